//! # Output Model: ApplicationSet Generator Config Record
//!
//! One element of the aggregated `config.json` array. Keys serialize in
//! camelCase; every optional field is skipped when absent so the artifact
//! never contains `null` placeholders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level keys every record in the aggregate must carry.
pub const REQUIRED_RECORD_FIELDS: [&str; 4] = ["metadata", "project", "source", "destination"];

/// A generator config record derived from exactly one Application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfigRecord {
    pub metadata: GeneratorMetadata,
    pub project: String,
    pub source: GeneratorSource,
    pub destination: GeneratorDestination,
    pub enable_sync_policy: bool,
}

impl GeneratorConfigRecord {
    /// `metadata.name`, if one was carried over.
    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<GeneratorAnnotations>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Annotations on a generator record.
///
/// `syncWave` and `enablePrune` are emitted first; every copied
/// non-ArgoCD annotation follows under its original key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorAnnotations {
    #[serde(rename = "syncWave", default, skip_serializing_if = "Option::is_none")]
    pub sync_wave: Option<String>,

    #[serde(rename = "enablePrune")]
    pub enable_prune: bool,

    #[serde(flatten)]
    pub passthrough: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSource {
    #[serde(rename = "repoURL", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomize: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
