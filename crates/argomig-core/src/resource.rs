//! # Input Model: ArgoCD Application
//!
//! The subset of an `argoproj.io/v1alpha1` `Application` that the migrator
//! reads. Unknown fields are ignored on decode; they have no counterpart in
//! the generator config and are dropped.
//!
//! Values are only constructed by the document loader after it has checked
//! `kind`, `apiVersion`, `metadata.name` and `spec`, so an `InputResource`
//! always satisfies those checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only resource kind the migrator accepts.
pub const APPLICATION_KIND: &str = "Application";

/// Required prefix of `apiVersion`.
pub const API_GROUP_PREFIX: &str = "argoproj.io/";

/// Schema version used when none is requested explicitly.
pub const DEFAULT_API_VERSION: &str = "v1alpha1";

/// Annotation carrying the sync-wave ordering priority.
pub const SYNC_WAVE_ANNOTATION: &str = "argocd.argoproj.io/sync-wave";

/// Annotations under this prefix are ArgoCD-reserved and not copied.
pub const ARGOCD_ANNOTATION_PREFIX: &str = "argocd.argoproj.io/";

/// Project used when `spec.project` is absent.
pub const DEFAULT_PROJECT: &str = "default";

/// Server URL denoting the cluster the controller runs in.
pub const IN_CLUSTER_SERVER: &str = "https://kubernetes.default.svc";

/// Cluster name emitted for [`IN_CLUSTER_SERVER`].
pub const IN_CLUSTER_NAME: &str = "in-cluster";

/// A parsed ArgoCD Application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputResource {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ApplicationSpec,
}

impl InputResource {
    /// `metadata.name`, guaranteed non-empty by the loader.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Application metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Application spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApplicationSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ApplicationDestination>,

    /// Kept opaque: only the presence of a non-null `automated` key matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_policy: Option<Value>,
}

/// Where the Application's manifests come from.
///
/// Every field is carried as a raw value. Unquoted Helm chart versions
/// (`targetRevision: 6.0`) decode as numbers and are copied through as-is;
/// typing is left to the schema check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
    #[serde(rename = "repoURL", default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_revision: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomize: Option<Value>,
}

/// Where the Application is deployed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
