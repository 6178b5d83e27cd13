//! # Field Transformer
//!
//! Maps one ArgoCD Application to one ApplicationSet generator config
//! record. Each rule reads only the input, never another rule's output,
//! and nothing outside the rule set reaches the record:
//!
//! | Input | Output |
//! |---|---|
//! | `metadata.name` | `metadata.name` |
//! | `metadata.annotations["argocd.argoproj.io/sync-wave"]` | `metadata.annotations.syncWave` |
//! | (always) | `metadata.annotations.enablePrune = false` |
//! | other non-`argocd.argoproj.io/` annotations | copied under the same key |
//! | `metadata.labels` | `metadata.labels` |
//! | `spec.project` (default `"default"`) | `project` |
//! | `source.repoURL` / `targetRevision` / `path` | `repoURL` / `revision` / `manifestPath` |
//! | `source.directory` / `helm` / `kustomize` | passed through |
//! | `destination.server` | `destination.clusterName` |
//! | `destination.namespace` | `destination.namespace` |
//! | `syncPolicy.automated` non-null | `enableSyncPolicy` |

use std::collections::BTreeMap;

use argomig_core::{
    ApplicationDestination, ApplicationSource, GeneratorAnnotations, GeneratorConfigRecord,
    GeneratorDestination, GeneratorMetadata, GeneratorSource, InputResource, ObjectMeta,
    TransformError, ARGOCD_ANNOTATION_PREFIX, DEFAULT_PROJECT, IN_CLUSTER_NAME,
    IN_CLUSTER_SERVER, SYNC_WAVE_ANNOTATION,
};
use serde_json::Value;

/// Output annotation keys owned by the transformer; a copied input
/// annotation never overrides them.
const RESERVED_OUTPUT_ANNOTATIONS: [&str; 2] = ["syncWave", "enablePrune"];

/// Transform an Application into a generator config record.
///
/// Pure: the same input always yields an equal record. Every loaded
/// Application maps to a record; a server URL that normalizes to nothing
/// is emitted as an empty `clusterName`.
pub fn transform(resource: &InputResource) -> Result<GeneratorConfigRecord, TransformError> {
    let spec = &resource.spec;

    let record = GeneratorConfigRecord {
        metadata: transform_metadata(&resource.metadata),
        project: spec
            .project
            .clone()
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
        source: spec.source.as_ref().map(transform_source).unwrap_or_default(),
        destination: transform_destination(spec.destination.as_ref()),
        enable_sync_policy: sync_policy_enabled(spec.sync_policy.as_ref()),
    };

    tracing::debug!(name = resource.name(), "transformed to generator config");
    Ok(record)
}

/// Derive a cluster name from a destination server URL.
///
/// The in-cluster URL maps to `in-cluster`. Anything else loses its
/// `http://` / `https://` prefix, its port and a trailing `.svc`, and has
/// dots and slashes replaced by dashes.
pub fn cluster_name(server: &str) -> String {
    if server == IN_CLUSTER_SERVER {
        return IN_CLUSTER_NAME.to_string();
    }

    let host = server
        .strip_prefix("https://")
        .or_else(|| server.strip_prefix("http://"))
        .unwrap_or(server);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_suffix(".svc").unwrap_or(host);
    host.replace(['.', '/'], "-")
}

fn transform_metadata(metadata: &ObjectMeta) -> GeneratorMetadata {
    GeneratorMetadata {
        name: Some(metadata.name.clone()),
        annotations: Some(transform_annotations(metadata.annotations.as_ref())),
        labels: metadata.labels.clone(),
    }
}

fn transform_annotations(source: Option<&BTreeMap<String, String>>) -> GeneratorAnnotations {
    let mut annotations = GeneratorAnnotations {
        sync_wave: None,
        enable_prune: false,
        passthrough: BTreeMap::new(),
    };

    for (key, value) in source.into_iter().flatten() {
        if key == SYNC_WAVE_ANNOTATION {
            annotations.sync_wave = Some(value.clone());
        } else if !key.starts_with(ARGOCD_ANNOTATION_PREFIX)
            && !RESERVED_OUTPUT_ANNOTATIONS.contains(&key.as_str())
        {
            annotations.passthrough.insert(key.clone(), value.clone());
        }
    }
    annotations
}

fn transform_source(source: &ApplicationSource) -> GeneratorSource {
    GeneratorSource {
        repo_url: source.repo_url.clone(),
        revision: source.target_revision.clone(),
        manifest_path: source.path.clone(),
        directory: source.directory.clone(),
        helm: source.helm.clone(),
        kustomize: source.kustomize.clone(),
    }
}

fn transform_destination(destination: Option<&ApplicationDestination>) -> GeneratorDestination {
    let Some(destination) = destination else {
        return GeneratorDestination::default();
    };

    GeneratorDestination {
        cluster_name: destination.server.as_deref().map(cluster_name),
        namespace: destination.namespace.clone(),
    }
}

fn sync_policy_enabled(sync_policy: Option<&Value>) -> bool {
    sync_policy
        .and_then(|policy| policy.get("automated"))
        .is_some_and(|automated| !automated.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn app(value: Value) -> InputResource {
        serde_json::from_value(value).unwrap()
    }

    fn valid_app() -> Value {
        json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Application",
            "metadata": {
                "name": "test-app",
                "namespace": "argocd",
                "annotations": {"argocd.argoproj.io/sync-wave": "40"},
                "labels": {"team": "platform"}
            },
            "spec": {
                "project": "default",
                "source": {
                    "repoURL": "https://github.com/test/repo",
                    "targetRevision": "main",
                    "path": "./manifests"
                },
                "destination": {
                    "server": "https://kubernetes.default.svc",
                    "namespace": "production"
                },
                "syncPolicy": {"automated": {"prune": true, "selfHeal": true}}
            }
        })
    }

    #[test]
    fn transforms_basic_application() {
        let record = transform(&app(valid_app())).unwrap();
        assert_eq!(record.name(), Some("test-app"));
        assert_eq!(record.project, "default");
        assert_eq!(record.source.repo_url, Some(json!("https://github.com/test/repo")));
        assert_eq!(record.source.revision, Some(json!("main")));
        assert_eq!(record.source.manifest_path, Some(json!("./manifests")));
        assert_eq!(record.destination.cluster_name.as_deref(), Some("in-cluster"));
        assert_eq!(record.destination.namespace.as_deref(), Some("production"));
        assert!(record.enable_sync_policy);
    }

    #[test]
    fn renamed_source_fields_drop_old_names() {
        let value = serde_json::to_value(transform(&app(valid_app())).unwrap()).unwrap();
        let source = value["source"].as_object().unwrap();
        assert!(source.contains_key("revision"));
        assert!(source.contains_key("manifestPath"));
        assert!(!source.contains_key("targetRevision"));
        assert!(!source.contains_key("path"));
    }

    #[test]
    fn sync_wave_and_enable_prune_annotations() {
        let value = serde_json::to_value(transform(&app(valid_app())).unwrap()).unwrap();
        assert_eq!(
            value["metadata"]["annotations"],
            json!({"syncWave": "40", "enablePrune": false})
        );
    }

    #[test]
    fn non_argocd_annotations_are_copied_and_argocd_ones_dropped() {
        let mut doc = valid_app();
        doc["metadata"]["annotations"] = json!({
            "argocd.argoproj.io/sync-wave": "-1",
            "argocd.argoproj.io/refresh": "hard",
            "notifications.argoproj.io/subscribe.on-sync.slack": "deploys",
            "owner": "team-a"
        });
        let annotations = transform(&app(doc)).unwrap().metadata.annotations.unwrap();
        assert_eq!(annotations.sync_wave.as_deref(), Some("-1"));
        assert!(!annotations.enable_prune);
        assert_eq!(
            annotations.passthrough,
            BTreeMap::from([
                (
                    "notifications.argoproj.io/subscribe.on-sync.slack".to_string(),
                    "deploys".to_string()
                ),
                ("owner".to_string(), "team-a".to_string()),
            ])
        );
    }

    #[test]
    fn copied_annotations_never_override_generated_keys() {
        let mut doc = valid_app();
        doc["metadata"]["annotations"] = json!({"enablePrune": "true", "syncWave": "99"});
        let value = serde_json::to_value(transform(&app(doc)).unwrap()).unwrap();
        assert_eq!(value["metadata"]["annotations"], json!({"enablePrune": false}));
    }

    #[test]
    fn annotations_without_sync_wave_still_carry_enable_prune() {
        let mut doc = valid_app();
        doc["metadata"].as_object_mut().unwrap().remove("annotations");
        let value = serde_json::to_value(transform(&app(doc)).unwrap()).unwrap();
        assert_eq!(value["metadata"]["annotations"], json!({"enablePrune": false}));
    }

    #[test]
    fn sync_wave_value_is_preserved_verbatim() {
        let mut doc = valid_app();
        doc["metadata"]["annotations"] = json!({"argocd.argoproj.io/sync-wave": "007"});
        let record = transform(&app(doc)).unwrap();
        assert_eq!(record.metadata.annotations.unwrap().sync_wave.as_deref(), Some("007"));
    }

    #[test]
    fn labels_are_preserved_or_omitted() {
        let record = transform(&app(valid_app())).unwrap();
        assert_eq!(
            record.metadata.labels.unwrap().get("team").map(String::as_str),
            Some("platform")
        );

        let mut doc = valid_app();
        doc["metadata"].as_object_mut().unwrap().remove("labels");
        let value = serde_json::to_value(transform(&app(doc)).unwrap()).unwrap();
        assert!(value["metadata"].get("labels").is_none());
    }

    #[test]
    fn passthrough_source_blocks() {
        let mut doc = valid_app();
        doc["spec"]["source"]["directory"] = json!({"recurse": true});
        doc["spec"]["source"]["helm"] = json!({"valueFiles": ["values-prod.yaml"]});
        doc["spec"]["source"]["kustomize"] = json!({"namePrefix": "prod-"});
        let source = transform(&app(doc)).unwrap().source;
        assert_eq!(source.directory, Some(json!({"recurse": true})));
        assert_eq!(source.helm, Some(json!({"valueFiles": ["values-prod.yaml"]})));
        assert_eq!(source.kustomize, Some(json!({"namePrefix": "prod-"})));
    }

    #[test]
    fn unknown_source_fields_are_dropped() {
        let mut doc = valid_app();
        doc["spec"]["source"]["chart"] = json!("nginx");
        let value = serde_json::to_value(transform(&app(doc)).unwrap()).unwrap();
        assert!(value["source"].get("chart").is_none());
    }

    #[test]
    fn project_defaults_when_absent() {
        let mut doc = valid_app();
        doc["spec"].as_object_mut().unwrap().remove("project");
        assert_eq!(transform(&app(doc)).unwrap().project, "default");
    }

    #[test]
    fn sync_policy_variants() {
        let cases = [
            (None, false),
            (Some(json!(null)), false),
            (Some(json!({})), false),
            (Some(json!({"syncOptions": ["CreateNamespace=true"]})), false),
            (Some(json!({"automated": null})), false),
            (Some(json!({"automated": {}})), true),
            (Some(json!({"automated": {"prune": false}})), true),
        ];
        for (policy, expected) in cases {
            let mut doc = valid_app();
            let spec = doc["spec"].as_object_mut().unwrap();
            spec.remove("syncPolicy");
            if let Some(policy) = policy.clone() {
                spec.insert("syncPolicy".to_string(), policy);
            }
            assert_eq!(
                transform(&app(doc)).unwrap().enable_sync_policy,
                expected,
                "syncPolicy {policy:?}"
            );
        }
    }

    #[test]
    fn missing_optional_fields() {
        let record = transform(&app(json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Application",
            "metadata": {"name": "minimal-app"},
            "spec": {
                "project": "default",
                "source": {"repoURL": "https://github.com/test/repo"},
                "destination": {"server": "https://kubernetes.default.svc"}
            }
        })))
        .unwrap();
        assert_eq!(record.name(), Some("minimal-app"));
        assert_eq!(record.project, "default");
        assert!(!record.enable_sync_policy);
        assert!(record.source.revision.is_none());
        assert!(record.destination.namespace.is_none());
    }

    #[test]
    fn empty_spec_yields_empty_source_and_destination() {
        let value = serde_json::to_value(
            transform(&app(json!({
                "apiVersion": "argoproj.io/v1alpha1",
                "kind": "Application",
                "metadata": {"name": "bare"},
                "spec": {}
            })))
            .unwrap(),
        )
        .unwrap();
        assert_eq!(value["source"], json!({}));
        assert_eq!(value["destination"], json!({}));
        assert_eq!(value["project"], "default");
    }

    #[test]
    fn cluster_name_rules() {
        assert_eq!(cluster_name("https://kubernetes.default.svc"), "in-cluster");
        assert_eq!(
            cluster_name("https://custom-cluster.example.com:6443"),
            "custom-cluster-example-com"
        );
        assert_eq!(cluster_name("http://staging.internal"), "staging-internal");
        assert_eq!(cluster_name("https://prod.cluster.svc"), "prod-cluster");
        assert_eq!(cluster_name("https://prod.cluster.svc:443"), "prod-cluster");
        assert_eq!(cluster_name("https://10.0.0.1/k8s/clusters/c-abc"), "10-0-0-1-k8s-clusters-c-abc");
    }

    #[test]
    fn server_without_host_yields_empty_cluster_name() {
        let mut doc = valid_app();
        doc["spec"]["destination"]["server"] = json!("https://");
        let record = transform(&app(doc)).unwrap();
        assert_eq!(record.destination.cluster_name.as_deref(), Some(""));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["destination"]["clusterName"], "");
        assert_eq!(cluster_name("https://:6443"), "");
    }

    #[test]
    fn transform_is_deterministic() {
        let resource = app(valid_app());
        let first = serde_json::to_vec_pretty(&transform(&resource).unwrap()).unwrap();
        let second = serde_json::to_vec_pretty(&transform(&resource).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn cluster_name_strips_scheme_and_port(
            host in "[a-z][a-z0-9-]{0,8}(\\.[a-z][a-z0-9-]{0,8}){0,3}",
            port in 1u16..,
        ) {
            prop_assume!(!host.ends_with(".svc"));
            let expected = host.replace('.', "-");
            prop_assert_eq!(cluster_name(&format!("https://{host}:{port}")), expected.clone());
            prop_assert_eq!(cluster_name(&format!("http://{host}")), expected);
        }

        #[test]
        fn cluster_name_has_no_separators(server in "[a-z0-9:/.-]{0,40}") {
            let name = cluster_name(&server);
            prop_assert!(!name.contains(':'));
            prop_assert!(!name.contains('.'));
            prop_assert!(!name.contains('/'));
        }

        #[test]
        fn any_non_null_automated_enables_sync(prune in any::<bool>(), self_heal in any::<bool>()) {
            let mut doc = valid_app();
            doc["spec"]["syncPolicy"] = json!({"automated": {"prune": prune, "selfHeal": self_heal}});
            let resource = app(doc);
            prop_assert!(transform(&resource).unwrap().enable_sync_policy);
            prop_assert_eq!(transform(&resource).unwrap(), transform(&resource).unwrap());
        }
    }
}
