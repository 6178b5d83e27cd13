//! # Pipeline Orchestrator
//!
//! Runs every discovered document through load, optional schema check and
//! transform, then gates the artifact write on the whole batch.
//!
//! ## Gate
//!
//! The artifact is written only when every document produced a record and
//! the combined records pass the structural check. Otherwise nothing is
//! written and the destination is left untouched. Document failures are
//! reported as [`Outcome`]s, never as an `Err`.

use std::path::{Path, PathBuf};

use argomig_core::{GeneratorConfigRecord, MigratorError, DEFAULT_API_VERSION};
use argomig_schema::{ApplicationSchema, SchemaValidator};

use crate::aggregate::{aggregate, validate_records};
use crate::loader::load_document;
use crate::scan::scan_directory;
use crate::transform::transform;

/// Inputs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Directory searched recursively for manifests.
    pub source_dir: PathBuf,
    /// Destination of the aggregated JSON array.
    pub output_file: PathBuf,
    /// Schema-check each document and structurally check the aggregate.
    pub validate: bool,
    /// Load schemas from here instead of the bundled set.
    pub schema_dir: Option<PathBuf>,
}

impl PipelineOptions {
    /// Options with validation on and bundled schemas.
    pub fn new(source_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_file: output_file.into(),
            validate: true,
            schema_dir: None,
        }
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_schema_dir(mut self, schema_dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(schema_dir.into());
        self
    }
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    Succeeded(GeneratorConfigRecord),
    Failed { error: String },
}

/// Result for one discovered document, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub source: PathBuf,
    pub status: OutcomeStatus,
}

impl Outcome {
    fn failed(source: &Path, error: impl ToString) -> Self {
        Self {
            source: source.to_path_buf(),
            status: OutcomeStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded(_))
    }

    /// The record, if this document succeeded.
    pub fn record(&self) -> Option<&GeneratorConfigRecord> {
        match &self.status {
            OutcomeStatus::Succeeded(record) => Some(record),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    /// The error message, if this document failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded(_) => None,
            OutcomeStatus::Failed { error } => Some(error),
        }
    }
}

/// Overall classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every document succeeded and the artifact was written.
    Success,
    /// No documents were found; an empty array was written.
    Empty,
    /// Something failed; no artifact was written.
    PartialFailure,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Written artifact, `None` when the gate vetoed the write.
    pub output_file: Option<PathBuf>,
    pub outcomes: Vec<Outcome>,
    pub status: RunStatus,
    /// Run-level failure (structural check or write), if any.
    pub error: Option<String>,
}

impl PipelineResult {
    /// Percentage of documents that succeeded, `0.0` for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64 * 100.0
    }

    /// True when an artifact was written and nothing failed.
    pub fn is_success(&self) -> bool {
        self.status != RunStatus::PartialFailure && self.output_file.is_some()
    }

    fn vetoed(mut outcomes: Vec<Outcome>, error: String) -> Self {
        for outcome in &mut outcomes {
            outcome.status = OutcomeStatus::Failed {
                error: error.clone(),
            };
        }
        Self {
            total: outcomes.len(),
            succeeded: 0,
            failed: outcomes.len(),
            output_file: None,
            outcomes,
            status: RunStatus::PartialFailure,
            error: Some(error),
        }
    }
}

/// Migrate every Application under `options.source_dir` into one
/// generator config file.
///
/// # Errors
///
/// Only a scan failure or a schema configuration failure (missing or
/// malformed schema document) is returned as `Err`. Document and
/// aggregate failures are reported in the [`PipelineResult`].
pub fn run_pipeline(options: &PipelineOptions) -> Result<PipelineResult, MigratorError> {
    let schema = if options.validate {
        Some(compile_schema(options)?)
    } else {
        None
    };

    let files = scan_directory(&options.source_dir)?;

    if files.is_empty() {
        tracing::warn!(
            directory = %options.source_dir.display(),
            "no YAML files found; writing empty config"
        );
        return Ok(match aggregate(&[], &options.output_file) {
            Ok(()) => PipelineResult {
                total: 0,
                succeeded: 0,
                failed: 0,
                output_file: Some(options.output_file.clone()),
                outcomes: Vec::new(),
                status: RunStatus::Empty,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to write empty config");
                PipelineResult::vetoed(Vec::new(), e.to_string())
            }
        });
    }

    let outcomes: Vec<Outcome> = files
        .iter()
        .map(|path| process_document(path, schema.as_ref()))
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        tracing::error!(
            failed,
            total = outcomes.len(),
            "not writing config: some applications failed"
        );
        return Ok(PipelineResult {
            total: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
            output_file: None,
            outcomes,
            status: RunStatus::PartialFailure,
            error: None,
        });
    }

    let records: Vec<GeneratorConfigRecord> =
        outcomes.iter().filter_map(Outcome::record).cloned().collect();

    if options.validate {
        if let Err(e) = validate_records(&records) {
            tracing::error!(error = %e, "aggregated config failed structural check");
            return Ok(PipelineResult::vetoed(outcomes, e.to_string()));
        }
    }

    if let Err(e) = aggregate(&records, &options.output_file) {
        tracing::error!(error = %e, "failed to write aggregated config");
        return Ok(PipelineResult::vetoed(outcomes, e.to_string()));
    }

    tracing::info!(
        total = outcomes.len(),
        output = %options.output_file.display(),
        "migration complete"
    );
    Ok(PipelineResult {
        total: outcomes.len(),
        succeeded: outcomes.len(),
        failed: 0,
        output_file: Some(options.output_file.clone()),
        outcomes,
        status: RunStatus::Success,
        error: None,
    })
}

fn compile_schema(options: &PipelineOptions) -> Result<ApplicationSchema, MigratorError> {
    let validator = match &options.schema_dir {
        Some(dir) => SchemaValidator::from_dir(dir)?,
        None => SchemaValidator::bundled()?,
    };
    Ok(validator.compile(DEFAULT_API_VERSION)?)
}

fn process_document(path: &Path, schema: Option<&ApplicationSchema>) -> Outcome {
    tracing::debug!(path = %path.display(), "processing");

    let loaded = match load_document(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load");
            return Outcome::failed(path, e);
        }
    };

    if let Some(schema) = schema {
        if let Err(e) = schema.validate(&loaded.raw) {
            tracing::error!(path = %path.display(), error = %e, "schema check failed");
            return Outcome::failed(path, e);
        }
    }

    match transform(&loaded.resource) {
        Ok(record) => {
            tracing::debug!(path = %path.display(), name = loaded.resource.name(), "transformed");
            Outcome {
                source: path.to_path_buf(),
                status: OutcomeStatus::Succeeded(record),
            }
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to transform");
            Outcome::failed(path, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argomig_core::{AggregationError, ValidationError};

    const APP: &str = "apiVersion: argoproj.io/v1alpha1\nkind: Application\nmetadata:\n  name: NAME\nspec:\n  source:\n    repoURL: https://github.com/org/repo\n  destination:\n    server: https://kubernetes.default.svc\n    namespace: default\n";

    fn app(name: &str) -> String {
        APP.replace("NAME", name)
    }

    #[test]
    fn options_builder() {
        let options = PipelineOptions::new("apps", "out/config.json")
            .with_validation(false)
            .with_schema_dir("schemas");
        assert_eq!(options.source_dir, PathBuf::from("apps"));
        assert!(!options.validate);
        assert_eq!(options.schema_dir, Some(PathBuf::from("schemas")));
        assert!(PipelineOptions::new("a", "b").validate);
    }

    #[test]
    fn success_rate() {
        let mut result = PipelineResult {
            total: 0,
            succeeded: 0,
            failed: 0,
            output_file: None,
            outcomes: Vec::new(),
            status: RunStatus::Empty,
            error: None,
        };
        assert_eq!(result.success_rate(), 0.0);
        result.total = 4;
        result.succeeded = 3;
        result.failed = 1;
        assert_eq!(result.success_rate(), 75.0);
    }

    #[test]
    fn successful_run_writes_records_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("apps");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("b.yaml"), app("beta")).unwrap();
        std::fs::write(input.join("a.yaml"), app("alpha")).unwrap();
        let output = dir.path().join("config.json");

        let result = run_pipeline(&PipelineOptions::new(&input, &output)).unwrap();
        assert_eq!(result.status, RunStatus::Success);
        assert!(result.is_success());
        assert_eq!(result.total, 2);
        let names: Vec<_> = result
            .outcomes
            .iter()
            .map(|o| o.record().and_then(|r| r.name()).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(result.output_file.as_deref(), Some(output.as_path()));
    }

    #[test]
    fn any_failure_vetoes_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("apps");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("good.yaml"), app("good")).unwrap();
        std::fs::write(input.join("bad.yaml"), "apiVersion: v1\nkind: ConfigMap\n").unwrap();
        let output = dir.path().join("config.json");

        let result = run_pipeline(&PipelineOptions::new(&input, &output)).unwrap();
        assert_eq!(result.status, RunStatus::PartialFailure);
        assert_eq!((result.total, result.succeeded, result.failed), (2, 1, 1));
        assert!(result.output_file.is_none());
        assert!(!output.exists());
        assert!(result.outcomes[0].error().unwrap().contains("not an ArgoCD Application"));
        assert!(result.outcomes[1].is_success());
        assert!(result.error.is_none());
    }

    #[test]
    fn schema_violation_is_a_document_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("apps");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(
            input.join("no-source.yaml"),
            "apiVersion: argoproj.io/v1alpha1\nkind: Application\nmetadata:\n  name: x\nspec:\n  destination:\n    namespace: default\n",
        )
        .unwrap();
        let output = dir.path().join("config.json");

        let result = run_pipeline(&PipelineOptions::new(&input, &output)).unwrap();
        assert_eq!(result.failed, 1);
        assert!(result.outcomes[0].error().unwrap().contains("Validation error"));

        let result =
            run_pipeline(&PipelineOptions::new(&input, &output).with_validation(false)).unwrap();
        assert_eq!(result.status, RunStatus::Success);
    }

    #[test]
    fn empty_input_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("config.json");
        let result = run_pipeline(&PipelineOptions::new(dir.path(), &output)).unwrap();
        assert_eq!(result.status, RunStatus::Empty);
        assert_eq!(result.total, 0);
        assert!(result.is_success());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");
    }

    #[test]
    fn write_failure_reclassifies_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("apps");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("a.yaml"), app("alpha")).unwrap();
        let output = dir.path().join("taken");
        std::fs::create_dir_all(output.join("inner")).unwrap();

        let result = run_pipeline(&PipelineOptions::new(&input, &output)).unwrap();
        assert_eq!(result.status, RunStatus::PartialFailure);
        assert_eq!((result.succeeded, result.failed), (0, 1));
        let error = result.error.clone().unwrap();
        assert_eq!(result.outcomes[0].error(), Some(error.as_str()));
        assert!(error.contains("Error writing aggregated config"));
    }

    #[test]
    fn vetoed_result_shape() {
        let outcomes = vec![Outcome {
            source: PathBuf::from("a.yaml"),
            status: OutcomeStatus::Failed { error: "x".into() },
        }];
        let error = AggregationError::MissingName { index: 0 }.to_string();
        let result = PipelineResult::vetoed(outcomes, error.clone());
        assert_eq!(result.outcomes[0].error(), Some(error.as_str()));
        assert!(!result.is_success());
    }

    #[test]
    fn scan_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = PipelineOptions::new(dir.path().join("missing"), dir.path().join("c.json"));
        assert!(matches!(run_pipeline(&options), Err(MigratorError::Scan(_))));
    }

    #[test]
    fn missing_schema_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = dir.path().join("schemas");
        std::fs::create_dir_all(&schemas).unwrap();
        let options = PipelineOptions::new(dir.path(), dir.path().join("c.json"))
            .with_schema_dir(&schemas);
        let err = run_pipeline(&options).unwrap_err();
        assert!(matches!(
            err,
            MigratorError::Validation(ValidationError::SchemaNotFound { .. })
        ));
        assert!(!dir.path().join("c.json").exists());
    }

    #[test]
    fn schema_dir_is_ignored_without_validation() {
        let dir = tempfile::tempdir().unwrap();
        let options = PipelineOptions::new(dir.path(), dir.path().join("c.json"))
            .with_validation(false)
            .with_schema_dir(dir.path().join("nowhere"));
        assert_eq!(run_pipeline(&options).unwrap().status, RunStatus::Empty);
    }
}
