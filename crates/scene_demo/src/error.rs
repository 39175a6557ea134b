use crate::orchestrator::{RunReport, Step};
use scene_bridge_core::SceneError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to spawn server '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server process error: {0}")]
    Process(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Dependency manifest not found: {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {}", exit_code_text(.code))]
    Failed { program: String, code: Option<i32> },
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: SceneError,
    },

    #[error("Server did not become healthy within {0:?}")]
    NotReady(std::time::Duration),
}

/// A run that stopped early, with the steps recorded up to that point.
#[derive(Error, Debug)]
#[error("run aborted after {} recorded steps", .report.steps.len())]
pub struct RunAborted {
    pub report: RunReport,
    #[source]
    pub source: OrchestratorError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_provision_error_display() {
        let err = ProvisionError::Failed {
            program: "pip".into(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "'pip' exited with status 2");

        let err = ProvisionError::Failed {
            program: "python3".into(),
            code: None,
        };
        assert_eq!(
            err.to_string(),
            "'python3' exited with no status (terminated by signal)"
        );

        let err = ProvisionError::MissingManifest(PathBuf::from("requirements.txt"));
        assert_eq!(
            err.to_string(),
            "Dependency manifest not found: requirements.txt"
        );
    }

    #[test]
    fn test_step_failed_display() {
        let err = OrchestratorError::StepFailed {
            step: Step::CreateEntity,
            source: SceneError::api(400, "ERROR_400", "Invalid JSON request"),
        };
        assert_eq!(
            err.to_string(),
            "Step 'create_entity' failed: API error (400): ERROR_400 - Invalid JSON request"
        );

        let err = OrchestratorError::NotReady(Duration::from_secs(3));
        assert_eq!(err.to_string(), "Server did not become healthy within 3s");
    }

    #[test]
    fn test_run_aborted_keeps_source_chain() {
        use std::error::Error as _;

        let aborted = RunAborted {
            report: RunReport::default(),
            source: OrchestratorError::NotReady(Duration::from_millis(500)),
        };
        assert_eq!(aborted.to_string(), "run aborted after 0 recorded steps");
        assert_eq!(
            aborted.source().map(|s| s.to_string()),
            Some("Server did not become healthy within 500ms".to_string())
        );
    }
}
