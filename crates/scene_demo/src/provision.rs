//! `configure-environment`: create a virtual environment and install the
//! dependency manifest into it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::ProvisionConfig;
use crate::error::ProvisionError;

pub async fn configure_environment(config: &ProvisionConfig) -> Result<(), ProvisionError> {
    if !config.manifest.is_file() {
        return Err(ProvisionError::MissingManifest(config.manifest.clone()));
    }

    tracing::info!(
        python = %config.python,
        env_dir = %config.env_dir.display(),
        "Creating virtual environment"
    );
    run(
        OsStr::new(&config.python),
        [OsStr::new("-m"), OsStr::new("venv"), config.env_dir.as_os_str()],
    )
    .await?;

    let pip = pip_path(&config.env_dir);

    if config.upgrade_pip {
        tracing::info!("Upgrading pip");
        run(
            pip.as_os_str(),
            [OsStr::new("install"), OsStr::new("--upgrade"), OsStr::new("pip")],
        )
        .await?;
    }

    tracing::info!(manifest = %config.manifest.display(), "Installing dependencies");
    run(
        pip.as_os_str(),
        [OsStr::new("install"), OsStr::new("-r"), config.manifest.as_os_str()],
    )
    .await?;

    tracing::info!("Environment ready");
    Ok(())
}

/// Location of `pip` inside a virtual environment.
pub fn pip_path(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("pip.exe")
    } else {
        env_dir.join("bin").join("pip")
    }
}

async fn run<'a>(
    program: &OsStr,
    args: impl IntoIterator<Item = &'a OsStr>,
) -> Result<(), ProvisionError> {
    let name = program.to_string_lossy().into_owned();
    tracing::debug!(program = %name, "Running");

    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|source| ProvisionError::Spawn {
            program: name.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ProvisionError::Failed {
            program: name,
            code: status.code(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir, python: &str) -> ProvisionConfig {
        let manifest = dir.path().join("requirements.txt");
        std::fs::write(&manifest, "requests\n").unwrap();
        ProvisionConfig {
            python: python.to_string(),
            env_dir: dir.path().join("venv"),
            manifest,
            upgrade_pip: false,
        }
    }

    #[test]
    fn pip_lives_inside_env_dir() {
        let pip = pip_path(Path::new("venv"));
        assert!(pip.starts_with("venv"));
        assert!(pip.to_string_lossy().contains("pip"));
    }

    #[tokio::test]
    async fn missing_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProvisionConfig {
            manifest: dir.path().join("nope.txt"),
            ..ProvisionConfig::default()
        };

        let err = configure_environment(&config).await.unwrap_err();
        assert!(matches!(err, ProvisionError::MissingManifest(_)));
    }

    #[tokio::test]
    async fn missing_interpreter_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, "definitely-not-python");

        let err = configure_environment(&config).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_venv_step_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, "false");

        let err = configure_environment(&config).await.unwrap_err();
        match err {
            ProvisionError::Failed { program, code } => {
                assert_eq!(program, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn pip_missing_from_env_is_spawn_error() {
        // `true` "creates" the venv without writing anything, so pip is absent.
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, "true");

        let err = configure_environment(&config).await.unwrap_err();
        match err {
            ProvisionError::Spawn { program, .. } => assert!(program.ends_with("pip")),
            other => panic!("Expected Spawn, got {other:?}"),
        }
    }
}
