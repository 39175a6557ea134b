//! Background launch of the scene server process.
//!
//! The server is not supervised: nothing watches it after spawn, and it keeps
//! running when the handle is dropped. [`ServerHandle::stop`] is the only way
//! this crate ends it.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};

use crate::config::ServerCommand;
use crate::error::LaunchError;

#[derive(Debug)]
pub struct ServerHandle {
    child: Child,
    pid: Option<u32>,
}

/// Spawns the server with inherited stdout/stderr. Must run inside a tokio runtime.
pub fn launch(command: &ServerCommand) -> Result<ServerHandle, LaunchError> {
    tracing::info!(
        program = %command.program,
        args = ?command.args,
        "Starting scene server in the background"
    );

    let child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(false)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    let pid = child.id();
    tracing::debug!(?pid, "Scene server spawned");

    Ok(ServerHandle { child, pid })
}

impl ServerHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking check for an early exit.
    pub fn try_exit_status(&mut self) -> Result<Option<ExitStatus>, LaunchError> {
        Ok(self.child.try_wait()?)
    }

    pub async fn stop(mut self) -> Result<(), LaunchError> {
        if self.child.try_wait()?.is_none() {
            tracing::info!(pid = ?self.pid, "Stopping scene server");
            self.child.kill().await?;
        }
        self.child.wait().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn launch_missing_program_is_spawn_error() {
        let command = ServerCommand::new("./definitely-not-a-scene-server", Vec::<String>::new());
        let err = launch(&command).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-scene-server"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn running_server_can_be_stopped() {
        let mut handle = launch(&ServerCommand::new("sleep", ["30"])).unwrap();
        assert!(handle.pid().is_some());
        assert!(handle.try_exit_status().unwrap().is_none());

        handle.stop().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_reaps_the_process() {
        let handle = launch(&ServerCommand::new("sleep", ["30"])).unwrap();
        let pid = handle.pid().unwrap().to_string();

        handle.stop().await.unwrap();

        // A reaped pid no longer accepts signals.
        let alive = std::process::Command::new("kill")
            .args(["-0", &pid])
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!alive.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn early_exit_is_reported() {
        let mut handle = launch(&ServerCommand::new("sh", ["-c", "exit 3"])).unwrap();

        let mut status = None;
        for _ in 0..50 {
            status = handle.try_exit_status().unwrap();
            if status.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(status.and_then(|s| s.code()), Some(3));

        // Stopping an exited server is a no-op.
        handle.stop().await.unwrap();
    }
}
