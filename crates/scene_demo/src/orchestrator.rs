//! The rotating-cube demo sequence.
//!
//! Start server, wait, create an entity, attach a script component, wait,
//! remove the entity. Every scene call is issued exactly once and in that
//! order. In best-effort mode a failed call is logged and recorded and the
//! sequence carries on; in strict mode the first failure ends the run.

use std::fmt;
use std::time::Duration;

use scene_bridge_core::ops;
use scene_bridge_core::types::ComponentSpec;
use scene_bridge_core::{SceneClient, SceneError};
use serde::Serialize;
use tokio::time::{sleep, timeout, Instant};

use crate::config::{DemoConfig, Readiness};
use crate::error::{OrchestratorError, RunAborted};
use crate::launcher::{self, ServerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    StartServer,
    AwaitReady,
    CreateEntity,
    AttachComponent,
    Settle,
    RemoveEntity,
    StopServer,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::StartServer => "start_server",
            Step::AwaitReady => "await_ready",
            Step::CreateEntity => "create_entity",
            Step::AttachComponent => "attach_component",
            Step::Settle => "settle",
            Step::RemoveEntity => "remove_entity",
            Step::StopServer => "stop_server",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepReport {
    fn ok(step: Step, detail: Option<String>) -> Self {
        Self {
            step,
            ok: true,
            status: None,
            detail,
        }
    }

    fn failed(step: Step, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok: false,
            status,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Id used for the attach and remove calls.
    pub entity_id: Option<u64>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| !s.ok)
    }

    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == step)
    }

    fn record(&mut self, report: StepReport) {
        self.steps.push(report);
    }
}

pub struct Orchestrator {
    client: SceneClient,
    config: DemoConfig,
}

impl Orchestrator {
    pub fn new(client: SceneClient, config: DemoConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Runs the whole sequence. On an abort the partial report travels with
    /// the error in [`RunAborted`].
    pub async fn run(&self) -> Result<RunReport, RunAborted> {
        let mut report = RunReport::default();

        let mut server = match self.start_server(&mut report) {
            Ok(server) => server,
            Err(source) => return Err(RunAborted { report, source }),
        };
        let outcome = self.run_sequence(server.as_mut(), &mut report).await;

        if self.config.stop_server {
            if let Some(handle) = server.take() {
                match handle.stop().await {
                    Ok(()) => report.record(StepReport::ok(Step::StopServer, None)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to stop scene server");
                        report.record(StepReport::failed(
                            Step::StopServer,
                            None,
                            e.to_string(),
                        ));
                    }
                }
            }
        } else if let Some(handle) = &server {
            tracing::info!(pid = ?handle.pid(), "Leaving scene server running");
        }

        match outcome {
            Ok(()) => Ok(report),
            Err(source) => Err(RunAborted { report, source }),
        }
    }

    fn start_server(
        &self,
        report: &mut RunReport,
    ) -> Result<Option<ServerHandle>, OrchestratorError> {
        let Some(command) = &self.config.server else {
            tracing::debug!("No server command configured, assuming it is already running");
            return Ok(None);
        };

        let handle = launcher::launch(command)?;
        report.record(StepReport::ok(
            Step::StartServer,
            handle.pid().map(|pid| format!("pid {pid}")),
        ));
        Ok(Some(handle))
    }

    async fn run_sequence(
        &self,
        server: Option<&mut ServerHandle>,
        report: &mut RunReport,
    ) -> Result<(), OrchestratorError> {
        self.await_ready(report).await?;

        if let Some(handle) = server {
            match handle.try_exit_status() {
                Ok(Some(status)) => {
                    tracing::warn!(%status, "Scene server exited before the demo started")
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Could not query scene server status"),
            }
        }

        let created = ops::create::create_entity(&self.client, &self.config.entity).await;
        let entity_id = match self.settle(report, Step::CreateEntity, created)? {
            Some(response) => match response.entity_id {
                Some(id) => id,
                None => {
                    tracing::debug!(
                        assumed = self.config.assumed_entity_id,
                        "Creation response carried no entity id"
                    );
                    self.config.assumed_entity_id
                }
            },
            None => self.config.assumed_entity_id,
        };
        report.entity_id = Some(entity_id);
        tracing::info!(entity_id, name = %self.config.entity.name, "Entity created");

        let component = ComponentSpec::script(self.config.script_path.clone());
        let attached = ops::component::add_component(&self.client, entity_id, component).await;
        self.settle(report, Step::AttachComponent, attached)?;

        tracing::info!(delay = ?self.config.settle_delay, "Letting the script run");
        sleep(self.config.settle_delay).await;
        report.record(StepReport::ok(Step::Settle, None));

        let removed = ops::remove::remove_entity(&self.client, entity_id).await;
        self.settle(report, Step::RemoveEntity, removed)?;

        Ok(())
    }

    async fn await_ready(&self, report: &mut RunReport) -> Result<(), OrchestratorError> {
        match self.config.readiness {
            Readiness::FixedDelay(delay) => {
                tracing::info!(?delay, "Waiting for scene server to start");
                sleep(delay).await;
                report.record(StepReport::ok(Step::AwaitReady, None));
                Ok(())
            }
            Readiness::PollHealth { interval, deadline } => {
                if poll_health(&self.client, interval, deadline).await {
                    report.record(StepReport::ok(Step::AwaitReady, None));
                    return Ok(());
                }

                tracing::warn!(?deadline, "Scene server never reported healthy");
                report.record(StepReport::failed(
                    Step::AwaitReady,
                    None,
                    format!("not healthy within {deadline:?}"),
                ));
                if self.config.strict {
                    return Err(OrchestratorError::NotReady(deadline));
                }
                Ok(())
            }
        }
    }

    /// Records a step outcome. Returns the value on success, `None` on a
    /// tolerated failure, and an error when running strict.
    fn settle<T>(
        &self,
        report: &mut RunReport,
        step: Step,
        result: Result<T, SceneError>,
    ) -> Result<Option<T>, OrchestratorError> {
        match result {
            Ok(value) => {
                tracing::info!(%step, "Step succeeded");
                report.record(StepReport::ok(step, None));
                Ok(Some(value))
            }
            Err(source) => {
                tracing::warn!(%step, error = %source, "Step failed");
                report.record(StepReport::failed(step, source.status(), source.to_string()));
                if self.config.strict {
                    Err(OrchestratorError::StepFailed { step, source })
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Polls `/health` until it answers or `deadline` passes. A request still in
/// flight when the deadline hits is cancelled.
pub async fn poll_health(client: &SceneClient, interval: Duration, deadline: Duration) -> bool {
    let started = Instant::now();
    loop {
        let remaining = deadline.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return false;
        }

        match timeout(remaining, ops::health::health(client)).await {
            Ok(Ok(_)) => {
                tracing::info!(elapsed = ?started.elapsed(), "Scene server is healthy");
                return true;
            }
            Ok(Err(e)) => tracing::debug!(error = %e, "Health check failed"),
            Err(_) => tracing::debug!(?deadline, "Health check still pending at deadline"),
        }

        if started.elapsed() + interval > deadline {
            return false;
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_match_serialization() {
        for step in [
            Step::StartServer,
            Step::AwaitReady,
            Step::CreateEntity,
            Step::AttachComponent,
            Step::Settle,
            Step::RemoveEntity,
            Step::StopServer,
        ] {
            let json = serde_json::to_value(step).unwrap();
            assert_eq!(json, step.as_str());
        }
    }

    #[test]
    fn run_report_tracks_failures() {
        let mut report = RunReport::default();
        report.record(StepReport::ok(Step::CreateEntity, None));
        assert!(report.all_succeeded());

        report.record(StepReport::failed(
            Step::AttachComponent,
            Some(404),
            "Entity #1 does not exist",
        ));
        assert!(!report.all_succeeded());

        let failures: Vec<_> = report.failures().map(|s| s.step).collect();
        assert_eq!(failures, vec![Step::AttachComponent]);
        assert_eq!(report.step(Step::AttachComponent).and_then(|s| s.status), Some(404));
        assert!(report.step(Step::RemoveEntity).is_none());
    }

    #[test]
    fn step_report_serialization_skips_empty_fields() {
        let json = serde_json::to_value(StepReport::ok(Step::Settle, None)).unwrap();
        assert_eq!(json, serde_json::json!({"step": "settle", "ok": true}));
    }
}
