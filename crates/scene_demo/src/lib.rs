//! Scene Demo
//!
//! Drives a scene server through the rotating-cube demo and provisions the
//! Python environment the server runs in.

pub mod config;
pub mod error;
pub mod launcher;
pub mod orchestrator;
pub mod provision;

pub use config::{DemoConfig, ProvisionConfig, Readiness, ServerCommand};
pub use error::{LaunchError, OrchestratorError, ProvisionError, RunAborted};
pub use orchestrator::{Orchestrator, RunReport, Step, StepReport};
