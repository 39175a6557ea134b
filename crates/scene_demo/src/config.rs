use scene_bridge_core::types::CreateEntityRequest;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENTITY_ID: u64 = 1;
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_SCRIPT: &str = "custom_scripts/my_custom_script.py";

/// Program and arguments used to launch the scene server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ServerCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ServerCommand {
    fn default() -> Self {
        Self::new("venv/bin/python", ["server/main.py"])
    }
}

/// How the orchestrator decides the server is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    FixedDelay(Duration),
    PollHealth { interval: Duration, deadline: Duration },
}

impl Default for Readiness {
    fn default() -> Self {
        Self::FixedDelay(DEFAULT_STARTUP_DELAY)
    }
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// `None` when the server is already running elsewhere.
    pub server: Option<ServerCommand>,
    pub readiness: Readiness,
    pub settle_delay: Duration,
    pub entity: CreateEntityRequest,
    pub script_path: PathBuf,
    /// Used when the creation response carries no id.
    pub assumed_entity_id: u64,
    pub strict: bool,
    pub stop_server: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            server: Some(ServerCommand::default()),
            readiness: Readiness::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            entity: CreateEntityRequest::new("Rotating Cube", "Main Scene", ["cube", "rotating"]),
            script_path: default_script_path(),
            assumed_entity_id: DEFAULT_ENTITY_ID,
            strict: false,
            stop_server: false,
        }
    }
}

pub fn default_script_path() -> PathBuf {
    absolutize(PathBuf::from(DEFAULT_SCRIPT))
}

/// Resolves a relative path against the working directory.
pub fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub python: String,
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub upgrade_pip: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            env_dir: PathBuf::from("venv"),
            manifest: PathBuf::from("requirements.txt"),
            upgrade_pip: false,
        }
    }
}
