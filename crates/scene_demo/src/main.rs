use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scene_bridge_core::types::CreateEntityRequest;
use scene_bridge_core::{SceneClient, SceneConfig};
use scene_demo::config::{absolutize, DEFAULT_HEALTH_INTERVAL, DEFAULT_STARTUP_DELAY};
use scene_demo::provision::configure_environment;
use scene_demo::{
    DemoConfig, Orchestrator, ProvisionConfig, Readiness, RunReport, ServerCommand,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    Command::new("scene_demo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Demo runner and environment setup for the scene server")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("rotating-cube")
                .about("Start the server, create an entity, attach a script, then remove it")
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help(
                            "Scene server base URL \
                             (default: $SCENE_ENDPOINT or http://127.0.0.1:5001)",
                        ),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .value_parser(value_parser!(u64))
                        .help("HTTP timeout per request in milliseconds"),
                )
                .arg(
                    Arg::new("server-program")
                        .long("server-program")
                        .default_value("venv/bin/python")
                        .help("Program that starts the scene server"),
                )
                .arg(
                    Arg::new("server-arg")
                        .long("server-arg")
                        .action(ArgAction::Append)
                        .allow_hyphen_values(true)
                        .help(
                            "Argument passed to the server program \
                             (repeatable, default: server/main.py)",
                        ),
                )
                .arg(
                    Arg::new("no-server")
                        .long("no-server")
                        .action(ArgAction::SetTrue)
                        .help("Do not launch the server; it is already running"),
                )
                .arg(
                    Arg::new("stop-server")
                        .long("stop-server")
                        .action(ArgAction::SetTrue)
                        .help("Kill the launched server when the demo finishes"),
                )
                .arg(
                    Arg::new("startup-delay-ms")
                        .long("startup-delay-ms")
                        .default_value("2000")
                        .value_parser(value_parser!(u64))
                        .help("Fixed wait after launching the server"),
                )
                .arg(
                    Arg::new("settle-delay-ms")
                        .long("settle-delay-ms")
                        .default_value("5000")
                        .value_parser(value_parser!(u64))
                        .help("Wait between attaching the script and removing the entity"),
                )
                .arg(
                    Arg::new("wait-for-health")
                        .long("wait-for-health")
                        .action(ArgAction::SetTrue)
                        .help("Poll GET /health instead of the fixed startup delay"),
                )
                .arg(
                    Arg::new("health-timeout-ms")
                        .long("health-timeout-ms")
                        .default_value("10000")
                        .value_parser(value_parser!(u64))
                        .help("How long to poll /health before giving up"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("Rotating Cube")
                        .help("Entity name"),
                )
                .arg(
                    Arg::new("scene")
                        .long("scene")
                        .default_value("Main Scene")
                        .help("Target scene"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .action(ArgAction::Append)
                        .help("Entity tag (repeatable, default: cube, rotating)"),
                )
                .arg(
                    Arg::new("script-path")
                        .long("script-path")
                        .value_parser(value_parser!(PathBuf))
                        .help("Script attached to the entity (made absolute)"),
                )
                .arg(
                    Arg::new("entity-id")
                        .long("entity-id")
                        .default_value("1")
                        .value_parser(value_parser!(u64))
                        .help("Entity id to use when the server does not return one"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Abort on the first failed step"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the run report as JSON"),
                ),
        )
        .subcommand(
            Command::new("configure-environment")
                .about("Create a virtual environment and install the dependency manifest")
                .arg(
                    Arg::new("python")
                        .long("python")
                        .default_value("python3")
                        .help("Interpreter used to create the environment"),
                )
                .arg(
                    Arg::new("env-dir")
                        .long("env-dir")
                        .default_value("venv")
                        .value_parser(value_parser!(PathBuf))
                        .help("Environment directory"),
                )
                .arg(
                    Arg::new("manifest")
                        .long("manifest")
                        .default_value("requirements.txt")
                        .value_parser(value_parser!(PathBuf))
                        .help("Dependency manifest"),
                )
                .arg(
                    Arg::new("upgrade-pip")
                        .long("upgrade-pip")
                        .action(ArgAction::SetTrue)
                        .help("Upgrade pip before installing"),
                ),
        )
}

fn scene_config(args: &ArgMatches) -> SceneConfig {
    let mut config = SceneConfig::from_env();
    if let Some(endpoint) = args.get_one::<String>("endpoint") {
        config.endpoint = endpoint.clone();
    }
    if let Some(ms) = args.get_one::<u64>("timeout-ms") {
        config.timeout = Duration::from_millis(*ms);
    }
    config
}

fn demo_config(args: &ArgMatches) -> DemoConfig {
    let defaults = DemoConfig::default();

    let server = if args.get_flag("no-server") {
        None
    } else {
        let program = args
            .get_one::<String>("server-program")
            .cloned()
            .unwrap_or_else(|| ServerCommand::default().program);
        let server_args = match args.get_many::<String>("server-arg") {
            Some(values) => values.cloned().collect(),
            None => ServerCommand::default().args,
        };
        Some(ServerCommand {
            program,
            args: server_args,
        })
    };

    let millis = |name: &str, fallback: Duration| {
        args.get_one::<u64>(name)
            .map(|ms| Duration::from_millis(*ms))
            .unwrap_or(fallback)
    };

    let readiness = if args.get_flag("wait-for-health") {
        Readiness::PollHealth {
            interval: DEFAULT_HEALTH_INTERVAL,
            deadline: millis("health-timeout-ms", Duration::from_secs(10)),
        }
    } else {
        Readiness::FixedDelay(millis("startup-delay-ms", DEFAULT_STARTUP_DELAY))
    };

    let tags: Vec<String> = match args.get_many::<String>("tag") {
        Some(values) => values.cloned().collect(),
        None => defaults.entity.tags.clone(),
    };
    let entity = CreateEntityRequest::new(
        args.get_one::<String>("name")
            .cloned()
            .unwrap_or_else(|| defaults.entity.name.clone()),
        args.get_one::<String>("scene")
            .cloned()
            .unwrap_or_else(|| defaults.entity.target_scene.clone()),
        tags,
    );

    DemoConfig {
        server,
        readiness,
        settle_delay: millis("settle-delay-ms", defaults.settle_delay),
        entity,
        script_path: args
            .get_one::<PathBuf>("script-path")
            .cloned()
            .map(absolutize)
            .unwrap_or(defaults.script_path),
        assumed_entity_id: args
            .get_one::<u64>("entity-id")
            .copied()
            .unwrap_or(defaults.assumed_entity_id),
        strict: args.get_flag("strict"),
        stop_server: args.get_flag("stop-server"),
    }
}

fn provision_config(args: &ArgMatches) -> ProvisionConfig {
    let defaults = ProvisionConfig::default();
    ProvisionConfig {
        python: args.get_one::<String>("python").cloned().unwrap_or(defaults.python),
        env_dir: args.get_one::<PathBuf>("env-dir").cloned().unwrap_or(defaults.env_dir),
        manifest: args.get_one::<PathBuf>("manifest").cloned().unwrap_or(defaults.manifest),
        upgrade_pip: args.get_flag("upgrade-pip"),
    }
}

/// Logs every recorded step and, with `--json`, prints the report to stdout.
fn emit_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    for step in &report.steps {
        if step.ok {
            tracing::info!(step = %step.step, detail = ?step.detail, "ok");
        } else {
            tracing::warn!(
                step = %step.step,
                status = ?step.status,
                detail = ?step.detail,
                "failed"
            );
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_demo=info,scene_bridge_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("rotating-cube", args)) => {
            let scene = scene_config(args);
            tracing::info!(endpoint = %scene.endpoint, "Running rotating cube demo");

            let client = SceneClient::new(scene).context("Failed to build HTTP client")?;
            let orchestrator = Orchestrator::new(client, demo_config(args));
            let json = args.get_flag("json");

            let report = match orchestrator.run().await {
                Ok(report) => report,
                Err(aborted) => {
                    emit_report(&aborted.report, json)?;
                    return Err(anyhow::Error::new(aborted).context("Rotating cube demo aborted"));
                }
            };
            emit_report(&report, json)?;

            let failed = report.failures().count();
            if failed > 0 {
                tracing::warn!(failed, "Demo finished with failed steps");
            } else {
                tracing::info!("Demo finished");
            }
        }
        Some(("configure-environment", args)) => {
            let config = provision_config(args);
            configure_environment(&config).await.with_context(|| {
                format!(
                    "Failed to configure environment in {}",
                    config.env_dir.display()
                )
            })?;
        }
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}
