mod bridge;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use donation_engine::{DonationFlow, FlowOptions, drive_session, parse_config_file};
use donation_platforms::builtin_registry;
use donation_types::{DonationConfig, ExtractedTable, PlatformConfig};
use donation_util::{SessionLog, default_config_path, expand_tilde};
use serde::Serialize;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "donation", version, about = "Run data donation sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a donation session; commands go to stdout and answers are read from stdin, one JSON document per line.
    Run(RunArgs),
    /// List the platforms this build can extract.
    Platforms,
    /// Validate and extract a file without asking for consent.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Donation config file (defaults to $DONATION_CONFIG_PATH, then the user config dir).
    #[arg(long)]
    config: Option<String>,
    /// Session identifier used for the log donation key.
    #[arg(long, default_value = "session")]
    session_id: String,
    /// Donate the session log before exiting.
    #[arg(long)]
    donate_logs: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Registered platform name.
    #[arg(long)]
    platform: String,
    #[arg(long)]
    config: Option<String>,
    /// Export file to inspect.
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_session(args).await,
        Commands::Platforms => {
            for platform in builtin_registry().platforms() {
                println!("{platform}");
            }
            Ok(())
        }
        Commands::Inspect(args) => inspect_file(args),
    }
}

/// Logs go to stderr so stdout stays a clean command channel.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(flag: Option<&str>) -> Result<DonationConfig> {
    let path = flag.map(expand_tilde).unwrap_or_else(default_config_path);
    info!(path = %path.display(), "loading donation config");
    parse_config_file(&path)
}

async fn run_session(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let registry = Arc::new(builtin_registry());
    for platform in config.platform_names().filter(|name| !registry.contains(name)) {
        warn!(platform, "configured platform has no extractor; the session will abort when it is reached");
    }

    let flow = DonationFlow::new(registry, config, SessionLog::default()).with_options(FlowOptions {
        session_id: args.session_id,
        donate_logs: args.donate_logs,
    });

    let (command_tx, command_rx) = unbounded_channel();
    let (answer_tx, answer_rx) = unbounded_channel();
    let writer = bridge::spawn_stdout_writer(command_rx);
    bridge::spawn_stdin_reader(answer_tx);

    let outcome = drive_session(flow, command_tx, answer_rx).await;
    writer.await.context("stdout writer panicked")??;

    let summary = outcome?;
    info!(session = %summary.session_id, donations = summary.donations, "session complete");
    Ok(())
}

#[derive(Debug, Serialize)]
struct InspectReport {
    platform: String,
    status: u32,
    description: String,
    category: Option<String>,
    tables: Vec<ExtractedTable>,
}

fn inspect_file(args: InspectArgs) -> Result<()> {
    let report = inspect_report(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn inspect_report(args: &InspectArgs) -> Result<InspectReport> {
    let config = if args.config.is_none() && !default_config_path().exists() {
        warn!("no donation config found; validating only");
        DonationConfig { platforms: Vec::new() }
    } else {
        load_config(args.config.as_deref())?
    };
    let platform_config = config.find(&args.platform).cloned().unwrap_or_else(|| PlatformConfig {
        platform: args.platform.clone(),
        tables: Vec::new(),
    });

    let extractor = builtin_registry().create(&args.platform, platform_config)?;
    let validation = extractor.validate(&args.file);
    let mut report = InspectReport {
        platform: args.platform.clone(),
        status: validation.status_id(),
        description: validation.status.description.clone(),
        category: validation.category.clone(),
        tables: Vec::new(),
    };
    if validation.is_valid() {
        report.tables = extractor
            .extract(&args.file, validation)
            .with_context(|| format!("failed to extract {}", args.file.display()))?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation_registry::RegistryError;
    use donation_util::CONFIG_PATH_ENV;
    use std::fs;

    const CONFIG: &str = "YouTube:\n  tables:\n    - name: watch_history\n      title: Watch history\n";

    fn inspect_args(platform: &str, config: &std::path::Path, file: PathBuf) -> InspectArgs {
        InspectArgs {
            platform: platform.into(),
            config: Some(config.display().to_string()),
            file,
        }
    }

    #[test]
    fn load_config_prefers_flag_then_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let flagged = dir.path().join("flag.yml");
        let from_env = dir.path().join("env.yml");
        fs::write(&flagged, CONFIG).expect("write flag config");
        fs::write(&from_env, "TikTok:\n").expect("write env config");

        temp_env::with_var(CONFIG_PATH_ENV, Some(from_env.as_os_str()), || {
            let config = load_config(Some(&flagged.display().to_string())).expect("flag config");
            assert_eq!(config.platform_names().collect::<Vec<_>>(), vec!["YouTube"]);

            let config = load_config(None).expect("env config");
            assert_eq!(config.platform_names().collect::<Vec<_>>(), vec!["TikTok"]);
        });

        assert!(load_config(Some(&dir.path().join("missing.yml").display().to_string())).is_err());
    }

    #[test]
    fn inspect_reports_validation_status_without_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.yml");
        fs::write(&config, CONFIG).expect("write config");
        let export = dir.path().join("export.zip");
        fs::write(&export, "not a zip").expect("write export");

        let report = inspect_report(&inspect_args("YouTube", &config, export)).expect("inspect");
        assert_eq!(report.status, 2);
        assert_eq!(report.description, "Bad zipfile");
        assert!(report.category.is_none());
        assert!(report.tables.is_empty());
    }

    #[test]
    fn inspect_unknown_platform_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("config.yml");
        fs::write(&config, CONFIG).expect("write config");

        let error = inspect_report(&inspect_args("Instagram", &config, dir.path().join("export.zip"))).expect_err("unknown platform");
        assert!(matches!(error.downcast_ref::<RegistryError>(), Some(RegistryError::UnknownPlatform { .. })));
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from(["donation", "run", "--config", "~/donation.yml", "--session-id", "abc", "--donate-logs"]).expect("parse args");
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.as_deref(), Some("~/donation.yml"));
        assert_eq!(args.session_id, "abc");
        assert!(args.donate_logs);
    }

    #[test]
    fn inspect_requires_platform() {
        assert!(Cli::try_parse_from(["donation", "inspect", "export.zip"]).is_err());
        let cli = Cli::try_parse_from(["donation", "inspect", "--platform", "YouTube", "export.zip"]).expect("parse args");
        assert!(matches!(cli.command, Commands::Inspect(InspectArgs { ref platform, .. }) if platform == "YouTube"));
    }
}
