//! BoothLock - session timeline and lockout coordinator
//!
//! CLI entry point for driving the timeline and inspecting the override audit.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use boothlock::cli::{Cli, Command, OutputFormat, generate_after_help};
use boothlock::config::Config;
use boothlock::{
    AuditStore, BoothEvent, Coordinator, InboundEvent, LocalServices, OperatorMode, TimelinePhase, create_event_bus,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boothlock")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("boothlock.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        grace_secs = config.timeline.grace_secs,
        mode = %config.timeline.operator_mode,
        "BoothLock loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run {
            wait_for_config,
            mode,
            grace_secs,
        }) => cmd_run(&config, wait_for_config, mode.as_deref(), grace_secs).await,
        Some(Command::Config) => cmd_config(&config),
        Some(Command::Audit { session, format }) => cmd_audit(&config, session.as_deref(), format).await,
        None => {
            Cli::command().after_help(generate_after_help()).print_help()?;
            Ok(())
        }
    }
}

/// Drive the timeline from stdin until EOF
async fn cmd_run(config: &Config, wait_for_config: bool, mode: Option<&str>, grace_secs: Option<u64>) -> Result<()> {
    debug!(wait_for_config, ?mode, ?grace_secs, "cmd_run: called");
    let mut settings = config.timeline;
    if let Some(mode) = mode {
        settings.operator_mode = mode.parse::<OperatorMode>().map_err(|e| eyre!(e))?;
    }
    if let Some(grace_secs) = grace_secs {
        if grace_secs == 0 {
            return Err(eyre!("--grace-secs must be a positive number of seconds"));
        }
        settings.grace_secs = grace_secs;
    }

    let bus = create_event_bus(config.coordinator.event_capacity);
    let events = bus.subscribe();
    let services = Arc::new(LocalServices::from_config(&config.services));

    let mut coordinator = Coordinator::new(config.coordinator.clone(), settings, services, Arc::clone(&bus));
    if config.audit.enabled {
        coordinator = coordinator.with_audit_store(AuditStore::new(&config.audit.dir));
    }
    let handle = coordinator.handle();
    let coord_task = tokio::spawn(coordinator.run());
    let printer = tokio::spawn(print_events(events));

    if !wait_for_config {
        handle.config_loaded(settings).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match InboundEvent::parse_line(&line) {
            Ok(Some(event)) => handle.send(event.into_input(&settings)).await?,
            Ok(None) => {}
            Err(e) => {
                warn!("{:#}", e);
                eprintln!("{} {:#}", "Skipping:".yellow(), e);
            }
        }
    }

    // Every queued input is applied once the snapshot comes back
    let snapshot = handle.snapshot().await?;
    info!(phase = %snapshot.phase, "Input closed, shutting down");
    if snapshot.phase == TimelinePhase::ResetPending {
        // Shutdown aborts the grace timer, so this reset never completes
        warn!(reset = ?snapshot.reset, "Input closed with a reset still pending");
        eprintln!("{} input closed with a reset still pending", "Warning:".yellow());
    }

    handle.shutdown().await?;
    coord_task.await.context("Coordinator task failed")?;
    drop(bus);
    printer.await.context("Printer task failed")?
}

/// Write every event as one JSON line until the bus closes
async fn print_events(mut events: broadcast::Receiver<BoothEvent>) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    loop {
        match events.recv().await {
            Ok(event) => {
                let line = serde_json::to_string(&event)? + "\n";
                stdout.write_all(line.as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event printer lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

async fn cmd_audit(config: &Config, session: Option<&str>, format: OutputFormat) -> Result<()> {
    debug!(?session, %format, "cmd_audit: called");
    let store = AuditStore::new(&config.audit.dir);
    let entries = match session {
        Some(key) => store.read_session(key).await?,
        None => store.read_all().await?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No overrides recorded");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "{}  {:<24} {}",
                    entry.timestamp.to_rfc3339().dimmed(),
                    entry.action.as_str().yellow(),
                    entry.session_key.as_deref().unwrap_or("-")
                );
            }
            println!("\n{} override(s)", entries.len().to_string().bold());
        }
    }
    Ok(())
}
