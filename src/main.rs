//! # Tempo — Adaptive Pipeline Scheduler Daemon
//!
//! Loads pipelines and schedules from a TOML config, runs the scheduler, and
//! prints the event stream until interrupted.
//!
//! Usage:
//!   tempo                                # ~/.tempo/config.toml
//!   tempo --config ./tempo.toml          # Explicit config file
//!   tempo --verbose                      # Debug logging

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempo_core::CommandPipeline;
use tempo_scheduler::{DaemonConfig, EventKind, Scheduler};

#[derive(Parser)]
#[command(name = "tempo", version, about = "⏰ Tempo — Adaptive Pipeline Scheduler")]
struct Cli {
    /// Config file path (default: ~/.tempo/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Validate the config file and exit
    #[arg(long)]
    check: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let expanded = shellexpand::tilde(path).to_string();
            DaemonConfig::load_from(&PathBuf::from(expanded))?
        }
        None => DaemonConfig::load()?,
    };

    // Initialize logging: CLI flag > config > info
    let filter = if cli.verbose {
        "tempo=debug,tempo_scheduler=debug".to_string()
    } else {
        config
            .log_level
            .clone()
            .unwrap_or_else(|| "tempo=info,tempo_scheduler=info".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    if cli.check {
        println!("✅ Config OK: {} pipeline(s), {} schedule(s)",
            config.pipelines.len(),
            config.schedules.len());
        return Ok(());
    }

    let mut pipelines = CommandPipeline::new();
    for spec in &config.pipelines {
        pipelines.register(&spec.id, &spec.command);
    }

    let scheduler = Scheduler::new(
        Arc::new(pipelines),
        Arc::new(tempo_core::StaticMetrics::default()),
    );

    for spec in &config.schedules {
        scheduler
            .create_schedule(spec.config.clone(), &spec.pipeline)
            .await?;
    }

    // Log the event stream in the background.
    let mut events = scheduler.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match &event.kind {
                    EventKind::ExecutionCompleted { execution } => {
                        tracing::info!(
                            "✅ {} completed in {}ms ({})",
                            execution.schedule_id,
                            execution.execution_time_ms.unwrap_or(0),
                            execution.trigger.as_str()
                        );
                    }
                    EventKind::ExecutionFailed { execution, error } => {
                        tracing::warn!("❌ {} failed: {}", execution.schedule_id, error);
                    }
                    EventKind::ExecutionSkipped { schedule_id, .. } => {
                        tracing::info!("⏭️ {} skipped (still running)", schedule_id);
                    }
                    other => tracing::debug!("🔔 {}", other.name()),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("⚠️ Event stream lagged, {} events dropped", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("⏰ Tempo v{}", env!("CARGO_PKG_VERSION"));
    println!("   📋 Pipelines: {}", config.pipelines.len());
    println!("   📅 Schedules: {}", config.schedules.len());
    println!();

    scheduler.start().await;

    tokio::signal::ctrl_c().await?;
    println!("\n⏹️ Shutting down...");
    scheduler.stop().await;

    let stats = scheduler.stats().await;
    println!(
        "   {} execution(s), {} successful, {} skipped",
        stats.total_executions, stats.successful_executions, stats.skipped_executions
    );
    Ok(())
}
