//! Daemon orchestration -- configuration, startup checks and lifecycle.
//!
//! The [`Orchestrator`] is the central coordinator of `tailstat-daemon`.
//! It owns the validated configuration, the [`LogMonitor`] and the report
//! channel, prints the startup banner, runs the console reporting sink and
//! performs graceful shutdown.
//!
//! # Startup Order
//!
//! 1. Load `tailstat.toml`, apply environment and CLI overrides, validate
//! 2. Check the log source is readable (fatal otherwise)
//! 3. Install the metrics recorder (if enabled)
//! 4. Print the banner, start the monitor, spawn the reporting sink
//!
//! # Shutdown Order
//!
//! 1. Monitor (stop tailing, hand back its state)
//! 2. Reporting sink (flush queued reports)

use std::future::Future;
use std::path::Path;

use anyhow::Result;
use chrono::Local;
use tokio::sync::{broadcast, mpsc};

use tailstat_core::config::TailstatConfig;
use tailstat_core::event::TickReport;
use tailstat_core::pipeline::{HealthStatus, Pipeline};
use tailstat_log_pipeline::{LogMonitor, LogMonitorBuilder, MonitorSettings};

use crate::banner::render_banner;
use crate::cli::{DEFAULT_CONFIG_PATH, DaemonCli};
use crate::metrics_server;
use crate::report::{ReportFormat, run_report_sink};

/// Report channel capacity between the monitor loop and the sink.
const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Load the effective configuration for the given command line.
///
/// - An explicit `--config` path must exist.
/// - Without `--config`, `./tailstat.toml` is used if present and
///   built-in defaults otherwise.
/// - CLI overrides win over environment variables and the file.
pub async fn load_config(cli: &DaemonCli) -> Result<TailstatConfig> {
    let mut config = match &cli.config {
        Some(path) => TailstatConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
        None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
            TailstatConfig::load(DEFAULT_CONFIG_PATH)
                .await
                .map_err(|e| {
                    anyhow::anyhow!("failed to load config {}: {}", DEFAULT_CONFIG_PATH, e)
                })?
        }
        None => {
            let mut config = TailstatConfig::default();
            config.apply_env_overrides();
            config.apply_fallbacks();
            config
        }
    };

    apply_cli_overrides(&mut config, cli);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
    Ok(config)
}

/// Apply command-line overrides on top of file and environment values.
pub fn apply_cli_overrides(config: &mut TailstatConfig, cli: &DaemonCli) {
    if let Some(level) = &cli.log_level {
        config.general.log_level.clone_from(level);
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format.clone_from(format);
    }
    if let Some(logfile) = &cli.logfile {
        config.monitor.logfile.clone_from(logfile);
    }
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: TailstatConfig,
    /// Report rendering format.
    report_format: ReportFormat,
    /// The log monitor (ingest loop).
    monitor: LogMonitor,
    /// Report receiver, handed to the sink on `run`.
    report_rx: Option<mpsc::Receiver<TickReport>>,
    /// Shutdown broadcast sender (signals background tasks).
    shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Build from an already-loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The log source is missing or unreadable
    /// - The metrics recorder cannot be installed
    /// - The monitor cannot be built
    pub async fn build_from_config(config: TailstatConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        let report_format: ReportFormat = config.general.report_format.parse()?;

        config
            .monitor
            .check_log_source()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let settings = MonitorSettings::from_core(&config);
        let (monitor, report_rx) = LogMonitorBuilder::new()
            .settings(settings)
            .report_channel_capacity(REPORT_CHANNEL_CAPACITY)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build log monitor: {}", e))?;

        let (shutdown_tx, _) = broadcast::channel(1);
        tracing::info!(
            logfile = %config.monitor.logfile,
            report_format = %config.general.report_format,
            "orchestrator initialized"
        );

        Ok(Self {
            config,
            report_format,
            monitor,
            report_rx,
            shutdown_tx,
        })
    }

    /// Run until SIGTERM or SIGINT is received.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Start the monitor and the reporting sink, then block until `shutdown`
    /// resolves.
    ///
    /// The shutdown future yields the name of the trigger for logging.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        let report_rx = self
            .report_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("orchestrator already ran"))?;

        print!("{}", render_banner(&self.config, &Local::now()));

        self.monitor
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start log monitor: {}", e))?;

        let sink_task = tokio::spawn(run_report_sink(
            report_rx,
            self.report_format,
            std::io::stdout(),
            self.shutdown_tx.subscribe(),
        ));

        tracing::info!("entering main loop");
        let trigger = shutdown.await;
        match &trigger {
            Ok(signal) => tracing::info!(signal = *signal, "shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "shutdown wait failed, stopping"),
        }

        // 모니터를 먼저 멈춰 더 이상 리포트가 생성되지 않게 함
        if let Err(e) = self.monitor.stop().await {
            tracing::error!(error = %e, "failed to stop log monitor");
        }
        let _ = self.shutdown_tx.send(());
        if let Err(e) = sink_task.await {
            tracing::error!(error = %e, "report sink task failed");
        }

        tracing::info!("tailstat-daemon shut down");
        trigger.map(|_| ())
    }

    /// Current health of the monitor.
    pub async fn health(&self) -> HealthStatus {
        self.monitor.health_check().await
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &TailstatConfig {
        &self.config
    }

    /// Get a reference to the log monitor.
    pub fn monitor(&self) -> &LogMonitor {
        &self.monitor
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}
