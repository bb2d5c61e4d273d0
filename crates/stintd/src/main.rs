//! stintd - session boundary alarms
//!
//! This is the main entry point for the stintd daemon.
//! It wires together all the components:
//! - Configuration loading
//! - Tick driver (core engine)
//! - Local alert dispatcher
//! - Signal handling and stdin commands

mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stint_alert_api::{AlertDispatcher, AlertEvent};
use stint_alert_local::{AlertCommands, LocalDispatcher};
use stint_api::{Command, PlanConfig, StopReason};
use stint_config::{Plan, load_config};
use stint_core::{CoreEvent, DriverOptions, StartDecision, StopDecision, TickDriver};
use stint_util::default_config_path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::output::{render_event, render_schedule, render_status, schedule_view, status_view};

/// stintd - Session boundary alarms for a fixed time window
#[derive(Parser, Debug)]
#[command(name = "stintd")]
#[command(about = "Session boundary alarms for a fixed time window", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/stint/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Start the alarms immediately instead of waiting for `start`
    #[arg(long)]
    start: bool,

    /// Print status, schedule and engine events as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// What the main loop should do after handling an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Main daemon state
struct Service {
    config_path: PathBuf,
    driver: TickDriver,
    dispatcher: Arc<LocalDispatcher>,
    tick_interval: Duration,
    ticker: Option<Interval>,
    json: bool,
    autostart: bool,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let plan = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            window_start = %plan.window.start,
            window_end = %plan.window.end,
            sessions = plan.grid.sessions,
            groups = plan.grid.groups,
            lead_minutes = plan.lead_minutes.get(),
            "Configuration loaded"
        );

        let plan_config = resolve_today(&plan)?;

        let dispatcher = Arc::new(LocalDispatcher::new(AlertCommands {
            early_warning: plan.alerts.early_warning_command.clone(),
            session_end: plan.alerts.session_end_command.clone(),
            notify: plan.alerts.notify_command.clone(),
        }));

        let driver = TickDriver::new(
            plan_config,
            dispatcher.clone(),
            DriverOptions {
                tick_interval: plan.daemon.tick_interval,
                notification_message: plan.alerts.message.clone(),
            },
        )
        .context("Failed to initialize tick driver")?;

        Ok(Self {
            config_path: args.config.clone(),
            driver,
            dispatcher,
            tick_interval: plan.daemon.tick_interval,
            ticker: None,
            json: args.json,
            autostart: args.start || plan.daemon.autostart,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut alert_events = self.dispatcher.subscribe();

        let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        if self.autostart {
            self.handle_command(Command::Start);
        }

        info!("Daemon running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down");
                    break;
                }

                // SIGHUP: reload the config as a plan edit
                _ = sighup.recv() => {
                    info!("Received SIGHUP, reloading configuration");
                    self.reload();
                }

                _ = next_tick(&mut self.ticker) => {
                    self.on_tick();
                }

                Some(event) = alert_events.recv() => {
                    log_alert_event(&event);
                }

                line = stdin.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if self.handle_line(&line) == Flow::Exit {
                                break;
                            }
                        }
                        Ok(None) => {
                            debug!("stdin closed; commands disabled");
                            stdin_open = false;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read stdin; commands disabled");
                            stdin_open = false;
                        }
                    }
                }
            }
        }

        info!("Shutting down stintd");
        if let StopDecision::Stopped(event) = self.driver.stop(StopReason::Shutdown) {
            self.print_event(&event);
        }
        info!("Shutdown complete");
        Ok(())
    }

    fn on_tick(&mut self) {
        let report = self.driver.tick(stint_util::now());

        for event in &report.events {
            self.print_event(event);
        }
        if let Some(disp) = &report.display {
            debug!(
                current_time = %disp.current_time,
                next_boundary = ?disp.next_boundary,
                time_to_boundary = ?disp.time_to_boundary,
                "Tick"
            );
        }
        if report.stopped() {
            self.ticker = None;
        }
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        match line.parse::<Command>() {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                eprintln!("{}", e);
                Flow::Continue
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> Flow {
        debug!(command = ?command, "Command received");
        let now = stint_util::now();

        match command {
            Command::Start => self.start(now),
            Command::Stop => self.stop(),
            Command::Toggle => {
                if self.driver.is_running() {
                    self.stop();
                } else {
                    self.start(now);
                }
            }
            Command::Status => {
                let view = status_view(&self.driver, self.dispatcher.pending_count(), now);
                self.print(&view, render_status(&view));
            }
            Command::Schedule => {
                let view = schedule_view(&self.driver);
                self.print(&view, render_schedule(&view));
            }
            Command::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    fn start(&mut self, now: chrono::DateTime<chrono::Local>) {
        match self.driver.start(now) {
            StartDecision::Started(event) => {
                let mut ticker = tokio::time::interval(self.tick_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);
                self.print_event(&event);
            }
            StartDecision::AlreadyRunning => {
                eprintln!("Already running");
            }
        }
    }

    fn stop(&mut self) {
        match self.driver.stop(StopReason::UserStop) {
            StopDecision::Stopped(event) => {
                self.ticker = None;
                self.print_event(&event);
            }
            StopDecision::NotRunning => {
                eprintln!("Not running");
            }
        }
    }

    fn reload(&mut self) {
        let plan = match load_config(&self.config_path) {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "Config reload failed; keeping current plan");
                return;
            }
        };

        let plan_config = match resolve_today(&plan) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Config reload failed; keeping current plan");
                return;
            }
        };

        if plan.daemon.tick_interval != self.tick_interval {
            warn!("tick_interval_ms changes take effect after a restart");
        }

        self.driver.set_notification_message(plan.alerts.message.clone());
        match self.driver.update_plan(plan_config) {
            Ok(Some(event)) => self.print_event(&event),
            Ok(None) => info!("Plan edit queued for the next tick"),
            Err(e) => error!(error = %e, "Reloaded plan rejected; keeping current plan"),
        }
    }

    fn print_event(&self, event: &CoreEvent) {
        self.print(event, render_event(event));
    }

    fn print<T: serde::Serialize>(&self, value: &T, text: String) {
        if self.json {
            match serde_json::to_string(value) {
                Ok(json) => println!("{}", json),
                Err(e) => error!(error = %e, "Failed to serialize output"),
            }
        } else {
            println!("{}", text);
        }
    }
}

/// Resolve the configured wall-clock window on today's date
fn resolve_today(plan: &Plan) -> Result<PlanConfig> {
    let today = stint_util::now().date_naive();
    plan.plan_config_on(today)
        .with_context(|| format!("Failed to resolve window on {}", today))
}

/// Resolves on the next tick, or never while stopped
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_alert_event(event: &AlertEvent) {
    match event {
        AlertEvent::Scheduled { accepted, skipped } => {
            debug!(accepted, skipped, "Notifications scheduled");
        }
        AlertEvent::ScheduleFailed { label, error } => {
            warn!(label = %label, error = %error, "Notification could not be scheduled");
        }
        AlertEvent::Delivered { id, label } => {
            info!(id = %id, label = %label, "Notification delivered");
        }
        AlertEvent::Cancelled { count } => {
            debug!(count, "Notifications cancelled");
        }
        AlertEvent::PlaybackFailed { kind, error } => {
            warn!(kind = ?kind, error = %error, "Alert playback failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries status output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        now = %stint_util::format_datetime_full(&stint_util::now()),
        mock_time = stint_util::is_mock_time_active(),
        "stintd starting"
    );

    let service = Service::new(&args)?;
    service.run().await
}
