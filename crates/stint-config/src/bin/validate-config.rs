//! Config validation CLI tool
//!
//! Validates a stintd configuration file and prints the resulting plan.

use std::path::PathBuf;
use std::process::ExitCode;
use stint_config::ConfigError;
use stint_util::default_config_path;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a stintd configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            eprintln!("  validate-config config.example.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match stint_config::load_config(&config_path) {
        Ok(plan) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", stint_config::CURRENT_CONFIG_VERSION);
            println!("  Window: {} - {}", plan.window.start, plan.window.end);
            if plan.window.end <= plan.window.start {
                println!("    (end is not after start: only the start boundary is scheduled)");
            }
            println!(
                "  Grid: {} sessions x {} groups ({} runs)",
                plan.grid.sessions,
                plan.grid.groups,
                plan.grid.total_runs()
            );
            let window_minutes = plan.window.end.as_minutes_from_midnight() as i64
                - plan.window.start.as_minutes_from_midnight() as i64;
            println!(
                "  Run length: {} min",
                window_minutes.div_euclid(plan.grid.total_runs() as i64).max(0)
            );
            println!("  Early warning: {} min before each boundary", plan.lead_minutes.get());
            println!("  Notification message: {}", plan.alerts.message);
            println!("  Tick interval: {} ms", plan.daemon.tick_interval.as_millis());
            println!("  Autostart: {}", plan.daemon.autostart);

            let commands = [
                ("early warning sound", &plan.alerts.early_warning_command),
                ("session end sound", &plan.alerts.session_end_command),
                ("notifications", &plan.alerts.notify_command),
            ];
            println!();
            println!("Commands:");
            for (name, command) in commands {
                match command {
                    Some(argv) => println!("  - {}: {}", name, argv.join(" ")),
                    None => println!("  - {}: (built-in)", name),
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        stint_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
