use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber
///
/// The filter comes from `RUST_LOG` (falling back to `default_level`). With a
/// `log_dir`, events go to a timestamped file in it; otherwise to stderr.
pub fn init_logger(log_dir: Option<&str>, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_dir {
        Some(log_dir) => {
            if !Path::new(log_dir).exists() {
                fs::create_dir_all(log_dir)
                    .with_context(|| format!("Failed to create log directory {}", log_dir))?;
            }

            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            let log_file = format!("{}/uri_manage_{}.log", log_dir, timestamp);
            let file = fs::File::create(&log_file)
                .with_context(|| format!("Failed to create log file {}", log_file))?;

            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    info!("Logger initialized");
    Ok(())
}
