use anyhow::Result;
use clap::Parser;
use uri_manage::cli::{run, CliConfig};
use uri_manage::utils::logger::init_logger;

fn main() -> Result<()> {
    let config = CliConfig::parse();

    // Logging is best effort; a missing log directory must not block the output
    if let Err(err) = init_logger(config.log_dir.as_deref(), &config.log_level) {
        eprintln!("Failed to initialize logger: {:#}", err);
    }

    run(&config)
}
