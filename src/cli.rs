use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::uri::Uri;

/// Parse, modify and recompose URIs
#[derive(Debug, Clone, Parser)]
#[command(name = "uri-manage", version)]
pub struct CliConfig {
    /// URI to parse
    #[arg(required_unless_present = "batch")]
    pub uri: Option<String>,

    /// File with one URI per line (`#` starts a comment)
    #[arg(long, conflicts_with = "uri")]
    pub batch: Option<String>,

    #[arg(long)]
    pub scheme: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub port: Option<i32>,

    /// Remove the port
    #[arg(long, conflicts_with = "port")]
    pub no_port: bool,

    #[arg(long)]
    pub path: Option<String>,

    #[arg(long)]
    pub query: Option<String>,

    /// Add or replace a query parameter, as `key=value`
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Remove a query parameter
    #[arg(long = "remove-param", value_name = "KEY")]
    pub removed_params: Vec<String>,

    #[arg(long)]
    pub fragment: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long, requires = "user")]
    pub password: Option<String>,

    /// Drop the file extension from the last path segment
    #[arg(long)]
    pub strip_extension: bool,

    /// Print every component as JSON instead of the composed URI
    #[arg(long)]
    pub json: bool,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long, env = "URI_MANAGE_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", env = "URI_MANAGE_LOG_LEVEL")]
    pub log_level: String,
}

impl CliConfig {
    /// Applies the requested modifications, in a fixed order
    pub fn apply(&self, uri: &Uri) -> Result<Uri> {
        let mut uri = uri.clone();

        if let Some(scheme) = &self.scheme {
            uri = uri.with_scheme(scheme)?;
        }
        if let Some(host) = &self.host {
            uri = uri.with_host(host);
        }
        if self.no_port {
            uri = uri.with_port(None)?;
        } else if let Some(port) = self.port {
            uri = uri.with_port(Some(port))?;
        }
        if let Some(user) = &self.user {
            uri = uri.with_user_info(user, self.password.as_deref());
        }
        if let Some(path) = &self.path {
            uri = uri.with_path(path);
        }
        if self.strip_extension {
            uri = uri.with_path_value(uri.path_value().with_file_extension_removed());
        }
        if let Some(query) = &self.query {
            uri = uri.with_query(query);
        }
        if !self.params.is_empty() || !self.removed_params.is_empty() {
            let mut query = uri.query_value();
            for param in &self.params {
                let (key, value) = param
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Query parameter must look like key=value, got `{}`", param))?;
                query = query.with_parameter_key_and_value(key, value)?;
            }
            for key in &self.removed_params {
                query = query.with_parameter_key_removed(key);
            }
            uri = uri.with_query_value(query);
        }
        if let Some(fragment) = &self.fragment {
            uri = uri.with_fragment(fragment);
        }

        Ok(uri)
    }
}

/// Runs the command line front end
pub fn run(config: &CliConfig) -> Result<()> {
    match (&config.batch, &config.uri) {
        (Some(file_path), _) => process_uri_batch(config, file_path),
        (None, Some(uri)) => {
            let output = process_single_uri(config, uri)?;
            println!("{}", output);
            Ok(())
        }
        (None, None) => Err(anyhow!("Missing URI argument")),
    }
}

/// Parses and modifies one URI, returning the text to print
pub fn process_single_uri(config: &CliConfig, raw: &str) -> Result<String> {
    info!("Processing URI: {}", raw);

    let parsed = Uri::parse(raw).with_context(|| format!("Failed to parse URI '{}'", raw))?;
    let modified = config.apply(&parsed)?;
    debug!("Composed URI: {}", modified);

    if config.json {
        return serde_json::to_string_pretty(&modified.components())
            .context("Failed to serialize URI components");
    }
    Ok(modified.compose())
}

fn process_uri_batch(config: &CliConfig, file_path: &str) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read batch file {}", file_path))?;
    let uris: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    info!("Processing {} URIs from file: {}", uris.len(), file_path);
    let start = Instant::now();

    let mut failures = Vec::new();
    for raw in &uris {
        match process_single_uri(config, raw) {
            Ok(output) => println!("{}", output),
            Err(err) => {
                warn!("Failed to process '{}': {:#}", raw, err);
                failures.push((raw, err));
            }
        }
    }

    eprintln!(
        "Processed {} URIs in {:?}, {} failed",
        uris.len(),
        start.elapsed(),
        failures.len()
    );
    for (raw, err) in &failures {
        eprintln!("  URI: {}", raw);
        eprintln!("  Error: {:#}", err);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} of {} URIs failed", failures.len(), uris.len()))
    }
}
