//! Command-line argument parsing for both binaries.
//!
//! Flags override values from the config file and environment.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Serves pivoted form signatures as JSON over HTTP.
#[derive(Parser, Debug)]
#[command(name = "signatures-proxy")]
#[command(version, about, long_about = None)]
pub struct ProxyCli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind (default 0.0.0.0)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (default: $PORT or 5001)
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Return a generic message instead of error details in 500 responses
    /// (also enabled by $REDACT_ERRORS)
    #[arg(long)]
    pub redact_errors: bool,
}

impl ProxyCli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag overrides to a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.redact_errors {
            config.server.redact_errors = true;
        }
    }
}

/// Pivots form signatures once and publishes them to a gist.
#[derive(Parser, Debug)]
#[command(name = "signatures-snapshot")]
#[command(version, about, long_about = None)]
pub struct SnapshotCli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the JSON snapshot to this file
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Gist to update (overrides $GIST_ID)
    #[arg(long, value_name = "ID")]
    pub gist_id: Option<String>,

    /// File inside the gist to replace (overrides $GIST_FILE_NAME)
    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    /// Fetch and render, but never call the gist API
    #[arg(long)]
    pub dry_run: bool,
}

impl SnapshotCli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag overrides to a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(id) = &self.gist_id {
            config.gist.gist_id = id.clone();
        }
        if let Some(name) = &self.file_name {
            config.gist.file_name = name.clone();
        }
    }

    /// Returns why publishing should be skipped for this run, if at all.
    pub fn skip_reason(&self, config: &Config) -> Option<String> {
        if self.dry_run {
            return Some("dry run".to_string());
        }
        config.gist.skip_reason().map(String::from)
    }
}
