//! Command line flags.
//!
//! Flags and their environment variables override values from the config
//! file, which override the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{LogFormat, ServiceConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "vanity")]
#[command(about = "Serve go-import vanity pages for a module namespace", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, env = "VANITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "VANITY_ADDRESS")]
    pub address: Option<String>,

    /// Host this server runs on
    #[arg(long = "vanity.host", env = "VANITY_HOST")]
    pub host: Option<String>,

    /// Where the code is hosted
    #[arg(long = "vanity.source", env = "VANITY_SOURCE")]
    pub source: Option<String>,

    /// Log output format
    #[arg(long = "log.format", env = "VANITY_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Build the final, validated configuration.
    pub fn load(self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServiceConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut ServiceConfig) {
        if let Some(address) = self.address {
            config.listener.bind_address = address;
        }
        if let Some(host) = self.host {
            config.vanity.host = host;
        }
        if let Some(source) = self.source {
            config.vanity.source = source;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}
