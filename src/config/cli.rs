use crate::config::toml_config::{LogFormat, TomlConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "layout-export")]
#[command(about = "Serve React + Tailwind project exports for the visual layout builder")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Frontend origin allowed to call the export endpoint
    #[arg(long)]
    pub allowed_origin: Option<String>,

    /// Directory in which per-export temporary roots are created
    #[arg(long)]
    pub temp_root: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// The configuration file (or defaults) with command line overrides applied.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(origin) = &self.allowed_origin {
            config.cors.allowed_origin = origin.clone();
        }
        if let Some(temp_root) = &self.temp_root {
            config.export.temp_root = Some(temp_root.clone());
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
    }
}
