use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "covault-service")]
#[command(about = "Cohort-signed smart-account transfer service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Override the HTTP listen address
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(covault_core::infrastructure::config::CONFIG_PATH_ENV, config_path);
        }

        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(covault_core::infrastructure::config::DATA_DIR_ENV, data_dir);
        }

        if let Some(addr) = &self.addr {
            std::env::set_var(covault_core::infrastructure::config::API_ADDR_ENV, addr);
        }
    }
}
