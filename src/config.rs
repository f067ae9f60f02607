use std::path::PathBuf;

use clap::Parser;

use crate::domain::Route;

pub const DEFAULT_STORE_PATH: &str = "loan-wizard.json";
pub const DEFAULT_LOG_FILE: &str = "loan-wizard.log";
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products/categories";
pub const DEFAULT_CREATE_URL: &str = "https://dummyjson.com/products/add";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "loan-wizard")]
#[command(author, version, about = "Three-step loan application wizard for the terminal")]
pub struct Cli {
    /// File holding the saved form state
    #[arg(long, env = "LOAN_WIZARD_STORE", default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// Endpoint returning the list of workplaces
    #[arg(long, env = "LOAN_WIZARD_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Endpoint receiving submitted applications
    #[arg(long, env = "LOAN_WIZARD_CREATE_URL", default_value = DEFAULT_CREATE_URL)]
    pub create_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "LOAN_WIZARD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Screen to open first: /, /address-work or /loan-parameters
    #[arg(long, default_value = "/")]
    pub route: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, env = "LOAN_WIZARD_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub catalog_url: String,
    pub create_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            create_url: DEFAULT_CREATE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub api: ApiConfig,
    pub start_route: Route,
    pub verbose: bool,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let start_route = Route::from_path(&cli.route).unwrap_or_else(|| {
            tracing::warn!(route = %cli.route, "Unknown start route, using /");
            Route::Personal
        });
        Self {
            store_path: cli.store,
            api: ApiConfig {
                catalog_url: cli.catalog_url,
                create_url: cli.create_url,
                timeout_secs: cli.timeout_secs,
            },
            start_route,
            verbose: cli.verbose,
            log_file: cli.log_file,
        }
    }
}
