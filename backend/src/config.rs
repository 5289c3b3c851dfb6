/// Runtime configuration, parsed from flags with environment fallbacks
use clap::Args;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "PAGESTORE_DB";
pub const LOG_FILTER_VAR: &str = "PAGESTORE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file; without one the store lives in memory
    #[arg(long = "db", env = DB_PATH_VAR, value_name = "PATH")]
    pub database_path: Option<PathBuf>,

    /// tracing-subscriber env-filter directive
    #[arg(long = "log", env = LOG_FILTER_VAR, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Whether writes are lost when the process exits
    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}
