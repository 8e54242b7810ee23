use chat_db::{AnalysisConfig, MAX_DECIMAL_PRECISION};
use simple_home_dir::home_dir;
use std::{env, path::PathBuf};

/// Runtime configuration, read from the environment (and `.env`).
///
/// Environment variables:
/// - `CHAT_ARCHIVE_LOG_DIRS` comma separated log folders (default: `logs`)
/// - `CHAT_ARCHIVE_OUTPUT_SUBFOLDER` (default: `output`)
/// - `CHAT_ARCHIVE_MIN_MESSAGES` (default: 10)
/// - `CHAT_ARCHIVE_MIN_MESSAGES_FOR_AVERAGE` (default: 10)
/// - `CHAT_ARCHIVE_DECIMAL_PRECISION` (default: 2, at most 15)
/// - `CHAT_ARCHIVE_WORKER_THREADS` (default: one per cpu)
#[derive(Debug, Clone)]
pub struct Config {
    pub log_dirs: Vec<PathBuf>,
    pub output_subfolder: String,
    pub analysis: AnalysisConfig,
    pub worker_threads: Option<usize>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AnalysisConfig::default();

        let log_dirs = lookup("CHAT_ARCHIVE_LOG_DIRS")
            .unwrap_or_else(|| "logs".to_string())
            .split(',')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(expand_home)
            .collect();

        Self {
            log_dirs,
            output_subfolder: lookup("CHAT_ARCHIVE_OUTPUT_SUBFOLDER")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "output".to_string()),
            analysis: AnalysisConfig {
                min_messages: lookup("CHAT_ARCHIVE_MIN_MESSAGES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.min_messages),
                min_messages_for_average: lookup("CHAT_ARCHIVE_MIN_MESSAGES_FOR_AVERAGE")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.min_messages_for_average),
                decimal_precision: lookup("CHAT_ARCHIVE_DECIMAL_PRECISION")
                    .and_then(|s| s.parse().ok())
                    .map(|precision: u32| precision.min(MAX_DECIMAL_PRECISION))
                    .unwrap_or(defaults.decimal_precision),
            },
            worker_threads: lookup("CHAT_ARCHIVE_WORKER_THREADS")
                .and_then(|s| s.parse().ok())
                .filter(|&threads: &usize| threads > 0),
        }
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
