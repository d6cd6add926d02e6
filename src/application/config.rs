use crate::infrastructure::parse_level;
use log::LevelFilter;
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "calories.db";

pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup: `CALORIES_DIR`, `CALORIES_DB`, `CALORIES_LOG`.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = var("CALORIES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("calories")
            });

        let db_path = var("CALORIES_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_DB_FILE));

        let log_level = var("CALORIES_LOG")
            .map(|level| parse_level(&level))
            .unwrap_or(LevelFilter::Warn);

        Self {
            data_dir,
            db_path,
            log_level,
        }
    }

    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        self
    }
}
