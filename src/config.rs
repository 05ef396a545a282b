use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-records";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "school_management.sqlite";
/// Environment variable that overrides the database location.
pub const DB_ENV_VAR: &str = "SCHOOL_RECORDS_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Use the explicit path when one was given (flag or `SCHOOL_RECORDS_DB`),
    /// otherwise fall back to the default file in the user's home.
    pub fn resolve(db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };
        Ok(Self { db_path })
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
