use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

const DB_ENV: &str = "CALTRACK_DB";
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_MODEL_ENV: &str = "CALTRACK_GEMINI_MODEL";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "caltrack").context("Could not determine home directory")?;

        let db_path = resolve_db_path(env::var_os(DB_ENV).map(PathBuf::from), proj_dirs.data_dir());
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        Ok(Config { db_path })
    }

    /// Only the `photo` command needs a key, so it is read on demand.
    pub fn gemini_api_key() -> Result<String> {
        env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| {
                format!("{GEMINI_API_KEY_ENV} is not set. Photo analysis needs a Google Gemini API key")
            })
    }

    pub fn gemini_model() -> String {
        env::var(GEMINI_MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }
}

fn resolve_db_path(override_path: Option<PathBuf>, data_dir: &Path) -> PathBuf {
    match override_path {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => data_dir.join("caltrack.db"),
    }
}
