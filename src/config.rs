// ⚙️ Settings - environment driven, CLI flags override

use crate::dataset::DEFAULT_DATA_FILE;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// FINFIT_DATA
    pub data_path: PathBuf,
    /// FINFIT_BIND
    pub bind_addr: String,
    /// FINFIT_EXPORT_DIR
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Read settings from the process environment (after loading `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build settings from any key lookup; unset or blank keys fall back
    /// to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        Settings {
            data_path: get("FINFIT_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            bind_addr: get("FINFIT_BIND").unwrap_or(defaults.bind_addr),
            export_dir: get("FINFIT_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        }
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data_path = path;
        }
        self
    }

    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.export_dir = dir;
        }
        self
    }
}
