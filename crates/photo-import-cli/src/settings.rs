use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const SETTINGS_FILENAME: &str = ".photo_importer_config.json";

/// Last-used directories, remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub dest: Option<PathBuf>,
}

impl Settings {
    /// `~/.photo_importer_config.json`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILENAME))
    }

    /// Load settings; a missing or unreadable file yields empty settings.
    pub fn load(path: &Path) -> Self {
        let Ok(file) = File::open(path) else {
            return Self::default();
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!(?path, error = %err, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let temp_path = path.with_extension("json.tmp");
        let writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(writer, self)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
