//! Settings persisted as a flat JSON object of path to value

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use oxicc_core::{MemorySettings, SettingsStore};

const SETTINGS_FILE: &str = "oxicc/settings.json";

/// Settings file in the user configuration directory
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// Settings store written back to its file on every change
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    values: MemorySettings,
}

impl JsonSettings {
    /// Open a settings file, a missing file starts empty
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let values = match fs::read_to_string(path) {
            Ok(text) => {
                let map: BTreeMap<String, String> = serde_json::from_str(&text)?;
                MemorySettings::from_values(map)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemorySettings::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn save(&self) -> oxicc_core::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self.values.values())?;
        fs::write(&self.path, text)?;
        log::debug!("wrote {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, path: &str) -> Option<String> {
        self.values.get(path)
    }

    fn set(&mut self, path: &str, value: Option<String>) -> oxicc_core::Result<()> {
        self.values.set(path, value)?;
        self.save()
    }

    fn keys(&self, prefix: &str) -> Vec<String> {
        self.values.keys(prefix)
    }
}
