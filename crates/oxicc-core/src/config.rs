//! Configuration
//!
//! Profile search directories, per call load flags and the ranking policy
//! constants. Nothing here is global; callers build the values and hand them
//! to [`crate::ProfileContext`].

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable with extra profile directories, colon separated
pub const PROFILE_PATH_ENV: &str = "OXICC_PROFILE_PATH";

const ICC_SUBDIR: &str = "color/icc";
const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Ordered list of directories that hold profiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Directories from the environment
    ///
    /// `OXICC_PROFILE_PATH` first, then the user data directory
    /// (`$XDG_DATA_HOME/color/icc`), `~/.color/icc` and finally every
    /// `$XDG_DATA_DIRS` entry.
    pub fn from_env() -> Self {
        let mut found: Vec<PathBuf> = Vec::new();

        if let Ok(extra) = env::var(PROFILE_PATH_ENV) {
            found.extend(env::split_paths(&extra).filter(|p| !p.as_os_str().is_empty()));
        }

        match env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
            Some(data_home) => found.push(PathBuf::from(data_home).join(ICC_SUBDIR)),
            None => {
                if let Some(data_dir) = dirs::data_dir() {
                    found.push(data_dir.join(ICC_SUBDIR));
                }
            }
        }

        if let Some(home) = dirs::home_dir() {
            found.push(home.join(".color").join("icc"));
        }

        let data_dirs = env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
        found.extend(env::split_paths(&data_dirs).map(|d| d.join(ICC_SUBDIR)));

        let mut unique = Self::default();
        for dir in found {
            unique.push(dir);
        }
        unique
    }

    /// Append a directory unless already listed
    pub fn push(&mut self, dir: PathBuf) {
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find a profile by name
    ///
    /// Absolute paths are taken as they are, then each search directory is
    /// tried, then the current working directory.
    pub fn resolve(&self, name: &Path) -> Option<PathBuf> {
        if name.as_os_str().is_empty() {
            return None;
        }
        if name.is_absolute() {
            return name.is_file().then(|| name.to_path_buf());
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .or_else(|| {
                let local = env::current_dir().ok()?.join(name);
                local.is_file().then_some(local)
            })
    }
}

/// Options for loading profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFlags {
    /// Do not look into the cache
    pub no_cache_read: bool,
    /// Do not store the loaded profile in the cache
    pub no_cache_write: bool,
    /// Accept only ICC version 2 profiles
    pub icc_version_2: bool,
    /// Accept only ICC version 4 profiles
    pub icc_version_4: bool,
    /// Never rewrite a missing or wrong profile ID
    pub no_repair: bool,
    /// Key the cache by name only, ignoring the file modification time
    pub skip_mtime_check: bool,
    /// Keep profiles with identical IDs in listings
    pub allow_duplicates: bool,
}

impl LoadFlags {
    /// Bypass the cache in both directions, as for one-off scans
    pub fn uncached() -> Self {
        Self {
            no_cache_read: true,
            no_cache_write: true,
            ..Self::default()
        }
    }

    /// True when the major version passes the version filter
    pub fn accepts_version(&self, major: u8) -> bool {
        match (self.icc_version_2, self.icc_version_4) {
            (false, false) => true,
            (v2, v4) => (v2 && major == 2) || (v4 && major == 4),
        }
    }
}

/// Constants used while ranking profiles against devices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankPolicy {
    /// Subtracted from automatically generated profiles carrying a serial
    pub auto_generated_serial_penalty: i32,
    /// Subtracted from other automatically generated profiles
    pub auto_generated_penalty: i32,
    /// Two numbers are equal when half their difference is below this
    pub numeric_delta: f64,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            auto_generated_serial_penalty: 13,
            auto_generated_penalty: 2,
            numeric_delta: 0.0005,
        }
    }
}
