//! Persistent Settings
//!
//! Device assignments and rank maps live in a key/value store under
//! `org/freedesktop/openicc/device/<class>/<id>/...`. The library only
//! defines the contract and an in-memory store; front ends bring their own
//! persistence.

use std::collections::BTreeMap;

use crate::Result;
use crate::matching::{Device, RankMap};

/// Key of the assigned profile name below a device key
pub const PROFILE_NAME_KEY: &str = "profile_name";
/// Key of the stored rank map JSON below a device key
pub const RANK_MAP_KEY: &str = "rank_map";

/// Hierarchical string store with '/' separated paths
pub trait SettingsStore {
    fn get(&self, path: &str) -> Option<String>;

    /// Store a value, `None` erases the path
    fn set(&mut self, path: &str, value: Option<String>) -> Result<()>;

    /// All stored paths starting with `prefix`, sorted
    fn keys(&self, prefix: &str) -> Vec<String>;
}

/// Settings kept in memory, e.g. for tests or one-shot runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn from_values(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }

    fn set(&mut self, path: &str, value: Option<String>) -> Result<()> {
        match value {
            Some(value) => {
                self.values.insert(path.to_string(), value);
            }
            None => {
                self.values.remove(path);
            }
        }
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Vec<String> {
        self.values
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

fn device_path(device: &Device, key: &str) -> String {
    format!("{}/{key}", device.settings_key())
}

/// Profile file name assigned to a device
pub fn assigned_profile(store: &dyn SettingsStore, device: &Device) -> Option<String> {
    store
        .get(&device_path(device, PROFILE_NAME_KEY))
        .filter(|name| !name.is_empty())
}

/// Assign a profile file name, or remove the assignment with `None`
pub fn assign_profile(
    store: &mut dyn SettingsStore,
    device: &Device,
    profile_name: Option<&str>,
) -> Result<()> {
    let path = device_path(device, PROFILE_NAME_KEY);
    match profile_name {
        Some(name) => log::info!("{path} = {name}"),
        None => log::info!("erasing {path}"),
    }
    store.set(&path, profile_name.map(str::to_string))
}

/// Rank map stored for a device
pub fn stored_rank_map(store: &dyn SettingsStore, device: &Device) -> Result<Option<RankMap>> {
    store
        .get(&device_path(device, RANK_MAP_KEY))
        .map(|text| RankMap::from_json(&text, 0))
        .transpose()
}

pub fn store_rank_map(
    store: &mut dyn SettingsStore,
    device: &Device,
    rank_map: &RankMap,
) -> Result<()> {
    let text = serde_json::to_string(&rank_map.to_json(&device.class))?;
    store.set(&device_path(device, RANK_MAP_KEY), Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_keys() {
        let mut store = MemorySettings::new();
        store.set("a/b/c", Some("1".to_string())).unwrap();
        store.set("a/b/d", Some("2".to_string())).unwrap();
        store.set("a/x", Some("3".to_string())).unwrap();
        assert_eq!(store.keys("a/b/"), vec!["a/b/c", "a/b/d"]);
        assert_eq!(store.keys("").len(), 3);

        store.set("a/b/c", None).unwrap();
        assert_eq!(store.get("a/b/c"), None);
        assert_eq!(store.get("a/x").as_deref(), Some("3"));
    }

    #[test]
    fn test_assignment() {
        let mut store = MemorySettings::new();
        let device = Device::new("monitor", "DP-1");
        assert_eq!(assigned_profile(&store, &device), None);

        assign_profile(&mut store, &device, Some("display.icc")).unwrap();
        assert_eq!(
            store
                .get("org/freedesktop/openicc/device/monitor/DP-1/profile_name")
                .as_deref(),
            Some("display.icc")
        );
        assert_eq!(assigned_profile(&store, &device).as_deref(), Some("display.icc"));

        assign_profile(&mut store, &device, None).unwrap();
        assert_eq!(assigned_profile(&store, &device), None);
    }

    #[test]
    fn test_rank_map_persistence() {
        let mut store = MemorySettings::new();
        let device = Device::new("monitor", "0");
        assert!(stored_rank_map(&store, &device).unwrap().is_none());

        let mut map = RankMap::new();
        map.append("serial", 10, -2, 0);
        store_rank_map(&mut store, &device, &map).unwrap();
        assert_eq!(stored_rank_map(&store, &device).unwrap(), Some(map));

        store
            .set(&device_path(&device, RANK_MAP_KEY), Some("{}".to_string()))
            .unwrap();
        assert!(stored_rank_map(&store, &device).is_err());
    }
}
