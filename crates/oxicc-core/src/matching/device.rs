//! Devices and Device Descriptors
//!
//! A device descriptor is the flat key/value property set a device backend
//! reports, or that a profile carries in its 'meta' tag. [`Device`] adds
//! the device class, an id and an optional rank map.
//!
//! Devices are exchanged as OpenICC device JSON:
//! `{"org":{"freedesktop":{"openicc":{"device":{"<class>":[{...}]}}}}}`.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::icc::ProfileClass;
use crate::{Error, Result};

use super::rank_map::RankMap;

/// JSON path from the document root to the device classes
pub const OPENICC_DEVICE_PATH: [&str; 4] = ["org", "freedesktop", "openicc", "device"];

/// Flags marking a profile as generated without measurement
pub const AUTO_GENERATED_KEYS: [&str; 3] = [
    "OPENICC_automatic_generated",
    "OYRANOS_automatic_generated",
    "automatic_generated",
];

/// Ordered key/value properties; keys may repeat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescriptor {
    entries: Vec<(String, String)>,
}

impl DeviceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property, keeping earlier entries with the same key
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Replace the first property named `key`, or append it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.into(),
            None => self.entries.push((key.to_string(), value.into())),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// First value stored under exactly `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, also accepting registration style keys ending in
    /// `/key`
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.entries
                .iter()
                .find(|(k, _)| {
                    k.strip_suffix(key)
                        .is_some_and(|head| head.ends_with('/'))
                })
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the descriptor flags an automatically generated profile
    pub fn is_auto_generated(&self) -> bool {
        AUTO_GENERATED_KEYS
            .iter()
            .any(|key| self.get(key) == Some("1"))
    }

    /// Properties as a JSON object; repeated keys keep the first value
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (key, value) in self.iter() {
            object
                .entry(key.to_string())
                .or_insert_with(|| Value::String(value.to_string()));
        }
        Value::Object(object)
    }

    /// Read a flat JSON object; scalars become strings, arrays of scalars
    /// are joined with ','
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let mut descriptor = Self::new();
        for (key, value) in object {
            match scalar_text(value) {
                Some(text) => descriptor.push(key.clone(), text),
                None => log::debug!("skipping structured device property '{key}'"),
            }
        }
        descriptor
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeviceDescriptor {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                other => scalar_text(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Null | Value::Object(_) => None,
    }
}

/// A physical device as seen by the matching engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    /// Device class, e.g. "monitor" or "printer"
    pub class: String,
    /// Device name or position, unique within the class
    pub id: String,
    pub properties: DeviceDescriptor,
    pub rank_map: Option<RankMap>,
}

impl Device {
    pub fn new(class: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: DeviceDescriptor) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_rank_map(mut self, rank_map: RankMap) -> Self {
        self.rank_map = Some(rank_map);
        self
    }

    /// Settings path of this device,
    /// `org/freedesktop/openicc/device/<class>/<id>`
    pub fn settings_key(&self) -> String {
        format!("org/freedesktop/openicc/device/{}/{}", self.class, self.id)
    }

    /// Read device `pos` from OpenICC device JSON
    ///
    /// With `class` set only that class is searched, else the first class
    /// in the document. The id is the "device_name" property when present,
    /// else the position.
    pub fn from_openicc_json(text: &str, class: Option<&str>, pos: usize) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        let classes = OPENICC_DEVICE_PATH
            .iter()
            .try_fold(&root, |node, key| node.get(key))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::NotFound("org/freedesktop/openicc/device".to_string()))?;

        let (class_name, list) = match class {
            Some(name) => classes
                .get(name)
                .map(|list| (name.to_string(), list))
                .ok_or_else(|| Error::NotFound(format!("device class '{name}'")))?,
            None => classes
                .iter()
                .next()
                .map(|(name, list)| (name.clone(), list))
                .ok_or_else(|| Error::NotFound("device class".to_string()))?,
        };

        let object = list
            .as_array()
            .and_then(|devices| devices.get(pos))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::NotFound(format!("device {class_name}/[{pos}]")))?;

        let properties = DeviceDescriptor::from_json(object);
        let id = properties
            .get("device_name")
            .map(str::to_string)
            .unwrap_or_else(|| pos.to_string());

        Ok(Self {
            class: class_name,
            id,
            properties,
            rank_map: None,
        })
    }

    /// Devices as OpenICC device JSON, grouped by class
    pub fn to_openicc_json(devices: &[Device]) -> Value {
        let mut classes = Map::new();
        for device in devices {
            let list = classes
                .entry(device.class.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = list {
                list.push(device.properties.to_json());
            }
        }

        OPENICC_DEVICE_PATH
            .iter()
            .rev()
            .fold(Value::Object(classes), |inner, key| {
                let mut outer = Map::new();
                outer.insert(key.to_string(), inner);
                Value::Object(outer)
            })
    }
}

/// Maps device classes to the ICC class of their profiles
#[derive(Debug, Clone)]
pub struct DeviceClassTable {
    classes: HashMap<String, ProfileClass>,
}

impl Default for DeviceClassTable {
    fn default() -> Self {
        let classes = [
            ("monitor", ProfileClass::Display),
            ("printer", ProfileClass::Output),
            ("scanner", ProfileClass::Input),
            ("camera", ProfileClass::Input),
        ]
        .into_iter()
        .map(|(name, class)| (name.to_string(), class))
        .collect();
        Self { classes }
    }
}

impl DeviceClassTable {
    pub fn register(&mut self, device_class: &str, profile_class: ProfileClass) {
        self.classes.insert(device_class.to_string(), profile_class);
    }

    /// Profile class for a device class, display when unknown
    pub fn profile_class(&self, device_class: &str) -> ProfileClass {
        self.classes
            .get(device_class)
            .copied()
            .unwrap_or(ProfileClass::Display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR_JSON: &str = r#"{
      "org": { "freedesktop": { "openicc": { "device": {
        "monitor": [
          { "device_name": "HDMI-1", "manufacturer": "EIZO", "model": "CG2420",
            "EDID_gamma": 2.2, "EDID_primaries": [0.64, 0.33] },
          { "manufacturer": "Dell", "nested": { "x": 1 } }
        ]
      } } } }
    }"#;

    #[test]
    fn test_descriptor_lookup() {
        let descriptor = DeviceDescriptor::new()
            .with("org/freedesktop/openicc/device/monitor/0/model", "CG2420")
            .with("manufacturer", "EIZO");
        assert_eq!(descriptor.lookup("manufacturer"), Some("EIZO"));
        assert_eq!(descriptor.lookup("model"), Some("CG2420"));
        assert_eq!(descriptor.get("model"), None);
        // a suffix without separator is a different key
        assert_eq!(descriptor.lookup("del"), None);
    }

    #[test]
    fn test_descriptor_set_and_duplicates() {
        let mut descriptor = DeviceDescriptor::new();
        descriptor.push("serial", "1");
        descriptor.push("serial", "2");
        assert_eq!(descriptor.len(), 2);
        assert_eq!(descriptor.get("serial"), Some("1"));

        descriptor.set("serial", "3");
        assert_eq!(descriptor.get("serial"), Some("3"));
        assert_eq!(descriptor.len(), 2);

        assert_eq!(descriptor.to_json(), serde_json::json!({"serial": "3"}));
    }

    #[test]
    fn test_auto_generated() {
        let plain = DeviceDescriptor::new().with("model", "x");
        assert!(!plain.is_auto_generated());
        assert!(plain.clone().with("OPENICC_automatic_generated", "1").is_auto_generated());
        assert!(!plain.with("automatic_generated", "0").is_auto_generated());
    }

    #[test]
    fn test_device_from_json() {
        let device = Device::from_openicc_json(MONITOR_JSON, None, 0).unwrap();
        assert_eq!(device.class, "monitor");
        assert_eq!(device.id, "HDMI-1");
        assert_eq!(device.properties.get("EDID_gamma"), Some("2.2"));
        assert_eq!(device.properties.get("EDID_primaries"), Some("0.64,0.33"));
        assert_eq!(
            device.settings_key(),
            "org/freedesktop/openicc/device/monitor/HDMI-1"
        );

        let second = Device::from_openicc_json(MONITOR_JSON, Some("monitor"), 1).unwrap();
        assert_eq!(second.id, "1");
        assert_eq!(second.properties.len(), 1);

        assert!(Device::from_openicc_json(MONITOR_JSON, Some("printer"), 0).is_err());
        assert!(Device::from_openicc_json(MONITOR_JSON, None, 5).is_err());
        assert!(Device::from_openicc_json("{}", None, 0).is_err());
    }

    #[test]
    fn test_device_json_roundtrip() {
        let device = Device::new("monitor", "0")
            .with_properties(DeviceDescriptor::new().with("manufacturer", "EIZO"));
        let text = Device::to_openicc_json(&[device.clone()]).to_string();
        let parsed = Device::from_openicc_json(&text, Some("monitor"), 0).unwrap();
        assert_eq!(parsed.properties, device.properties);
    }

    #[test]
    fn test_class_table() {
        let mut table = DeviceClassTable::default();
        assert_eq!(table.profile_class("monitor"), ProfileClass::Display);
        assert_eq!(table.profile_class("printer"), ProfileClass::Output);
        assert_eq!(table.profile_class("camera"), ProfileClass::Input);
        assert_eq!(table.profile_class("projector"), ProfileClass::Display);

        table.register("projector", ProfileClass::Output);
        assert_eq!(table.profile_class("projector"), ProfileClass::Output);
    }
}
