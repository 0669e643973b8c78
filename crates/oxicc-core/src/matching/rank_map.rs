//! Rank Maps
//!
//! A rank map says, per device property key, how many points a profile
//! earns when its embedded value matches the device, does not match, or is
//! missing.
//!
//! JSON form:
//! `{"org":{"freedesktop":{"openicc":{"rank_map":{"<class>":[{"key":[2,-1,0]}]}}}}}`

use serde_json::{Map, Value};

use crate::{Error, Result};

/// JSON path from the document root to the rank map classes
pub const OPENICC_RANK_MAP_PATH: [&str; 4] = ["org", "freedesktop", "openicc", "rank_map"];

/// Points for one property key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub key: String,
    pub match_value: i32,
    pub none_match_value: i32,
    pub not_found_value: i32,
}

/// Ordered rank entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankMap {
    entries: Vec<RankEntry>,
}

impl RankMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map giving one point per matching key for the given keys
    pub fn counting<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for key in keys {
            map.append(key, 1, 0, 0);
        }
        map
    }

    /// Add an entry, replacing an earlier one for the same key
    pub fn append(
        &mut self,
        key: impl Into<String>,
        match_value: i32,
        none_match_value: i32,
        not_found_value: i32,
    ) {
        let entry = RankEntry {
            key: key.into(),
            match_value,
            none_match_value,
            not_found_value,
        };
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RankEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse element `pos` of the first device class in a rank map document
    ///
    /// Values may be numbers or numeric strings.
    pub fn from_json(text: &str, pos: usize) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        let classes = OPENICC_RANK_MAP_PATH
            .iter()
            .try_fold(&root, |node, key| node.get(key))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::RankMap("missing org/freedesktop/openicc/rank_map".to_string()))?;

        let (class, list) = classes
            .iter()
            .next()
            .ok_or_else(|| Error::RankMap("no device class in rank map".to_string()))?;

        let object = list
            .as_array()
            .and_then(|maps| maps.get(pos))
            .and_then(Value::as_object)
            .ok_or_else(|| Error::RankMap(format!("no rank map {class}/[{pos}]")))?;

        let mut map = Self::new();
        for (key, values) in object {
            let numbers = values
                .as_array()
                .filter(|v| v.len() == 3)
                .and_then(|v| v.iter().map(rank_value).collect::<Option<Vec<i32>>>())
                .ok_or_else(|| {
                    Error::RankMap(format!("'{key}' needs [match, none_match, not_found]"))
                })?;
            map.append(key.clone(), numbers[0], numbers[1], numbers[2]);
        }
        Ok(map)
    }

    /// Rank map document for one device class
    pub fn to_json(&self, device_class: &str) -> Value {
        let mut object = Map::new();
        for entry in &self.entries {
            object.insert(
                entry.key.clone(),
                Value::from(vec![
                    entry.match_value,
                    entry.none_match_value,
                    entry.not_found_value,
                ]),
            );
        }

        let mut classes = Map::new();
        classes.insert(
            device_class.to_string(),
            Value::Array(vec![Value::Object(object)]),
        );

        OPENICC_RANK_MAP_PATH
            .iter()
            .rev()
            .fold(Value::Object(classes), |inner, key| {
                let mut outer = Map::new();
                outer.insert(key.to_string(), inner);
                Value::Object(outer)
            })
    }
}

fn rank_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANK_JSON: &str = r#"{
      "org": { "freedesktop": { "openicc": { "rank_map": {
        "monitor": [
          { "manufacturer": [2, -1, 0], "model": ["5", "-2", "0"] },
          { "serial": [10, -2, 0] }
        ]
      } } } }
    }"#;

    #[test]
    fn test_parse() {
        let map = RankMap::from_json(RANK_JSON, 0).unwrap();
        assert_eq!(map.len(), 2);
        let model = map.get("model").unwrap();
        assert_eq!(
            (model.match_value, model.none_match_value, model.not_found_value),
            (5, -2, 0)
        );
        assert_eq!(map.iter().next().unwrap().key, "manufacturer");

        let second = RankMap::from_json(RANK_JSON, 1).unwrap();
        assert_eq!(second.get("serial").unwrap().match_value, 10);
        assert!(RankMap::from_json(RANK_JSON, 2).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(RankMap::from_json("{}", 0), Err(Error::RankMap(_))));
        assert!(matches!(RankMap::from_json("not json", 0), Err(Error::Json(_))));
        let short = r#"{"org":{"freedesktop":{"openicc":{"rank_map":{"monitor":[{"a":[1,2]}]}}}}}"#;
        assert!(RankMap::from_json(short, 0).is_err());
        let text = r#"{"org":{"freedesktop":{"openicc":{"rank_map":{"monitor":[{"a":[1,"x",0]}]}}}}}"#;
        assert!(RankMap::from_json(text, 0).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut map = RankMap::new();
        map.append("manufacturer", 2, -1, 0);
        map.append("model", 5, -2, 0);
        let text = map.to_json("monitor").to_string();
        assert_eq!(RankMap::from_json(&text, 0).unwrap(), map);
        assert!(text.contains(r#""monitor":[{"manufacturer":[2,-1,0]"#));
    }

    #[test]
    fn test_append_replaces() {
        let mut map = RankMap::counting(["a", "b"]);
        assert_eq!(map.get("a").unwrap().match_value, 1);
        map.append("a", 7, 0, 0);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a").unwrap().match_value, 7);
    }
}
