//! Device and Pattern Matching
//!
//! Scores how well a profile fits a device or a selection pattern.
//!
//! A device is ranked against the device properties a profile carries in
//! its 'meta' tag. Every property key of the device present in the rank map
//! adds the map's match, mismatch or not found points. Automatically
//! generated profiles get a penalty so that hand made or vendor profiles win.

mod device;
mod rank_map;

pub use device::{
    AUTO_GENERATED_KEYS, Device, DeviceClassTable, DeviceDescriptor, OPENICC_DEVICE_PATH,
};
pub use rank_map::{OPENICC_RANK_MAP_PATH, RankEntry, RankMap};

use std::borrow::Cow;

use crate::config::RankPolicy;
use crate::icc::SignatureKind;
use crate::profile::Profile;

/// Compare two property values
///
/// Both sides may be comma separated lists; any pair matching is enough.
/// A pair matches when the strings are equal, both parse as the same
/// integer, or both parse as floats whose half difference is below `delta`.
/// With `sub_string` a value containing the other also matches.
pub fn dict_match(value: &str, pattern: &str, delta: f64, sub_string: bool) -> bool {
    value.split(',').any(|left| {
        pattern
            .split(',')
            .any(|right| value_match(left.trim(), right.trim(), delta, sub_string))
    })
}

fn value_match(left: &str, right: &str, delta: f64, sub_string: bool) -> bool {
    if left == right {
        return true;
    }
    if sub_string && !left.is_empty() && !right.is_empty() {
        if left.contains(right) || right.contains(left) {
            return true;
        }
    }
    if let (Ok(a), Ok(b)) = (left.parse::<i64>(), right.parse::<i64>()) {
        return a == b;
    }
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(a), Ok(b)) => ((a - b) / 2.0).abs() < delta,
        _ => false,
    }
}

/// Rank a profile's device properties against a device
///
/// Keys missing from the rank map, or every key when there is no rank
/// map, contribute nothing. Keys of the profile are also found when stored
/// as `.../key`. The sum saturates at the `i32` bounds.
pub fn match_device(
    device: &DeviceDescriptor,
    profile: &DeviceDescriptor,
    rank_map: Option<&RankMap>,
    policy: &RankPolicy,
    sub_string: bool,
) -> i32 {
    let mut rank: i32 = 0;

    for (i, (key, value)) in device.iter().enumerate() {
        if device.iter().take(i).any(|(earlier, _)| earlier == key) {
            log::warn!("device property '{key}' appears more than once");
        }

        let Some(entry) = rank_map.and_then(|map| map.get(key)) else {
            continue;
        };

        let points = match profile.lookup(key) {
            Some(found) if dict_match(value, found, policy.numeric_delta, sub_string) => {
                entry.match_value
            }
            Some(_) => entry.none_match_value,
            None => entry.not_found_value,
        };
        rank = rank.saturating_add(points);
    }

    if profile.is_auto_generated() {
        let penalty = if profile.contains_key("serial") {
            policy.auto_generated_serial_penalty
        } else {
            policy.auto_generated_penalty
        };
        rank = rank.saturating_sub(penalty);
    }

    rank
}

/// Rank one profile for a device, using the device's rank map
pub fn rank_profile(device: &Device, profile: &Profile, policy: &RankPolicy) -> i32 {
    match_device(
        &device.properties,
        &profile.device_descriptor(),
        device.rank_map.as_ref(),
        policy,
        false,
    )
}

/// Whether `candidate` fits `pattern`
///
/// The first applicable rule decides:
/// 1. a meta filter ranks the candidate's device properties, `rank > 0`
/// 2. a file name must be contained in the candidate's file name, a '*'
///    in the pattern is ignored
/// 3. every non-zero header field of the pattern must equal the
///    candidate's field
pub fn match_pattern(pattern: &Profile, candidate: &Profile, policy: &RankPolicy) -> bool {
    let pattern_name = pattern.file_name().map(|name| name.to_string_lossy());

    if let Some(filter) = pattern.meta_filter() {
        let sub_string = pattern_name.as_deref().is_some_and(|n| n.contains('*'));
        let rank_map = match &filter.rank_map {
            Some(map) => Cow::Borrowed(map),
            None => Cow::Owned(RankMap::counting(filter.properties.iter().map(|(k, _)| k))),
        };
        let rank = match_device(
            &filter.properties,
            &candidate.device_descriptor(),
            Some(&*rank_map),
            policy,
            sub_string,
        );
        return rank > 0;
    }

    if let Some(name) = pattern_name {
        let needle = name.replace('*', "");
        return candidate
            .file_name()
            .is_some_and(|file| file.to_string_lossy().contains(needle.as_str()));
    }

    SignatureKind::ALL.iter().all(|kind| {
        let wanted = pattern.signature(*kind);
        wanted == 0 || wanted == candidate.signature(*kind)
    })
}

/// Best ranked profile for a device, or `default` when none ranks above 0
pub fn select_profile<'a>(
    device: &Device,
    candidates: impl IntoIterator<Item = &'a Profile>,
    default: Option<&'a Profile>,
    policy: &RankPolicy,
) -> Option<&'a Profile> {
    let mut best: Option<(i32, &Profile)> = None;
    for candidate in candidates {
        let rank = rank_profile(device, candidate, policy);
        if best.is_none_or(|(top, _)| rank > top) {
            best = Some((rank, candidate));
        }
    }

    match best {
        Some((rank, profile)) if rank > 0 => Some(profile),
        _ => {
            log::debug!("no profile ranks above 0 for device {}", device.settings_key());
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::ColorSpace;
    use crate::profile::DeviceEmbedOptions;

    fn rank_map() -> RankMap {
        let mut map = RankMap::new();
        map.append("manufacturer", 2, -1, 0);
        map.append("model", 5, -2, 0);
        map
    }

    fn device() -> DeviceDescriptor {
        DeviceDescriptor::new()
            .with("manufacturer", "Acme")
            .with("model", "X1")
    }

    fn profile_for(properties: DeviceDescriptor) -> Profile {
        let mut profile = Profile::from_color_space(ColorSpace::Rgb);
        profile
            .add_device(&properties, &DeviceEmbedOptions::default())
            .unwrap();
        profile
    }

    #[test]
    fn test_dict_match() {
        let delta = RankPolicy::default().numeric_delta;
        assert!(dict_match("Acme", "Acme", delta, false));
        assert!(!dict_match("Acme", "acme", delta, false));
        assert!(dict_match("a,b,c", "x,c", delta, false));
        assert!(dict_match("42", "042", delta, false));
        assert!(dict_match("2.2", "2.2009", delta, false));
        assert!(!dict_match("2.2", "2.21", delta, false));
        assert!(!dict_match("View 24", "View", delta, false));
        assert!(dict_match("View 24", "View", delta, true));
    }

    #[test]
    fn test_rank_exact_match() {
        let a = profile_for(device());
        let rank = match_device(
            &device(),
            &a.device_descriptor(),
            Some(&rank_map()),
            &RankPolicy::default(),
            false,
        );
        assert_eq!(rank, 7);
    }

    #[test]
    fn test_rank_partial_match() {
        let b = profile_for(
            DeviceDescriptor::new()
                .with("manufacturer", "Acme")
                .with("model", "X2"),
        );
        let rank = match_device(
            &device(),
            &b.device_descriptor(),
            Some(&rank_map()),
            &RankPolicy::default(),
            false,
        );
        assert_eq!(rank, 0);
    }

    #[test]
    fn test_rank_auto_generated_penalty() {
        let policy = RankPolicy::default();
        let generated = profile_for(
            device()
                .with("serial", "123")
                .with("OPENICC_automatic_generated", "1"),
        );
        let rank = match_device(
            &device(),
            &generated.device_descriptor(),
            Some(&rank_map()),
            &policy,
            false,
        );
        assert_eq!(rank, 7 - 13);

        let no_serial = profile_for(device().with("OYRANOS_automatic_generated", "1"));
        let rank = match_device(
            &device(),
            &no_serial.device_descriptor(),
            Some(&rank_map()),
            &policy,
            false,
        );
        assert_eq!(rank, 7 - 2);
    }

    #[test]
    fn test_rank_not_found_and_unmapped() {
        let mut map = rank_map();
        map.append("serial", 10, -10, -3);
        let device = device().with("serial", "S9").with("host", "desk");
        let profile = profile_for(DeviceDescriptor::new().with("manufacturer", "Acme"));
        let rank = match_device(
            &device,
            &profile.device_descriptor(),
            Some(&map),
            &RankPolicy::default(),
            false,
        );
        assert_eq!(rank, 2 - 3);

        let rank = match_device(
            &device,
            &profile.device_descriptor(),
            None,
            &RankPolicy::default(),
            false,
        );
        assert_eq!(rank, 0);
    }

    #[test]
    fn test_rank_saturates() {
        let map = RankMap::from_json(
            r#"{"org": {"freedesktop": {"openicc": {"rank_map": {"monitor": [
                {"manufacturer": [2147483647, 0, 0], "model": [2147483647, 0, 0]}
            ]}}}}}"#,
            0,
        )
        .unwrap();
        let profile = profile_for(device());
        let policy = RankPolicy::default();

        let rank = match_device(
            &device(),
            &profile.device_descriptor(),
            Some(&map),
            &policy,
            false,
        );
        assert_eq!(rank, i32::MAX);

        let mut map = RankMap::new();
        map.append("manufacturer", 0, i32::MIN, 0);
        map.append("model", 0, i32::MIN, 0);
        let generated = DeviceDescriptor::new()
            .with("manufacturer", "Other")
            .with("model", "Other")
            .with("automatic_generated", "1");
        let rank = match_device(&device(), &generated, Some(&map), &policy, false);
        assert_eq!(rank, i32::MIN);
    }

    #[test]
    fn test_rank_registration_style_keys() {
        let profile = DeviceDescriptor::new()
            .with("org/freedesktop/openicc/device/monitor/0/manufacturer", "Acme");
        let rank = match_device(
            &device(),
            &profile,
            Some(&rank_map()),
            &RankPolicy::default(),
            false,
        );
        assert_eq!(rank, 2);
    }

    #[test]
    fn test_match_pattern_signatures() {
        let policy = RankPolicy::default();
        let rgb = Profile::from_color_space(ColorSpace::Rgb);
        let cmyk = Profile::from_color_space(ColorSpace::Cmyk);
        let any = Profile::empty();

        let pattern = Profile::from_color_space(ColorSpace::Rgb);
        assert!(match_pattern(&pattern, &rgb, &policy));
        assert!(!match_pattern(&pattern, &cmyk, &policy));
        assert!(match_pattern(&any, &cmyk, &policy));
    }

    #[test]
    fn test_match_pattern_file_name_wins() {
        let policy = RankPolicy::default();
        let mut candidate = Profile::from_color_space(ColorSpace::Cmyk);
        candidate.set_file_name(Some("/usr/share/color/icc/printer-glossy.icc".into()));

        let mut pattern = Profile::file_name_pattern("glossy");
        pattern.set_signature(SignatureKind::ColorSpace, ColorSpace::Rgb.to_u32());
        assert!(match_pattern(&pattern, &candidate, &policy));

        let wildcard = Profile::file_name_pattern("printer*");
        assert!(match_pattern(&wildcard, &candidate, &policy));

        let other = Profile::file_name_pattern("matte");
        assert!(!match_pattern(&other, &candidate, &policy));
        assert!(!match_pattern(&other, &Profile::empty(), &policy));
    }

    #[test]
    fn test_match_pattern_meta_filter() {
        let policy = RankPolicy::default();
        let a = profile_for(device());
        let b = profile_for(DeviceDescriptor::new().with("manufacturer", "Other"));

        let pattern = Profile::device_pattern(Device::new("monitor", "0").with_properties(device()))
            .unwrap();
        assert!(match_pattern(&pattern, &a, &policy));
        assert!(!match_pattern(&pattern, &b, &policy));

        let ranked = Device::new("monitor", "0")
            .with_properties(device())
            .with_rank_map(rank_map());
        let pattern = Profile::device_pattern(ranked).unwrap();
        assert!(match_pattern(&pattern, &a, &policy));
    }

    #[test]
    fn test_select_profile() {
        let policy = RankPolicy::default();
        let device = Device::new("monitor", "0")
            .with_properties(device())
            .with_rank_map(rank_map());
        let candidates = vec![
            profile_for(
                DeviceDescriptor::new()
                    .with("manufacturer", "Acme")
                    .with("model", "X2"),
            ),
            profile_for(device.properties.clone()),
        ];
        let fallback = Profile::from_color_space(ColorSpace::Rgb);

        let chosen = select_profile(&device, &candidates, Some(&fallback), &policy).unwrap();
        assert_eq!(chosen.device_descriptor().get("model"), Some("X1"));

        let chosen = select_profile(&device, &candidates[..1], Some(&fallback), &policy).unwrap();
        assert!(std::ptr::eq(chosen, &fallback));
        assert!(select_profile(&device, Vec::<Profile>::new().iter(), None, &policy).is_none());
    }
}
