//! Test Fixtures

use std::path::{Path, PathBuf};

use oxicc_core::{
    ColorSpace, Device, DeviceDescriptor, DeviceEmbedOptions, LoadFlags, Profile, ProfileClass,
    ProfileContext, ProfileVersion, RankMap, SearchPaths, SignatureKind, TagSignature,
};

/// 132 byte RGB profile: header with 'acsp' magic and a zero tag count
pub fn minimal_profile() -> Vec<u8> {
    let mut data = vec![0u8; 132];
    data[0..4].copy_from_slice(&132u32.to_be_bytes());
    data[8] = 4;
    data[9] = 0x30;
    data[12..16].copy_from_slice(b"mntr");
    data[16..20].copy_from_slice(b"RGB ");
    data[20..24].copy_from_slice(b"XYZ ");
    data[36..40].copy_from_slice(b"acsp");
    data
}

/// Device properties as handed out by a monitor backend
pub fn device(manufacturer: &str, model: &str) -> DeviceDescriptor {
    DeviceDescriptor::new()
        .with("manufacturer", manufacturer)
        .with("model", model)
}

/// `manufacturer: [2, -1, 0]`, `model: [5, -2, 0]`
pub fn eizo_rank_map() -> RankMap {
    let mut map = RankMap::new();
    map.append("manufacturer", 2, -1, 0);
    map.append("model", 5, -2, 0);
    map
}

/// v4 display profile with a description and embedded device properties
pub fn profile_for(description: &str, properties: &DeviceDescriptor) -> Profile {
    let mut profile = Profile::from_color_space(ColorSpace::Rgb);
    profile.set_signature(SignatureKind::Version, ProfileVersion::V4_3.to_u32());
    profile.set_signature(SignatureKind::Class, ProfileClass::Display.to_u32());
    profile
        .add_text(TagSignature::DESC, description)
        .expect("description encodes");
    profile
        .add_device(properties, &DeviceEmbedOptions::default())
        .expect("meta tag encodes");
    profile
}

/// A monitor device with the EIZO rank map
pub fn eizo_monitor(model: &str) -> Device {
    Device::new("monitor", "DP-1")
        .with_properties(device("EIZO", model))
        .with_rank_map(eizo_rank_map())
}

/// Temporary directory used as the only profile search path
pub struct ProfileDir {
    dir: tempfile::TempDir,
}

impl ProfileDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temporary directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write bytes below the directory, creating parent directories
    pub fn write(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("parent directory");
        }
        std::fs::write(&path, data).expect("profile written");
        path
    }

    pub fn write_profile(&self, name: &str, profile: &Profile) -> PathBuf {
        self.write(name, &profile.to_bytes())
    }

    pub fn context(&self) -> ProfileContext {
        ProfileContext::new(SearchPaths::new(vec![self.dir.path().to_path_buf()]))
    }
}

impl Default for ProfileDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Load flags that neither touch the cache nor rewrite files
pub fn read_only() -> LoadFlags {
    LoadFlags {
        no_repair: true,
        ..LoadFlags::uncached()
    }
}
