//! Device metadata embedded in the 'meta' tag

use super::Profile;
use crate::Result;
use crate::icc::tags::DictData;
use crate::icc::{SignatureKind, Tag, TagData, TagSignature};
use crate::matching::{Device, DeviceDescriptor};

/// How [`Profile::add_device`] filters and applies device properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEmbedOptions {
    /// Dot separated key prefixes; only keys starting with one are stored
    pub key_prefix_required: Option<String>,
    /// Also write 'dmnd'/'dmdd' and the header manufacturer and model
    pub set_device_attributes: bool,
}

impl Profile {
    /// Store device properties as 'meta' dictionary
    ///
    /// The descriptor's own "prefix" value is used when no prefix is
    /// required. A required prefix is recorded under the "prefix" key.
    pub fn add_device(
        &mut self,
        descriptor: &DeviceDescriptor,
        options: &DeviceEmbedOptions,
    ) -> Result<()> {
        let prefix_text = options
            .key_prefix_required
            .as_deref()
            .or_else(|| descriptor.get("prefix"))
            .unwrap_or_default();
        let prefixes: Vec<&str> = prefix_text.split('.').filter(|p| !p.is_empty()).collect();

        let mut entries = Vec::with_capacity(descriptor.len() + 1);
        if let Some(required) = &options.key_prefix_required {
            if !descriptor.contains_key("prefix") {
                entries.push(("prefix".to_string(), required.clone()));
            }
        }

        let mut attributes = DeviceDescriptor::new();
        for (key, value) in descriptor.iter() {
            let prefix = prefixes.iter().find(|p| key.starts_with(*p));
            if options.key_prefix_required.is_some() && prefix.is_none() && key != "prefix" {
                continue;
            }
            let short = prefix.map_or(key, |p| &key[p.len()..]);
            attributes.push(short, value);
            entries.push((key.to_string(), value.to_string()));
        }

        let meta = Tag::new(TagSignature::META, TagData::Dict(DictData::new(entries)))
            .ok_or_else(|| crate::Error::InvalidArgument("meta tag not encodable".to_string()))?;
        self.add_tag(meta, None)?;

        if options.set_device_attributes {
            self.set_device_attributes(&attributes)?;
        }
        Ok(())
    }

    fn set_device_attributes(&mut self, attributes: &DeviceDescriptor) -> Result<()> {
        if let Some(manufacturer) = attributes.get("manufacturer") {
            self.add_text(TagSignature::DEVICE_MFG_DESC, manufacturer)?;
        }
        if let Some(model) = attributes.get("model") {
            self.add_text(TagSignature::DEVICE_MODEL_DESC, model)?;
        }
        if let Some(code) = attributes.get("mnft").and_then(signature_code) {
            self.set_signature(SignatureKind::Manufacturer, code);
        }
        if let Some(id) = attributes.get("model_id") {
            match id.trim().parse::<u32>().ok().or_else(|| signature_code(id)) {
                Some(model) => self.set_signature(SignatureKind::Model, model),
                None => log::warn!("model_id '{id}' is neither a number nor a signature"),
            }
        }
        Ok(())
    }

    /// Device properties from the 'meta' tag
    ///
    /// A missing "serial" is taken from a key ending in "_serial"; missing
    /// "model" and "manufacturer" come from the 'dmdd' and 'dmnd' tags.
    pub fn device_descriptor(&self) -> DeviceDescriptor {
        let mut descriptor: DeviceDescriptor = self
            .tag_by_signature(TagSignature::META)
            .filter(|tag| !tag.is_corrupted())
            .and_then(|tag| tag.data().as_dict())
            .map(|dict| dict.entries.iter().cloned().collect())
            .unwrap_or_default();

        if !descriptor.contains_key("serial") {
            let serial = descriptor
                .iter()
                .find(|(key, _)| key.ends_with("_serial"))
                .map(|(_, value)| value.to_string());
            if let Some(serial) = serial {
                descriptor.push("serial", serial);
            }
        }
        if !descriptor.contains_key("model") {
            if let Some(model) = self.model() {
                descriptor.push("model", model);
            }
        }
        if !descriptor.contains_key("manufacturer") {
            if let Some(manufacturer) = self.manufacturer() {
                descriptor.push("manufacturer", manufacturer);
            }
        }
        descriptor
    }

    /// Pattern profile ranking candidates against `device`
    ///
    /// The device properties go through the 'meta' tag, so the filter holds
    /// exactly what a profile made for this device would embed.
    pub fn device_pattern(device: Device) -> Result<Self> {
        let mut pattern = Self::empty();
        pattern.add_device(&device.properties, &DeviceEmbedOptions::default())?;
        let properties = pattern.device_descriptor();
        pattern.meta_filter = Some(device.with_properties(properties));
        Ok(pattern)
    }
}

/// Up to 4 ASCII characters as a big-endian signature, space padded
fn signature_code(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || text.len() > 4 || !text.is_ascii() {
        return None;
    }
    let mut bytes = *b"    ";
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    Some(u32::from_be_bytes(bytes))
}
