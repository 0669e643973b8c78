//! ICC Profile Container
//!
//! A [`Profile`] owns the original profile bytes, the live 128 byte header
//! and the tag list. The tag list is materialized once, on first access,
//! by walking the tag table of the original bytes; until then only the
//! header is decoded. While no tag or header field changes, the original
//! bytes stay the authoritative serialization.
//!
//! Profiles are plain values. Share them as `Arc<Profile>` and use
//! `Arc::make_mut` to get a private copy before mutating.

mod device;
mod serialize;

pub use device::DeviceEmbedOptions;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::LoadFlags;
use crate::icc::{
    ColorSpace, HEADER_SIZE, IccError, IccHeader, MIN_PROFILE_SIZE, PROFILE_ID_OFFSET,
    ProfileClass, ProfileVersion, RenderingIntent, SignatureKind, Tag, TagData, TagSignature,
    read_u32,
};
use crate::identity::{self, IdCheck, ProfileId};
use crate::matching::Device;
use crate::{Error, Result};

/// One ICC profile
#[derive(Clone, Default)]
pub struct Profile {
    file_name: Option<PathBuf>,
    raw: Option<Arc<[u8]>>,
    header: Option<Box<[u8; HEADER_SIZE]>>,
    tags: OnceLock<Vec<Tag>>,
    modified: bool,
    identity: OnceLock<ProfileId>,
    meta_filter: Option<Device>,
}

impl Profile {
    /// A profile without header or tags, e.g. as match pattern
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a profile from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_vec(data.to_vec(), LoadFlags::default())
    }

    /// Parse a profile, taking ownership of the bytes
    ///
    /// Fails with [`IccError::TooSmall`] below 132 bytes and with
    /// [`IccError::InvalidSignature`] when the 'acsp' magic is missing.
    /// Only the header and the tag table bounds are checked here.
    pub fn from_vec(data: Vec<u8>, flags: LoadFlags) -> Result<Self> {
        if data.len() < MIN_PROFILE_SIZE {
            return Err(IccError::TooSmall {
                expected: MIN_PROFILE_SIZE,
                actual: data.len(),
            }
            .into());
        }

        let parsed = IccHeader::parse(&data)?;
        parsed.validate(data.len())?;
        if parsed.size as usize != data.len() {
            log::debug!(
                "header size {} differs from {} bytes of data",
                parsed.size,
                data.len()
            );
        }

        let tag_count = read_u32(&data, HEADER_SIZE).unwrap_or_default() as usize;
        let table_end = tag_count
            .checked_mul(12)
            .and_then(|n| n.checked_add(MIN_PROFILE_SIZE));
        if !table_end.is_some_and(|end| end <= data.len()) {
            return Err(IccError::CorruptedData(format!(
                "tag table with {tag_count} entries exceeds {} bytes",
                data.len()
            ))
            .into());
        }

        if !flags.accepts_version(parsed.version.major) {
            return Err(Error::VersionFiltered {
                found: parsed.version.major,
            });
        }

        let mut header = Box::new([0u8; HEADER_SIZE]);
        header.copy_from_slice(&data[..HEADER_SIZE]);

        Ok(Self {
            raw: Some(Arc::from(data)),
            header: Some(header),
            ..Self::default()
        })
    }

    /// Read a profile from an exact path
    ///
    /// Unless `flags.no_repair` is set, a v4 profile with a missing or
    /// wrong ID gets the computed ID written back to its file. Failing to
    /// write is only a warning.
    pub fn read_file(path: &Path, flags: LoadFlags) -> Result<Self> {
        let data = fs::read(path)?;
        let mut profile = Self::from_vec(data, flags)?;
        profile.file_name = Some(path.to_path_buf());

        if !flags.no_repair && profile.version().major >= 4 {
            profile.repair_file_id(path);
        }
        Ok(profile)
    }

    fn repair_file_id(&mut self, path: &Path) {
        match self.check_id() {
            IdCheck::Valid => return,
            IdCheck::Missing => log::warn!("{}: no profile ID", path.display()),
            IdCheck::Mismatch { embedded, computed } => log::warn!(
                "{}: profile ID {embedded} does not match computed {computed}",
                path.display()
            ),
        }

        let id = self.repair_id();
        match fs::write(path, self.to_bytes()) {
            Ok(()) => log::info!("{}: stored profile ID {id}", path.display()),
            Err(err) => log::warn!("{}: could not store profile ID: {err}", path.display()),
        }
    }

    /// A header only profile with one signature field set
    pub fn from_signature(value: u32, kind: SignatureKind) -> Self {
        let mut profile = Self::empty();
        profile.set_signature(kind, value);
        profile
    }

    /// Pattern matching profiles of one color space
    pub fn from_color_space(color_space: ColorSpace) -> Self {
        Self::from_signature(color_space.to_u32(), SignatureKind::ColorSpace)
    }

    /// Pattern matching profiles whose file name contains `name`
    pub fn file_name_pattern(name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// File the profile was loaded from or written to
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Replace the remembered file name
    pub fn set_file_name(&mut self, name: Option<PathBuf>) {
        self.file_name = name;
    }

    /// Device description used when this profile acts as a match pattern
    pub fn meta_filter(&self) -> Option<&Device> {
        self.meta_filter.as_ref()
    }

    /// Set or clear the device used for meta tag matching
    pub fn set_meta_filter(&mut self, device: Option<Device>) {
        self.meta_filter = device;
    }

    /// Original bytes, if the profile was parsed from memory or file
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// True once a tag or header field changed after loading
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.identity = OnceLock::new();
    }

    // Header

    /// The 128 byte header block, if allocated
    pub fn header_bytes(&self) -> Option<&[u8; HEADER_SIZE]> {
        self.header.as_deref()
    }

    /// Parsed header, `None` without a valid 'acsp' header
    pub fn header(&self) -> Option<IccHeader> {
        IccHeader::parse(self.header.as_deref()?).ok()
    }

    /// One header field, 0 when no header is allocated
    pub fn signature(&self, kind: SignatureKind) -> u32 {
        self.header
            .as_deref()
            .map_or(0, |header| kind.read(header))
    }

    /// Write one header field, allocating a zeroed header on first use
    pub fn set_signature(&mut self, kind: SignatureKind, value: u32) {
        let header = self
            .header
            .get_or_insert_with(|| Box::new([0u8; HEADER_SIZE]));
        kind.write(&mut header[..], value);
        self.sync_header_tag();
        self.mark_modified();
    }

    /// Device color space from the header
    pub fn color_space(&self) -> Option<ColorSpace> {
        ColorSpace::from_u32(self.signature(SignatureKind::ColorSpace))
    }

    /// Profile connection space from the header
    pub fn pcs(&self) -> Option<ColorSpace> {
        ColorSpace::from_u32(self.signature(SignatureKind::Pcs))
    }

    /// Device class from the header
    pub fn profile_class(&self) -> Option<ProfileClass> {
        ProfileClass::from_u32(self.signature(SignatureKind::Class))
    }

    /// Rendering intent from the header
    pub fn rendering_intent(&self) -> Option<RenderingIntent> {
        RenderingIntent::from_u32(self.signature(SignatureKind::Intent))
    }

    /// Major and minor header version
    pub fn version(&self) -> ProfileVersion {
        let [major, minor, _, _] = self.signature(SignatureKind::Version).to_be_bytes();
        ProfileVersion::from_bytes(major, minor)
    }

    /// Number of color channels, 0 for unknown color spaces
    pub fn channel_count(&self) -> usize {
        self.color_space().map_or(0, |cs| cs.channels())
    }

    /// Channel names of the color space, empty when unknown
    pub fn channel_names(&self) -> Vec<String> {
        self.color_space()
            .map(|cs| cs.channel_names())
            .unwrap_or_default()
    }

    // Tags

    /// Walk the tag table once; entry 0 is the header pseudo tag
    fn parse_tags(&self) -> Vec<Tag> {
        let Some(header) = self.header.as_deref() else {
            return Vec::new();
        };
        let cmm = SignatureKind::Cmm.read(header);
        let mut tags = vec![Tag::header(header, cmm)];

        let Some(raw) = self.raw.as_deref() else {
            return tags;
        };

        let count = read_u32(raw, HEADER_SIZE).unwrap_or_default() as usize;
        tags.reserve(count);
        for i in 0..count {
            let entry = MIN_PROFILE_SIZE + i * 12;
            let (Some(sig), Some(offset), Some(size)) = (
                read_u32(raw, entry),
                read_u32(raw, entry + 4),
                read_u32(raw, entry + 8),
            ) else {
                log::warn!("tag table ends before entry {i} of {count}");
                break;
            };
            tags.push(Tag::decode(raw, TagSignature(sig), offset, size, cmm));
        }
        tags
    }

    fn tag_list(&self) -> &[Tag] {
        self.tags.get_or_init(|| self.parse_tags())
    }

    /// Run `edit` on the materialized tag list and mark the profile modified
    fn edit_tags<R>(&mut self, edit: impl FnOnce(&mut Vec<Tag>) -> R) -> R {
        let mut tags = match self.tags.take() {
            Some(tags) => tags,
            None => self.parse_tags(),
        };
        let out = edit(&mut tags);
        self.tags = OnceLock::from(tags);
        self.mark_modified();
        out
    }

    fn sync_header_tag(&mut self) {
        let (Some(header), Some(tags)) = (self.header.as_deref(), self.tags.get_mut()) else {
            return;
        };
        let tag = Tag::header(header, SignatureKind::Cmm.read(header));
        match tags.first_mut() {
            Some(first) if first.is_header() => *first = tag,
            _ => tags.insert(0, tag),
        }
    }

    fn visible_tags(&self) -> &[Tag] {
        let tags = self.tag_list();
        match tags.first() {
            Some(first) if first.is_header() => &tags[1..],
            _ => tags,
        }
    }

    /// The header pseudo tag
    pub fn header_tag(&self) -> Option<&Tag> {
        self.tag_list().first().filter(|tag| tag.is_header())
    }

    /// Number of tags, not counting the header
    pub fn tag_count(&self) -> usize {
        self.visible_tags().len()
    }

    /// Tags in table order, without the header
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.visible_tags().iter()
    }

    /// Tag at `pos` in table order, the header excluded
    pub fn tag_by_position(&self, pos: usize) -> Option<&Tag> {
        self.visible_tags().get(pos)
    }

    /// First tag with `signature`
    pub fn tag_by_signature(&self, signature: TagSignature) -> Option<&Tag> {
        self.visible_tags()
            .iter()
            .find(|tag| tag.signature() == signature)
    }

    /// Insert a tag at a position among the visible tags, or append it
    ///
    /// A tag with the same signature is removed first.
    pub fn add_tag(&mut self, tag: Tag, position: Option<usize>) -> Result<()> {
        if tag.is_header() {
            return Err(Error::InvalidArgument(
                "the header is not a regular tag".to_string(),
            ));
        }

        self.edit_tags(|tags| {
            tags.retain(|t| t.signature() != tag.signature());
            let skip = usize::from(tags.first().is_some_and(Tag::is_header));
            let index = position.map_or(tags.len(), |pos| (pos + skip).min(tags.len()));
            tags.insert(index, tag);
        });
        Ok(())
    }

    /// Remove the first tag with `signature`; the header cannot be removed
    pub fn remove_tag(&mut self, signature: TagSignature) -> Option<Tag> {
        if signature == TagSignature::HEADER || self.tag_by_signature(signature).is_none() {
            return None;
        }
        self.edit_tags(|tags| {
            let index = tags.iter().position(|t| t.signature() == signature)?;
            Some(tags.remove(index))
        })
    }

    // Text

    /// Best en_US text of a tag
    pub fn text(&self, signature: TagSignature) -> Option<String> {
        self.text_for_locale(signature, "en", "US")
    }

    /// Best text of a tag for a locale
    pub fn text_for_locale(
        &self,
        signature: TagSignature,
        language: &str,
        country: &str,
    ) -> Option<String> {
        let tag = self.tag_by_signature(signature)?;
        if tag.is_corrupted() {
            return None;
        }
        match tag.data() {
            TagData::Text(text) | TagData::Description(text) => Some(text.clone()),
            TagData::MultiLocalized(text) => text.best(language, country).map(str::to_string),
            _ => None,
        }
    }

    /// en_US profile description
    pub fn description(&self) -> Option<String> {
        self.text(TagSignature::DESC)
    }

    pub fn manufacturer(&self) -> Option<String> {
        self.text(TagSignature::DEVICE_MFG_DESC)
    }

    pub fn model(&self) -> Option<String> {
        self.text(TagSignature::DEVICE_MODEL_DESC)
    }

    pub fn copyright(&self) -> Option<String> {
        self.text(TagSignature::COPYRIGHT)
    }

    /// Store a text tag in the encoding of the profile version
    ///
    /// v4 and later use 'mluc'; v2 uses 'text' for the copyright and 'desc'
    /// for everything else.
    pub fn add_text(&mut self, signature: TagSignature, text: &str) -> Result<()> {
        let data = if self.version().major >= 4 {
            TagData::MultiLocalized(crate::icc::tags::MultiLocalizedText::english(text))
        } else if signature == TagSignature::COPYRIGHT {
            TagData::Text(text.to_string())
        } else {
            TagData::Description(text.to_string())
        };
        let tag = Tag::new(signature, data)
            .ok_or_else(|| Error::InvalidArgument(format!("cannot encode tag '{signature}'")))?;
        self.add_tag(tag, None)
    }

    /// Media white point
    pub fn white_point(&self) -> Option<(f64, f64, f64)> {
        self.tag_by_signature(TagSignature::MEDIA_WHITE)?.xyz()
    }

    // Identity

    /// True when the header carries a non-zero ID
    pub fn has_embedded_id(&self) -> bool {
        self.header
            .as_deref()
            .is_some_and(|h| h[PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16] != [0u8; 16])
    }

    /// The profile identity
    ///
    /// An embedded ID of an unmodified profile is trusted unless `force` is
    /// set; otherwise the MD5 ID is computed. The result is cached until
    /// the next modification; forced results bypass the cache.
    pub fn identity(&self, force: bool) -> ProfileId {
        if force {
            return self.computed_identity();
        }
        *self.identity.get_or_init(|| {
            let embedded = self
                .header
                .as_deref()
                .and_then(|h| identity::embedded_id(&h[..]));
            match embedded {
                Some(id) if !self.modified => id,
                _ => self.computed_identity(),
            }
        })
    }

    /// Compare the embedded ID with the computed one
    pub fn check_id(&self) -> IdCheck {
        let embedded = self
            .header
            .as_deref()
            .and_then(|h| identity::embedded_id(&h[..]));
        match embedded {
            None => IdCheck::Missing,
            Some(embedded) => {
                let computed = self.computed_identity();
                if embedded == computed {
                    IdCheck::Valid
                } else {
                    IdCheck::Mismatch { embedded, computed }
                }
            }
        }
    }

    /// Store the computed ID in the header and the original bytes
    pub fn repair_id(&mut self) -> ProfileId {
        let id = self.computed_identity();
        if let Some(header) = self.header.as_deref_mut() {
            identity::stamp_id(&mut header[..], id);
        }
        if let Some(raw) = self.raw.take() {
            let mut bytes = raw.to_vec();
            identity::stamp_id(&mut bytes, id);
            self.raw = Some(Arc::from(bytes));
        }
        self.sync_header_tag();
        self.identity = OnceLock::from(id);
        id
    }
}

/// Profiles are equal when their identities are equal
impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.identity(false) == other.identity(false)
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("file_name", &self.file_name)
            .field("size", &self.raw.as_ref().map(|r| r.len()))
            .field("color_space", &self.color_space())
            .field("tags", &self.tags.get().map(Vec::len))
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::TypeSignature;
    use crate::icc::tags::{DictData, MultiLocalizedText};

    /// 132 byte profile: header with magic and RGB, zero tags
    pub(crate) fn minimal_profile() -> Vec<u8> {
        let mut data = vec![0u8; MIN_PROFILE_SIZE];
        data[0..4].copy_from_slice(&(MIN_PROFILE_SIZE as u32).to_be_bytes());
        data[8] = 4;
        data[9] = 0x30;
        data[16..20].copy_from_slice(b"RGB ");
        data[36..40].copy_from_slice(b"acsp");
        data
    }

    /// Profile with a desc tag and a tag pointing past the end
    fn profile_with_broken_tag() -> Vec<u8> {
        let desc = TagData::MultiLocalized(MultiLocalizedText::english("Good"))
            .encode()
            .unwrap();
        let mut data = minimal_profile();
        data[128..132].copy_from_slice(&2u32.to_be_bytes());
        let data_start = 132 + 24;
        for (sig, offset, size) in [
            (*b"desc", data_start as u32, desc.len() as u32),
            (*b"cprt", 10_000, 40),
        ] {
            data.extend_from_slice(&sig);
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&size.to_be_bytes());
        }
        data.extend_from_slice(&desc);
        let len = data.len() as u32;
        data[0..4].copy_from_slice(&len.to_be_bytes());
        data
    }

    #[test]
    fn test_minimal_profile() {
        let data = minimal_profile();
        let profile = Profile::from_bytes(&data).unwrap();
        assert_eq!(profile.color_space(), Some(ColorSpace::Rgb));
        assert_eq!(profile.channel_count(), 3);
        assert_eq!(profile.tag_count(), 0);
        assert!(profile.header_tag().is_some());
        assert_eq!(profile.to_bytes(), data);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut data = minimal_profile();
        assert!(matches!(
            Profile::from_bytes(&data[..100]),
            Err(Error::Icc(IccError::TooSmall { .. }))
        ));

        data[36..40].copy_from_slice(b"XXXX");
        assert!(matches!(
            Profile::from_bytes(&data),
            Err(Error::Icc(IccError::InvalidSignature(_)))
        ));

        let mut data = minimal_profile();
        data[128..132].copy_from_slice(&3u32.to_be_bytes());
        assert!(matches!(
            Profile::from_bytes(&data),
            Err(Error::Icc(IccError::CorruptedData(_)))
        ));
    }

    #[test]
    fn test_version_filter() {
        let data = minimal_profile();
        let v2_only = LoadFlags {
            icc_version_2: true,
            ..LoadFlags::default()
        };
        assert!(matches!(
            Profile::from_vec(data.clone(), v2_only),
            Err(Error::VersionFiltered { found: 4 })
        ));
        assert!(Profile::from_vec(data, LoadFlags::default()).is_ok());
    }

    #[test]
    fn test_lazy_tags() {
        let profile = Profile::from_bytes(&profile_with_broken_tag()).unwrap();
        assert!(profile.tags.get().is_none());
        assert_eq!(profile.tag_count(), 2);
        assert!(profile.tags.get().is_some());
        assert_eq!(profile.tags.get().map(Vec::len), Some(3));
    }

    #[test]
    fn test_corrupted_tag_does_not_block_others() {
        let profile = Profile::from_bytes(&profile_with_broken_tag()).unwrap();
        let broken = profile.tag_by_signature(TagSignature::COPYRIGHT).unwrap();
        assert!(broken.is_corrupted());
        assert!(broken.text_payload(None, None).is_empty());
        assert_eq!(profile.copyright(), None);
        assert_eq!(profile.description().as_deref(), Some("Good"));
    }

    #[test]
    fn test_add_tag_replaces_same_signature() {
        let mut profile = Profile::from_bytes(&profile_with_broken_tag()).unwrap();
        assert!(!profile.is_modified());
        profile.add_text(TagSignature::DESC, "Better").unwrap();
        assert!(profile.is_modified());
        assert_eq!(profile.tag_count(), 2);
        assert_eq!(profile.description().as_deref(), Some("Better"));

        let dict = DictData::new(vec![("k".to_string(), "v".to_string())]);
        let meta = Tag::new(TagSignature::META, TagData::Dict(dict)).unwrap();
        profile.add_tag(meta, Some(0)).unwrap();
        assert_eq!(profile.tag_by_position(0).unwrap().signature(), TagSignature::META);
        assert!(profile.header_tag().is_some());

        let header = Tag::from_block(TagSignature::HEADER, vec![0; 8]);
        assert!(profile.add_tag(header, None).is_err());
    }

    #[test]
    fn test_remove_tag() {
        let mut profile = Profile::from_bytes(&profile_with_broken_tag()).unwrap();
        assert!(profile.remove_tag(TagSignature::TECH).is_none());
        assert!(!profile.is_modified());
        let removed = profile.remove_tag(TagSignature::COPYRIGHT).unwrap();
        assert_eq!(removed.signature(), TagSignature::COPYRIGHT);
        assert_eq!(profile.tag_count(), 1);
        assert!(profile.remove_tag(TagSignature::HEADER).is_none());
    }

    #[test]
    fn test_signature_fields() {
        let mut profile = Profile::from_color_space(ColorSpace::Cmyk);
        assert!(profile.raw_bytes().is_none());
        assert_eq!(profile.channel_count(), 4);
        assert_eq!(profile.signature(SignatureKind::Pcs), 0);
        assert!(profile.header().is_none());

        profile.set_signature(SignatureKind::Class, ProfileClass::Output.to_u32());
        assert_eq!(profile.profile_class(), Some(ProfileClass::Output));
        assert_eq!(profile.channel_names(), vec!["C", "M", "Y", "K"]);

        let empty = Profile::empty();
        assert_eq!(empty.signature(SignatureKind::ColorSpace), 0);
        assert_eq!(empty.tag_count(), 0);
        assert_eq!(empty.channel_count(), 0);
    }

    #[test]
    fn test_set_signature_updates_header_tag() {
        let mut profile = Profile::from_bytes(&minimal_profile()).unwrap();
        assert_eq!(profile.tag_count(), 0);
        profile.set_signature(SignatureKind::Creator, u32::from_be_bytes(*b"test"));
        let header_tag = profile.header_tag().unwrap();
        assert_eq!(header_tag.type_signature(), TypeSignature::HEADER);
        assert_eq!(&header_tag.block()[80..84], b"test");
    }

    #[test]
    fn test_identity_policy() {
        let mut data = minimal_profile();
        let computed = identity::compute_md5(&data);

        let profile = Profile::from_bytes(&data).unwrap();
        assert!(!profile.has_embedded_id());
        assert_eq!(profile.check_id(), IdCheck::Missing);
        assert_eq!(profile.identity(false), computed);
        assert_eq!(profile.identity(true), profile.identity(true));

        // a vendor ID is trusted unless recomputation is forced
        data[84..100].copy_from_slice(&[7; 16]);
        let vendor = Profile::from_bytes(&data).unwrap();
        assert_eq!(vendor.identity(false), ProfileId([7; 16]));
        assert_eq!(vendor.identity(true), computed);
        assert!(matches!(vendor.check_id(), IdCheck::Mismatch { .. }));
    }

    #[test]
    fn test_repair_id() {
        let mut profile = Profile::from_bytes(&minimal_profile()).unwrap();
        let id = profile.repair_id();
        assert!(!profile.is_modified());
        assert!(profile.has_embedded_id());
        assert_eq!(profile.check_id(), IdCheck::Valid);
        assert_eq!(&profile.to_bytes()[84..100], &id.0);
    }

    #[test]
    fn test_identity_resets_on_change() {
        let mut profile = Profile::from_bytes(&minimal_profile()).unwrap();
        let before = profile.identity(false);
        profile.add_text(TagSignature::DESC, "changed").unwrap();
        assert_ne!(profile.identity(false), before);
    }

    #[test]
    fn test_equality() {
        let a = Profile::from_bytes(&minimal_profile()).unwrap();
        let b = Profile::from_bytes(&minimal_profile()).unwrap();
        let c = Profile::from_bytes(&profile_with_broken_tag()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shared_copy_on_write() {
        let shared = Arc::new(Profile::from_bytes(&minimal_profile()).unwrap());
        let mut copy = Arc::clone(&shared);
        Arc::make_mut(&mut copy)
            .add_text(TagSignature::DESC, "private")
            .unwrap();
        assert_eq!(shared.tag_count(), 0);
        assert_eq!(copy.tag_count(), 1);
        assert_eq!(shared.raw_bytes(), copy.raw_bytes());
    }
}
