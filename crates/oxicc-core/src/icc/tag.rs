//! Tag Records
//!
//! A [`Tag`] is one entry of a profile's tag list: the use signature from
//! the tag table, the raw block copied out of the container and the decoded
//! [`TagData`]. Tags decoded from a container never fail; a tag whose block
//! lies outside the container or does not decode is marked
//! [`TagStatus::Corrupted`] and the rest of the profile stays usable.

use super::header::HEADER_SIZE;
use super::tags::TagData;
use super::types::{TagSignature, TypeSignature, fourcc, read_u32};

/// CMM id recorded as the module that decoded a tag
pub const DECODER_CMM: u32 = u32::from_be_bytes(*b"oxic");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStatus {
    Ok,
    Corrupted,
}

/// The three 4 character CMM identifiers attached to a tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CmmIds {
    /// Preferred CMM from the profile header
    pub profile: u32,
    /// Module that processed the tag last
    pub last: u32,
    /// Module required to handle the tag, 0 for any
    pub required: u32,
}

impl CmmIds {
    pub fn profile_name(&self) -> String {
        fourcc(self.profile)
    }

    pub fn last_name(&self) -> String {
        fourcc(self.last)
    }
}

/// One ICC tag
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    signature: TagSignature,
    type_signature: TypeSignature,
    status: TagStatus,
    block: Vec<u8>,
    offset: Option<u32>,
    declared_size: u32,
    size_check: usize,
    cmm: CmmIds,
    data: TagData,
}

impl Tag {
    /// Decode one tag table entry of `container`
    ///
    /// The block is copied verbatim; `offset + declared_size` beyond the end
    /// of the container gives a corrupted tag with an empty block.
    pub fn decode(
        container: &[u8],
        signature: TagSignature,
        offset: u32,
        declared_size: u32,
        profile_cmm: u32,
    ) -> Self {
        let cmm = CmmIds {
            profile: profile_cmm,
            last: DECODER_CMM,
            required: 0,
        };
        let start = offset as usize;
        let block = start
            .checked_add(declared_size as usize)
            .and_then(|end| container.get(start..end));

        let Some(block) = block else {
            log::warn!(
                "tag '{signature}' at offset {offset} with size {declared_size} exceeds profile size {}",
                container.len()
            );
            return Self {
                signature,
                type_signature: TypeSignature(0),
                status: TagStatus::Corrupted,
                block: Vec::new(),
                offset: Some(offset),
                declared_size,
                size_check: 0,
                cmm,
                data: TagData::Unsupported(TypeSignature(0)),
            };
        };

        let mut tag = Self::from_block(signature, block.to_vec());
        tag.offset = Some(offset);
        tag.cmm = cmm;
        tag
    }

    /// Build a tag from a caller supplied raw block
    pub fn from_block(signature: TagSignature, block: Vec<u8>) -> Self {
        let type_signature = TypeSignature(read_u32(&block, 0).unwrap_or_default());
        let declared_size = block.len() as u32;

        let (status, data, size_check) = match TagData::parse(&block) {
            Ok((data, used)) => (TagStatus::Ok, data, used),
            Err(err) => {
                log::warn!("tag '{signature}' of type '{type_signature}': {err}");
                (TagStatus::Corrupted, TagData::Unsupported(type_signature), 0)
            }
        };

        Self {
            signature,
            type_signature,
            status,
            block,
            offset: None,
            declared_size,
            size_check,
            cmm: CmmIds {
                last: DECODER_CMM,
                ..CmmIds::default()
            },
            data,
        }
    }

    /// Build a tag from decoded data
    ///
    /// Opaque data has no encoding and gives `None`.
    pub fn new(signature: TagSignature, data: TagData) -> Option<Self> {
        let block = data.encode()?;
        Some(Self {
            signature,
            type_signature: data.type_signature(),
            status: TagStatus::Ok,
            declared_size: block.len() as u32,
            size_check: block.len(),
            block,
            offset: None,
            cmm: CmmIds::default(),
            data,
        })
    }

    /// Pseudo tag holding the 128 byte header, always first in a tag list
    pub(crate) fn header(header: &[u8; HEADER_SIZE], profile_cmm: u32) -> Self {
        Self {
            signature: TagSignature::HEADER,
            type_signature: TypeSignature::HEADER,
            status: TagStatus::Ok,
            block: header.to_vec(),
            offset: Some(0),
            declared_size: HEADER_SIZE as u32,
            size_check: HEADER_SIZE,
            cmm: CmmIds {
                profile: profile_cmm,
                last: DECODER_CMM,
                required: 0,
            },
            data: TagData::Unsupported(TypeSignature::HEADER),
        }
    }

    pub fn signature(&self) -> TagSignature {
        self.signature
    }

    pub fn type_signature(&self) -> TypeSignature {
        self.type_signature
    }

    pub fn status(&self) -> TagStatus {
        self.status
    }

    pub fn is_corrupted(&self) -> bool {
        self.status == TagStatus::Corrupted
    }

    pub fn is_header(&self) -> bool {
        self.signature == TagSignature::HEADER
    }

    /// The raw tag block
    pub fn block(&self) -> &[u8] {
        &self.block
    }

    /// Offset in the container the tag was read from
    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    /// Size from the tag table
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// Bytes actually used by the type decoder
    pub fn size_check(&self) -> usize {
        self.size_check
    }

    pub fn cmm(&self) -> &CmmIds {
        &self.cmm
    }

    pub fn data(&self) -> &TagData {
        &self.data
    }

    /// Strings of the tag, empty for corrupted or opaque tags
    pub fn text_payload(&self, language: Option<&str>, country: Option<&str>) -> Vec<String> {
        if self.is_corrupted() {
            return Vec::new();
        }
        self.data.text_payload(language, country)
    }

    /// First value of an XYZ tag
    pub fn xyz(&self) -> Option<(f64, f64, f64)> {
        self.data.as_xyz()?.triple()
    }
}
