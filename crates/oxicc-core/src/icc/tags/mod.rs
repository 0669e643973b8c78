//! ICC Profile Tag Types
//!
//! Tags contain the actual profile data. Each tag block starts with:
//! - A 4-byte type signature identifying the data format
//! - 4 reserved bytes
//! - Type-specific data
//!
//! Only the types needed for profile metadata and device matching are
//! decoded; everything else stays an opaque block. See ICC.1:2022 Section 10.

mod dict;
mod sequence;
mod text;
mod xyz;

pub use dict::{DICT_RECORD_SIZE, DictData};
pub use sequence::{ProfileSequence, SequenceEntry};
pub use text::{LocalizedString, MultiLocalizedText};
pub use xyz::{Sf32Data, XyzTagData};

use super::error::IccError;
use super::types::{TypeSignature, fourcc, read_u32};

/// Decoded tag data
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    /// 'text' ASCII text
    Text(String),
    /// 'desc' v2 profile description
    Description(String),
    /// 'mluc' multi-localized Unicode
    MultiLocalized(MultiLocalizedText),
    /// 'dict' name/value pairs
    Dict(DictData),
    /// 'XYZ ' values (colorants, white point)
    Xyz(XyzTagData),
    /// 'sf32' numbers (chromatic adaptation matrix)
    Sf32(Sf32Data),
    /// 'sig ' a single signature (technology tag)
    Signature(u32),
    /// 'psid' device link source chain
    ProfileSequence(ProfileSequence),
    /// Any other type, kept only as the raw block
    Unsupported(TypeSignature),
}

impl TagData {
    /// Decode a whole tag block, returns the data and the bytes consumed
    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let type_sig = read_u32(data, 0)
            .map(TypeSignature)
            .ok_or_else(|| IccError::CorruptedData("Tag data too small for header".to_string()))?;

        let decoded = match type_sig {
            TypeSignature::TEXT => {
                let (text, used) = text::parse_text(data)?;
                (TagData::Text(text), used)
            }
            TypeSignature::DESC => {
                let (text, used) = text::parse_desc(data)?;
                (TagData::Description(text), used)
            }
            TypeSignature::MLUC => {
                let (text, used) = MultiLocalizedText::parse(data)?;
                (TagData::MultiLocalized(text), used)
            }
            TypeSignature::DICT => {
                let (dict, used) = DictData::parse(data)?;
                (TagData::Dict(dict), used)
            }
            TypeSignature::XYZ => {
                let (xyz, used) = XyzTagData::parse(data)?;
                (TagData::Xyz(xyz), used)
            }
            TypeSignature::SF32 => {
                let (sf32, used) = Sf32Data::parse(data)?;
                (TagData::Sf32(sf32), used)
            }
            TypeSignature::SIG => {
                let sig = read_u32(data, 8).ok_or_else(|| {
                    IccError::CorruptedData("signature tag too small".to_string())
                })?;
                (TagData::Signature(sig), 12)
            }
            TypeSignature::PSID => {
                let (sequence, used) = ProfileSequence::parse(data)?;
                (TagData::ProfileSequence(sequence), used)
            }
            other => (TagData::Unsupported(other), data.len()),
        };

        Ok(decoded)
    }

    /// Encode to a tag block, `None` for opaque types
    pub fn encode(&self) -> Option<Vec<u8>> {
        let block = match self {
            TagData::Text(text) => text::encode_text(text),
            TagData::Description(text) => text::encode_desc(text),
            TagData::MultiLocalized(text) => text.encode(),
            TagData::Dict(dict) => dict.encode(),
            TagData::Xyz(xyz) => xyz.encode(),
            TagData::Sf32(sf32) => sf32.encode(),
            TagData::Signature(sig) => {
                let mut out = TypeSignature::SIG.0.to_be_bytes().to_vec();
                out.extend_from_slice(&[0; 4]);
                out.extend_from_slice(&sig.to_be_bytes());
                out
            }
            TagData::ProfileSequence(sequence) => sequence.encode(),
            TagData::Unsupported(_) => return None,
        };
        Some(block)
    }

    pub fn type_signature(&self) -> TypeSignature {
        match self {
            TagData::Text(_) => TypeSignature::TEXT,
            TagData::Description(_) => TypeSignature::DESC,
            TagData::MultiLocalized(_) => TypeSignature::MLUC,
            TagData::Dict(_) => TypeSignature::DICT,
            TagData::Xyz(_) => TypeSignature::XYZ,
            TagData::Sf32(_) => TypeSignature::SF32,
            TagData::Signature(_) => TypeSignature::SIG,
            TagData::ProfileSequence(_) => TypeSignature::PSID,
            TagData::Unsupported(sig) => *sig,
        }
    }

    /// Text form of the tag
    ///
    /// 'text' and 'desc' give one string, 'mluc' is filtered by locale (see
    /// [`MultiLocalizedText::select`]), 'dict' gives name, value, name, ...
    /// Numeric and opaque types give nothing.
    pub fn text_payload(&self, language: Option<&str>, country: Option<&str>) -> Vec<String> {
        match self {
            TagData::Text(text) | TagData::Description(text) => vec![text.clone()],
            TagData::MultiLocalized(text) => text.select(language, country),
            TagData::Dict(dict) => dict.to_flat(),
            TagData::Signature(sig) => vec![fourcc(*sig)],
            TagData::ProfileSequence(sequence) => sequence.to_flat(),
            TagData::Xyz(_) | TagData::Sf32(_) | TagData::Unsupported(_) => Vec::new(),
        }
    }

    pub fn as_xyz(&self) -> Option<&XyzTagData> {
        match self {
            TagData::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictData> {
        match self {
            TagData::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&ProfileSequence> {
        match self {
            TagData::ProfileSequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}
