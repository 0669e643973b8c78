//! Dictionary Tag Type
//!
//! 'dict' holds ordered name/value string pairs, used by the 'meta' tag to
//! embed device properties into a profile. See ICC.1:2022 Section 10.9.
//!
//! Layout: type signature, reserved, record count, record size (16, 24 or
//! 32), then the records `{name offset, name size, value offset, value size}`
//! followed by the UTF-16BE strings. Offsets are relative to the tag start.
//! Records of 24 or 32 bytes also point to localized display names, which
//! are not read here.

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, pad4, read_u32, write_u32};

use super::text::{decode_utf16be, encode_utf16be};

/// Record size written by [`DictData::encode`]
pub const DICT_RECORD_SIZE: usize = 16;

/// Ordered name/value pairs of a 'dict' tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictData {
    pub entries: Vec<(String, String)>,
}

impl DictData {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Value of the first entry named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Flat name, value, name, value, ... sequence
    pub fn to_flat(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(k, v)| [k.clone(), v.clone()])
            .collect()
    }

    /// Parse a 'dict' block, returns the pairs and the bytes used
    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let (Some(count), Some(record_size)) = (read_u32(data, 8), read_u32(data, 12)) else {
            return Err(IccError::CorruptedData("dict tag too small".to_string()));
        };
        let count = count as usize;
        let record_size = record_size as usize;

        if !matches!(record_size, 16 | 24 | 32) {
            return Err(IccError::CorruptedData(format!(
                "dict record size {record_size} not one of 16, 24, 32"
            )));
        }

        let table_end = count
            .checked_mul(record_size)
            .and_then(|n| n.checked_add(16))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                IccError::CorruptedData(format!("dict with {count} records is truncated"))
            })?;

        let mut entries = Vec::with_capacity(count);
        let mut used = table_end;

        for i in 0..count {
            let record = 16 + i * record_size;
            let field = |n: usize| read_u32(data, record + n * 4).unwrap_or_default() as usize;
            let (name_offset, name_size) = (field(0), field(1));
            let (value_offset, value_size) = (field(2), field(3));

            let name = read_string(data, name_offset, name_size).ok_or_else(|| {
                IccError::CorruptedData(format!("dict record {i} name out of bounds"))
            })?;
            // a zero value offset stands for an empty value
            let value = if value_offset == 0 {
                String::new()
            } else {
                read_string(data, value_offset, value_size).ok_or_else(|| {
                    IccError::CorruptedData(format!("dict record {i} value out of bounds"))
                })?
            };

            used = used
                .max(pad4(name_offset + name_size))
                .max(pad4(value_offset + value_size));
            entries.push((name, value));
        }

        Ok((Self { entries }, used.min(data.len())))
    }

    /// Encode as 'dict' block
    ///
    /// Each string is padded to a four byte boundary; the size fields carry
    /// the unpadded UTF-16 length.
    pub fn encode(&self) -> Vec<u8> {
        let table_end = 16 + self.entries.len() * DICT_RECORD_SIZE;
        let mut out = vec![0u8; table_end];
        write_u32(&mut out, 0, TypeSignature::DICT.0);
        write_u32(&mut out, 8, self.entries.len() as u32);
        write_u32(&mut out, 12, DICT_RECORD_SIZE as u32);

        for (i, (name, value)) in self.entries.iter().enumerate() {
            let record = 16 + i * DICT_RECORD_SIZE;
            for (n, text) in [name, value].into_iter().enumerate() {
                let utf16 = encode_utf16be(text);
                let offset = out.len();
                write_u32(&mut out, record + n * 8, offset as u32);
                write_u32(&mut out, record + n * 8 + 4, utf16.len() as u32);
                out.extend_from_slice(&utf16);
                out.resize(pad4(out.len()), 0);
            }
        }
        out
    }
}

fn read_string(data: &[u8], offset: usize, size: usize) -> Option<String> {
    let bytes = data.get(offset..offset.checked_add(size)?)?;
    decode_utf16be(bytes)
}
