//! Profile Sequence Identifier Type
//!
//! 'psid' lists the profiles a device link was built from: per entry a 16
//! byte profile ID and an 'mluc' description. See ICC.1:2022 Section 10.19.

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, pad4, read_u32, write_u32};

use super::text::{MultiLocalizedText, parse_desc};

/// One profile of a device link chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    pub profile_id: [u8; 16],
    pub description: MultiLocalizedText,
}

impl SequenceEntry {
    /// Lower case hex form of the ID
    pub fn id_hex(&self) -> String {
        self.profile_id.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSequence {
    pub entries: Vec<SequenceEntry>,
}

impl ProfileSequence {
    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let count = read_u32(data, 8)
            .ok_or_else(|| IccError::CorruptedData("psid tag too small".to_string()))?
            as usize;

        let mut entries = Vec::new();
        let mut used = 12;

        for i in 0..count {
            let (Some(offset), Some(size)) =
                (read_u32(data, 12 + i * 8), read_u32(data, 16 + i * 8))
            else {
                return Err(IccError::CorruptedData(format!(
                    "psid position table truncated at entry {i}"
                )));
            };
            let (offset, size) = (offset as usize, size as usize);
            used = used.max(20 + i * 8);

            let element = data
                .get(offset..offset.saturating_add(size))
                .filter(|e| e.len() >= 24)
                .ok_or_else(|| {
                    IccError::CorruptedData(format!("psid entry {i} out of bounds"))
                })?;

            let mut profile_id = [0u8; 16];
            profile_id.copy_from_slice(&element[..16]);

            let text = &element[16..];
            let description = match read_u32(text, 0).map(TypeSignature) {
                Some(TypeSignature::MLUC) => MultiLocalizedText::parse(text)?.0,
                Some(TypeSignature::DESC) => {
                    MultiLocalizedText::english(&parse_desc(text)?.0)
                }
                _ => MultiLocalizedText::default(),
            };

            used = used.max(offset + size);
            entries.push(SequenceEntry {
                profile_id,
                description,
            });
        }

        Ok((Self { entries }, used))
    }

    pub fn encode(&self) -> Vec<u8> {
        let table_end = 12 + self.entries.len() * 8;
        let mut out = vec![0u8; table_end];
        write_u32(&mut out, 0, TypeSignature::PSID.0);
        write_u32(&mut out, 8, self.entries.len() as u32);

        for (i, entry) in self.entries.iter().enumerate() {
            out.resize(pad4(out.len()), 0);
            let offset = out.len();
            out.extend_from_slice(&entry.profile_id);
            out.extend_from_slice(&entry.description.encode());
            let size = out.len() - offset;
            write_u32(&mut out, 12 + i * 8, offset as u32);
            write_u32(&mut out, 16 + i * 8, size as u32);
        }
        out
    }

    /// Flat text form: hex ID then description for each entry
    pub fn to_flat(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| {
                let description = e.description.best("en", "US").unwrap_or_default();
                [e.id_hex(), description.to_string()]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_roundtrip() {
        let sequence = ProfileSequence {
            entries: vec![
                SequenceEntry {
                    profile_id: [0xab; 16],
                    description: MultiLocalizedText::english("Input"),
                },
                SequenceEntry {
                    profile_id: [0x01; 16],
                    description: MultiLocalizedText::english("Output"),
                },
            ],
        };
        let data = sequence.encode();
        let (parsed, used) = ProfileSequence::parse(&data).unwrap();
        assert_eq!(parsed, sequence);
        assert_eq!(used, data.len());
        assert_eq!(
            parsed.to_flat(),
            vec!["abababababababababababababababab", "Input", "01010101010101010101010101010101", "Output"]
        );
    }

    #[test]
    fn test_sequence_position_table() {
        let description = MultiLocalizedText::english("Link");
        let entry_len = 16 + description.encode().len();
        let data = ProfileSequence {
            entries: vec![
                SequenceEntry {
                    profile_id: [1; 16],
                    description: description.clone(),
                },
                SequenceEntry {
                    profile_id: [2; 16],
                    description,
                },
            ],
        }
        .encode();

        assert_eq!(read_u32(&data, 12), Some(28));
        assert_eq!(read_u32(&data, 16), Some(entry_len as u32));
        assert_eq!(read_u32(&data, 20), Some(pad4(28 + entry_len) as u32));
        assert_eq!(read_u32(&data, 24), Some(entry_len as u32));
        assert_eq!(data.len(), pad4(28 + entry_len) + entry_len);
    }

    #[test]
    fn test_sequence_truncated() {
        let mut data = ProfileSequence {
            entries: vec![SequenceEntry {
                profile_id: [0; 16],
                description: MultiLocalizedText::english("x"),
            }],
        }
        .encode();
        write_u32(&mut data, 16, 4000);
        assert!(ProfileSequence::parse(&data).is_err());
    }
}
