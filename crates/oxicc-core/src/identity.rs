//! Profile Identity
//!
//! The profile ID is the MD5 digest of the whole profile with the flags,
//! rendering intent and ID header fields set to zero (ICC.1:2022 Section
//! 7.2.18). An all zero ID field means "no ID", never a valid digest.
//!
//! Policy: an embedded non-zero ID is trusted unless the caller forces a
//! recomputation; a missing ID is always computed.

use std::fmt;

use crate::icc::{FLAGS_OFFSET, HEADER_SIZE, INTENT_OFFSET, PROFILE_ID_OFFSET};

/// 16 byte profile identity
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId(pub [u8; 16]);

impl ProfileId {
    pub const ZERO: Self = Self([0; 16]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }

    /// The ID as four big-endian words
    pub fn words(&self) -> [u32; 4] {
        let mut words = [0u32; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }

    /// Lower case hex, 32 characters
    pub fn to_hex(&self) -> String {
        self.words().iter().map(|w| format!("{w:08x}")).collect()
    }

    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 32 || !text.is_ascii() {
            return None;
        }
        let mut id = [0u8; 16];
        for (i, byte) in id.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(id))
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProfileId({})", self.to_hex())
    }
}

/// Outcome of comparing the embedded ID with the computed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCheck {
    Valid,
    Missing,
    Mismatch {
        embedded: ProfileId,
        computed: ProfileId,
    },
}

impl IdCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, IdCheck::Valid)
    }
}

/// MD5 over `data` with flags, intent and ID zeroed
pub fn compute_md5(data: &[u8]) -> ProfileId {
    if data.len() < HEADER_SIZE {
        return ProfileId(md5::compute(data).0);
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&data[..HEADER_SIZE]);
    header[FLAGS_OFFSET..FLAGS_OFFSET + 4].fill(0);
    header[INTENT_OFFSET..INTENT_OFFSET + 4].fill(0);
    header[PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16].fill(0);

    let mut context = md5::Context::new();
    context.consume(header);
    context.consume(&data[HEADER_SIZE..]);
    ProfileId(context.compute().0)
}

/// The non-zero ID stored at offset 84
pub fn embedded_id(data: &[u8]) -> Option<ProfileId> {
    let bytes = data.get(PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16)?;
    let mut id = [0u8; 16];
    id.copy_from_slice(bytes);
    let id = ProfileId(id);
    (!id.is_zero()).then_some(id)
}

/// Compare the stored ID with a fresh digest
pub fn check_id(data: &[u8]) -> IdCheck {
    match embedded_id(data) {
        None => IdCheck::Missing,
        Some(embedded) => {
            let computed = compute_md5(data);
            if computed == embedded {
                IdCheck::Valid
            } else {
                IdCheck::Mismatch { embedded, computed }
            }
        }
    }
}

/// Write `id` into the header of `data`
pub(crate) fn stamp_id(data: &mut [u8], id: ProfileId) {
    if let Some(field) = data.get_mut(PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16) {
        field.copy_from_slice(&id.0);
    }
}
