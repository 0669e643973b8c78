//! Writing profiles back to bytes

use std::fs;
use std::path::Path;

use super::Profile;
use crate::Result;
use crate::icc::{
    HEADER_SIZE, MIN_PROFILE_SIZE, PROFILE_ID_OFFSET, PROFILE_SIGNATURE, ProfileVersion,
    SignatureKind, Tag, pad4, write_u32,
};
use crate::identity::{self, ProfileId};

const fn host_platform() -> u32 {
    if cfg!(target_os = "macos") {
        u32::from_be_bytes(*b"APPL")
    } else if cfg!(windows) {
        u32::from_be_bytes(*b"MSFT")
    } else {
        u32::from_be_bytes(*b"*nix")
    }
}

impl Profile {
    /// Serialize the profile
    ///
    /// An unmodified profile returns its original bytes. Otherwise the
    /// header and tag table are rebuilt, every tag block is written 4 byte
    /// aligned and the MD5 ID is stamped into the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        if let (false, Some(raw)) = (self.modified, self.raw.as_deref()) {
            return raw.to_vec();
        }

        let mut data = self.serialize_tags();
        let id = identity::compute_md5(&data);
        identity::stamp_id(&mut data, id);
        data
    }

    /// Header and tags without ID
    pub(crate) fn serialize_tags(&self) -> Vec<u8> {
        let tags: Vec<&Tag> = self
            .tags()
            .filter(|tag| {
                let empty = tag.block().is_empty();
                if empty {
                    log::warn!("dropping tag '{}' without data", tag.signature());
                }
                !empty
            })
            .collect();

        let table_end = MIN_PROFILE_SIZE + tags.len() * 12;
        let data_len: usize = tags.iter().map(|tag| pad4(tag.block().len())).sum();
        let mut data = vec![0u8; table_end + data_len];

        match self.header.as_deref() {
            Some(header) => data[..HEADER_SIZE].copy_from_slice(header),
            None => log::debug!("serializing profile without header"),
        }
        data[PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16].fill(0);
        SignatureKind::Magic.write(&mut data, PROFILE_SIGNATURE);
        if SignatureKind::Version.read(&data) == 0 {
            SignatureKind::Version.write(&mut data, ProfileVersion::V4_3.to_u32());
        }
        SignatureKind::Platform.write(&mut data, host_platform());

        write_u32(&mut data, HEADER_SIZE, tags.len() as u32);
        let mut offset = table_end;
        for (i, tag) in tags.iter().enumerate() {
            let entry = MIN_PROFILE_SIZE + i * 12;
            let block = tag.block();
            write_u32(&mut data, entry, tag.signature().0);
            write_u32(&mut data, entry + 4, offset as u32);
            write_u32(&mut data, entry + 8, block.len() as u32);
            data[offset..offset + block.len()].copy_from_slice(block);
            offset += pad4(block.len());
        }

        let len = data.len() as u32;
        SignatureKind::Size.write(&mut data, len);
        data
    }

    /// MD5 ID of the current content
    pub(crate) fn computed_identity(&self) -> ProfileId {
        match (self.modified, self.raw.as_deref()) {
            (false, Some(raw)) => identity::compute_md5(raw),
            _ => identity::compute_md5(&self.serialize_tags()),
        }
    }

    /// Serialize into a file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}
