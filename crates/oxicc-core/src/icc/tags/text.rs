//! Text Tag Types
//!
//! ICC profiles can contain text in several formats:
//! - text: Simple ASCII text
//! - desc: Profile description (v2 format)
//! - mluc: Multi-localized Unicode (v4 format)
//!
//! See ICC.1:2022 Sections 10.24 (text), 10.14 (desc), 10.15 (mluc)
//!
//! Every parser takes the whole tag block, type signature included, because
//! mluc string offsets are relative to the start of the tag.

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, read_u32, write_u32};

/// Bytes that follow the ASCII part of a 'desc' tag: Unicode language code
/// and count, ScriptCode code and count, 67 bytes of ScriptCode text
const DESC_TRAILER_SIZE: usize = 4 + 4 + 2 + 1 + 67;

/// Size of one mluc record: language, country, length, offset
const MLUC_RECORD_SIZE: usize = 12;

/// Parse 'text' type (null terminated ASCII), returns text and bytes used
pub fn parse_text(data: &[u8]) -> Result<(String, usize), IccError> {
    let body = data
        .get(8..)
        .ok_or_else(|| IccError::CorruptedData("text tag too small".to_string()))?;
    let text = ascii_until_nul(body);
    let used = 8 + (text.len() + 1).min(body.len());
    Ok((text, used))
}

/// Encode a 'text' type block
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(9 + text.len());
    out.extend_from_slice(&TypeSignature::TEXT.0.to_be_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend(text.bytes().map(ascii_or_placeholder));
    out.push(0);
    out
}

/// Parse 'desc' type (v2 profile description), returns text and bytes used
pub fn parse_desc(data: &[u8]) -> Result<(String, usize), IccError> {
    let ascii_count = read_u32(data, 8)
        .ok_or_else(|| IccError::CorruptedData("Description tag too small".to_string()))?
        as usize;

    let ascii = data
        .get(12..12usize.saturating_add(ascii_count))
        .ok_or_else(|| IccError::CorruptedData("Description ASCII data truncated".to_string()))?;

    // The Unicode and ScriptCode parts are rarely filled in and often broken
    let used = (12 + ascii_count + DESC_TRAILER_SIZE).min(data.len());
    Ok((ascii_until_nul(ascii), used))
}

/// Encode a 'desc' block with empty Unicode and ScriptCode parts
pub fn encode_desc(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + text.len() + 1 + DESC_TRAILER_SIZE);
    out.extend_from_slice(&TypeSignature::DESC.0.to_be_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(text.len() as u32 + 1).to_be_bytes());
    out.extend(text.bytes().map(ascii_or_placeholder));
    out.push(0);
    out.extend_from_slice(&[0; DESC_TRAILER_SIZE]);
    out
}

/// One string of a multi-localized Unicode tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    /// ISO 639-1 language code, e.g. "en"
    pub language: String,
    /// ISO 3166-1 country code, e.g. "US"
    pub country: String,
    pub text: String,
}

impl LocalizedString {
    pub fn new(language: &str, country: &str, text: &str) -> Self {
        Self {
            language: language.to_string(),
            country: country.to_string(),
            text: text.to_string(),
        }
    }

    /// Locale label such as "en_US", or just "en" without a country
    pub fn locale(&self) -> String {
        if self.country.is_empty() {
            self.language.clone()
        } else {
            format!("{}_{}", self.language, self.country)
        }
    }

    /// "en_US:text" form used when listing several localizations
    pub fn labeled(&self) -> String {
        if self.language.is_empty() {
            self.text.clone()
        } else {
            format!("{}:{}", self.locale(), self.text)
        }
    }
}

/// Multi-localized Unicode text ('mluc')
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiLocalizedText {
    pub entries: Vec<LocalizedString>,
}

impl MultiLocalizedText {
    pub fn new(entries: Vec<LocalizedString>) -> Self {
        Self { entries }
    }

    /// A single en_US string
    pub fn english(text: &str) -> Self {
        Self::new(vec![LocalizedString::new("en", "US", text)])
    }

    /// Parse 'mluc' type, returns text and bytes used
    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let (Some(record_count), Some(record_size)) = (read_u32(data, 8), read_u32(data, 12))
        else {
            return Err(IccError::CorruptedData("mluc tag too small".to_string()));
        };
        let record_count = record_count as usize;
        let record_size = record_size as usize;

        if record_size < MLUC_RECORD_SIZE {
            return Err(IccError::CorruptedData(
                "mluc record size too small".to_string(),
            ));
        }

        let mut entries = Vec::new();
        let mut used = 16;

        for i in 0..record_count {
            let record_offset = 16 + i * record_size;
            let Some(record) = data.get(record_offset..record_offset + MLUC_RECORD_SIZE) else {
                break;
            };
            used = used.max(record_offset + MLUC_RECORD_SIZE);

            let language = ascii_until_nul(&record[0..2]);
            let country = ascii_until_nul(&record[2..4]);
            let str_len = read_u32(record, 4).unwrap_or_default() as usize;
            let str_offset = read_u32(record, 8).unwrap_or_default() as usize;

            let Some(utf16) = data.get(str_offset..str_offset.saturating_add(str_len)) else {
                log::debug!("mluc record {i} points outside of the tag");
                continue;
            };
            used = used.max(str_offset + str_len);

            if let Some(text) = decode_utf16be(utf16) {
                entries.push(LocalizedString {
                    language,
                    country,
                    text,
                });
            }
        }

        Ok((Self { entries }, used))
    }

    /// Encode as 'mluc' block, strings follow the records without padding
    pub fn encode(&self) -> Vec<u8> {
        let header_len = 16 + self.entries.len() * MLUC_RECORD_SIZE;
        let strings: Vec<Vec<u8>> = self
            .entries
            .iter()
            .map(|e| encode_utf16be(&e.text))
            .collect();
        let total = header_len + strings.iter().map(Vec::len).sum::<usize>();

        let mut out = vec![0u8; header_len];
        write_u32(&mut out, 0, TypeSignature::MLUC.0);
        write_u32(&mut out, 8, self.entries.len() as u32);
        write_u32(&mut out, 12, MLUC_RECORD_SIZE as u32);
        out.reserve(total - header_len);

        for (i, (entry, utf16)) in self.entries.iter().zip(&strings).enumerate() {
            let record = 16 + i * MLUC_RECORD_SIZE;
            out[record..record + 2].copy_from_slice(&code2(&entry.language));
            out[record + 2..record + 4].copy_from_slice(&code2(&entry.country));
            let offset = out.len() as u32;
            write_u32(&mut out, record + 4, utf16.len() as u32);
            write_u32(&mut out, record + 8, offset);
            out.extend_from_slice(utf16);
        }
        out
    }

    /// Select strings for a locale filter
    ///
    /// Without any filter every entry is returned as "lang_CC:text". With a
    /// filter, entries matching language and country, then language only
    /// (no country given), then country only (no language given) are
    /// returned. When nothing matches, English is used, else the first entry.
    pub fn select(&self, language: Option<&str>, country: Option<&str>) -> Vec<String> {
        if language.is_none() && country.is_none() {
            return self.entries.iter().map(LocalizedString::labeled).collect();
        }

        let matches: Vec<String> = self
            .entries
            .iter()
            .filter(|e| match (language, country) {
                (Some(l), Some(c)) => e.language == l && e.country == c,
                (Some(l), None) => e.language == l,
                (None, Some(c)) => e.country == c,
                (None, None) => false,
            })
            .map(LocalizedString::labeled)
            .collect();
        if !matches.is_empty() {
            return matches;
        }

        self.entries
            .iter()
            .find(|e| e.language == "en")
            .or_else(|| self.entries.first())
            .map(|e| vec![e.labeled()])
            .unwrap_or_default()
    }

    /// Best single string for a locale, without the locale label
    pub fn best(&self, language: &str, country: &str) -> Option<&str> {
        let exact = |e: &&LocalizedString| e.language == language && e.country == country;
        let by_language = |e: &&LocalizedString| e.language == language;
        let by_country = |e: &&LocalizedString| !country.is_empty() && e.country == country;
        let english = |e: &&LocalizedString| e.language == "en";

        self.entries
            .iter()
            .find(exact)
            .or_else(|| self.entries.iter().find(by_language))
            .or_else(|| self.entries.iter().find(by_country))
            .or_else(|| self.entries.iter().find(english))
            .or_else(|| self.entries.first())
            .map(|e| e.text.as_str())
    }
}

/// Decode UTF-16BE bytes to String, stopping at the first NUL
pub(crate) fn decode_utf16be(data: &[u8]) -> Option<String> {
    let utf16: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .take_while(|&c| c != 0)
        .collect();

    String::from_utf16(&utf16).ok()
}

pub(crate) fn encode_utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

fn ascii_until_nul(data: &[u8]) -> String {
    data.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

fn ascii_or_placeholder(b: u8) -> u8 {
    if b.is_ascii() { b } else { b'?' }
}

fn code2(code: &str) -> [u8; 2] {
    let mut out = [0u8; 2];
    for (dst, src) in out.iter_mut().zip(code.bytes()) {
        *dst = src;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_locales() -> MultiLocalizedText {
        MultiLocalizedText::new(vec![
            LocalizedString::new("de", "DE", "Licht"),
            LocalizedString::new("en", "US", "Light"),
        ])
    }

    #[test]
    fn test_parse_text() {
        let data = encode_text("Hello, World!");
        let (text, used) = parse_text(&data).unwrap();
        assert_eq!(text, "Hello, World!");
        assert_eq!(used, data.len());
    }

    #[test]
    fn test_parse_desc() {
        // Count = 6 (including null)
        let mut data = b"desc\0\0\0\0".to_vec();
        data.extend_from_slice(&[0, 0, 0, 6]);
        data.extend_from_slice(b"sRGB\0\0");

        let (text, used) = parse_desc(&data).unwrap();
        assert_eq!(text, "sRGB");
        assert_eq!(used, data.len());
    }

    #[test]
    fn test_desc_encode() {
        let data = encode_desc("Display");
        let (text, used) = parse_desc(&data).unwrap();
        assert_eq!(text, "Display");
        assert_eq!(used, data.len());
        assert_eq!(data.len(), 12 + 8 + DESC_TRAILER_SIZE);
    }

    #[test]
    fn test_desc_truncated() {
        let mut data = b"desc\0\0\0\0".to_vec();
        data.extend_from_slice(&[0, 0, 1, 0]);
        data.extend_from_slice(b"short");
        assert!(parse_desc(&data).is_err());
    }

    #[test]
    fn test_parse_mluc() {
        // 1 record, 12 bytes each
        let mut data = b"mluc\0\0\0\0".to_vec();
        data.extend_from_slice(&[
            0, 0, 0, 1, // record count = 1
            0, 0, 0, 12, // record size = 12
        ]);

        // Record: en-US
        data.extend_from_slice(&[
            b'e', b'n', // language
            b'U', b'S', // country
            0, 0, 0, 8, // string length = 8 bytes (4 UTF-16 chars)
            0, 0, 0, 28, // string offset = 28 (after this record)
        ]);

        // UTF-16BE string "Test"
        data.extend_from_slice(&[0x00, b'T', 0x00, b'e', 0x00, b's', 0x00, b't']);

        let (text, used) = MultiLocalizedText::parse(&data).unwrap();
        assert_eq!(text.entries, vec![LocalizedString::new("en", "US", "Test")]);
        assert_eq!(used, data.len());
        assert_eq!(text.encode(), data);
    }

    #[test]
    fn test_mluc_encode_offsets() {
        let data = two_locales().encode();
        // two 12 byte records, "Licht" then "Light" as 10 byte strings
        assert_eq!(read_u32(&data, 16 + 4), Some(10));
        assert_eq!(read_u32(&data, 16 + 8), Some(40));
        assert_eq!(read_u32(&data, 28 + 8), Some(50));
        assert_eq!(data.len(), 60);

        let (text, used) = MultiLocalizedText::parse(&data).unwrap();
        assert_eq!(text, two_locales());
        assert_eq!(used, data.len());
    }

    #[test]
    fn test_mluc_bad_offset_skipped() {
        let mut data = MultiLocalizedText::english("Test").encode();
        write_u32(&mut data, 16 + 8, 4000);
        let (text, _) = MultiLocalizedText::parse(&data).unwrap();
        assert!(text.entries.is_empty());
    }

    #[test]
    fn test_mluc_select() {
        let text = two_locales();
        assert_eq!(text.select(None, None), vec!["de_DE:Licht", "en_US:Light"]);
        assert_eq!(text.select(Some("de"), Some("DE")), vec!["de_DE:Licht"]);
        assert_eq!(text.select(Some("en"), None), vec!["en_US:Light"]);
        assert_eq!(text.select(None, Some("DE")), vec!["de_DE:Licht"]);
        // missing locale falls back to English
        assert_eq!(text.select(Some("fr"), Some("FR")), vec!["en_US:Light"]);

        let german_only = MultiLocalizedText::new(vec![LocalizedString::new("de", "DE", "Licht")]);
        assert_eq!(german_only.select(Some("fr"), None), vec!["de_DE:Licht"]);
    }

    #[test]
    fn test_mluc_best() {
        let text = two_locales();
        assert_eq!(text.best("de", "AT"), Some("Licht"));
        assert_eq!(text.best("fr", "FR"), Some("Light"));
        assert_eq!(MultiLocalizedText::default().best("en", "US"), None);
    }

    #[test]
    fn test_decode_utf16be() {
        // "Hello" in UTF-16BE
        let data = [0x00, 0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F];
        assert_eq!(decode_utf16be(&data).unwrap(), "Hello");
        assert_eq!(encode_utf16be("Hello"), data);
        // trailing NUL units are dropped
        assert_eq!(decode_utf16be(&[0, b'A', 0, 0, 0, 0]).unwrap(), "A");
    }
}
