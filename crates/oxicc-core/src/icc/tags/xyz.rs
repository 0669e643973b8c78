//! XYZ and s15Fixed16 Array Tag Types
//!
//! The XYZType contains an array of XYZ values. Used for colorant tags,
//! white point, black point, etc. 'sf32' arrays carry the chromatic
//! adaptation matrix.
//!
//! See ICC.1:2022 Sections 10.31 and 10.22

use crate::icc::error::IccError;
use crate::icc::types::{S15Fixed16, TypeSignature, XyzNumber};

/// XYZ tag data - contains one or more XYZ values
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTagData {
    /// XYZ values stored in the tag
    pub values: Vec<XyzNumber>,
}

impl XyzTagData {
    pub fn new(value: XyzNumber) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Parse an 'XYZ ' block, returns values and bytes used
    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let body = data.get(8..).unwrap_or_default();
        // Each XYZNumber is 12 bytes (3 × s15Fixed16)
        let values: Vec<XyzNumber> = body
            .chunks_exact(12)
            .filter_map(XyzNumber::from_bytes)
            .collect();

        if values.is_empty() {
            return Err(IccError::CorruptedData("XYZ tag too small".to_string()));
        }

        let used = 8 + values.len() * 12;
        Ok((Self { values }, used))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.values.len() * 12);
        out.extend_from_slice(&TypeSignature::XYZ.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        for value in &self.values {
            out.extend_from_slice(&value.to_bytes());
        }
        out
    }

    /// Get the first XYZ value (most common case)
    pub fn first(&self) -> Option<&XyzNumber> {
        self.values.first()
    }

    /// The first value as floating point (X, Y, Z)
    pub fn triple(&self) -> Option<(f64, f64, f64)> {
        self.first().map(XyzNumber::to_f64)
    }
}

/// s15Fixed16 array ('sf32')
#[derive(Debug, Clone, PartialEq)]
pub struct Sf32Data {
    pub values: Vec<S15Fixed16>,
}

impl Sf32Data {
    pub fn from_f64(values: &[f64]) -> Self {
        Self {
            values: values.iter().copied().map(S15Fixed16::from_f64).collect(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<(Self, usize), IccError> {
        let body = data
            .get(8..)
            .ok_or_else(|| IccError::CorruptedData("sf32 tag too small".to_string()))?;
        let values: Vec<S15Fixed16> = body
            .chunks_exact(4)
            .map(|c| S15Fixed16::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let used = 8 + values.len() * 4;
        Ok((Self { values }, used))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.values.len() * 4);
        out.extend_from_slice(&TypeSignature::SF32.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        for value in &self.values {
            out.extend_from_slice(&value.to_be_bytes());
        }
        out
    }

    /// Row major 3x3 matrix, as stored in the 'chad' tag
    pub fn to_matrix(&self) -> Option<[[f64; 3]; 3]> {
        if self.values.len() < 9 {
            return None;
        }
        let mut m = [[0.0; 3]; 3];
        for (i, value) in self.values.iter().take(9).enumerate() {
            m[i / 3][i % 3] = value.to_f64();
        }
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xyz_tag() {
        // D50 white point
        let mut data = b"XYZ \0\0\0\0".to_vec();
        data.extend_from_slice(&[
            0x00, 0x00, 0xF6, 0xD6, // X = 0.9642 (approximately)
            0x00, 0x01, 0x00, 0x00, // Y = 1.0
            0x00, 0x00, 0xD3, 0x2D, // Z = 0.8249 (approximately)
        ]);

        let (tag, used) = XyzTagData::parse(&data).unwrap();
        assert_eq!(tag.values.len(), 1);
        assert_eq!(used, 20);

        let (_, y, _) = tag.triple().unwrap();
        assert!((y - 1.0).abs() < 0.001);
        assert_eq!(tag.encode(), data);
    }

    #[test]
    fn test_parse_multiple_xyz() {
        let tag = XyzTagData {
            values: vec![XyzNumber::from_f64(1.0, 0.0, 0.0), XyzNumber::from_f64(0.0, 1.0, 0.0)],
        };
        let (parsed, used) = XyzTagData::parse(&tag.encode()).unwrap();
        assert_eq!(parsed, tag);
        assert_eq!(used, 32);
    }

    #[test]
    fn test_parse_xyz_too_small() {
        let data = b"XYZ \0\0\0\0\0\0\0\0";
        assert!(XyzTagData::parse(data).is_err());
    }

    #[test]
    fn test_sf32_matrix() {
        // Bradford from D65 to D50, rounded
        let values = [
            1.0479, 0.0229, -0.0502, 0.0296, 0.9904, -0.0171, -0.0092, 0.0151, 0.7519,
        ];
        let (sf32, used) = Sf32Data::parse(&Sf32Data::from_f64(&values).encode()).unwrap();
        assert_eq!(used, 8 + 36);
        let m = sf32.to_matrix().unwrap();
        assert!((m[0][0] - 1.0479).abs() < 1e-4);
        assert!((m[2][2] - 0.7519).abs() < 1e-4);
        assert!(Sf32Data::from_f64(&[1.0]).to_matrix().is_none());
    }
}
