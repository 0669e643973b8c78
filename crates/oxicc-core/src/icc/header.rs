//! ICC Profile Header
//!
//! The ICC profile header is exactly 128 bytes and contains basic profile information.
//! See ICC.1:2022 Section 7.2.
//!
//! Profiles keep their header as the raw 128 byte block. [`IccHeader`] is a
//! parsed snapshot of it, and [`SignatureKind`] addresses single fields in
//! the raw block by their fixed offsets.

use super::error::IccError;
use super::types::{DateTimeNumber, XyzNumber, read_u16, read_u32, write_u32};

/// Profile file signature - must be 'acsp' (0x61637370)
pub const PROFILE_SIGNATURE: u32 = 0x61637370;

/// Header size in bytes
pub const HEADER_SIZE: usize = 128;

/// Minimum valid profile size (header plus tag count)
pub const MIN_PROFILE_SIZE: usize = HEADER_SIZE + 4;

/// Offset of the 16 byte profile ID
pub const PROFILE_ID_OFFSET: usize = 84;

/// Offset of the profile flags
pub const FLAGS_OFFSET: usize = 44;

/// Offset of the rendering intent
pub const INTENT_OFFSET: usize = 64;

/// ICC Profile Header (128 bytes)
///
/// Class and color space are kept as raw signatures so that unknown values
/// survive a round trip; use [`IccHeader::profile_class`] and
/// [`IccHeader::color_space`] for the typed view.
#[derive(Debug, Clone, PartialEq)]
pub struct IccHeader {
    /// Profile size in bytes
    pub size: u32,
    /// Preferred CMM type signature
    pub cmm_type: u32,
    /// Profile version (major.minor.0.0)
    pub version: ProfileVersion,
    /// Device class signature
    pub device_class: u32,
    /// Color space signature of data
    pub color_space: u32,
    /// Profile connection space signature
    pub pcs: u32,
    /// Date and time profile was created
    pub creation_date: DateTimeNumber,
    /// Profile file signature (must be 'acsp')
    pub signature: u32,
    /// Primary platform signature
    pub platform: u32,
    /// Profile flags
    pub flags: u32,
    /// Device manufacturer signature
    pub manufacturer: u32,
    /// Device model signature
    pub model: u32,
    /// Device attributes
    pub attributes: u64,
    /// Rendering intent
    pub rendering_intent: u32,
    /// PCS illuminant (should be D50)
    pub illuminant: XyzNumber,
    /// Profile creator signature
    pub creator: u32,
    /// Profile ID (MD5 hash, or zero)
    pub profile_id: [u8; 16],
}

impl IccHeader {
    /// Parse header from bytes
    ///
    /// Only the length and the 'acsp' magic are enforced here; see
    /// [`IccHeader::validate`] for the size check against the whole container.
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let u32_at = |offset: usize| read_u32(data, offset).unwrap_or_default();

        let signature = u32_at(36);
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(signature));
        }

        let mut attributes = [0u8; 8];
        attributes.copy_from_slice(&data[56..64]);

        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(&data[PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16]);

        Ok(Self {
            size: u32_at(0),
            cmm_type: u32_at(4),
            version: ProfileVersion::from_bytes(data[8], data[9]),
            device_class: u32_at(12),
            color_space: u32_at(16),
            pcs: u32_at(20),
            creation_date: DateTimeNumber::from_bytes(&data[24..36]).unwrap_or_default(),
            signature,
            platform: u32_at(40),
            flags: u32_at(FLAGS_OFFSET),
            manufacturer: u32_at(48),
            model: u32_at(52),
            attributes: u64::from_be_bytes(attributes),
            rendering_intent: u32_at(INTENT_OFFSET),
            illuminant: XyzNumber::from_bytes(&data[68..80]).unwrap_or_default(),
            creator: u32_at(80),
            profile_id,
        })
    }

    /// Check the header against the length of the whole container
    pub fn validate(&self, data_len: usize) -> Result<(), IccError> {
        if self.signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(self.signature));
        }

        if self.size as usize > data_len {
            return Err(IccError::SizeMismatch {
                header_size: self.size,
                actual_size: data_len,
            });
        }

        Ok(())
    }

    /// Serialize into a 128 byte block; reserved bytes are zero
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        write_u32(&mut out, 0, self.size);
        write_u32(&mut out, 4, self.cmm_type);
        out[8] = self.version.major;
        out[9] = (self.version.minor << 4) | (self.version.patch & 0x0F);
        write_u32(&mut out, 12, self.device_class);
        write_u32(&mut out, 16, self.color_space);
        write_u32(&mut out, 20, self.pcs);
        out[24..36].copy_from_slice(&self.creation_date.to_bytes());
        write_u32(&mut out, 36, self.signature);
        write_u32(&mut out, 40, self.platform);
        write_u32(&mut out, FLAGS_OFFSET, self.flags);
        write_u32(&mut out, 48, self.manufacturer);
        write_u32(&mut out, 52, self.model);
        out[56..64].copy_from_slice(&self.attributes.to_be_bytes());
        write_u32(&mut out, INTENT_OFFSET, self.rendering_intent);
        out[68..80].copy_from_slice(&self.illuminant.to_bytes());
        write_u32(&mut out, 80, self.creator);
        out[PROFILE_ID_OFFSET..PROFILE_ID_OFFSET + 16].copy_from_slice(&self.profile_id);
        out
    }

    pub fn profile_class(&self) -> Option<ProfileClass> {
        ProfileClass::from_u32(self.device_class)
    }

    pub fn color_space(&self) -> Option<ColorSpace> {
        ColorSpace::from_u32(self.color_space)
    }

    pub fn pcs(&self) -> Option<ColorSpace> {
        ColorSpace::from_u32(self.pcs)
    }

    pub fn rendering_intent(&self) -> Option<RenderingIntent> {
        RenderingIntent::from_u32(self.rendering_intent)
    }

    /// Get the version as a tuple (major, minor, patch)
    pub fn version_tuple(&self) -> (u8, u8, u8) {
        (self.version.major, self.version.minor, self.version.patch)
    }
}

/// ICC Profile Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl ProfileVersion {
    pub const V2_4: Self = Self { major: 2, minor: 4, patch: 0 };
    pub const V4_3: Self = Self { major: 4, minor: 3, patch: 0 };

    pub(crate) fn from_bytes(major: u8, minor_patch: u8) -> Self {
        Self {
            major,
            minor: minor_patch >> 4,
            patch: minor_patch & 0x0F,
        }
    }

    /// Check if version is at least the specified version
    pub fn at_least(&self, major: u8, minor: u8) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Check if this is a v4 profile
    pub fn is_v4(&self) -> bool {
        self.major == 4
    }

    /// Check if this is a v2 profile
    pub fn is_v2(&self) -> bool {
        self.major == 2
    }

    /// The raw 4 byte header field
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes([self.major, (self.minor << 4) | (self.patch & 0x0F), 0, 0])
    }
}

/// ICC Profile Class (Device Class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileClass {
    /// Input device (scanner, camera)
    Input,
    /// Display device (monitor)
    Display,
    /// Output device (printer)
    Output,
    /// Device link
    DeviceLink,
    /// Color space conversion
    ColorSpace,
    /// Abstract profile
    Abstract,
    /// Named color profile
    NamedColor,
}

impl ProfileClass {
    pub fn from_u32(val: u32) -> Option<Self> {
        match &val.to_be_bytes() {
            b"scnr" => Some(Self::Input),
            b"mntr" => Some(Self::Display),
            b"prtr" => Some(Self::Output),
            b"link" => Some(Self::DeviceLink),
            b"spac" => Some(Self::ColorSpace),
            b"abst" => Some(Self::Abstract),
            b"nmcl" => Some(Self::NamedColor),
            _ => None,
        }
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(*match self {
            Self::Input => b"scnr",
            Self::Display => b"mntr",
            Self::Output => b"prtr",
            Self::DeviceLink => b"link",
            Self::ColorSpace => b"spac",
            Self::Abstract => b"abst",
            Self::NamedColor => b"nmcl",
        })
    }
}

/// ICC Color Space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Xyz,
    Lab,
    Luv,
    YCbCr,
    Yxy,
    Rgb,
    Gray,
    Hsv,
    Hls,
    Cmyk,
    Cmy,
    /// N color spaces, 2 to 15 channels ('2CLR' .. 'FCLR')
    Color(u8),
}

impl ColorSpace {
    pub fn from_u32(val: u32) -> Option<Self> {
        let bytes = val.to_be_bytes();
        match &bytes {
            b"XYZ " => Some(Self::Xyz),
            b"Lab " => Some(Self::Lab),
            b"Luv " => Some(Self::Luv),
            b"YCbr" => Some(Self::YCbCr),
            b"Yxy " => Some(Self::Yxy),
            b"RGB " => Some(Self::Rgb),
            b"GRAY" => Some(Self::Gray),
            b"HSV " => Some(Self::Hsv),
            b"HLS " => Some(Self::Hls),
            b"CMYK" => Some(Self::Cmyk),
            b"CMY " => Some(Self::Cmy),
            [n, b'C', b'L', b'R'] => {
                let channels = (*n as char).to_digit(16)?;
                (2..=15).contains(&channels).then_some(Self::Color(channels as u8))
            }
            _ => None,
        }
    }

    pub fn to_u32(&self) -> u32 {
        let bytes = match self {
            Self::Xyz => *b"XYZ ",
            Self::Lab => *b"Lab ",
            Self::Luv => *b"Luv ",
            Self::YCbCr => *b"YCbr",
            Self::Yxy => *b"Yxy ",
            Self::Rgb => *b"RGB ",
            Self::Gray => *b"GRAY",
            Self::Hsv => *b"HSV ",
            Self::Hls => *b"HLS ",
            Self::Cmyk => *b"CMYK",
            Self::Cmy => *b"CMY ",
            Self::Color(n) => {
                let digit = char::from_digit(u32::from(*n), 16)
                    .map(|c| c.to_ascii_uppercase() as u8)
                    .unwrap_or(b'0');
                [digit, b'C', b'L', b'R']
            }
        };
        u32::from_be_bytes(bytes)
    }

    /// Get number of channels for this color space
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Xyz
            | Self::Lab
            | Self::Luv
            | Self::YCbCr
            | Self::Yxy
            | Self::Rgb
            | Self::Hsv
            | Self::Hls
            | Self::Cmy => 3,
            Self::Cmyk => 4,
            Self::Color(n) => *n as usize,
        }
    }

    /// Default channel names, e.g. `["R", "G", "B"]`
    pub fn channel_names(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Self::Gray => &["K"],
            Self::Xyz => &["X", "Y", "Z"],
            Self::Lab => &["L", "a", "b"],
            Self::Luv => &["L", "u", "v"],
            Self::YCbCr => &["Y", "Cb", "Cr"],
            Self::Yxy => &["Y", "x", "y"],
            Self::Rgb => &["R", "G", "B"],
            Self::Hsv => &["H", "S", "V"],
            Self::Hls => &["H", "L", "S"],
            Self::Cmy => &["C", "M", "Y"],
            Self::Cmyk => &["C", "M", "Y", "K"],
            Self::Color(n) => return (1..=*n).map(|i| format!("{i}. color")).collect(),
        };
        fixed.iter().map(|s| s.to_string()).collect()
    }
}

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    pub fn from_u32(val: u32) -> Option<Self> {
        match val {
            0 => Some(Self::Perceptual),
            1 => Some(Self::RelativeColorimetric),
            2 => Some(Self::Saturation),
            3 => Some(Self::AbsoluteColorimetric),
            _ => None,
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Perceptual => 0,
            Self::RelativeColorimetric => 1,
            Self::Saturation => 2,
            Self::AbsoluteColorimetric => 3,
        }
    }
}

/// One addressable field of the 128 byte header
///
/// Every field reads as a `u32`: 4 byte fields verbatim, date parts as their
/// u16 value, illuminant parts as the raw s15Fixed16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    ColorSpace,
    Pcs,
    Size,
    Cmm,
    Version,
    Class,
    Magic,
    Platform,
    Flags,
    Manufacturer,
    Model,
    Intent,
    Creator,
    DateTimeYear,
    DateTimeMonth,
    DateTimeDay,
    DateTimeHours,
    DateTimeMinutes,
    DateTimeSeconds,
    IlluminantX,
    IlluminantY,
    IlluminantZ,
}

impl SignatureKind {
    pub const ALL: [SignatureKind; 22] = [
        Self::ColorSpace,
        Self::Pcs,
        Self::Size,
        Self::Cmm,
        Self::Version,
        Self::Class,
        Self::Magic,
        Self::Platform,
        Self::Flags,
        Self::Manufacturer,
        Self::Model,
        Self::Intent,
        Self::Creator,
        Self::DateTimeYear,
        Self::DateTimeMonth,
        Self::DateTimeDay,
        Self::DateTimeHours,
        Self::DateTimeMinutes,
        Self::DateTimeSeconds,
        Self::IlluminantX,
        Self::IlluminantY,
        Self::IlluminantZ,
    ];

    /// Byte offset and width of the field inside the header
    pub const fn location(&self) -> (usize, usize) {
        match self {
            Self::Size => (0, 4),
            Self::Cmm => (4, 4),
            Self::Version => (8, 4),
            Self::Class => (12, 4),
            Self::ColorSpace => (16, 4),
            Self::Pcs => (20, 4),
            Self::DateTimeYear => (24, 2),
            Self::DateTimeMonth => (26, 2),
            Self::DateTimeDay => (28, 2),
            Self::DateTimeHours => (30, 2),
            Self::DateTimeMinutes => (32, 2),
            Self::DateTimeSeconds => (34, 2),
            Self::Magic => (36, 4),
            Self::Platform => (40, 4),
            Self::Flags => (FLAGS_OFFSET, 4),
            Self::Manufacturer => (48, 4),
            Self::Model => (52, 4),
            Self::Intent => (INTENT_OFFSET, 4),
            Self::IlluminantX => (68, 4),
            Self::IlluminantY => (72, 4),
            Self::IlluminantZ => (76, 4),
            Self::Creator => (80, 4),
        }
    }

    /// Read this field from a header block, 0 when the block is short
    pub fn read(&self, header: &[u8]) -> u32 {
        let (offset, width) = self.location();
        if width == 2 {
            read_u16(header, offset).map(u32::from).unwrap_or(0)
        } else {
            read_u32(header, offset).unwrap_or(0)
        }
    }

    /// Write this field into a header block of at least 128 bytes
    pub fn write(&self, header: &mut [u8], value: u32) {
        let (offset, width) = self.location();
        if width == 2 {
            header[offset..offset + 2].copy_from_slice(&(value as u16).to_be_bytes());
        } else {
            write_u32(header, offset, value);
        }
    }
}
