//! Pixel sample format description:
//! samples per pixel, bit depth fields, and sample representation.

use std::fmt;

/// How one stored sample value is to be interpreted.
///
/// The first two variants carry the standard Pixel Representation
/// codes 0 and 1; the floating point variants are internal extensions
/// encoded as discriminants 2 through 4, never written to a file.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelRepresentation {
    /// Unsigned integer samples (code 0).
    Unsigned,
    /// Two's complement integer samples (code 1).
    Signed,
    /// IEEE 754 half precision samples.
    Float16,
    /// IEEE 754 single precision samples.
    Float32,
    /// IEEE 754 double precision samples.
    Float64,
}

impl PixelRepresentation {
    /// Resolve the representation from its discriminant code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(PixelRepresentation::Unsigned),
            1 => Some(PixelRepresentation::Signed),
            2 => Some(PixelRepresentation::Float16),
            3 => Some(PixelRepresentation::Float32),
            4 => Some(PixelRepresentation::Float64),
            _ => None,
        }
    }
}

/// The scalar classification derived from a pixel format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    UInt8,
    Int8,
    UInt12,
    Int12,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float16,
    Float32,
    Float64,
    Unknown,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ScalarType::UInt8 => "UINT8",
            ScalarType::Int8 => "INT8",
            ScalarType::UInt12 => "UINT12",
            ScalarType::Int12 => "INT12",
            ScalarType::UInt16 => "UINT16",
            ScalarType::Int16 => "INT16",
            ScalarType::UInt32 => "UINT32",
            ScalarType::Int32 => "INT32",
            ScalarType::Float16 => "FLOAT16",
            ScalarType::Float32 => "FLOAT32",
            ScalarType::Float64 => "FLOAT64",
            ScalarType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// The sample format of a pixel buffer, as declared by the
/// (0028,xxxx) image description attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    /// Number of samples (color channels) per pixel.
    pub samples_per_pixel: u16,
    /// Number of bits allocated per sample.
    pub bits_allocated: u16,
    /// Number of bits actually carrying sample information.
    pub bits_stored: u16,
    /// Position of the most significant bit.
    pub high_bit: u16,
    /// Interpretation of the stored sample values.
    pub pixel_representation: PixelRepresentation,
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat {
            samples_per_pixel: 1,
            bits_allocated: 8,
            bits_stored: 8,
            high_bit: 7,
            pixel_representation: PixelRepresentation::Unsigned,
        }
    }
}

impl PixelFormat {
    /// The number of samples per pixel.
    ///
    /// 24 bits allocated is illegal but occurs in the wild;
    /// it is interpreted as an RGB image.
    pub fn samples_per_pixel(&self) -> u16 {
        if self.bits_allocated == 24 {
            tracing::warn!("24 bits allocated is illegal, assuming an RGB image");
            return 3;
        }
        self.samples_per_pixel
    }

    /// The scalar classification of one stored sample.
    pub fn scalar_type(&self) -> ScalarType {
        let unsigned = match self.bits_allocated {
            0 => return ScalarType::Unknown,
            8 => ScalarType::UInt8,
            12 => ScalarType::UInt12,
            16 => ScalarType::UInt16,
            32 => ScalarType::UInt32,
            24 => {
                tracing::warn!("24 bits allocated is illegal, assuming an RGB image");
                ScalarType::UInt8
            }
            other => {
                tracing::warn!("unexpected bits allocated value {}", other);
                return ScalarType::Unknown;
            }
        };
        match self.pixel_representation {
            PixelRepresentation::Unsigned => unsigned,
            PixelRepresentation::Signed => match unsigned {
                ScalarType::UInt8 => ScalarType::Int8,
                ScalarType::UInt12 => ScalarType::Int12,
                ScalarType::UInt16 => ScalarType::Int16,
                ScalarType::UInt32 => ScalarType::Int32,
                _ => ScalarType::Unknown,
            },
            PixelRepresentation::Float16 => ScalarType::Float16,
            PixelRepresentation::Float32 => ScalarType::Float32,
            PixelRepresentation::Float64 => ScalarType::Float64,
        }
    }

    /// The byte size of one full pixel (all samples).
    ///
    /// 12-bit samples are stored as if they occupied a full short.
    pub fn pixel_size(&self) -> u8 {
        let sample_size = if self.bits_allocated == 12 {
            2
        } else {
            debug_assert!(self.bits_allocated % 8 == 0);
            (self.bits_allocated / 8) as u8
        };
        sample_size * self.samples_per_pixel() as u8
    }

    /// The smallest representable sample value.
    pub fn min_value(&self) -> f64 {
        match self.pixel_representation {
            PixelRepresentation::Unsigned => 0.0,
            PixelRepresentation::Signed => {
                -(((1u64 << self.bits_stored) >> 1) as f64)
            }
            PixelRepresentation::Float16 => -65504.0,
            PixelRepresentation::Float32 => f64::from(f32::MIN),
            PixelRepresentation::Float64 => f64::MIN,
        }
    }

    /// The largest representable sample value.
    pub fn max_value(&self) -> f64 {
        match self.pixel_representation {
            PixelRepresentation::Unsigned => ((1u64 << self.bits_stored) - 1) as f64,
            PixelRepresentation::Signed => (((1u64 << self.bits_stored) - 1) >> 1) as f64,
            PixelRepresentation::Float16 => 65504.0,
            PixelRepresentation::Float32 => f64::from(f32::MAX),
            PixelRepresentation::Float64 => f64::MAX,
        }
    }
}
