//! Photometric interpretation of decoded pixel samples.

use std::fmt;
use std::str::FromStr;

/// The photometric interpretation declared at (0028,0004).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PhotometricInterpretation {
    /// Single sample per pixel, minimum value is white.
    Monochrome1,
    /// Single sample per pixel, minimum value is black.
    Monochrome2,
    /// Single sample per pixel, used as an index into color lookup
    /// tables.
    PaletteColor,
    /// Three samples per pixel: red, green, blue.
    Rgb,
    /// Three samples per pixel: one luminance, two chrominance,
    /// without subsampling.
    YbrFull,
    /// Three samples per pixel: one luminance, two chrominance,
    /// 4:2:2 subsampled.
    YbrFull422,
    /// Any other defined term, kept verbatim.
    Other(String),
}

impl PhotometricInterpretation {
    /// The number of samples per pixel this interpretation implies.
    pub fn samples_per_pixel(&self) -> u16 {
        match self {
            PhotometricInterpretation::Monochrome1
            | PhotometricInterpretation::Monochrome2
            | PhotometricInterpretation::PaletteColor => 1,
            PhotometricInterpretation::Rgb
            | PhotometricInterpretation::YbrFull
            | PhotometricInterpretation::YbrFull422 => 3,
            PhotometricInterpretation::Other(_) => 1,
        }
    }

    /// Whether this is one of the two monochrome interpretations.
    pub fn is_monochrome(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Monochrome1 | PhotometricInterpretation::Monochrome2
        )
    }

    /// The defined term, as it appears in a data set.
    pub fn as_str(&self) -> &str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::Other(term) => term,
        }
    }
}

impl FromStr for PhotometricInterpretation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let term = s.trim_end_matches(|c| c == ' ' || c == '\0');
        Ok(match term {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            other => PhotometricInterpretation::Other(other.to_string()),
        })
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defined_terms() {
        let pi: PhotometricInterpretation = "MONOCHROME2 ".parse().unwrap();
        assert_eq!(pi, PhotometricInterpretation::Monochrome2);
        assert_eq!(pi.samples_per_pixel(), 1);
        assert!(pi.is_monochrome());

        let pi: PhotometricInterpretation = "RGB".parse().unwrap();
        assert_eq!(pi.samples_per_pixel(), 3);
        assert!(!pi.is_monochrome());

        let pi: PhotometricInterpretation = "YBR_ICT".parse().unwrap();
        assert_eq!(pi, PhotometricInterpretation::Other("YBR_ICT".to_string()));
    }
}
