//! The decoded image descriptor:
//! geometry, sample format, photometric interpretation,
//! and ownership of the flat pixel buffer.

use dcmio_encoding::swap::SwapCode;
use smallvec::SmallVec;

use crate::photometric::PhotometricInterpretation;
use crate::pixel_format::PixelFormat;

/// The pixel data compression scheme in effect for a data set,
/// derived from its transfer syntax.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Compression {
    /// Uncompressed samples.
    Raw,
    /// Segmented run-length encoding.
    Rle,
    /// JPEG bit stream, decoded by the external JPEG codec.
    Jpeg,
}

/// A decoded image: geometric metadata plus the flat pixel buffer.
///
/// Built only after a data set has been fully read;
/// it does not persist independently of its source.
#[derive(Debug, Clone)]
pub struct Image {
    dimensions: SmallVec<[u32; 3]>,
    pixel_format: PixelFormat,
    photometric_interpretation: PhotometricInterpretation,
    planar_configuration: u16,
    swap_code: SwapCode,
    compression: Compression,
    need_byte_swap: bool,
    buffer: Vec<u8>,
}

impl Image {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        dimensions: SmallVec<[u32; 3]>,
        pixel_format: PixelFormat,
        photometric_interpretation: PhotometricInterpretation,
        planar_configuration: u16,
        swap_code: SwapCode,
        compression: Compression,
        need_byte_swap: bool,
        buffer: Vec<u8>,
    ) -> Self {
        Image {
            dimensions,
            pixel_format,
            photometric_interpretation,
            planar_configuration,
            swap_code,
            compression,
            need_byte_swap,
            buffer,
        }
    }

    /// The image dimensions: `[columns, rows]`,
    /// plus the number of frames for multi-frame objects.
    pub fn dimensions(&self) -> &[u32] {
        &self.dimensions
    }

    /// The number of dimensions (2 or 3).
    pub fn number_of_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// The sample format of the buffer.
    pub fn pixel_format(&self) -> &PixelFormat {
        &self.pixel_format
    }

    /// The photometric interpretation of the samples.
    pub fn photometric_interpretation(&self) -> &PhotometricInterpretation {
        &self.photometric_interpretation
    }

    /// The planar configuration: 0 for interleaved samples,
    /// 1 for per-plane sample storage.
    pub fn planar_configuration(&self) -> u16 {
        self.planar_configuration
    }

    /// The byte order the source stream was read under.
    pub fn swap_code(&self) -> SwapCode {
        self.swap_code
    }

    /// The compression scheme the pixel data was stored under.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Whether the pixel data element declared OW samples,
    /// requiring a word swap of decoded content on byte-order
    /// mismatched streams.
    pub fn need_byte_swap(&self) -> bool {
        self.need_byte_swap
    }

    /// The decoded flat pixel buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The expected byte size of the decoded buffer:
    /// the product of the dimensions and the pixel size.
    pub fn buffer_length(&self) -> u64 {
        let pixels: u64 = self.dimensions.iter().map(|&d| u64::from(d)).product();
        pixels * u64::from(self.pixel_format.pixel_size())
    }

    /// The expected byte size of the buffer when palette color
    /// expansion to RGB is requested by the caller.
    pub fn buffer_length_with_palette_expansion(&self) -> u64 {
        let base = self.buffer_length();
        if self.photometric_interpretation == PhotometricInterpretation::PaletteColor {
            base * 3
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_format::PixelRepresentation;
    use smallvec::smallvec;

    fn test_image(pi: PhotometricInterpretation) -> Image {
        Image::new(
            smallvec![16, 16],
            PixelFormat {
                samples_per_pixel: 1,
                bits_allocated: 16,
                bits_stored: 12,
                high_bit: 11,
                pixel_representation: PixelRepresentation::Unsigned,
            },
            pi,
            0,
            SwapCode::LittleEndian,
            Compression::Raw,
            false,
            vec![0; 512],
        )
    }

    #[test]
    fn buffer_length_accounting() {
        let image = test_image(PhotometricInterpretation::Monochrome2);
        assert_eq!(image.buffer_length(), 16 * 16 * 2);
        assert_eq!(image.buffer_length_with_palette_expansion(), 16 * 16 * 2);
    }

    #[test]
    fn palette_expansion_triples_the_buffer() {
        let image = test_image(PhotometricInterpretation::PaletteColor);
        assert_eq!(image.buffer_length(), 16 * 16 * 2);
        assert_eq!(
            image.buffer_length_with_palette_expansion(),
            16 * 16 * 2 * 3
        );
    }
}
