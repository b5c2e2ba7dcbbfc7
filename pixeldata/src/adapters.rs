//! The decode-call contract between the image extraction layer and
//! the per-frame pixel codecs.
//!
//! The run-length codec is implemented in this crate; JPEG decoding
//! is delegated to the external `jpeg-decoder` crate behind the same
//! contract.

use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Cursor;

use crate::rle;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Run-length decoding failed: {}", source))]
    RleDecoding { source: rle::Error },
    #[snafu(display("JPEG decoding failed: {}", message))]
    JpegDecoding {
        message: String,
        backtrace: Backtrace,
    },
    #[snafu(display("Frame decoded to {} bytes, expected {}", got, expected))]
    FrameSizeMismatch {
        got: usize,
        expected: usize,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A decoder of one pixel data frame from its encoded fragment.
pub trait PixelCodec {
    /// A short name identifying the codec.
    fn name(&self) -> &'static str;

    /// Decode one frame fragment into exactly `expected_len` bytes
    /// of flat sample data.
    fn decode_frame(&self, fragment: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

/// Pass-through codec for uncompressed frame fragments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawCodec;

impl PixelCodec for RawCodec {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn decode_frame(&self, fragment: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        if fragment.len() < expected_len {
            return FrameSizeMismatchSnafu {
                got: fragment.len(),
                expected: expected_len,
            }
            .fail();
        }
        if fragment.len() > expected_len {
            // usually just padding to an even length
            tracing::debug!(
                "raw frame has {} trailing bytes",
                fragment.len() - expected_len
            );
        }
        Ok(fragment[..expected_len].to_vec())
    }
}

/// Codec for the RLE Lossless segmented run-length scheme.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RleCodec;

impl PixelCodec for RleCodec {
    fn name(&self) -> &'static str {
        "rle"
    }

    fn decode_frame(&self, fragment: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        rle::decode_fragment(fragment, expected_len).context(RleDecodingSnafu)
    }
}

/// Codec delegating to the external JPEG decoder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JpegCodec;

impl PixelCodec for JpegCodec {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn decode_frame(&self, fragment: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(fragment));
        let frame = decoder
            .decode()
            .map_err(|e| JpegDecodingSnafu { message: e.to_string() }.build())?;
        if frame.len() != expected_len {
            return FrameSizeMismatchSnafu {
                got: frame.len(),
                expected: expected_len,
            }
            .fail();
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codec_checks_lengths() {
        let codec = RawCodec;
        assert_eq!(codec.decode_frame(&[1, 2, 3, 4], 4).unwrap(), vec![1, 2, 3, 4]);
        // trailing padding is dropped
        assert_eq!(codec.decode_frame(&[1, 2, 3, 0], 3).unwrap(), vec![1, 2, 3]);
        assert!(codec.decode_frame(&[1, 2], 4).is_err());
    }

    #[test]
    fn rle_codec_delegates() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&64u32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 4 * 14]);
        raw.extend_from_slice(&[0xFDu8, 0x42]);
        let codec = RleCodec;
        assert_eq!(codec.decode_frame(&raw, 4).unwrap(), vec![0x42; 4]);
    }

    #[test]
    fn jpeg_codec_surfaces_decoder_errors() {
        let codec = JpegCodec;
        assert!(matches!(
            codec.decode_frame(&[0x00, 0x01, 0x02], 16),
            Err(Error::JpegDecoding { .. })
        ));
    }
}
