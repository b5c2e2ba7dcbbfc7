//! Reusable components for encoding and decoding text in DICOM
//! data structures.
//!
//! Only the default repertoire (ISO-IR 6) is needed by this workspace:
//! file meta header values are restricted to the default repertoire
//! by the standard.

use encoding::all::ISO_8859_1;
use encoding::{DecoderTrap, EncoderTrap, Encoding};
use snafu::{Backtrace, Snafu};
use std::borrow::Cow;

/// An error type for text encoding issues.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum EncodeTextError {
    /// A custom error message,
    /// for when the underlying error type does not encode error semantics
    /// into type variants.
    #[snafu(display("{}", message))]
    EncodeCustom {
        /// The error message in plain text.
        message: Cow<'static, str>,
        /// The generated backtrace, if available.
        backtrace: Backtrace,
    },
}

/// An error type for text decoding issues.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeTextError {
    /// A custom error message,
    /// for when the underlying error type does not encode error semantics
    /// into type variants.
    #[snafu(display("{}", message))]
    DecodeCustom {
        /// The error message in plain text.
        message: Cow<'static, str>,
        /// The generated backtrace, if available.
        backtrace: Backtrace,
    },
}

type EncodeResult<T> = Result<T, EncodeTextError>;
type DecodeResult<T> = Result<T, DecodeTextError>;

/// A holder of encoding and decoding mechanisms for text in DICOM content.
pub trait TextCodec {
    /// Obtain the defined term (unique name) of the text encoding.
    ///
    /// Should contain no leading or trailing spaces.
    fn name(&self) -> &'static str;

    /// Decode the given byte buffer as a single string. The resulting string
    /// _may_ contain backslash characters ('\') to delimit individual values,
    /// and should be split later on if required.
    fn decode(&self, text: &[u8]) -> DecodeResult<String>;

    /// Encode a text value into a byte vector. The input string can
    /// feature multiple text values by using the backslash character ('\')
    /// as the value delimiter.
    fn encode(&self, text: &str) -> EncodeResult<Vec<u8>>;
}

/// Data type representing the default character set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Copy)]
pub struct DefaultCharacterSetCodec;

impl TextCodec for DefaultCharacterSetCodec {
    fn name(&self) -> &'static str {
        "ISO_IR 6"
    }

    fn decode(&self, text: &[u8]) -> DecodeResult<String> {
        // Using 8859-1 because it is a superset.
        ISO_8859_1
            .decode(text, DecoderTrap::Replace)
            .map_err(|message| DecodeCustomSnafu { message }.build())
    }

    fn encode(&self, text: &str) -> EncodeResult<Vec<u8>> {
        ISO_8859_1
            .encode(text, EncoderTrap::Strict)
            .map_err(|message| EncodeCustomSnafu { message }.build())
    }
}

/// Decode a string value, stripping the trailing padding
/// (space for most text, NUL for unique identifiers).
pub fn decode_trimmed(codec: &dyn TextCodec, value: &[u8]) -> DecodeResult<String> {
    let mut s = codec.decode(value)?;
    while s.ends_with(' ') || s.ends_with('\0') {
        s.pop();
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_codec_round_trip() {
        let codec = DefaultCharacterSetCodec;
        assert_eq!(codec.name(), "ISO_IR 6");
        let bytes = codec.encode("MONOCHROME2 ").unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), "MONOCHROME2 ");
    }

    #[test]
    fn trimmed_decoding() {
        let codec = DefaultCharacterSetCodec;
        assert_eq!(
            decode_trimmed(&codec, b"1.2.840.10008.1.2.1\0").unwrap(),
            "1.2.840.10008.1.2.1"
        );
        assert_eq!(decode_trimmed(&codec, b"TITLE ").unwrap(), "TITLE");
    }
}
