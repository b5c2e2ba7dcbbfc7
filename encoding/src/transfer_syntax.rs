//! Transfer syntax resolution:
//! mapping between transfer syntax UIDs and the pair of
//! (swap code, element encoding mode) governing a data set,
//! plus the structural guesser for headerless legacy streams.

use dcmio_core::dataset::EncodingMode;
use dcmio_core::{Tag, VR};
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{Read, Seek, SeekFrom};

use crate::swap::SwapCode;

/// The supported transfer syntaxes.
///
/// Each variant resolves to a byte order and an element encoding mode;
/// encapsulated variants additionally imply a pixel data codec.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransferSyntax {
    /// Implicit VR Little Endian: the default transfer syntax.
    ImplicitVRLittleEndian,
    /// Explicit VR Little Endian.
    ExplicitVRLittleEndian,
    /// Explicit VR Big Endian (retired).
    ExplicitVRBigEndian,
    /// Implicit VR Big Endian, an ACR-NEMA legacy layout
    /// without a registered UID.
    ImplicitVRBigEndianAcrNema,
    /// Deflated Explicit VR Little Endian.
    /// Recognized, but inflating the stream is not supported.
    DeflatedExplicitVRLittleEndian,
    /// JPEG Baseline (process 1): encapsulated, decoded by
    /// an external JPEG codec.
    JpegBaseline,
    /// RLE Lossless: encapsulated, segmented run-length encoding.
    RleLossless,
}

impl TransferSyntax {
    /// The registered UID of this transfer syntax,
    /// or `None` for the unregistered ACR-NEMA legacy layout.
    pub fn uid(self) -> Option<&'static str> {
        match self {
            TransferSyntax::ImplicitVRLittleEndian => Some("1.2.840.10008.1.2"),
            TransferSyntax::ExplicitVRLittleEndian => Some("1.2.840.10008.1.2.1"),
            TransferSyntax::ExplicitVRBigEndian => Some("1.2.840.10008.1.2.2"),
            TransferSyntax::ImplicitVRBigEndianAcrNema => None,
            TransferSyntax::DeflatedExplicitVRLittleEndian => Some("1.2.840.10008.1.2.1.99"),
            TransferSyntax::JpegBaseline => Some("1.2.840.10008.1.2.4.50"),
            TransferSyntax::RleLossless => Some("1.2.840.10008.1.2.5"),
        }
    }

    /// Resolve a transfer syntax from its UID.
    ///
    /// Trailing padding (NUL or space) in the UID value is ignored.
    pub fn from_uid(uid: &str) -> Option<Self> {
        match uid.trim_end_matches(|c| c == '\0' || c == ' ') {
            "1.2.840.10008.1.2" => Some(TransferSyntax::ImplicitVRLittleEndian),
            "1.2.840.10008.1.2.1" => Some(TransferSyntax::ExplicitVRLittleEndian),
            "1.2.840.10008.1.2.2" => Some(TransferSyntax::ExplicitVRBigEndian),
            "1.2.840.10008.1.2.1.99" => Some(TransferSyntax::DeflatedExplicitVRLittleEndian),
            "1.2.840.10008.1.2.4.50" => Some(TransferSyntax::JpegBaseline),
            "1.2.840.10008.1.2.5" => Some(TransferSyntax::RleLossless),
            _ => None,
        }
    }

    /// The byte order of the data set under this transfer syntax.
    pub fn swap_code(self) -> SwapCode {
        match self {
            TransferSyntax::ExplicitVRBigEndian | TransferSyntax::ImplicitVRBigEndianAcrNema => {
                SwapCode::BigEndian
            }
            _ => SwapCode::LittleEndian,
        }
    }

    /// The element encoding mode of the data set
    /// under this transfer syntax.
    pub fn encoding_mode(self) -> EncodingMode {
        match self {
            TransferSyntax::ImplicitVRLittleEndian
            | TransferSyntax::ImplicitVRBigEndianAcrNema => EncodingMode::Implicit,
            _ => EncodingMode::Explicit,
        }
    }

    /// Whether pixel data under this transfer syntax is encapsulated
    /// in a fragment sequence.
    pub fn is_encapsulated(self) -> bool {
        matches!(
            self,
            TransferSyntax::JpegBaseline | TransferSyntax::RleLossless
        )
    }
}

/// An error occurring during transfer syntax guessing.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GuessError {
    #[snafu(display("Failed to read from the data set stream: {}", source))]
    ReadStream {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Failed to reposition the data set stream: {}", source))]
    SeekStream {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// The first element of the stream fits none of the known layouts.
    /// Proceeding would mean reading garbage, so the reader must give up.
    #[snafu(display("Cannot determine transfer syntax: {}", detail))]
    CannotDetermine {
        detail: &'static str,
        backtrace: Backtrace,
    },
}

pub type GuessResult<T> = std::result::Result<T, GuessError>;

/// Probe the structure of a headerless data set stream to determine
/// its transfer syntax.
///
/// The stream must be positioned at the first data element.
/// The position is restored before returning, whether the guess
/// succeeded or not.
///
/// This heuristic is inherently best-effort: it recognizes the
/// layouts observed in legacy ACR-NEMA material, and refuses anything
/// else rather than guessing silently.
pub fn guess_transfer_syntax<S>(source: &mut S) -> GuessResult<TransferSyntax>
where
    S: Read + Seek,
{
    let start = source.stream_position().context(SeekStreamSnafu)?;
    let guess = probe(source);
    // restore the position even when the probe failed
    source
        .seek(SeekFrom::Start(start))
        .context(SeekStreamSnafu)?;
    guess
}

fn probe<S>(source: &mut S) -> GuessResult<TransferSyntax>
where
    S: Read + Seek,
{
    // the tag is read as little endian; a big endian stream
    // shows up as a byte-reversed group number
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf).context(ReadStreamSnafu)?;
    let tag = Tag(
        u16::from_le_bytes([buf[0], buf[1]]),
        u16::from_le_bytes([buf[2], buf[3]]),
    );

    let (swap, explicit) = if tag.group() % 2 == 0 {
        let mut swap = match tag.group() {
            0x0008 => SwapCode::LittleEndian,
            0x0800 => SwapCode::BigEndian,
            _ => {
                return CannotDetermineSnafu {
                    detail: "first group is neither 0x0008 nor its byte reversal",
                }
                .fail()
            }
        };
        let mut vr_buf = [0u8; 2];
        source.read_exact(&mut vr_buf).context(ReadStreamSnafu)?;
        if VR::from_binary(vr_buf).is_some() {
            (swap, true)
        } else {
            // not a VR: assume implicit and inspect the group length value
            source
                .seek(SeekFrom::Current(-2))
                .context(SeekStreamSnafu)?;
            if tag.element() == 0x0000 {
                let mut gl = [0u8; 4];
                source.read_exact(&mut gl).context(ReadStreamSnafu)?;
                swap = match gl {
                    [0x04, 0x00, 0x00, 0x00] => SwapCode::LittleEndian,
                    [0x00, 0x00, 0x00, 0x04] => SwapCode::BigEndian,
                    [0x00, 0x00, 0x04, 0x00] => {
                        tracing::warn!("group length suggests word-reversed little endian");
                        SwapCode::BadLittleEndian
                    }
                    [0x00, 0x04, 0x00, 0x00] => {
                        tracing::warn!("group length suggests byte-swapped big endian");
                        SwapCode::BadBigEndian
                    }
                    _ => {
                        return CannotDetermineSnafu {
                            detail: "group length value fits no known byte permutation",
                        }
                        .fail()
                    }
                };
            }
            (swap, false)
        }
    } else {
        // the data set starts with a private creator
        tracing::warn!("data set starts with a private tag creator");
        if tag.element() != 0x0010 {
            return CannotDetermineSnafu {
                detail: "private first tag is not a creator slot",
            }
            .fail();
        }
        let swap = SwapCode::LittleEndian;
        let mut vr_buf = [0u8; 2];
        source.read_exact(&mut vr_buf).context(ReadStreamSnafu)?;
        if VR::from_binary(vr_buf).is_some() {
            (swap, true)
        } else {
            // a creator value is character data, so there is little
            // structure left to check here
            tracing::warn!("assuming implicit encoding from a private creator alone");
            (swap, false)
        }
    };

    match (explicit, swap) {
        (false, SwapCode::LittleEndian) => Ok(TransferSyntax::ImplicitVRLittleEndian),
        (false, SwapCode::BigEndian) => Ok(TransferSyntax::ImplicitVRBigEndianAcrNema),
        (true, SwapCode::LittleEndian) => Ok(TransferSyntax::ExplicitVRLittleEndian),
        (true, SwapCode::BigEndian) => Ok(TransferSyntax::ExplicitVRBigEndian),
        // the aberrant byte orders never negotiated a full transfer
        // syntax in practice; refuse instead of inventing one
        _ => CannotDetermineSnafu {
            detail: "aberrant byte order has no canonical transfer syntax",
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn uid_round_trips() {
        for ts in [
            TransferSyntax::ImplicitVRLittleEndian,
            TransferSyntax::ExplicitVRLittleEndian,
            TransferSyntax::ExplicitVRBigEndian,
            TransferSyntax::RleLossless,
        ] {
            let uid = ts.uid().unwrap();
            assert_eq!(TransferSyntax::from_uid(uid), Some(ts));
        }
        assert_eq!(TransferSyntax::ImplicitVRBigEndianAcrNema.uid(), None);
        assert_eq!(
            TransferSyntax::from_uid("1.2.840.10008.1.2.1\0"),
            Some(TransferSyntax::ExplicitVRLittleEndian)
        );
    }

    #[test]
    fn negotiated_properties() {
        use dcmio_core::dataset::EncodingMode::*;
        let ts = TransferSyntax::ImplicitVRLittleEndian;
        assert_eq!(ts.swap_code(), SwapCode::LittleEndian);
        assert_eq!(ts.encoding_mode(), Implicit);
        let ts = TransferSyntax::ExplicitVRBigEndian;
        assert_eq!(ts.swap_code(), SwapCode::BigEndian);
        assert_eq!(ts.encoding_mode(), Explicit);
        assert!(TransferSyntax::RleLossless.is_encapsulated());
        assert!(!TransferSyntax::ExplicitVRLittleEndian.is_encapsulated());
    }

    #[test]
    fn guess_implicit_little_endian() {
        // (0008,0000) group length, value 4 in little endian
        let raw: &[u8] = &[
            0x08, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        ];
        let mut cursor = Cursor::new(raw);
        let ts = guess_transfer_syntax(&mut cursor).unwrap();
        assert_eq!(ts, TransferSyntax::ImplicitVRLittleEndian);
        // the position must be restored
        assert_eq!(cursor.stream_position().unwrap(), 0);
    }

    #[test]
    fn guess_implicit_big_endian() {
        // (0008,0000) byte-reversed group, value 4 in big endian
        let raw: &[u8] = &[
            0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04,
        ];
        let mut cursor = Cursor::new(raw);
        let ts = guess_transfer_syntax(&mut cursor).unwrap();
        assert_eq!(ts, TransferSyntax::ImplicitVRBigEndianAcrNema);
        assert_eq!(cursor.stream_position().unwrap(), 0);
    }

    #[test]
    fn guess_explicit_little_endian() {
        // (0008,0018) with a readable VR field
        let raw: &[u8] = &[0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x06, 0x00];
        let mut cursor = Cursor::new(raw);
        let ts = guess_transfer_syntax(&mut cursor).unwrap();
        assert_eq!(ts, TransferSyntax::ExplicitVRLittleEndian);
    }

    #[test]
    fn guess_private_creator_start() {
        // (0009,0010) private creator, implicit encoding
        let raw: &[u8] = &[0x09, 0x00, 0x10, 0x00, 0x08, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(raw);
        let ts = guess_transfer_syntax(&mut cursor).unwrap();
        assert_eq!(ts, TransferSyntax::ImplicitVRLittleEndian);
    }

    #[test]
    fn refuses_the_unrecognizable() {
        // an even group which is neither 0x0008 nor 0x0800
        let raw: &[u8] = &[0x10, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut cursor = Cursor::new(raw);
        assert!(matches!(
            guess_transfer_syntax(&mut cursor),
            Err(GuessError::CannotDetermine { .. })
        ));
        // position restored even on failure
        assert_eq!(cursor.stream_position().unwrap(), 0);

        // a recognized group but a garbage group length value
        let raw: &[u8] = &[0x08, 0x00, 0x00, 0x00, 0x12, 0x34, 0x56, 0x78];
        let mut cursor = Cursor::new(raw);
        assert!(matches!(
            guess_transfer_syntax(&mut cursor),
            Err(GuessError::CannotDetermine { .. })
        ));
    }

    #[test]
    fn bad_byte_orders_are_detected_but_refused() {
        // group length value 4 in word-reversed little endian
        let raw: &[u8] = &[
            0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut cursor = Cursor::new(raw);
        assert!(matches!(
            guess_transfer_syntax(&mut cursor),
            Err(GuessError::CannotDetermine { .. })
        ));
    }
}
