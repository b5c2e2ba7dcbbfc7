//! This module contains all DICOM data element header encoding logic.

use dcmio_core::dataset::EncodingMode;
use dcmio_core::header::DataElementHeader;
use dcmio_core::Tag;
use snafu::{Backtrace, Snafu};
use std::io::{self, Write};

use crate::swap::SwapCode;

pub mod basic;
pub mod explicit;
pub mod implicit;

pub use self::explicit::ExplicitEncoder;
pub use self::implicit::ImplicitEncoder;

/// Module-level error type:
/// for errors which may occur while encoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to write the header's tag: {}", source))]
    WriteTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write data element header: {}", source))]
    WriteHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write item header: {}", source))]
    WriteItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write item delimiter: {}", source))]
    WriteItemDelimiter {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to write sequence delimiter: {}", source))]
    WriteSequenceDelimiter {
        backtrace: Backtrace,
        source: io::Error,
    },
    /// An element whose value exceeds 0xFFFF bytes cannot be encoded
    /// with a 16-bit length field.
    #[snafu(display("Value length {} of {} does not fit a 16-bit field", len, tag))]
    LengthOverflow {
        tag: Tag,
        len: u32,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Type trait for encoding DICOM data element headers.
pub trait Encode {
    /// Encode and write an element tag.
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write;

    /// Encode and write a data element header to the given destination.
    /// Returns the number of bytes effectively written on success.
    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write;

    /// Encode and write an item header,
    /// where `len` is the specified length of the item
    /// (can be 0xFFFF_FFFF for undefined length).
    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write;

    /// Encode and write an item delimiter.
    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// Encode and write a sequence delimiter.
    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write;

    /// The number of bytes the header of the given element would occupy
    /// under this encoder, without writing anything.
    fn header_width(&self, de: &DataElementHeader) -> u32;
}

/// A data element header encoder with the encoding mode
/// decided at run time, mirroring [`ModeDecoder`](crate::decode::ModeDecoder).
#[derive(Debug, Clone)]
pub enum ModeEncoder {
    /// Encode element headers with the VR present on the wire.
    Explicit(ExplicitEncoder),
    /// Encode element headers without a VR field.
    Implicit(ImplicitEncoder),
}

impl ModeEncoder {
    /// Create a header encoder for the given encoding mode and swap code.
    pub fn new(mode: EncodingMode, swap: SwapCode) -> Self {
        match mode {
            EncodingMode::Explicit => ModeEncoder::Explicit(ExplicitEncoder::new(swap)),
            EncodingMode::Implicit => ModeEncoder::Implicit(ImplicitEncoder::new(swap)),
        }
    }
}

impl Encode for ModeEncoder {
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        match self {
            ModeEncoder::Explicit(enc) => enc.encode_tag(to, tag),
            ModeEncoder::Implicit(enc) => enc.encode_tag(to, tag),
        }
    }

    fn encode_element_header<W>(&self, to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        match self {
            ModeEncoder::Explicit(enc) => enc.encode_element_header(to, de),
            ModeEncoder::Implicit(enc) => enc.encode_element_header(to, de),
        }
    }

    fn encode_item_header<W>(&self, to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        match self {
            ModeEncoder::Explicit(enc) => enc.encode_item_header(to, len),
            ModeEncoder::Implicit(enc) => enc.encode_item_header(to, len),
        }
    }

    fn encode_item_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        match self {
            ModeEncoder::Explicit(enc) => enc.encode_item_delimiter(to),
            ModeEncoder::Implicit(enc) => enc.encode_item_delimiter(to),
        }
    }

    fn encode_sequence_delimiter<W>(&self, to: W) -> Result<()>
    where
        W: Write,
    {
        match self {
            ModeEncoder::Explicit(enc) => enc.encode_sequence_delimiter(to),
            ModeEncoder::Implicit(enc) => enc.encode_sequence_delimiter(to),
        }
    }

    fn header_width(&self, de: &DataElementHeader) -> u32 {
        match self {
            ModeEncoder::Explicit(enc) => enc.header_width(de),
            ModeEncoder::Implicit(enc) => enc.header_width(de),
        }
    }
}

/// Obtain a data element encoder for writing the data elements of a DICOM
/// file's meta information. According to the standard, these are always
/// encoded in Explicit VR Little Endian.
pub fn file_header_encoder() -> ExplicitEncoder {
    ExplicitEncoder::new(SwapCode::LittleEndian)
}
