//! This module contains all DICOM data element header decoding logic.

use dcmio_core::dataset::EncodingMode;
use dcmio_core::header::{DataElementHeader, SequenceItemHeader};
use dcmio_core::{DataDictionary, Tag};
use snafu::{Backtrace, Snafu};
use std::io::{self, Read};

use crate::swap::SwapCode;

pub mod basic;
pub mod explicit;
pub mod implicit;

pub use self::explicit::ExplicitDecoder;
pub use self::implicit::ImplicitDecoder;

/// Module-level error type:
/// for errors which may occur while decoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the beginning (tag) of the header: {}", source))]
    ReadHeaderTag {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's value representation: {}", source))]
    ReadVr {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's reserved bytes: {}", source))]
    ReadReserved {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's element length field: {}", source))]
    ReadLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the item header: {}", source))]
    ReadItemHeader {
        backtrace: Backtrace,
        source: io::Error,
    },
    #[snafu(display("Failed to read the header's item length field: {}", source))]
    ReadItemLength {
        backtrace: Backtrace,
        source: io::Error,
    },
    /// In explicit mode, a value representation field which matches
    /// no known code means the stream structure was lost.
    #[snafu(display(
        "Unknown value representation {:?} in element header {}",
        bytes,
        tag
    ))]
    UnknownVr {
        tag: Tag,
        bytes: [u8; 2],
        backtrace: Backtrace,
    },
    #[snafu(display("Bad sequence item header: {}", source))]
    BadSequenceHeader {
        source: dcmio_core::header::SequenceItemHeaderError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Type trait for reading and decoding DICOM data element headers.
///
/// The specific behaviour of decoding, even when abstracted from the
/// original source, depends on the transfer syntax.
pub trait Decode {
    /// Fetch and decode the next data element header from the given source.
    /// This method returns only the header of the element. At the end of
    /// this operation, the source will be pointing at the element's value
    /// data, which should be read or skipped as necessary.
    ///
    /// Decoding an item or sequence delimiter is considered valid, and
    /// should be properly handled by the decoder. The value representation
    /// in this case should be `UN`.
    ///
    /// Returns the expected header and the exact number of bytes read
    /// from the source.
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read;

    /// Fetch and decode the next sequence item head from the given source.
    /// It is a separate method because the value representation is always
    /// implicit when reading item headers and delimiters.
    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read;

    /// Decode a DICOM attribute tag from the given source.
    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read;
}

impl<T: ?Sized> Decode for &T
where
    T: Decode,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        (**self).decode_header(source)
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        (**self).decode_item_header(source)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        (**self).decode_tag(source)
    }
}

/// A data element header decoder with the encoding mode
/// decided at run time. The mode never changes mid-parse,
/// so a single enum dispatch per element suffices.
#[derive(Debug, Clone)]
pub enum ModeDecoder<D> {
    /// Decode element headers with the VR present on the wire.
    Explicit(ExplicitDecoder),
    /// Decode element headers with the VR resolved from a dictionary.
    Implicit(ImplicitDecoder<D>),
}

impl<D> ModeDecoder<D>
where
    D: DataDictionary,
{
    /// Create a header decoder for the given encoding mode,
    /// swap code, and attribute dictionary.
    pub fn new(mode: EncodingMode, swap: SwapCode, dict: D) -> Self {
        match mode {
            EncodingMode::Explicit => ModeDecoder::Explicit(ExplicitDecoder::new(swap)),
            EncodingMode::Implicit => ModeDecoder::Implicit(ImplicitDecoder::new(swap, dict)),
        }
    }
}

impl<D> Decode for ModeDecoder<D>
where
    D: DataDictionary,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        match self {
            ModeDecoder::Explicit(dec) => dec.decode_header(source),
            ModeDecoder::Implicit(dec) => dec.decode_header(source),
        }
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        match self {
            ModeDecoder::Explicit(dec) => dec.decode_item_header(source),
            ModeDecoder::Implicit(dec) => dec.decode_item_header(source),
        }
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        match self {
            ModeDecoder::Explicit(dec) => dec.decode_tag(source),
            ModeDecoder::Implicit(dec) => dec.decode_tag(source),
        }
    }
}

/// Obtain a data element decoder for reading the data elements in a DICOM
/// file's meta information. According to the standard, these are always
/// encoded in Explicit VR Little Endian.
pub fn file_header_decoder() -> ExplicitDecoder {
    ExplicitDecoder::new(SwapCode::LittleEndian)
}
