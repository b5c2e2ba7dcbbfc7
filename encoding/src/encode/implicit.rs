//! Implicit VR data element encoding,
//! parameterized over the stream's swap code.
//!
//! No value representation is written; the header is always
//! a tag followed by a 32-bit length field.

use dcmio_core::header::{DataElementHeader, HasLength, Header};
use dcmio_core::Tag;
use snafu::ResultExt;
use std::io::Write;

use crate::encode::basic::BasicEncoder;
use crate::encode::{
    Encode, Result, WriteHeaderSnafu, WriteItemDelimiterSnafu, WriteItemHeaderSnafu,
    WriteSequenceDelimiterSnafu, WriteTagSnafu,
};
use crate::swap::SwapCode;

/// A concrete encoder for implicit VR transfer syntaxes.
#[derive(Debug, Default, Clone)]
pub struct ImplicitEncoder {
    basic: BasicEncoder,
}

impl ImplicitEncoder {
    /// Create an implicit VR encoder over the given swap code.
    pub fn new(swap: SwapCode) -> Self {
        ImplicitEncoder {
            basic: BasicEncoder::new(swap),
        }
    }
}

impl Encode for ImplicitEncoder {
    fn encode_tag<W>(&self, to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        self.basic.encode_tag(to, tag).context(WriteTagSnafu)
    }

    fn encode_element_header<W>(&self, mut to: W, de: DataElementHeader) -> Result<usize>
    where
        W: Write,
    {
        self.basic
            .encode_tag(&mut to, de.tag())
            .context(WriteHeaderSnafu)?;
        self.basic
            .encode_ul(to, de.length().0)
            .context(WriteHeaderSnafu)?;
        Ok(8)
    }

    fn encode_item_header<W>(&self, mut to: W, len: u32) -> Result<()>
    where
        W: Write,
    {
        self.basic
            .encode_tag(&mut to, Tag(0xFFFE, 0xE000))
            .context(WriteItemHeaderSnafu)?;
        self.basic
            .encode_ul(to, len)
            .context(WriteItemHeaderSnafu)
    }

    fn encode_item_delimiter<W>(&self, mut to: W) -> Result<()>
    where
        W: Write,
    {
        self.basic
            .encode_tag(&mut to, Tag(0xFFFE, 0xE00D))
            .context(WriteItemDelimiterSnafu)?;
        self.basic.encode_ul(to, 0).context(WriteItemDelimiterSnafu)
    }

    fn encode_sequence_delimiter<W>(&self, mut to: W) -> Result<()>
    where
        W: Write,
    {
        self.basic
            .encode_tag(&mut to, Tag(0xFFFE, 0xE0DD))
            .context(WriteSequenceDelimiterSnafu)?;
        self.basic
            .encode_ul(to, 0)
            .context(WriteSequenceDelimiterSnafu)
    }

    fn header_width(&self, _de: &DataElementHeader) -> u32 {
        8
    }
}
