//! Explicit VR data element encoding,
//! parameterized over the stream's swap code.

use dcmio_core::header::{DataElementHeader, HasLength, Header};
use dcmio_core::Tag;
use snafu::{ensure, ResultExt};
use std::io::Write;

use crate::encode::basic::BasicEncoder;
use crate::encode::{
    Encode, LengthOverflowSnafu, Result, WriteHeaderSnafu, WriteItemDelimiterSnafu,
    WriteItemHeaderSnafu, WriteSequenceDelimiterSnafu, WriteTagSnafu,
};
use crate::swap::SwapCode;

/// A concrete encoder for explicit VR transfer syntaxes.
#[derive(Debug, Default, Clone)]
pub struct ExplicitEncoder {
    basic: BasicEncoder,
}

impl ExplicitEncoder {
    /// Create an explicit VR encoder over the given swap code.
    pub fn new(swap: SwapCode) -> Self {
        ExplicitEncoder {
            basic: BasicEncoder::new(swap),
        }
    }
}

impl Encode for ExplicitEncoder {
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
        let vr = de.vr();
        self.basic
            .encode_tag(&mut to, de.tag())
            .context(WriteHeaderSnafu)?;
        to.write_all(&vr.to_bytes()).context(WriteHeaderSnafu)?;
        if vr.has_long_header() {
            // PS3.5 7.1.2: two reserved bytes, set to zero,
            // then a 32-bit length field
            to.write_all(&[0u8, 0]).context(WriteHeaderSnafu)?;
            self.basic
                .encode_ul(&mut to, de.length().0)
                .context(WriteHeaderSnafu)?;
            Ok(12)
        } else {
            let len = de.length().0;
            ensure!(
                len <= u32::from(u16::MAX),
                LengthOverflowSnafu { tag: de.tag(), len }
            );
            self.basic
                .encode_us(&mut to, len as u16)
                .context(WriteHeaderSnafu)?;
            Ok(8)
        }
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

    fn header_width(&self, de: &DataElementHeader) -> u32 {
        if de.vr().has_long_header() {
            12
        } else {
            8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::{Length, VR};

    #[test]
    fn short_headers_use_16_bit_lengths() {
        let enc = ExplicitEncoder::new(SwapCode::LittleEndian);
        let mut out = Vec::new();
        let de = DataElementHeader::new((0x0008u16, 0x0060u16), VR::CS, Length(2));
        let written = enc.encode_element_header(&mut out, de).unwrap();
        assert_eq!(written, 8);
        assert_eq!(out, &[0x08, 0x00, 0x60, 0x00, b'C', b'S', 0x02, 0x00]);
    }

    #[test]
    fn long_headers_use_reserved_bytes_and_32_bit_lengths() {
        let enc = ExplicitEncoder::new(SwapCode::LittleEndian);
        for vr in [VR::OB, VR::OW, VR::OF, VR::SQ, VR::UN, VR::UT] {
            let mut out = Vec::new();
            let de = DataElementHeader::new((0x7FE0u16, 0x0010u16), vr, Length(0x0206));
            let written = enc.encode_element_header(&mut out, de).unwrap();
            assert_eq!(written, 12);
            // reserved bytes must be zero
            assert_eq!(&out[6..8], &[0x00, 0x00]);
            assert_eq!(&out[8..12], &[0x06, 0x02, 0x00, 0x00]);
        }
    }

    #[test]
    fn oversized_short_header_is_refused() {
        let enc = ExplicitEncoder::new(SwapCode::LittleEndian);
        let mut out = Vec::new();
        let de = DataElementHeader::new((0x0010u16, 0x0010u16), VR::PN, Length(0x1_0000));
        assert!(enc.encode_element_header(&mut out, de).is_err());
    }

    #[test]
    fn delimiters() {
        let enc = ExplicitEncoder::new(SwapCode::LittleEndian);
        let mut out = Vec::new();
        enc.encode_item_header(&mut out, 0xFFFF_FFFF).unwrap();
        enc.encode_item_delimiter(&mut out).unwrap();
        enc.encode_sequence_delimiter(&mut out).unwrap();
        #[rustfmt::skip]
        assert_eq!(
            out,
            &[
                0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
                0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
                0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
            ]
        );
    }
}
