//! Explicit VR data element decoding,
//! parameterized over the stream's swap code.

use dcmio_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmio_core::{Tag, VR};
use snafu::ResultExt;
use std::io::Read;

use crate::decode::basic::BasicDecoder;
use crate::decode::{
    BadSequenceHeaderSnafu, Decode, ReadHeaderTagSnafu, ReadItemHeaderSnafu, ReadItemLengthSnafu,
    ReadLengthSnafu, ReadReservedSnafu, ReadVrSnafu, Result, UnknownVrSnafu,
};
use crate::swap::SwapCode;

/// A data element decoder for explicit VR transfer syntaxes.
///
/// The value representation of each element is read from the stream;
/// a field which matches no known VR code is a fatal decoding error.
#[derive(Debug, Default, Clone)]
pub struct ExplicitDecoder {
    basic: BasicDecoder,
}

impl ExplicitDecoder {
    /// Create an explicit VR decoder over the given swap code.
    pub fn new(swap: SwapCode) -> Self {
        ExplicitDecoder {
            basic: BasicDecoder::new(swap),
        }
    }
}

impl Decode for ExplicitDecoder {
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        let tag = self
            .basic
            .decode_tag(&mut *source)
            .context(ReadHeaderTagSnafu)?;

        if tag.group() == 0xFFFE {
            // item delimiters do not have a VR or reserved field
            let len = self
                .basic
                .decode_ul(&mut *source)
                .context(ReadItemLengthSnafu)?;
            return Ok((DataElementHeader::new(tag, VR::UN, Length(len)), 8));
        }

        let mut vr_buf = [0u8; 2];
        source.read_exact(&mut vr_buf).context(ReadVrSnafu)?;
        let vr = match VR::from_binary(vr_buf) {
            Some(vr) => vr,
            None => return UnknownVrSnafu { tag, bytes: vr_buf }.fail(),
        };

        // PS3.5 7.1.2: OB, OW, OF, SQ, UN and UT carry two reserved bytes
        // followed by a 32-bit length field; every other VR carries a
        // 16-bit length field.
        let (len, bytes_read) = if vr.has_long_header() {
            let mut reserved = [0u8; 2];
            source.read_exact(&mut reserved).context(ReadReservedSnafu)?;
            if reserved != [0, 0] {
                tracing::debug!("{}: reserved bytes of {} header are not zero", tag, vr);
            }
            let len = self.basic.decode_ul(&mut *source).context(ReadLengthSnafu)?;
            (len, 12)
        } else {
            let len = self.basic.decode_us(&mut *source).context(ReadLengthSnafu)?;
            (u32::from(len), 8)
        };

        Ok((DataElementHeader::new(tag, vr, Length(len)), bytes_read))
    }

    fn decode_item_header<S>(&self, source: &mut S) -> Result<SequenceItemHeader>
    where
        S: ?Sized + Read,
    {
        let tag = self
            .basic
            .decode_tag(&mut *source)
            .context(ReadItemHeaderSnafu)?;
        let len = self
            .basic
            .decode_ul(&mut *source)
            .context(ReadItemLengthSnafu)?;
        SequenceItemHeader::new(tag, Length(len)).context(BadSequenceHeaderSnafu)
    }

    fn decode_tag<S>(&self, source: &mut S) -> Result<Tag>
    where
        S: ?Sized + Read,
    {
        self.basic.decode_tag(source).context(ReadHeaderTagSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::ExplicitDecoder;
    use crate::decode::Decode;
    use crate::swap::SwapCode;
    use dcmio_core::header::{HasLength, Header, Length};
    use dcmio_core::{Tag, VR};
    use std::io::{Cursor, Seek, SeekFrom};

    // manually crafting some DICOM data elements
    #[rustfmt::skip]
    const RAW_LE: &[u8] = &[
        0x02, 0x00, 0x10, 0x00,     // (0002,0010) Transfer Syntax UID
            b'U', b'I',             // VR: UI
            0x14, 0x00,             // Length: 20 bytes (LE)
                // UID: 1.2.840.10008.1.2.1
                b'1', b'.', b'2', b'.', b'8', b'4', b'0', b'.', b'1', b'0', b'0', b'0', b'8', b'.',
                b'1', b'.', b'2', b'.', b'1',
                0x00,               // Padding to make length even
        0x08, 0x00, 0x1B, 0x04,     // (0008,041B) RecordKey
            b'O', b'B',             // VR: OB
            0x00, 0x00,             // Reserved, always 0
            0x02, 0x00, 0x00, 0x00, // Length: 2 bytes (LE)
                0x12, 0x34,
        0x08, 0x00, 0x40, 0x00,     // (0008,0040) Data Set Type
            b'U', b'S',             // VR: US
            0x02, 0x00,             // Length: 2 bytes (LE)
                0x07, 0x87,
    ];

    #[test]
    fn decode_explicit_le_elements() {
        let dec = ExplicitDecoder::new(SwapCode::LittleEndian);
        let mut cursor = Cursor::new(RAW_LE);

        let (elem, bytes_read) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0002, 0x0010));
        assert_eq!(elem.vr(), VR::UI);
        assert_eq!(elem.length(), Length(20));
        assert_eq!(bytes_read, 8);
        cursor.seek(SeekFrom::Current(20)).unwrap();

        let (elem, bytes_read) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0008, 0x041B));
        assert_eq!(elem.vr(), VR::OB);
        assert_eq!(elem.length(), Length(2));
        assert_eq!(bytes_read, 12);
        cursor.seek(SeekFrom::Current(2)).unwrap();

        let (elem, _) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0008, 0x0040));
        assert_eq!(elem.vr(), VR::US);
        assert_eq!(elem.length(), Length(2));
    }

    #[rustfmt::skip]
    const RAW_BE: &[u8] = &[
        0x00, 0x08, 0x00, 0x60,     // (0008,0060) Modality
            b'C', b'S',             // VR: CS
            0x00, 0x02,             // Length: 2 bytes (BE)
                b'M', b'R',
    ];

    #[test]
    fn decode_explicit_be_elements() {
        let dec = ExplicitDecoder::new(SwapCode::BigEndian);
        let mut cursor = Cursor::new(RAW_BE);

        let (elem, bytes_read) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0008, 0x0060));
        assert_eq!(elem.vr(), VR::CS);
        assert_eq!(elem.length(), Length(2));
        assert_eq!(bytes_read, 8);
    }

    #[test]
    fn unknown_vr_is_fatal() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x08, 0x00, 0x60, 0x00, // (0008,0060)
            0xAB, 0xCD,             // not a VR
            0x02, 0x00,
        ];
        let dec = ExplicitDecoder::new(SwapCode::LittleEndian);
        let mut cursor = Cursor::new(raw);
        assert!(dec.decode_header(&mut cursor).is_err());
    }

    // manually crafting some DICOM sequence/item delimiters
    //  Tag: (0008,103F) Series Description Code Sequence
    //  VR: SQ, reserved bytes, undefined length
    //  Item of undefined length, item delimiter, sequence delimiter
    #[rustfmt::skip]
    const RAW_SEQUENCE_ITEMS: &[u8] = &[
        0x08, 0x00, 0x3F, 0x10, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
        0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn decode_items() {
        let dec = ExplicitDecoder::new(SwapCode::LittleEndian);
        let mut cursor = Cursor::new(RAW_SEQUENCE_ITEMS);
        {
            let (elem, bytes_read) = dec
                .decode_header(&mut cursor)
                .expect("should find an element header");
            assert_eq!(elem.tag(), Tag(0x0008, 0x103F));
            assert_eq!(elem.vr(), VR::SQ);
            assert!(elem.length().is_undefined());
            assert_eq!(bytes_read, 12);
        }
        {
            let elem = dec
                .decode_item_header(&mut cursor)
                .expect("should find an item header");
            assert!(elem.is_item());
            assert!(elem.length().is_undefined());
        }
        {
            let elem = dec
                .decode_item_header(&mut cursor)
                .expect("should find an item header");
            assert!(elem.is_item_delimiter());
        }
        {
            let elem = dec
                .decode_item_header(&mut cursor)
                .expect("should find an item header");
            assert!(elem.is_sequence_delimiter());
        }
        assert_eq!(cursor.stream_position().unwrap(), 36);
    }
}
