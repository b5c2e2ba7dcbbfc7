//! Implicit VR data element decoding,
//! parameterized over the stream's swap code.
//!
//! The value representation is not present on the wire:
//! it is resolved from the attribute dictionary, falling back to UN
//! for private attributes and attributes absent from the dictionary.

use dcmio_core::header::{DataElementHeader, Length, SequenceItemHeader};
use dcmio_core::{DataDictionary, Tag, VR};
use dcmio_dictionary_std::StandardDataDictionary;
use snafu::ResultExt;
use std::io::Read;

use crate::decode::basic::BasicDecoder;
use crate::decode::{
    BadSequenceHeaderSnafu, Decode, ReadHeaderTagSnafu, ReadItemHeaderSnafu, ReadItemLengthSnafu,
    ReadLengthSnafu, Result,
};
use crate::swap::SwapCode;

/// A data element decoder for implicit VR transfer syntaxes.
#[derive(Debug, Clone)]
pub struct ImplicitDecoder<D = StandardDataDictionary> {
    basic: BasicDecoder,
    dict: D,
}

/// An implicit VR decoder bound to the standard attribute dictionary.
pub type StandardImplicitDecoder = ImplicitDecoder<StandardDataDictionary>;

impl Default for StandardImplicitDecoder {
    fn default() -> Self {
        ImplicitDecoder::new(SwapCode::LittleEndian, StandardDataDictionary)
    }
}

impl<D> ImplicitDecoder<D>
where
    D: DataDictionary,
{
    /// Create an implicit VR decoder over the given swap code,
    /// resolving value representations from the given dictionary.
    pub fn new(swap: SwapCode, dict: D) -> Self {
        ImplicitDecoder {
            basic: BasicDecoder::new(swap),
            dict,
        }
    }

    fn resolve_vr(&self, tag: Tag) -> VR {
        if tag.group() == 0xFFFE {
            return VR::UN;
        }
        self.dict
            .by_tag(tag)
            .map(|entry| entry.vr.relaxed())
            .unwrap_or(VR::UN)
    }
}

impl<D> Decode for ImplicitDecoder<D>
where
    D: DataDictionary,
{
    fn decode_header<S>(&self, source: &mut S) -> Result<(DataElementHeader, usize)>
    where
        S: ?Sized + Read,
    {
        let tag = self
            .basic
            .decode_tag(&mut *source)
            .context(ReadHeaderTagSnafu)?;
        // the length field is always 4 bytes
        let len = self.basic.decode_ul(&mut *source).context(ReadLengthSnafu)?;
        let vr = self.resolve_vr(tag);
        Ok((DataElementHeader::new(tag, vr, Length(len)), 8))
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
    use super::*;
    use dcmio_core::header::{HasLength, Header};

    // manually crafting some implicit VR data elements
    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x08, 0x00, 0x18, 0x00,     // (0008,0018) SOP Instance UID
            0x06, 0x00, 0x00, 0x00, // Length: 6
                b'1', b'.', b'2', b'.', b'3', 0x00,
        0x28, 0x00, 0x10, 0x00,     // (0028,0010) Rows
            0x02, 0x00, 0x00, 0x00, // Length: 2
                0x00, 0x02,
        0x09, 0x00, 0x01, 0x10,     // (0009,1001) private attribute
            0x02, 0x00, 0x00, 0x00, // Length: 2
                0xAB, 0xCD,
    ];

    #[test]
    fn decode_implicit_le_elements() {
        let dec = StandardImplicitDecoder::default();
        let mut cursor = std::io::Cursor::new(RAW);

        let (elem, bytes_read) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0008, 0x0018));
        assert_eq!(elem.vr(), VR::UI);
        assert_eq!(elem.length(), Length(6));
        assert_eq!(bytes_read, 8);
        std::io::copy(
            &mut std::io::Read::by_ref(&mut cursor).take(6),
            &mut std::io::sink(),
        )
        .unwrap();

        let (elem, _) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0028, 0x0010));
        assert_eq!(elem.vr(), VR::US);
        std::io::copy(
            &mut std::io::Read::by_ref(&mut cursor).take(2),
            &mut std::io::sink(),
        )
        .unwrap();

        // private attribute outside the dictionary falls back to UN
        let (elem, _) = dec
            .decode_header(&mut cursor)
            .expect("should find an element");
        assert_eq!(elem.tag(), Tag(0x0009, 0x1001));
        assert_eq!(elem.vr(), VR::UN);
        assert_eq!(elem.length(), Length(2));
    }

    #[test]
    fn resolve_group_length_and_creator() {
        let dec = StandardImplicitDecoder::default();
        assert_eq!(dec.resolve_vr(Tag(0x0008, 0x0000)), VR::UL);
        assert_eq!(dec.resolve_vr(Tag(0x0009, 0x0010)), VR::LO);
        assert_eq!(dec.resolve_vr(Tag(0xFFFE, 0xE000)), VR::UN);
    }
}
