//! Data set reading: assembling in-memory data sets from an element
//! stream, using the header codecs of `dcmio-encoding`.
//!
//! Sequence items and pixel data fragments are read recursively,
//! with the parent's encoding mode governing all nested content.
//! Value bytes of binary representations are brought to native byte
//! order here, so that downstream consumers never see stream order.

use dcmio_core::dataset::{
    DataElement, DataSet, ElementValue, EncodingMode, Fragment, Item, SequenceOfFragments,
    SequenceOfItems,
};
use dcmio_core::header::{DataElementHeader, Header, Length, SequenceItemHeader, Tag};
use dcmio_core::{DataDictionary, VR};
use dcmio_encoding::decode::{Decode, ModeDecoder};
use dcmio_encoding::swap::SwapCode;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::{BufRead, Read};

/// An error occurring while reading a data set.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not decode element header: {}", source))]
    DecodeHeader {
        source: dcmio_encoding::decode::Error,
    },
    #[snafu(display("Could not read value of element {}: {}", tag, source))]
    ReadValue {
        tag: Tag,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not probe the stream for more elements: {}", source))]
    ProbeStream {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// A value field of undefined length on an element which admits
    /// neither items nor fragments.
    #[snafu(display("Element {} of VR {} has undefined length", tag, vr))]
    UndefinedValueLength {
        tag: Tag,
        vr: VR,
        backtrace: Backtrace,
    },
    #[snafu(display("Unexpected delimiter in sequence of {}", tag))]
    UnexpectedDelimiter { tag: Tag, backtrace: Backtrace },
    #[snafu(display(
        "Sequence content of {} overran its declared length {} (consumed {})",
        tag,
        declared,
        consumed
    ))]
    SequenceLengthMismatch {
        tag: Tag,
        declared: u32,
        consumed: u64,
        backtrace: Backtrace,
    },
    /// The leading item of a fragment sequence must be a basic offset
    /// table of definite length.
    #[snafu(display("Fragment sequence of {} has no basic offset table", tag))]
    MissingOffsetTable { tag: Tag, backtrace: Backtrace },
    #[snafu(display("Fragment of {} has undefined length", tag))]
    UndefinedFragmentLength { tag: Tag, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A reader of full data sets over a negotiated transfer syntax.
#[derive(Debug, Clone)]
pub struct DataSetReader<D> {
    decoder: ModeDecoder<D>,
    mode: EncodingMode,
    swap: SwapCode,
}

impl<D> DataSetReader<D>
where
    D: DataDictionary,
{
    /// Create a data set reader for the given encoding mode and swap
    /// code, resolving implicit value representations from `dict`.
    pub fn new(mode: EncodingMode, swap: SwapCode, dict: D) -> Self {
        DataSetReader {
            decoder: ModeDecoder::new(mode, swap, dict),
            mode,
            swap,
        }
    }

    /// Read data elements until the end of the stream,
    /// producing one data set.
    pub fn read_data_set<S>(&self, source: &mut S) -> Result<DataSet>
    where
        S: BufRead,
    {
        let mut ds = DataSet::new(self.mode);
        loop {
            if source.fill_buf().context(ProbeStreamSnafu)?.is_empty() {
                break;
            }
            let (header, _) = self.decoder.decode_header(source).context(DecodeHeaderSnafu)?;
            let (elem, _) = self.read_element_value(source, header)?;
            ds.put(elem);
        }
        Ok(ds)
    }

    /// Read the value of an element whose header was already decoded,
    /// returning the complete element and the number of bytes consumed
    /// after the header.
    pub fn read_element_value<S>(
        &self,
        source: &mut S,
        header: DataElementHeader,
    ) -> Result<(DataElement, u64)>
    where
        S: ?Sized + Read,
    {
        let tag = header.tag();
        match header.vr() {
            VR::SQ => {
                let (seq, consumed) = self.read_items(source, tag, header.len)?;
                Ok((
                    DataElement::new_with_len(tag, VR::SQ, header.len, ElementValue::Items(seq)),
                    consumed,
                ))
            }
            // an unknown attribute of undefined length can only be
            // a sequence, encoded like the data set itself
            VR::UN if header.len.is_undefined() => {
                let (seq, consumed) = self.read_items(source, tag, header.len)?;
                Ok((
                    DataElement::new_with_len(tag, VR::UN, header.len, ElementValue::Items(seq)),
                    consumed,
                ))
            }
            VR::OB | VR::OW if header.len.is_undefined() => {
                let (seq, consumed) = self.read_fragments(source, tag)?;
                Ok((
                    DataElement::new_with_len(
                        tag,
                        header.vr(),
                        header.len,
                        ElementValue::Fragments(seq),
                    ),
                    consumed,
                ))
            }
            vr => {
                let len = match header.len.get() {
                    Some(len) => len,
                    None => return UndefinedValueLengthSnafu { tag, vr }.fail(),
                };
                let mut data = vec![0u8; len as usize];
                source.read_exact(&mut data).context(ReadValueSnafu { tag })?;
                if vr.is_binary() {
                    let width = vr.scalar_width();
                    if width > 1 {
                        self.swap.swap_in_place(&mut data, width);
                    }
                }
                Ok((
                    DataElement::new_with_len(tag, vr, header.len, ElementValue::Bytes(data)),
                    u64::from(len),
                ))
            }
        }
    }

    fn read_items<S>(
        &self,
        source: &mut S,
        tag: Tag,
        len: Length,
    ) -> Result<(SequenceOfItems, u64)>
    where
        S: ?Sized + Read,
    {
        let mut items = Vec::new();
        let mut consumed = 0u64;
        if len.is_undefined() {
            loop {
                let item_header = self
                    .decoder
                    .decode_item_header(source)
                    .context(DecodeHeaderSnafu)?;
                consumed += 8;
                match item_header {
                    SequenceItemHeader::Item { len } => {
                        let (nested, n) = self.read_item_data_set(source, tag, len)?;
                        consumed += n;
                        items.push(Item::new(len, nested));
                    }
                    SequenceItemHeader::SequenceDelimiter => break,
                    SequenceItemHeader::ItemDelimiter => {
                        return UnexpectedDelimiterSnafu { tag }.fail()
                    }
                }
            }
        } else {
            let declared = len.0;
            while consumed < u64::from(declared) {
                let item_header = self
                    .decoder
                    .decode_item_header(source)
                    .context(DecodeHeaderSnafu)?;
                consumed += 8;
                match item_header {
                    SequenceItemHeader::Item { len } => {
                        let (nested, n) = self.read_item_data_set(source, tag, len)?;
                        consumed += n;
                        items.push(Item::new(len, nested));
                    }
                    _ => return UnexpectedDelimiterSnafu { tag }.fail(),
                }
            }
            if consumed != u64::from(declared) {
                return SequenceLengthMismatchSnafu {
                    tag,
                    declared,
                    consumed,
                }
                .fail();
            }
        }
        Ok((SequenceOfItems::new(len, items), consumed))
    }

    fn read_item_data_set<S>(
        &self,
        source: &mut S,
        tag: Tag,
        len: Length,
    ) -> Result<(DataSet, u64)>
    where
        S: ?Sized + Read,
    {
        let mut ds = DataSet::new(self.mode);
        let mut consumed = 0u64;
        if len.is_undefined() {
            loop {
                let (header, header_len) = self
                    .decoder
                    .decode_header(source)
                    .context(DecodeHeaderSnafu)?;
                consumed += header_len as u64;
                if header.is_item_delimiter() {
                    if header.len.0 != 0 {
                        tracing::debug!("{}: item delimiter with non-zero length", tag);
                    }
                    break;
                }
                let (elem, n) = self.read_element_value(source, header)?;
                consumed += n;
                ds.put(elem);
            }
        } else {
            let declared = len.0;
            while consumed < u64::from(declared) {
                let (header, header_len) = self
                    .decoder
                    .decode_header(source)
                    .context(DecodeHeaderSnafu)?;
                consumed += header_len as u64;
                let (elem, n) = self.read_element_value(source, header)?;
                consumed += n;
                ds.put(elem);
            }
            if consumed != u64::from(declared) {
                return SequenceLengthMismatchSnafu {
                    tag,
                    declared,
                    consumed,
                }
                .fail();
            }
        }
        Ok((ds, consumed))
    }

    fn read_fragments<S>(&self, source: &mut S, tag: Tag) -> Result<(SequenceOfFragments, u64)>
    where
        S: ?Sized + Read,
    {
        let mut consumed = 0u64;
        // the first item is the basic offset table, often empty
        let item_header = self
            .decoder
            .decode_item_header(source)
            .context(DecodeHeaderSnafu)?;
        consumed += 8;
        let table_len = match item_header {
            SequenceItemHeader::Item { len } => match len.get() {
                Some(len) => len,
                None => return UndefinedFragmentLengthSnafu { tag }.fail(),
            },
            _ => return MissingOffsetTableSnafu { tag }.fail(),
        };
        let mut table = vec![0u8; table_len as usize];
        source
            .read_exact(&mut table)
            .context(ReadValueSnafu { tag })?;
        consumed += u64::from(table_len);

        let mut fragments = Vec::new();
        loop {
            let item_header = self
                .decoder
                .decode_item_header(source)
                .context(DecodeHeaderSnafu)?;
            consumed += 8;
            match item_header {
                SequenceItemHeader::Item { len } => {
                    let len = match len.get() {
                        Some(len) => len,
                        None => return UndefinedFragmentLengthSnafu { tag }.fail(),
                    };
                    let mut data = vec![0u8; len as usize];
                    source
                        .read_exact(&mut data)
                        .context(ReadValueSnafu { tag })?;
                    consumed += u64::from(len);
                    fragments.push(Fragment(data));
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    return UnexpectedDelimiterSnafu { tag }.fail()
                }
            }
        }
        Ok((SequenceOfFragments::new(table, fragments), consumed))
    }
}
