//! Data set writing: serializing in-memory data sets back into an
//! element stream, mirroring the reading side.
//!
//! Definite lengths are recomputed bottom-up from the actual content;
//! undefined lengths are preserved and emitted with their delimiters.
//! Group length elements are rewritten with the true encoded size of
//! their group's content.

use dcmio_core::dataset::{DataElement, DataSet, ElementValue, EncodingMode};
use dcmio_core::header::{DataElementHeader, Header, Length, Tag};
use dcmio_core::{HasLength, VR};
use dcmio_encoding::encode::basic::BasicEncoder;
use dcmio_encoding::encode::{Encode, ModeEncoder};
use dcmio_encoding::swap::SwapCode;
use snafu::{Backtrace, ResultExt, Snafu};
use std::io::Write;

/// An error occurring while writing a data set.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not encode element header: {}", source))]
    EncodeHeader {
        source: dcmio_encoding::encode::Error,
    },
    #[snafu(display("Could not write value of element {}: {}", tag, source))]
    WriteValue {
        tag: Tag,
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A writer of full data sets over a negotiated transfer syntax.
#[derive(Debug, Clone)]
pub struct DataSetWriter {
    encoder: ModeEncoder,
    basic: BasicEncoder,
    swap: SwapCode,
}

impl DataSetWriter {
    /// Create a data set writer for the given encoding mode and swap code.
    pub fn new(mode: EncodingMode, swap: SwapCode) -> Self {
        DataSetWriter {
            encoder: ModeEncoder::new(mode, swap),
            basic: BasicEncoder::new(swap),
            swap,
        }
    }

    /// Serialize the whole data set to the given destination.
    ///
    /// Group length pseudo-elements are not copied verbatim:
    /// their value is replaced with the recomputed byte size of the
    /// remainder of their group.
    pub fn write_data_set<W>(&self, to: &mut W, ds: &DataSet) -> Result<()>
    where
        W: ?Sized + Write,
    {
        for elem in ds {
            if elem.tag().is_group_length() {
                let value = self.group_content_size(ds, elem.tag().group());
                let header = DataElementHeader::new(elem.tag(), VR::UL, Length(4));
                self.encoder
                    .encode_element_header(&mut *to, header)
                    .context(EncodeHeaderSnafu)?;
                self.basic
                    .encode_ul(&mut *to, value)
                    .context(WriteValueSnafu { tag: elem.tag() })?;
                continue;
            }
            self.write_element(to, elem)?;
        }
        Ok(())
    }

    /// Serialize a single element, including any nested content.
    pub fn write_element<W>(&self, to: &mut W, elem: &DataElement) -> Result<()>
    where
        W: ?Sized + Write,
    {
        let tag = elem.tag();
        match elem.value() {
            ElementValue::Bytes(data) => {
                let header =
                    DataElementHeader::new(tag, elem.vr(), Length(data.len() as u32));
                self.encoder
                    .encode_element_header(&mut *to, header)
                    .context(EncodeHeaderSnafu)?;
                let width = elem.vr().scalar_width();
                if elem.vr().is_binary() && width > 1 && self.swap != SwapCode::LittleEndian {
                    let mut swapped = data.clone();
                    self.swap.swap_in_place(&mut swapped, width);
                    to.write_all(&swapped).context(WriteValueSnafu { tag })?;
                } else {
                    to.write_all(data).context(WriteValueSnafu { tag })?;
                }
            }
            ElementValue::Items(seq) => {
                let len = if elem.length().is_undefined() {
                    Length::UNDEFINED
                } else {
                    Length(self.items_content_size(seq) as u32)
                };
                let header = DataElementHeader::new(tag, elem.vr(), len);
                self.encoder
                    .encode_element_header(&mut *to, header)
                    .context(EncodeHeaderSnafu)?;
                for item in seq.items() {
                    if item.length().is_undefined() {
                        self.encoder
                            .encode_item_header(&mut *to, 0xFFFF_FFFF)
                            .context(EncodeHeaderSnafu)?;
                        self.write_nested(to, item.nested())?;
                        self.encoder
                            .encode_item_delimiter(&mut *to)
                            .context(EncodeHeaderSnafu)?;
                    } else {
                        let nested_len = self.nested_content_size(item.nested()) as u32;
                        self.encoder
                            .encode_item_header(&mut *to, nested_len)
                            .context(EncodeHeaderSnafu)?;
                        self.write_nested(to, item.nested())?;
                    }
                }
                if elem.length().is_undefined() {
                    self.encoder
                        .encode_sequence_delimiter(&mut *to)
                        .context(EncodeHeaderSnafu)?;
                }
            }
            ElementValue::Fragments(seq) => {
                let header = DataElementHeader::new(tag, elem.vr(), Length::UNDEFINED);
                self.encoder
                    .encode_element_header(&mut *to, header)
                    .context(EncodeHeaderSnafu)?;
                self.encoder
                    .encode_item_header(&mut *to, seq.offset_table().len() as u32)
                    .context(EncodeHeaderSnafu)?;
                to.write_all(seq.offset_table())
                    .context(WriteValueSnafu { tag })?;
                for fragment in seq.fragments() {
                    self.encoder
                        .encode_item_header(&mut *to, fragment.len() as u32)
                        .context(EncodeHeaderSnafu)?;
                    to.write_all(fragment.data())
                        .context(WriteValueSnafu { tag })?;
                }
                self.encoder
                    .encode_sequence_delimiter(&mut *to)
                    .context(EncodeHeaderSnafu)?;
            }
        }
        Ok(())
    }

    fn write_nested<W>(&self, to: &mut W, ds: &DataSet) -> Result<()>
    where
        W: ?Sized + Write,
    {
        self.write_data_set(to, ds)
    }

    /// The number of bytes one element occupies on the wire,
    /// header included.
    pub fn element_encoded_size(&self, elem: &DataElement) -> u64 {
        let header = DataElementHeader::new(elem.tag(), elem.vr(), Length(0));
        let header_width = u64::from(self.encoder.header_width(&header));
        match elem.value() {
            ElementValue::Bytes(data) => {
                if elem.tag().is_group_length() {
                    header_width + 4
                } else {
                    header_width + data.len() as u64
                }
            }
            ElementValue::Items(seq) => {
                let mut size = header_width + self.items_content_size(seq);
                if elem.length().is_undefined() {
                    // closing sequence delimiter
                    size += 8;
                }
                size
            }
            ElementValue::Fragments(seq) => {
                let mut size = header_width;
                size += 8 + seq.offset_table().len() as u64;
                for fragment in seq.fragments() {
                    size += 8 + fragment.len() as u64;
                }
                // closing sequence delimiter
                size + 8
            }
        }
    }

    fn items_content_size(&self, seq: &dcmio_core::SequenceOfItems) -> u64 {
        let mut size = 0u64;
        for item in seq.items() {
            size += 8 + self.nested_content_size(item.nested());
            if item.length().is_undefined() {
                // closing item delimiter
                size += 8;
            }
        }
        size
    }

    fn nested_content_size(&self, ds: &DataSet) -> u64 {
        ds.iter().map(|e| self.element_encoded_size(e)).sum()
    }

    fn group_content_size(&self, ds: &DataSet, group: u16) -> u32 {
        ds.iter()
            .filter(|e| e.tag().group() == group && !e.tag().is_group_length())
            .map(|e| self.element_encoded_size(e))
            .sum::<u64>() as u32
    }
}
