//! Data structures and readers of DICOM file meta information tables.
//!
//! The file meta group is always encoded in Explicit VR Little Endian,
//! regardless of the transfer syntax it announces for the data set.

use dcmio_core::header::{DataElementHeader, HasLength, Header, Length, Tag};
use dcmio_core::VR;
use dcmio_encoding::decode::{self, Decode};
use dcmio_encoding::encode::{self, Encode};
use dcmio_encoding::text::{decode_trimmed, DefaultCharacterSetCodec, TextCodec};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::io::{Read, Seek, SeekFrom, Write};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The file meta group parser could not fetch
    /// the value of a data element from its source.
    #[snafu(display("Could not read data value: {}", source))]
    ReadValueData {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    #[snafu(display("Could not reposition the source: {}", source))]
    SeekSource {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// An issue occurred while decoding the next data element
    /// in the file meta data set.
    #[snafu(display("Could not decode data element: {}", source))]
    DecodeElement { source: decode::Error },

    #[snafu(display("Could not encode data element: {}", source))]
    EncodeElement { source: encode::Error },

    #[snafu(display("Could not write data value: {}", source))]
    WriteValueData {
        backtrace: Backtrace,
        source: std::io::Error,
    },

    /// The file meta group parser could not decode
    /// the text in one of its data elements.
    #[snafu(display("Could not decode text in meta group: {}", source))]
    DecodeText {
        source: dcmio_encoding::text::DecodeTextError,
    },

    #[snafu(display("Could not encode text in meta group: {}", source))]
    EncodeText {
        source: dcmio_encoding::text::EncodeTextError,
    },

    /// A data element with an unexpected tag was retrieved:
    /// the parser was expecting another tag first,
    /// or at least one that is part of the file meta group.
    #[snafu(display("Unexpected data element tagged {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },

    /// The value length of a data element in the file meta group
    /// was unexpected.
    #[snafu(display("Unexpected length {} for data element tagged {}", length, tag))]
    UnexpectedDataValueLength {
        tag: Tag,
        length: Length,
        backtrace: Backtrace,
    },

    /// The value length of a data element is undefined,
    /// but knowing the length is required in its context.
    #[snafu(display("Undefined value length for data element tagged {}", tag))]
    UndefinedValueLength { tag: Tag, backtrace: Backtrace },

    /// A required file meta data element is missing.
    #[snafu(display("Missing data element `{}`", alias))]
    MissingElement {
        alias: &'static str,
        backtrace: Backtrace,
    },
}

type Result<T> = std::result::Result<T, Error>;

/// DICOM file meta information table.
///
/// This data type contains the relevant parts of the file meta
/// information group, most importantly the negotiated transfer syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaTable {
    /// File Meta Information Group Length, as declared in the source
    pub information_group_length: u32,
    /// File Meta Information Version
    pub information_version: Option<[u8; 2]>,
    /// Media Storage SOP Class UID
    pub media_storage_sop_class_uid: Option<String>,
    /// Media Storage SOP Instance UID
    pub media_storage_sop_instance_uid: Option<String>,
    /// Transfer Syntax UID
    pub transfer_syntax: String,
    /// Implementation Class UID
    pub implementation_class_uid: Option<String>,
    /// Implementation Version Name
    pub implementation_version_name: Option<String>,
    /// Source Application Entity Title
    pub source_application_entity_title: Option<String>,
    /// Private Information Creator UID
    pub private_information_creator_uid: Option<String>,
    /// Private Information
    pub private_information: Option<Vec<u8>>,
}

impl FileMetaTable {
    /// Read the file meta group, if one is present at the current
    /// position. Returns `None`, with the position restored,
    /// if the stream does not start with a group `0002` element
    /// (legacy layouts carry no meta information at all).
    pub fn read_from<S>(source: &mut S) -> Result<Option<FileMetaTable>>
    where
        S: Read + Seek,
    {
        let start = source.stream_position().context(SeekSourceSnafu)?;
        let mut probe = [0u8; 2];
        match source.read_exact(&mut probe) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                source
                    .seek(SeekFrom::Start(start))
                    .context(SeekSourceSnafu)?;
                return Ok(None);
            }
            Err(e) => return Err(e).context(ReadValueDataSnafu),
        }
        source
            .seek(SeekFrom::Start(start))
            .context(SeekSourceSnafu)?;
        if u16::from_le_bytes(probe) != 0x0002 {
            return Ok(None);
        }
        Self::read_group(source).map(Some)
    }

    fn read_group<S>(source: &mut S) -> Result<FileMetaTable>
    where
        S: Read,
    {
        let decoder = decode::file_header_decoder();
        let text = DefaultCharacterSetCodec;

        // the group starts with its own length element
        let (elem, _) = decoder.decode_header(source).context(DecodeElementSnafu)?;
        if elem.tag() != Tag(0x0002, 0x0000) {
            return UnexpectedTagSnafu { tag: elem.tag() }.fail();
        }
        if elem.length() != Length(4) {
            return UnexpectedDataValueLengthSnafu {
                tag: elem.tag(),
                length: elem.length(),
            }
            .fail();
        }
        let mut buf = [0u8; 4];
        source.read_exact(&mut buf).context(ReadValueDataSnafu)?;
        let group_length = u32::from_le_bytes(buf);

        let mut builder = FileMetaTableBuilder::new().group_length(group_length);
        let mut remaining = group_length;

        while remaining > 0 {
            let (elem, header_len) =
                decoder.decode_header(source).context(DecodeElementSnafu)?;
            let len = elem
                .length()
                .get()
                .context(UndefinedValueLengthSnafu { tag: elem.tag() })?;
            let mut value = vec![0u8; len as usize];
            source.read_exact(&mut value).context(ReadValueDataSnafu)?;
            remaining = remaining.saturating_sub(header_len as u32 + len);

            builder = match elem.tag() {
                Tag(0x0002, 0x0001) => {
                    if value.len() != 2 {
                        return UnexpectedDataValueLengthSnafu {
                            tag: elem.tag(),
                            length: elem.length(),
                        }
                        .fail();
                    }
                    builder.information_version([value[0], value[1]])
                }
                Tag(0x0002, 0x0002) => builder.media_storage_sop_class_uid(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0003) => builder.media_storage_sop_instance_uid(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0010) => builder
                    .transfer_syntax(decode_trimmed(&text, &value).context(DecodeTextSnafu)?),
                Tag(0x0002, 0x0012) => builder.implementation_class_uid(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0013) => builder.implementation_version_name(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0016) => builder.source_application_entity_title(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0100) => builder.private_information_creator_uid(
                    decode_trimmed(&text, &value).context(DecodeTextSnafu)?,
                ),
                Tag(0x0002, 0x0102) => builder.private_information(value),
                Tag(0x0002, _) => {
                    // unsupported or non-standard meta attribute
                    tracing::debug!("ignoring meta group attribute {}", elem.tag());
                    builder
                }
                tag => return UnexpectedTagSnafu { tag }.fail(),
            };
        }

        builder.build()
    }

    /// The announced transfer syntax UID, without padding.
    pub fn transfer_syntax(&self) -> &str {
        &self.transfer_syntax
    }

    /// The media storage SOP class UID, if announced.
    pub fn media_storage_sop_class_uid(&self) -> Option<&str> {
        self.media_storage_sop_class_uid.as_deref()
    }

    /// Replace the announced transfer syntax.
    pub fn set_transfer_syntax(&mut self, uid: &str) {
        self.transfer_syntax = uid.trim_end_matches(|c| c == '\0' || c == ' ').to_string();
    }

    /// Serialize the file meta group, always in Explicit VR Little
    /// Endian. The group length is recomputed from the actual content.
    pub fn write_to<W>(&self, to: &mut W) -> Result<()>
    where
        W: ?Sized + Write,
    {
        let encoder = encode::file_header_encoder();
        let text = DefaultCharacterSetCodec;

        // serialize the group body first to learn its true length
        let mut body: Vec<u8> = Vec::new();
        if let Some(version) = self.information_version {
            write_element(&encoder, &mut body, Tag(0x0002, 0x0001), VR::OB, &version)?;
        }
        if let Some(uid) = &self.media_storage_sop_class_uid {
            let value = encode_padded(&text, uid, 0x00)?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0002), VR::UI, &value)?;
        }
        if let Some(uid) = &self.media_storage_sop_instance_uid {
            let value = encode_padded(&text, uid, 0x00)?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0003), VR::UI, &value)?;
        }
        let value = encode_padded(&text, &self.transfer_syntax, 0x00)?;
        write_element(&encoder, &mut body, Tag(0x0002, 0x0010), VR::UI, &value)?;
        if let Some(uid) = &self.implementation_class_uid {
            let value = encode_padded(&text, uid, 0x00)?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0012), VR::UI, &value)?;
        }
        if let Some(name) = &self.implementation_version_name {
            let value = encode_padded(&text, name, b' ')?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0013), VR::SH, &value)?;
        }
        if let Some(title) = &self.source_application_entity_title {
            let value = encode_padded(&text, title, b' ')?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0016), VR::AE, &value)?;
        }
        if let Some(uid) = &self.private_information_creator_uid {
            let value = encode_padded(&text, uid, 0x00)?;
            write_element(&encoder, &mut body, Tag(0x0002, 0x0100), VR::UI, &value)?;
        }
        if let Some(info) = &self.private_information {
            write_element(&encoder, &mut body, Tag(0x0002, 0x0102), VR::OB, info)?;
        }

        let header = DataElementHeader::new(Tag(0x0002, 0x0000), VR::UL, Length(4));
        encoder
            .encode_element_header(&mut *to, header)
            .context(EncodeElementSnafu)?;
        to.write_all(&(body.len() as u32).to_le_bytes())
            .context(WriteValueDataSnafu)?;
        to.write_all(&body).context(WriteValueDataSnafu)?;
        Ok(())
    }

    /// The number of bytes this table occupies on the wire,
    /// group length element included.
    pub fn encoded_size(&self) -> Result<u64> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf.len() as u64)
    }
}

fn write_element<E, W>(
    encoder: &E,
    to: &mut W,
    tag: Tag,
    vr: VR,
    value: &[u8],
) -> Result<()>
where
    E: Encode,
    W: ?Sized + Write,
{
    let header = DataElementHeader::new(tag, vr, Length(value.len() as u32));
    encoder
        .encode_element_header(&mut *to, header)
        .context(EncodeElementSnafu)?;
    to.write_all(value).context(WriteValueDataSnafu)
}

fn encode_padded(text: &DefaultCharacterSetCodec, value: &str, pad: u8) -> Result<Vec<u8>> {
    let mut bytes = text.encode(value).context(EncodeTextSnafu)?;
    if bytes.len() % 2 != 0 {
        bytes.push(pad);
    }
    Ok(bytes)
}

/// A builder for the file meta information table.
#[derive(Debug, Default, Clone)]
pub struct FileMetaTableBuilder {
    group_length: Option<u32>,
    information_version: Option<[u8; 2]>,
    media_storage_sop_class_uid: Option<String>,
    media_storage_sop_instance_uid: Option<String>,
    transfer_syntax: Option<String>,
    implementation_class_uid: Option<String>,
    implementation_version_name: Option<String>,
    source_application_entity_title: Option<String>,
    private_information_creator_uid: Option<String>,
    private_information: Option<Vec<u8>>,
}

impl FileMetaTableBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        FileMetaTableBuilder::default()
    }

    /// Define the file meta group length.
    pub fn group_length(mut self, value: u32) -> Self {
        self.group_length = Some(value);
        self
    }

    /// Define the file meta information version.
    pub fn information_version(mut self, value: [u8; 2]) -> Self {
        self.information_version = Some(value);
        self
    }

    /// Define the media storage SOP class UID.
    pub fn media_storage_sop_class_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.media_storage_sop_class_uid = Some(value.into());
        self
    }

    /// Define the media storage SOP instance UID.
    pub fn media_storage_sop_instance_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.media_storage_sop_instance_uid = Some(value.into());
        self
    }

    /// Define the transfer syntax UID.
    pub fn transfer_syntax<T: Into<String>>(mut self, value: T) -> Self {
        self.transfer_syntax = Some(value.into());
        self
    }

    /// Define the implementation class UID.
    pub fn implementation_class_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.implementation_class_uid = Some(value.into());
        self
    }

    /// Define the implementation version name.
    pub fn implementation_version_name<T: Into<String>>(mut self, value: T) -> Self {
        self.implementation_version_name = Some(value.into());
        self
    }

    /// Define the source application entity title.
    pub fn source_application_entity_title<T: Into<String>>(mut self, value: T) -> Self {
        self.source_application_entity_title = Some(value.into());
        self
    }

    /// Define the private information creator UID.
    pub fn private_information_creator_uid<T: Into<String>>(mut self, value: T) -> Self {
        self.private_information_creator_uid = Some(value.into());
        self
    }

    /// Define the private information blob.
    pub fn private_information(mut self, value: Vec<u8>) -> Self {
        self.private_information = Some(value);
        self
    }

    /// Build the table. The transfer syntax UID is mandatory.
    pub fn build(self) -> Result<FileMetaTable> {
        let transfer_syntax = self.transfer_syntax.context(MissingElementSnafu {
            alias: "TransferSyntaxUID",
        })?;
        Ok(FileMetaTable {
            information_group_length: self.group_length.unwrap_or(0),
            information_version: self.information_version,
            media_storage_sop_class_uid: self.media_storage_sop_class_uid,
            media_storage_sop_instance_uid: self.media_storage_sop_instance_uid,
            transfer_syntax,
            implementation_class_uid: self.implementation_class_uid,
            implementation_version_name: self.implementation_version_name,
            source_application_entity_title: self.source_application_entity_title,
            private_information_creator_uid: self.private_information_creator_uid,
            private_information: self.private_information,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // manually crafting a file meta group
    #[rustfmt::skip]
    const RAW: &[u8] = &[
        0x02, 0x00, 0x00, 0x00,     // (0002,0000) group length
            b'U', b'L', 0x04, 0x00,
            0x4C, 0x00, 0x00, 0x00, // 76 bytes
        0x02, 0x00, 0x01, 0x00,     // (0002,0001) information version
            b'O', b'B', 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x01,
        0x02, 0x00, 0x02, 0x00,     // (0002,0002) media storage SOP class
            b'U', b'I', 0x1A, 0x00,
            b'1', b'.', b'2', b'.', b'8', b'4', b'0', b'.', b'1', b'0', b'0', b'0', b'8', b'.',
            b'5', b'.', b'1', b'.', b'4', b'.', b'1', b'.', b'1', b'.', b'7', 0x00,
        0x02, 0x00, 0x10, 0x00,     // (0002,0010) transfer syntax
            b'U', b'I', 0x14, 0x00,
            b'1', b'.', b'2', b'.', b'8', b'4', b'0', b'.', b'1', b'0', b'0', b'0', b'8', b'.',
            b'1', b'.', b'2', b'.', b'1', 0x00,
    ];

    #[test]
    fn read_meta_group() {
        let mut cursor = Cursor::new(RAW);
        let table = FileMetaTable::read_from(&mut cursor)
            .unwrap()
            .expect("meta group should be detected");
        assert_eq!(table.information_group_length, 76);
        assert_eq!(table.information_version, Some([0x00, 0x01]));
        assert_eq!(
            table.media_storage_sop_class_uid(),
            Some("1.2.840.10008.5.1.4.1.1.7")
        );
        assert_eq!(table.transfer_syntax(), "1.2.840.10008.1.2.1");
        // the stream is left at the start of the data set
        assert_eq!(cursor.stream_position().unwrap(), RAW.len() as u64);
    }

    #[test]
    fn absent_meta_group_is_none() {
        // an implicit VR data set element, not a meta group
        let raw: &[u8] = &[0x08, 0x00, 0x18, 0x00, 0x02, 0x00, 0x00, 0x00, b'1', b'2'];
        let mut cursor = Cursor::new(raw);
        assert!(FileMetaTable::read_from(&mut cursor).unwrap().is_none());
        assert_eq!(cursor.stream_position().unwrap(), 0);
    }

    #[test]
    fn write_and_reread() {
        let table = FileMetaTableBuilder::new()
            .information_version([0x00, 0x01])
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .media_storage_sop_instance_uid("1.2.3.4")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .implementation_class_uid("1.2.3.0.1")
            .build()
            .unwrap();

        let mut raw = Vec::new();
        table.write_to(&mut raw).unwrap();

        let mut cursor = Cursor::new(&raw);
        let reread = FileMetaTable::read_from(&mut cursor)
            .unwrap()
            .expect("meta group should be detected");
        assert_eq!(reread.transfer_syntax(), table.transfer_syntax());
        assert_eq!(
            reread.media_storage_sop_instance_uid,
            table.media_storage_sop_instance_uid
        );
        // the declared group length must cover the whole body
        assert_eq!(
            u64::from(reread.information_group_length) + 12,
            raw.len() as u64
        );
    }

    #[test]
    fn missing_transfer_syntax_fails_build() {
        let result = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .build();
        assert!(matches!(result, Err(Error::MissingElement { .. })));
    }
}
