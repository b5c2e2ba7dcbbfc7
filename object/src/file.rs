//! Whole-file reading and writing:
//! preamble detection, file meta parsing, transfer syntax negotiation,
//! and data set codec orchestration.

use dcmio_core::dataset::DataSet;
use dcmio_core::DataDictionary;
use dcmio_dictionary_std::StandardDataDictionary;
use dcmio_encoding::transfer_syntax::{self, TransferSyntax};
use dcmio_parser::{DataSetReader, DataSetWriter};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::meta::FileMetaTable;

const DICM_MAGIC_CODE: [u8; 4] = [b'D', b'I', b'C', b'M'];

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Could not open file {}: {}", path.display(), source))]
    OpenFile {
        path: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not create file {}: {}", path.display(), source))]
    CreateFile {
        path: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read from the source: {}", source))]
    ReadSource {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write to the destination: {}", source))]
    WriteDestination {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read file meta group: {}", source))]
    ReadMeta { source: crate::meta::Error },
    #[snafu(display("Could not write file meta group: {}", source))]
    WriteMeta { source: crate::meta::Error },
    /// The announced transfer syntax UID is not in the support table.
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    /// The announced transfer syntax is recognized but its stream
    /// encoding (deflate) is not supported by this implementation.
    #[snafu(display("Deflated data sets are not supported"))]
    DeflatedUnsupported { backtrace: Backtrace },
    #[snafu(display("Could not determine the transfer syntax: {}", source))]
    GuessTransferSyntax {
        source: transfer_syntax::GuessError,
    },
    #[snafu(display("Could not read data set: {}", source))]
    ReadDataSet { source: dcmio_parser::read::Error },
    #[snafu(display("Could not write data set: {}", source))]
    WriteDataSet { source: dcmio_parser::write::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A DICOM file fully loaded in memory:
/// the optional 128-byte preamble, the optional file meta group,
/// and the main data set, together with the negotiated transfer syntax.
#[derive(Debug, Clone)]
pub struct DicomFile {
    /// The 128-byte preamble, when the source carried one.
    pub preamble: Option<[u8; 128]>,
    /// The file meta group, when the source carried one.
    pub meta: Option<FileMetaTable>,
    /// The main data set.
    pub dataset: DataSet,
    transfer_syntax: TransferSyntax,
}

impl DicomFile {
    /// Create a file object over an existing data set,
    /// to be serialized under the given transfer syntax.
    pub fn new(
        preamble: Option<[u8; 128]>,
        meta: Option<FileMetaTable>,
        dataset: DataSet,
        transfer_syntax: TransferSyntax,
    ) -> Self {
        DicomFile {
            preamble,
            meta,
            dataset,
            transfer_syntax,
        }
    }

    /// The transfer syntax negotiated when this file was read,
    /// or assigned at construction.
    pub fn transfer_syntax(&self) -> TransferSyntax {
        self.transfer_syntax
    }

    /// Serialize the whole file to the given destination:
    /// preamble (when present), file meta group (when present, forced
    /// Explicit VR Little Endian), then the data set in its own
    /// negotiated encoding.
    pub fn write_to<W>(&self, to: &mut W) -> Result<()>
    where
        W: ?Sized + Write,
    {
        if let Some(preamble) = &self.preamble {
            to.write_all(preamble).context(WriteDestinationSnafu)?;
            to.write_all(&DICM_MAGIC_CODE)
                .context(WriteDestinationSnafu)?;
        }
        if let Some(meta) = &self.meta {
            meta.write_to(to).context(WriteMetaSnafu)?;
        }
        let writer = DataSetWriter::new(
            self.transfer_syntax.encoding_mode(),
            self.transfer_syntax.swap_code(),
        );
        writer
            .write_data_set(to, &self.dataset)
            .context(WriteDataSetSnafu)
    }

    /// Serialize the whole file to a new file at the given path.
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path).context(CreateFileSnafu { path })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().context(WriteDestinationSnafu)
    }
}

/// Create a DICOM object by reading from a file.
///
/// This function assumes the standard file encoding structure,
/// tolerating the absence of the 128-byte preamble and of the file
/// meta group (legacy ACR-NEMA layouts).
pub fn open_file<P>(path: P) -> Result<DicomFile>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).context(OpenFileSnafu { path })?;
    from_reader(BufReader::new(file))
}

/// Create a DICOM object by reading from a seekable byte source,
/// using the standard attribute dictionary.
pub fn from_reader<S>(source: S) -> Result<DicomFile>
where
    S: BufRead + Seek,
{
    from_reader_with_dictionary(source, StandardDataDictionary)
}

/// Create a DICOM object by reading from a seekable byte source,
/// resolving implicit value representations from the given dictionary.
pub fn from_reader_with_dictionary<S, D>(mut source: S, dict: D) -> Result<DicomFile>
where
    S: BufRead + Seek,
    D: DataDictionary,
{
    let preamble = read_preamble(&mut source)?;
    let meta = FileMetaTable::read_from(&mut source).context(ReadMetaSnafu)?;

    let transfer_syntax = match &meta {
        Some(meta) => {
            let uid = meta.transfer_syntax();
            TransferSyntax::from_uid(uid).context(UnsupportedTransferSyntaxSnafu { uid })?
        }
        None => {
            // headerless legacy stream: probe the first element
            tracing::debug!("no file meta group, guessing the transfer syntax");
            transfer_syntax::guess_transfer_syntax(&mut source)
                .context(GuessTransferSyntaxSnafu)?
        }
    };
    if transfer_syntax == TransferSyntax::DeflatedExplicitVRLittleEndian {
        return DeflatedUnsupportedSnafu.fail();
    }

    let reader = DataSetReader::new(
        transfer_syntax.encoding_mode(),
        transfer_syntax.swap_code(),
        dict,
    );
    let dataset = reader.read_data_set(&mut source).context(ReadDataSetSnafu)?;

    Ok(DicomFile {
        preamble,
        meta,
        dataset,
        transfer_syntax,
    })
}

/// Attempt to consume the 128-byte preamble and the "DICM" marker.
/// On mismatch the source is rewound and the file is treated as
/// having no preamble.
fn read_preamble<S>(source: &mut S) -> Result<Option<[u8; 128]>>
where
    S: Read + Seek,
{
    let start = source.stream_position().context(ReadSourceSnafu)?;
    let mut buf = [0u8; 132];
    match source.read_exact(&mut buf) {
        Ok(()) => {
            if buf[128..132] == DICM_MAGIC_CODE {
                let mut preamble = [0u8; 128];
                preamble.copy_from_slice(&buf[..128]);
                return Ok(Some(preamble));
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {}
        Err(e) => return Err(e).context(ReadSourceSnafu),
    }
    tracing::debug!("no preamble marker, rewinding to the stream start");
    source
        .seek(SeekFrom::Start(start))
        .context(ReadSourceSnafu)?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::dataset::{DataElement, EncodingMode};
    use dcmio_core::{Tag, VR};
    use std::io::Cursor;

    fn full_file_bytes() -> Vec<u8> {
        let meta = crate::meta::FileMetaTableBuilder::new()
            .information_version([0x00, 0x01])
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .media_storage_sop_instance_uid("1.2.3.4")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();

        let mut dataset = DataSet::new(EncodingMode::Explicit);
        dataset.put(DataElement::new(
            Tag(0x0008, 0x0018),
            VR::UI,
            b"1.2.3.4\0".to_vec(),
        ));
        dataset.put(DataElement::new(
            Tag(0x0028, 0x0010),
            VR::US,
            vec![0x00, 0x02],
        ));

        let file = DicomFile::new(
            Some([0u8; 128]),
            Some(meta),
            dataset,
            TransferSyntax::ExplicitVRLittleEndian,
        );
        let mut raw = Vec::new();
        file.write_to(&mut raw).unwrap();
        raw
    }

    #[test]
    fn read_full_file() {
        let raw = full_file_bytes();
        let file = from_reader(Cursor::new(&raw)).unwrap();
        assert!(file.preamble.is_some());
        let meta = file.meta.as_ref().expect("should have meta");
        assert_eq!(meta.transfer_syntax(), "1.2.840.10008.1.2.1");
        assert_eq!(
            file.transfer_syntax(),
            TransferSyntax::ExplicitVRLittleEndian
        );
        assert_eq!(
            file.dataset.element_bytes(Tag(0x0008, 0x0018)),
            Some(&b"1.2.3.4\0"[..])
        );
    }

    #[test]
    fn file_round_trip_is_stable() {
        let raw = full_file_bytes();
        let file = from_reader(Cursor::new(&raw)).unwrap();
        let mut again = Vec::new();
        file.write_to(&mut again).unwrap();
        assert_eq!(raw, again);
    }

    #[test]
    fn headerless_implicit_file_is_guessed() {
        // (0008,0000) group length 4, then (0008,0018), implicit LE
        #[rustfmt::skip]
        let raw: Vec<u8> = vec![
            0x08, 0x00, 0x00, 0x00,
                0x04, 0x00, 0x00, 0x00,
                0x1A, 0x00, 0x00, 0x00,
            0x08, 0x00, 0x18, 0x00,
                0x04, 0x00, 0x00, 0x00,
                b'1', b'.', b'2', 0x00,
        ];
        let file = from_reader(Cursor::new(&raw)).unwrap();
        assert!(file.preamble.is_none());
        assert!(file.meta.is_none());
        assert_eq!(
            file.transfer_syntax(),
            TransferSyntax::ImplicitVRLittleEndian
        );
        assert_eq!(
            file.dataset.element_bytes(Tag(0x0008, 0x0018)),
            Some(&b"1.2\0"[..])
        );
    }

    #[test]
    fn garbage_is_refused() {
        let raw = vec![0xFFu8; 16];
        assert!(from_reader(Cursor::new(&raw)).is_err());
    }
}
