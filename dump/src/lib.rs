//! Human readable dumping of DICOM objects:
//! the file meta group followed by the data set,
//! one annotated line per element, recursing into sequences.

use dcmio_core::dataset::{DataSet, ElementValue};
use dcmio_core::header::{HasLength, Header};
use dcmio_core::vm::value_count;
use dcmio_core::{DataDictionary, DataElement, VR};
use dcmio_dictionary_std::StandardDataDictionary;
use dcmio_object::DicomFile;
use std::io::{Result, Write};

/// The number of characters a printed text value may occupy
/// before being elided.
const DEFAULT_TEXT_LIMIT: usize = 64;

/// Options for dumping a DICOM object.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    text_limit: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            text_limit: DEFAULT_TEXT_LIMIT,
        }
    }
}

impl DumpOptions {
    /// Create dump options with the default text limit.
    pub fn new() -> Self {
        DumpOptions::default()
    }

    /// Print text values to the end instead of eliding them.
    pub fn no_text_limit(&mut self, value: bool) -> &mut Self {
        self.text_limit = if value { usize::MAX } else { DEFAULT_TEXT_LIMIT };
        self
    }

    /// Dump the whole file to the given destination.
    pub fn dump_file<W>(&self, to: &mut W, file: &DicomFile) -> Result<()>
    where
        W: ?Sized + Write,
    {
        writeln!(to, "# Dicom-File-Format")?;
        if let Some(meta) = &file.meta {
            writeln!(to)?;
            writeln!(to, "# Dicom-Meta-Information-Header")?;
            writeln!(
                to,
                "(0002,0010) UI [{}]  # TransferSyntaxUID",
                meta.transfer_syntax()
            )?;
            if let Some(uid) = meta.media_storage_sop_class_uid() {
                writeln!(to, "(0002,0002) UI [{}]  # MediaStorageSOPClassUID", uid)?;
            }
            if let Some(uid) = &meta.media_storage_sop_instance_uid {
                writeln!(to, "(0002,0003) UI [{}]  # MediaStorageSOPInstanceUID", uid)?;
            }
            if let Some(uid) = &meta.implementation_class_uid {
                writeln!(to, "(0002,0012) UI [{}]  # ImplementationClassUID", uid)?;
            }
        }
        writeln!(to)?;
        writeln!(to, "# Dicom-Data-Set")?;
        self.dump_data_set(to, &file.dataset, 0)
    }

    /// Dump one data set at the given indentation depth.
    pub fn dump_data_set<W>(&self, to: &mut W, ds: &DataSet, depth: usize) -> Result<()>
    where
        W: ?Sized + Write,
    {
        let dict = StandardDataDictionary;
        for elem in ds {
            self.dump_element(to, elem, &dict, depth)?;
        }
        Ok(())
    }

    fn dump_element<W>(
        &self,
        to: &mut W,
        elem: &DataElement,
        dict: &StandardDataDictionary,
        depth: usize,
    ) -> Result<()>
    where
        W: ?Sized + Write,
    {
        let indent = "  ".repeat(depth);
        let entry = dict.by_tag(elem.tag());
        let alias = entry.map(|entry| entry.alias).unwrap_or("");
        match elem.value() {
            ElementValue::Bytes(data) => {
                // flag values whose count falls outside the declared
                // multiplicity
                let vm_note = entry
                    .filter(|entry| {
                        let vr = elem.vr();
                        let count = value_count(data, vr.scalar_width(), vr.is_ascii());
                        !data.is_empty() && !entry.vm.is_valid(count)
                    })
                    .map(|entry| format!(" (value count outside VM {})", entry.vm))
                    .unwrap_or_default();
                writeln!(
                    to,
                    "{}{} {} {}  # {}{}",
                    indent,
                    elem.tag(),
                    elem.vr(),
                    self.render_value(elem.vr(), data),
                    alias,
                    vm_note
                )?;
            }
            ElementValue::Items(seq) => {
                writeln!(
                    to,
                    "{}{} {} (sequence of {} items, {})  # {}",
                    indent,
                    elem.tag(),
                    elem.vr(),
                    seq.items().len(),
                    elem.length(),
                    alias
                )?;
                for item in seq.items() {
                    writeln!(to, "{}  (item, {})", indent, item.length())?;
                    self.dump_data_set(to, item.nested(), depth + 2)?;
                }
            }
            ElementValue::Fragments(seq) => {
                writeln!(
                    to,
                    "{}{} {} (encapsulated, {} fragments, {} bytes)  # {}",
                    indent,
                    elem.tag(),
                    elem.vr(),
                    seq.number_of_fragments(),
                    seq.total_byte_length(),
                    alias
                )?;
            }
        }
        Ok(())
    }

    fn render_value(&self, vr: VR, data: &[u8]) -> String {
        if vr.is_ascii() {
            let text: String = String::from_utf8_lossy(data)
                .trim_end_matches(|c| c == ' ' || c == '\0')
                .to_string();
            if text.len() > self.text_limit {
                format!("[{}...]", &text[..self.text_limit])
            } else {
                format!("[{}]", text)
            }
        } else {
            match vr {
                VR::US if data.len() == 2 => {
                    format!("{}", u16::from_le_bytes([data[0], data[1]]))
                }
                VR::SS if data.len() == 2 => {
                    format!("{}", i16::from_le_bytes([data[0], data[1]]))
                }
                VR::UL if data.len() == 4 => {
                    format!("{}", u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
                }
                VR::SL if data.len() == 4 => {
                    format!("{}", i32::from_le_bytes([data[0], data[1], data[2], data[3]]))
                }
                _ => format!("({} bytes)", data.len()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmio_core::dataset::{DataElement, DataSet, EncodingMode};
    use dcmio_core::Tag;
    use dcmio_encoding::transfer_syntax::TransferSyntax;
    use dcmio_object::FileMetaTableBuilder;

    #[test]
    fn dump_renders_annotated_lines() {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut ds = DataSet::new(EncodingMode::Explicit);
        ds.put(DataElement::new(
            Tag(0x0028, 0x0011),
            VR::US,
            vec![0x00, 0x02],
        ));
        ds.put(DataElement::new(
            Tag(0x0010, 0x0010),
            VR::PN,
            b"Doe^John".to_vec(),
        ));
        let file = DicomFile::new(None, Some(meta), ds, TransferSyntax::ExplicitVRLittleEndian);

        let mut out = Vec::new();
        DumpOptions::new().dump_file(&mut out, &file).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(0010,0010) PN [Doe^John]  # PatientName"));
        assert!(text.contains("(0028,0011) US 512  # Columns"));
    }

    #[test]
    fn dump_flags_multiplicity_violations() {
        let meta = FileMetaTableBuilder::new()
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut ds = DataSet::new(EncodingMode::Explicit);
        // ImageType requires at least two values
        ds.put(DataElement::new(
            Tag(0x0008, 0x0008),
            VR::CS,
            b"ORIGINAL".to_vec(),
        ));
        let file = DicomFile::new(None, Some(meta), ds, TransferSyntax::ExplicitVRLittleEndian);

        let mut out = Vec::new();
        DumpOptions::new().dump_file(&mut out, &file).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ImageType (value count outside VM 2-n)"));
    }
}
