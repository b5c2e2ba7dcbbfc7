//! Image extraction from a fully parsed DICOM file:
//! geometry and pixel format resolution, pixel data location,
//! and routing through the appropriate pixel codec.

use dcmio_core::dataset::{DataSet, ElementValue};
use dcmio_core::{Tag, VR};
use dcmio_dictionary_std::tags;
use dcmio_encoding::transfer_syntax::TransferSyntax;
use dcmio_object::DicomFile;
use smallvec::SmallVec;
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};

use crate::adapters::{self, JpegCodec, PixelCodec, RleCodec};
use crate::image::{Compression, Image};
use crate::photometric::PhotometricInterpretation;
use crate::pixel_format::{PixelFormat, PixelRepresentation};

/// Storage SOP classes which describe image objects.
#[rustfmt::skip]
const IMAGE_STORAGE_CLASSES: &[&str] = &[
    "1.2.840.10008.5.1.4.1.1.1",     // Computed Radiography
    "1.2.840.10008.5.1.4.1.1.2",     // CT
    "1.2.840.10008.5.1.4.1.1.3",     // US Multi-frame (retired)
    "1.2.840.10008.5.1.4.1.1.4",     // MR
    "1.2.840.10008.5.1.4.1.1.5",     // Nuclear Medicine (retired)
    "1.2.840.10008.5.1.4.1.1.6",     // US (retired)
    "1.2.840.10008.5.1.4.1.1.6.1",   // US
    "1.2.840.10008.5.1.4.1.1.7",     // Secondary Capture
    "1.2.840.10008.5.1.4.1.1.12.1",  // X-Ray Angiography
    "1.2.840.10008.5.1.4.1.1.12.2",  // X-Ray RF
    "1.2.840.10008.5.1.4.1.1.20",    // Nuclear Medicine
    "1.2.840.10008.5.1.4.1.1.128",   // PET
    "1.2.840.10008.5.1.4.1.1.481.1", // RT Image
];

/// Storage SOP classes recognized as something other than an image.
#[rustfmt::skip]
const NON_IMAGE_STORAGE_CLASSES: &[&str] = &[
    "1.2.840.10008.5.1.4.1.1.11.1",  // Grayscale Softcopy Presentation State
    "1.2.840.10008.5.1.4.1.1.66",    // Raw Data
    "1.2.840.10008.5.1.4.1.1.88.11", // Basic Text SR
    "1.2.840.10008.5.1.4.1.1.88.22", // Enhanced SR
    "1.2.840.10008.5.1.4.1.1.481.2", // RT Dose
    "1.2.840.10008.5.1.4.1.1.481.3", // RT Structure Set
    "1.2.840.10008.5.1.4.1.1.481.5", // RT Plan
];

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A geometry or pixel description attribute required for
    /// building the image descriptor is absent.
    #[snafu(display("Missing mandatory attribute {} {}", tag, name))]
    MissingMandatoryElement {
        tag: Tag,
        name: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("Attribute {} {} has a malformed value", tag, name))]
    InvalidValue {
        tag: Tag,
        name: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("Unsupported pixel representation code {}", code))]
    UnsupportedPixelRepresentation { code: u16, backtrace: Backtrace },
    #[snafu(display("No pixel data element in the data set"))]
    MissingPixelData { backtrace: Backtrace },
    #[snafu(display("Object is not an image (SOP class {})", sop_class))]
    NotAnImage {
        sop_class: String,
        backtrace: Backtrace,
    },
    /// Every identification heuristic was exhausted without finding
    /// a readable image.
    #[snafu(display("Cannot identify an image in this object"))]
    CannotIdentifyImage { backtrace: Backtrace },
    #[snafu(display("Compressed pixel data is not encapsulated in fragments"))]
    NotEncapsulated { backtrace: Backtrace },
    #[snafu(display(
        "Pixel buffer has {} bytes where {} were expected",
        got,
        expected
    ))]
    BufferSizeMismatch {
        got: usize,
        expected: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not reconstruct the fragmented buffer: {}", source))]
    ReconstructBuffer {
        source: dcmio_core::dataset::FragmentBufferError,
    },
    #[snafu(display("Pixel codec failed: {}", source))]
    Codec { source: adapters::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Build the image descriptor and decode the pixel buffer from a
/// fully parsed file.
///
/// The identification fallback chain is applied in order:
/// the declared media storage class, the SOP class UID in the data
/// set, the ACR-NEMA heuristic, and finally a last attempt keyed on
/// the mere presence of a pixel data element.
pub fn decode_image(file: &DicomFile) -> Result<Image> {
    let ds = &file.dataset;
    let ts = file.transfer_syntax();

    let declared_class = file
        .meta
        .as_ref()
        .and_then(|meta| meta.media_storage_sop_class_uid());
    if let Some(uid) = declared_class {
        if is_image_storage(uid) {
            return read_standard_image(file, compression_of(ts));
        }
        if is_known_storage(uid) {
            return NotAnImageSnafu { sop_class: uid }.fail();
        }
        tracing::warn!("unrecognized media storage class {}", uid);
    }

    // the media storage class did not identify an image;
    // check the SOP class UID inside the data set
    if let Some(uid) = read_trimmed_str(ds, tags::SOP_CLASS_UID) {
        return if is_image_storage(&uid) {
            tracing::warn!("image SOP class declared only in the data set");
            read_standard_image(file, Compression::Raw)
        } else {
            NotAnImageSnafu { sop_class: uid }.fail()
        };
    }

    if ts == TransferSyntax::ImplicitVRBigEndianAcrNema || file.meta.is_none() {
        // this layout has a high probability of being ACR-NEMA
        tracing::warn!("object looks like an ACR-NEMA file");
        return read_acr_nema_image(file);
    }

    tracing::warn!("attempting to read pixel data without identification");
    if ds.contains(tags::PIXEL_DATA) {
        read_standard_image(file, Compression::Raw)
    } else {
        CannotIdentifyImageSnafu.fail()
    }
}

fn is_image_storage(uid: &str) -> bool {
    let uid = uid.trim_end_matches(|c| c == '\0' || c == ' ');
    IMAGE_STORAGE_CLASSES.contains(&uid)
}

fn is_known_storage(uid: &str) -> bool {
    let uid = uid.trim_end_matches(|c| c == '\0' || c == ' ');
    NON_IMAGE_STORAGE_CLASSES.contains(&uid)
}

fn compression_of(ts: TransferSyntax) -> Compression {
    match ts {
        TransferSyntax::RleLossless => Compression::Rle,
        TransferSyntax::JpegBaseline => Compression::Jpeg,
        _ => Compression::Raw,
    }
}

fn read_standard_image(file: &DicomFile, compression: Compression) -> Result<Image> {
    let ds = &file.dataset;
    let swap = file.transfer_syntax().swap_code();

    if ds.contains(tags::RECOGNITION_CODE) {
        tracing::warn!("mixture of ACR-NEMA and DICOM attributes");
    }

    let mut dimensions: SmallVec<[u32; 3]> = SmallVec::new();
    dimensions.push(u32::from(read_u16_required(ds, tags::COLUMNS, "Columns")?));
    dimensions.push(u32::from(read_u16_required(ds, tags::ROWS, "Rows")?));
    if let Some(frames) = read_is(ds, tags::NUMBER_OF_FRAMES)? {
        if frames > 1 {
            dimensions.push(frames as u32);
        } else {
            tracing::debug!("number of frames specified as {}", frames);
        }
    }

    let pixel_format = read_pixel_format(ds)?;

    let planar_configuration = read_u16(ds, tags::PLANAR_CONFIGURATION)?.unwrap_or(0);

    let photometric_interpretation = read_trimmed_str(ds, tags::PHOTOMETRIC_INTERPRETATION)
        .context(MissingMandatoryElementSnafu {
            tag: tags::PHOTOMETRIC_INTERPRETATION,
            name: "PhotometricInterpretation",
        })?
        .parse::<PhotometricInterpretation>()
        .unwrap_or(PhotometricInterpretation::Monochrome2);

    finish_image(
        file,
        dimensions,
        pixel_format,
        photometric_interpretation,
        planar_configuration,
        compression,
        swap,
    )
}

fn read_acr_nema_image(file: &DicomFile) -> Result<Image> {
    let ds = &file.dataset;
    let swap = file.transfer_syntax().swap_code();

    let mut dimensions: SmallVec<[u32; 3]> = SmallVec::new();
    dimensions.push(u32::from(read_u16_required(ds, tags::COLUMNS, "Columns")?));
    dimensions.push(u32::from(read_u16_required(ds, tags::ROWS, "Rows")?));
    match read_u16(ds, tags::IMAGE_DIMENSIONS)? {
        Some(2) | None => {
            if !ds.contains(tags::IMAGE_DIMENSIONS) {
                tracing::warn!("attempting a guess for the number of dimensions");
            }
        }
        Some(3) => {
            dimensions.push(u32::from(read_u16_required(ds, tags::PLANES, "Planes")?));
        }
        Some(_) => {
            return InvalidValueSnafu {
                tag: tags::IMAGE_DIMENSIONS,
                name: "ImageDimensions",
            }
            .fail()
        }
    }

    // LIBIDO-produced files declare their dimensions transposed
    if let Some(code) = read_trimmed_str(ds, tags::RECOGNITION_CODE) {
        if code == "ACRNEMA_LIBIDO_1.1" {
            tracing::warn!("LIBIDO recognition code, transposing rows and columns");
            dimensions.swap(0, 1);
        } else if code != "ACR-NEMA 1.0" && code != "ACR-NEMA 2.0" {
            tracing::warn!("unexpected recognition code `{}`", code);
        }
    } else {
        tracing::warn!("reading as ACR-NEMA an object which does not look like ACR-NEMA");
    }

    let pixel_format = read_pixel_format(ds)?;

    // ACR-NEMA has no photometric interpretation attribute
    finish_image(
        file,
        dimensions,
        pixel_format,
        PhotometricInterpretation::Monochrome2,
        0,
        Compression::Raw,
        swap,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish_image(
    file: &DicomFile,
    dimensions: SmallVec<[u32; 3]>,
    pixel_format: PixelFormat,
    photometric_interpretation: PhotometricInterpretation,
    planar_configuration: u16,
    compression: Compression,
    swap: dcmio_encoding::swap::SwapCode,
) -> Result<Image> {
    let ds = &file.dataset;
    let pixel_element = match ds.element(tags::PIXEL_DATA) {
        Some(elem) => elem,
        None => {
            tracing::warn!("no pixel data found");
            return MissingPixelDataSnafu.fail();
        }
    };
    let need_byte_swap = pixel_element.vr() == VR::OW;

    let pixels: u64 = dimensions.iter().map(|&d| u64::from(d)).product();
    let expected = (pixels * u64::from(pixel_format.pixel_size())) as usize;
    let frames = dimensions.get(2).copied().unwrap_or(1) as usize;
    let frame_len = expected / frames.max(1);

    let buffer = match pixel_element.value() {
        ElementValue::Bytes(data) => match compression {
            Compression::Raw => {
                if data.len() < expected {
                    return BufferSizeMismatchSnafu {
                        got: data.len(),
                        expected,
                    }
                    .fail();
                }
                if data.len() > expected {
                    tracing::debug!("pixel buffer has {} trailing bytes", data.len() - expected);
                }
                data[..expected].to_vec()
            }
            _ => return NotEncapsulatedSnafu.fail(),
        },
        ElementValue::Fragments(seq) => match compression {
            Compression::Raw => seq.combined_buffer(expected).context(ReconstructBufferSnafu)?,
            Compression::Rle | Compression::Jpeg => {
                if seq.number_of_fragments() != frames {
                    tracing::warn!(
                        "{} fragments for {} frames",
                        seq.number_of_fragments(),
                        frames
                    );
                }
                let codec: &dyn PixelCodec = match compression {
                    Compression::Rle => &RleCodec,
                    _ => &JpegCodec,
                };
                let mut buffer = Vec::with_capacity(expected);
                for fragment in seq.fragments() {
                    buffer.extend(
                        codec
                            .decode_frame(fragment.data(), frame_len)
                            .context(CodecSnafu)?,
                    );
                }
                if buffer.len() != expected {
                    return BufferSizeMismatchSnafu {
                        got: buffer.len(),
                        expected,
                    }
                    .fail();
                }
                buffer
            }
        },
        ElementValue::Items(_) => return MissingPixelDataSnafu.fail(),
    };

    Ok(Image::new(
        dimensions,
        pixel_format,
        photometric_interpretation,
        planar_configuration,
        swap,
        compression,
        need_byte_swap,
        buffer,
    ))
}

fn read_pixel_format(ds: &DataSet) -> Result<PixelFormat> {
    let samples_per_pixel = read_u16(ds, tags::SAMPLES_PER_PIXEL)?.unwrap_or(1);
    let bits_allocated = read_u16_required(ds, tags::BITS_ALLOCATED, "BitsAllocated")?;
    let bits_stored = read_u16_required(ds, tags::BITS_STORED, "BitsStored")?;
    let high_bit = read_u16_required(ds, tags::HIGH_BIT, "HighBit")?;
    let code = read_u16_required(ds, tags::PIXEL_REPRESENTATION, "PixelRepresentation")?;
    let pixel_representation = PixelRepresentation::from_code(code)
        .context(UnsupportedPixelRepresentationSnafu { code })?;
    Ok(PixelFormat {
        samples_per_pixel,
        bits_allocated,
        bits_stored,
        high_bit,
        pixel_representation,
    })
}

/// Read a 16-bit scalar value; element values are kept in native
/// byte order by the data set reader.
fn read_u16(ds: &DataSet, tag: Tag) -> Result<Option<u16>> {
    match ds.element_bytes(tag) {
        None => Ok(None),
        Some(bytes) if bytes.len() >= 2 => Ok(Some(u16::from_le_bytes([bytes[0], bytes[1]]))),
        Some(_) => InvalidValueSnafu { tag, name: "" }.fail(),
    }
}

fn read_u16_required(ds: &DataSet, tag: Tag, name: &'static str) -> Result<u16> {
    match read_u16(ds, tag) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => MissingMandatoryElementSnafu { tag, name }.fail(),
        Err(_) => InvalidValueSnafu { tag, name }.fail(),
    }
}

/// Read an integer string value, such as Number of Frames.
fn read_is(ds: &DataSet, tag: Tag) -> Result<Option<i32>> {
    match ds.element_bytes(tag) {
        None => Ok(None),
        Some(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| InvalidValueSnafu { tag, name: "" }.build())?;
            let value = text
                .trim_matches(|c| c == ' ' || c == '\0')
                .parse::<i32>()
                .map_err(|_| InvalidValueSnafu { tag, name: "" }.build())?;
            Ok(Some(value))
        }
    }
}

fn read_trimmed_str(ds: &DataSet, tag: Tag) -> Option<String> {
    ds.element_bytes(tag).and_then(|bytes| {
        std::str::from_utf8(bytes)
            .ok()
            .map(|s| s.trim_end_matches(|c| c == ' ' || c == '\0').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_format::ScalarType;
    use dcmio_core::dataset::{
        DataElement, DataSet, EncodingMode, Fragment, SequenceOfFragments,
    };
    use dcmio_object::FileMetaTableBuilder;

    fn put_us(ds: &mut DataSet, tag: Tag, value: u16) {
        ds.put(DataElement::new(tag, VR::US, value.to_le_bytes().to_vec()));
    }

    fn image_file(ts: TransferSyntax, dataset: DataSet) -> DicomFile {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .media_storage_sop_instance_uid("1.2.3.4")
            .transfer_syntax(ts.uid().unwrap())
            .build()
            .unwrap();
        DicomFile::new(Some([0u8; 128]), Some(meta), dataset, ts)
    }

    fn geometry_data_set(cols: u16, rows: u16) -> DataSet {
        let mut ds = DataSet::new(EncodingMode::Explicit);
        put_us(&mut ds, tags::SAMPLES_PER_PIXEL, 1);
        ds.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            b"MONOCHROME2 ".to_vec(),
        ));
        put_us(&mut ds, tags::ROWS, rows);
        put_us(&mut ds, tags::COLUMNS, cols);
        put_us(&mut ds, tags::BITS_ALLOCATED, 16);
        put_us(&mut ds, tags::BITS_STORED, 12);
        put_us(&mut ds, tags::HIGH_BIT, 11);
        put_us(&mut ds, tags::PIXEL_REPRESENTATION, 0);
        ds
    }

    #[test]
    fn geometry_extraction() {
        let mut ds = geometry_data_set(512, 512);
        ds.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            vec![0u8; 512 * 512 * 2],
        ));
        let file = image_file(TransferSyntax::ExplicitVRLittleEndian, ds);
        let image = decode_image(&file).unwrap();

        assert_eq!(image.number_of_dimensions(), 2);
        assert_eq!(image.dimensions(), &[512, 512]);
        assert_eq!(image.pixel_format().scalar_type(), ScalarType::UInt16);
        assert_eq!(image.buffer_length(), 512 * 512 * 2);
        assert_eq!(image.buffer().len(), 512 * 512 * 2);
        assert!(image.need_byte_swap());
    }

    #[test]
    fn missing_geometry_fails() {
        let mut ds = geometry_data_set(16, 16);
        ds.take(tags::ROWS);
        ds.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            vec![0u8; 16 * 16 * 2],
        ));
        let file = image_file(TransferSyntax::ExplicitVRLittleEndian, ds);
        assert!(matches!(
            decode_image(&file),
            Err(Error::MissingMandatoryElement { name: "Rows", .. })
        ));
    }

    #[test]
    fn missing_pixel_data_fails() {
        let ds = geometry_data_set(16, 16);
        let file = image_file(TransferSyntax::ExplicitVRLittleEndian, ds);
        assert!(matches!(
            decode_image(&file),
            Err(Error::MissingPixelData { .. })
        ));
    }

    #[test]
    fn non_image_sop_class_fails() {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.88.11")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let file = DicomFile::new(
            Some([0u8; 128]),
            Some(meta),
            DataSet::new(EncodingMode::Explicit),
            TransferSyntax::ExplicitVRLittleEndian,
        );
        assert!(matches!(decode_image(&file), Err(Error::NotAnImage { .. })));
    }

    #[test]
    fn rle_pixel_data_is_decompressed() {
        let mut ds = geometry_data_set(4, 4);
        put_us(&mut ds, tags::BITS_ALLOCATED, 8);
        put_us(&mut ds, tags::BITS_STORED, 8);
        put_us(&mut ds, tags::HIGH_BIT, 7);

        // one frame: header + one segment, repeat 0x55 sixteen times
        let mut fragment = Vec::new();
        fragment.extend_from_slice(&1u32.to_le_bytes());
        fragment.extend_from_slice(&64u32.to_le_bytes());
        fragment.extend_from_slice(&[0u8; 4 * 14]);
        fragment.extend_from_slice(&[0xF1, 0x55]); // -15: sixteen repeats

        ds.put(DataElement::new_fragments(
            tags::PIXEL_DATA,
            VR::OB,
            SequenceOfFragments::new(vec![], vec![Fragment(fragment)]),
        ));
        let file = image_file(TransferSyntax::RleLossless, ds);
        let image = decode_image(&file).unwrap();
        assert_eq!(image.compression(), Compression::Rle);
        assert_eq!(image.buffer(), &[0x55u8; 16][..]);
    }

    #[test]
    fn acr_nema_libido_transposition() {
        let mut ds = DataSet::new(EncodingMode::Implicit);
        put_us(&mut ds, tags::IMAGE_DIMENSIONS, 2);
        ds.put(DataElement::new(
            tags::RECOGNITION_CODE,
            VR::SH,
            b"ACRNEMA_LIBIDO_1.1".to_vec(),
        ));
        put_us(&mut ds, tags::ROWS, 8);
        put_us(&mut ds, tags::COLUMNS, 4);
        put_us(&mut ds, tags::BITS_ALLOCATED, 8);
        put_us(&mut ds, tags::BITS_STORED, 8);
        put_us(&mut ds, tags::HIGH_BIT, 7);
        put_us(&mut ds, tags::PIXEL_REPRESENTATION, 0);
        ds.put(DataElement::new(tags::PIXEL_DATA, VR::OW, vec![0u8; 32]));

        let file = DicomFile::new(None, None, ds, TransferSyntax::ImplicitVRLittleEndian);
        let image = decode_image(&file).unwrap();
        // columns and rows are swapped back for LIBIDO files
        assert_eq!(image.dimensions(), &[8, 4]);
    }
}
