//! The records of the standard attribute registry.
//!
//! This table covers the attributes handled by the rest of the
//! workspace: the file meta group, SOP identification, patient and
//! study identification, image geometry and pixel description,
//! and pixel data. It is not the complete standard dictionary.

use dcmio_core::dictionary::{DictEntry, VirtualVr::*};
use dcmio_core::Tag;
use dcmio_core::VM::*;
use dcmio_core::VR::*;

/// One record of the registry: a tag and its dictionary entry.
pub type Record = (Tag, DictEntry);

/// The attribute records, ordered by tag.
#[rustfmt::skip]
pub const ENTRIES: &[Record] = &[
    // group 0002: file meta information
    (Tag(0x0002, 0x0000), DictEntry::new(Exact(UL), VM1, "FileMetaInformationGroupLength")),
    (Tag(0x0002, 0x0001), DictEntry::new(Exact(OB), VM1, "FileMetaInformationVersion")),
    (Tag(0x0002, 0x0002), DictEntry::new(Exact(UI), VM1, "MediaStorageSOPClassUID")),
    (Tag(0x0002, 0x0003), DictEntry::new(Exact(UI), VM1, "MediaStorageSOPInstanceUID")),
    (Tag(0x0002, 0x0010), DictEntry::new(Exact(UI), VM1, "TransferSyntaxUID")),
    (Tag(0x0002, 0x0012), DictEntry::new(Exact(UI), VM1, "ImplementationClassUID")),
    (Tag(0x0002, 0x0013), DictEntry::new(Exact(SH), VM1, "ImplementationVersionName")),
    (Tag(0x0002, 0x0016), DictEntry::new(Exact(AE), VM1, "SourceApplicationEntityTitle")),
    (Tag(0x0002, 0x0100), DictEntry::new(Exact(UI), VM1, "PrivateInformationCreatorUID")),
    (Tag(0x0002, 0x0102), DictEntry::new(Exact(OB), VM1, "PrivateInformation")),
    // group 0008: identification
    (Tag(0x0008, 0x0005), DictEntry::new(Exact(CS), VM1_N, "SpecificCharacterSet")),
    (Tag(0x0008, 0x0008), DictEntry::new(Exact(CS), VM2_N, "ImageType")),
    (Tag(0x0008, 0x0010), DictEntry::new(Exact(SH), VM1, "RecognitionCode")),
    (Tag(0x0008, 0x0016), DictEntry::new(Exact(UI), VM1, "SOPClassUID")),
    (Tag(0x0008, 0x0018), DictEntry::new(Exact(UI), VM1, "SOPInstanceUID")),
    (Tag(0x0008, 0x0020), DictEntry::new(Exact(DA), VM1, "StudyDate")),
    (Tag(0x0008, 0x0021), DictEntry::new(Exact(DA), VM1, "SeriesDate")),
    (Tag(0x0008, 0x0030), DictEntry::new(Exact(TM), VM1, "StudyTime")),
    (Tag(0x0008, 0x0031), DictEntry::new(Exact(TM), VM1, "SeriesTime")),
    (Tag(0x0008, 0x0050), DictEntry::new(Exact(SH), VM1, "AccessionNumber")),
    (Tag(0x0008, 0x0060), DictEntry::new(Exact(CS), VM1, "Modality")),
    (Tag(0x0008, 0x0070), DictEntry::new(Exact(LO), VM1, "Manufacturer")),
    (Tag(0x0008, 0x0080), DictEntry::new(Exact(LO), VM1, "InstitutionName")),
    (Tag(0x0008, 0x0090), DictEntry::new(Exact(PN), VM1, "ReferringPhysicianName")),
    (Tag(0x0008, 0x103E), DictEntry::new(Exact(LO), VM1, "SeriesDescription")),
    (Tag(0x0008, 0x1090), DictEntry::new(Exact(LO), VM1, "ManufacturerModelName")),
    (Tag(0x0008, 0x1140), DictEntry::new(Exact(SQ), VM1, "ReferencedImageSequence")),
    (Tag(0x0008, 0x1150), DictEntry::new(Exact(UI), VM1, "ReferencedSOPClassUID")),
    (Tag(0x0008, 0x1155), DictEntry::new(Exact(UI), VM1, "ReferencedSOPInstanceUID")),
    // group 0010: patient
    (Tag(0x0010, 0x0010), DictEntry::new(Exact(PN), VM1, "PatientName")),
    (Tag(0x0010, 0x0020), DictEntry::new(Exact(LO), VM1, "PatientID")),
    (Tag(0x0010, 0x0030), DictEntry::new(Exact(DA), VM1, "PatientBirthDate")),
    (Tag(0x0010, 0x0040), DictEntry::new(Exact(CS), VM1, "PatientSex")),
    (Tag(0x0010, 0x1010), DictEntry::new(Exact(AS), VM1, "PatientAge")),
    (Tag(0x0010, 0x1020), DictEntry::new(Exact(DS), VM1, "PatientSize")),
    (Tag(0x0010, 0x1030), DictEntry::new(Exact(DS), VM1, "PatientWeight")),
    (Tag(0x0010, 0x4000), DictEntry::new(Exact(LT), VM1, "PatientComments")),
    // group 0018: acquisition
    (Tag(0x0018, 0x0050), DictEntry::new(Exact(DS), VM1, "SliceThickness")),
    (Tag(0x0018, 0x0060), DictEntry::new(Exact(DS), VM1, "KVP")),
    (Tag(0x0018, 0x1020), DictEntry::new(Exact(LO), VM1_N, "SoftwareVersions")),
    (Tag(0x0018, 0x5100), DictEntry::new(Exact(CS), VM1, "PatientPosition")),
    // group 0020: relationship and position
    (Tag(0x0020, 0x000D), DictEntry::new(Exact(UI), VM1, "StudyInstanceUID")),
    (Tag(0x0020, 0x000E), DictEntry::new(Exact(UI), VM1, "SeriesInstanceUID")),
    (Tag(0x0020, 0x0010), DictEntry::new(Exact(SH), VM1, "StudyID")),
    (Tag(0x0020, 0x0011), DictEntry::new(Exact(IS), VM1, "SeriesNumber")),
    (Tag(0x0020, 0x0013), DictEntry::new(Exact(IS), VM1, "InstanceNumber")),
    (Tag(0x0020, 0x0032), DictEntry::new(Exact(DS), VM3, "ImagePositionPatient")),
    (Tag(0x0020, 0x0037), DictEntry::new(Exact(DS), VM6, "ImageOrientationPatient")),
    (Tag(0x0020, 0x0052), DictEntry::new(Exact(UI), VM1, "FrameOfReferenceUID")),
    (Tag(0x0020, 0x1041), DictEntry::new(Exact(DS), VM1, "SliceLocation")),
    // group 0028: image presentation
    (Tag(0x0028, 0x0002), DictEntry::new(Exact(US), VM1, "SamplesPerPixel")),
    (Tag(0x0028, 0x0004), DictEntry::new(Exact(CS), VM1, "PhotometricInterpretation")),
    (Tag(0x0028, 0x0005), DictEntry::new(Exact(US), VM1, "ImageDimensions")),
    (Tag(0x0028, 0x0006), DictEntry::new(Exact(US), VM1, "PlanarConfiguration")),
    (Tag(0x0028, 0x0008), DictEntry::new(Exact(IS), VM1, "NumberOfFrames")),
    (Tag(0x0028, 0x0010), DictEntry::new(Exact(US), VM1, "Rows")),
    (Tag(0x0028, 0x0011), DictEntry::new(Exact(US), VM1, "Columns")),
    (Tag(0x0028, 0x0012), DictEntry::new(Exact(US), VM1, "Planes")),
    (Tag(0x0028, 0x0030), DictEntry::new(Exact(DS), VM2, "PixelSpacing")),
    (Tag(0x0028, 0x0034), DictEntry::new(Exact(IS), VM2, "PixelAspectRatio")),
    (Tag(0x0028, 0x0100), DictEntry::new(Exact(US), VM1, "BitsAllocated")),
    (Tag(0x0028, 0x0101), DictEntry::new(Exact(US), VM1, "BitsStored")),
    (Tag(0x0028, 0x0102), DictEntry::new(Exact(US), VM1, "HighBit")),
    (Tag(0x0028, 0x0103), DictEntry::new(Exact(US), VM1, "PixelRepresentation")),
    (Tag(0x0028, 0x0106), DictEntry::new(UsSs, VM1, "SmallestImagePixelValue")),
    (Tag(0x0028, 0x0107), DictEntry::new(UsSs, VM1, "LargestImagePixelValue")),
    (Tag(0x0028, 0x1050), DictEntry::new(Exact(DS), VM1_N, "WindowCenter")),
    (Tag(0x0028, 0x1051), DictEntry::new(Exact(DS), VM1_N, "WindowWidth")),
    (Tag(0x0028, 0x1052), DictEntry::new(Exact(DS), VM1, "RescaleIntercept")),
    (Tag(0x0028, 0x1053), DictEntry::new(Exact(DS), VM1, "RescaleSlope")),
    (Tag(0x0028, 0x1101), DictEntry::new(UsSs, VM3, "RedPaletteColorLookupTableDescriptor")),
    (Tag(0x0028, 0x1102), DictEntry::new(UsSs, VM3, "GreenPaletteColorLookupTableDescriptor")),
    (Tag(0x0028, 0x1103), DictEntry::new(UsSs, VM3, "BluePaletteColorLookupTableDescriptor")),
    (Tag(0x0028, 0x1201), DictEntry::new(UsSsOw, VM1_N, "RedPaletteColorLookupTableData")),
    (Tag(0x0028, 0x1202), DictEntry::new(UsSsOw, VM1_N, "GreenPaletteColorLookupTableData")),
    (Tag(0x0028, 0x1203), DictEntry::new(UsSsOw, VM1_N, "BluePaletteColorLookupTableData")),
    // group 7FE0: pixel data
    (Tag(0x7FE0, 0x0010), DictEntry::new(ObOw, VM1, "PixelData")),
];
