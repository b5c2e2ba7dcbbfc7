//! Constants for attribute tags used across the workspace.

use dcmio_core::Tag;

/// File Meta Information Group Length (0002,0000)
pub const FILE_META_INFORMATION_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
/// File Meta Information Version (0002,0001)
pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
/// Media Storage SOP Class UID (0002,0002)
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
/// Media Storage SOP Instance UID (0002,0003)
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
/// Transfer Syntax UID (0002,0010)
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
/// Implementation Class UID (0002,0012)
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);

/// Recognition Code (0008,0010), retired
pub const RECOGNITION_CODE: Tag = Tag(0x0008, 0x0010);
/// SOP Class UID (0008,0016)
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
/// SOP Instance UID (0008,0018)
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);

/// Samples per Pixel (0028,0002)
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// Photometric Interpretation (0028,0004)
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// Image Dimensions (0028,0005), retired
pub const IMAGE_DIMENSIONS: Tag = Tag(0x0028, 0x0005);
/// Planar Configuration (0028,0006)
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
/// Number of Frames (0028,0008)
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// Rows (0028,0010)
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011)
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// Planes (0028,0012), retired
pub const PLANES: Tag = Tag(0x0028, 0x0012);
/// Bits Allocated (0028,0100)
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// Bits Stored (0028,0101)
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// High Bit (0028,0102)
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
/// Pixel Representation (0028,0103)
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);

/// Pixel Data (7FE0,0010)
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
