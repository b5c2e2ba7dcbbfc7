//! This crate provides the high-level abstraction for DICOM files:
//! the preamble, the file meta group, the transfer syntax negotiation,
//! and the main data set, aggregated into a single owned object.
//!
//! Reading tolerates legacy layouts: missing preamble, missing file
//! meta group (in which case the transfer syntax is guessed from the
//! structure of the first element), and the ACR-NEMA big endian form.

pub mod explicitify;
pub mod file;
pub mod meta;

pub use crate::explicitify::to_explicit_vr;
pub use crate::file::{from_reader, open_file, DicomFile, Error, Result};
pub use crate::meta::{FileMetaTable, FileMetaTableBuilder};
