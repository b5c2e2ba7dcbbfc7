//! This crate provides a mid-level abstraction for reading and writing
//! whole DICOM data sets, including nested sequences and encapsulated
//! pixel data, on top of the element codecs in `dcmio-encoding`.
//!
//! The file-level abstraction (preamble, file meta group, transfer
//! syntax negotiation) lives in `dcmio-object`.

pub mod read;
pub mod write;

pub use crate::read::DataSetReader;
pub use crate::write::DataSetWriter;
