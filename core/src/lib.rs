//! This crate contains the essential data structures for handling
//! DICOM data sets in memory: the attribute tag and value length
//! primitives, the value representation and multiplicity type system,
//! the data element and container model,
//! and the attribute dictionary abstraction.
//!
//! Encoding and decoding of these structures to and from their wire
//! form lives in the sibling crates `dcmio-encoding` and `dcmio-parser`.
pub mod dataset;
pub mod dictionary;
pub mod header;
pub mod vm;
pub mod vr;

pub use crate::dataset::{
    DataElement, DataSet, ElementValue, EncodingMode, Fragment, Item, SequenceOfFragments,
    SequenceOfItems,
};
pub use crate::dictionary::{DataDictionary, DictEntry, VirtualVr};
pub use crate::header::{DataElementHeader, HasLength, Header, Length, SequenceItemHeader, Tag};
pub use crate::vm::VM;
pub use crate::vr::VR;
