//! This crate contains the DICOM encoding and decoding primitives:
//! byte order handling across the four swap codes,
//! explicit and implicit VR element header codecs,
//! transfer syntax resolution and structural guessing,
//! and text codecs for the default character repertoire.
//!
//! Full data set reading and writing is built on top of these
//! primitives by the `dcmio-parser` crate.

pub mod decode;
pub mod encode;
pub mod swap;
pub mod text;
pub mod transfer_syntax;

pub use crate::decode::{Decode, ModeDecoder};
pub use crate::encode::{Encode, ModeEncoder};
pub use crate::swap::SwapCode;
pub use crate::transfer_syntax::{guess_transfer_syntax, TransferSyntax};
