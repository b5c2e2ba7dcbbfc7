//! Primitive decoders of scalar values, parameterized over
//! the stream's swap code.

use byteordered::{ByteOrdered, Endianness};
use dcmio_core::Tag;
use std::io::Read;

use crate::swap::SwapCode;

type Result<T> = std::io::Result<T>;

/// A basic decoder of DICOM primitive scalars under a given swap code.
///
/// Straight little and big endian reads go through `byteordered`;
/// the two legacy mixed-endian permutations are resolved through
/// [`SwapCode`].
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct BasicDecoder {
    swap: SwapCode,
}

impl BasicDecoder {
    /// Create a basic decoder for the given swap code.
    pub fn new(swap: SwapCode) -> Self {
        BasicDecoder { swap }
    }

    /// The swap code expected by this decoder.
    pub fn swap_code(&self) -> SwapCode {
        self.swap
    }

    /// The byte order governing 16-bit words.
    pub fn endianness(&self) -> Endianness {
        self.swap.endianness()
    }

    /// Decode an unsigned short value from the given source.
    pub fn decode_us<S>(&self, source: S) -> Result<u16>
    where
        S: Read,
    {
        match self.swap.endianness() {
            Endianness::Little => ByteOrdered::le(source).read_u16(),
            Endianness::Big => ByteOrdered::be(source).read_u16(),
        }
    }

    /// Decode an unsigned long value from the given source.
    pub fn decode_ul<S>(&self, mut source: S) -> Result<u32>
    where
        S: Read,
    {
        let mut buf = [0u8; 4];
        source.read_exact(&mut buf)?;
        Ok(self.swap.decode_u32(buf))
    }

    /// Decode a DICOM attribute tag from the given source.
    pub fn decode_tag<S>(&self, mut source: S) -> Result<Tag>
    where
        S: Read,
    {
        let g = self.decode_us(&mut source)?;
        let e = self.decode_us(source)?;
        Ok(Tag(g, e))
    }
}
