//! Primitive encoders of scalar values, parameterized over
//! the stream's swap code.

use byteordered::{ByteOrdered, Endianness};
use dcmio_core::Tag;
use std::io::Write;

use crate::swap::SwapCode;

type Result<T> = std::io::Result<T>;

/// A basic encoder of DICOM primitive scalars under a given swap code.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct BasicEncoder {
    swap: SwapCode,
}

impl BasicEncoder {
    /// Create a basic encoder for the given swap code.
    pub fn new(swap: SwapCode) -> Self {
        BasicEncoder { swap }
    }

    /// The swap code produced by this encoder.
    pub fn swap_code(&self) -> SwapCode {
        self.swap
    }

    /// Encode an unsigned short value to the given destination.
    pub fn encode_us<W>(&self, to: W, value: u16) -> Result<()>
    where
        W: Write,
    {
        match self.swap.endianness() {
            Endianness::Little => ByteOrdered::le(to).write_u16(value),
            Endianness::Big => ByteOrdered::be(to).write_u16(value),
        }
    }

    /// Encode an unsigned long value to the given destination.
    pub fn encode_ul<W>(&self, mut to: W, value: u32) -> Result<()>
    where
        W: Write,
    {
        to.write_all(&self.swap.encode_u32(value))
    }

    /// Encode a DICOM attribute tag to the given destination.
    pub fn encode_tag<W>(&self, mut to: W, tag: Tag) -> Result<()>
    where
        W: Write,
    {
        self.encode_us(&mut to, tag.group())?;
        self.encode_us(to, tag.element())
    }
}
