//! Byte order handling for the four swap codes found in the wild.
//!
//! Besides proper little and big endian streams, two non-standard
//! mixed-endian permutations exist in legacy ACR-NEMA material.
//! Their semantics are defined at the 16-bit word level:
//! the "bad" little endian form keeps bytes within each word but
//! reverses the word order, and the "bad" big endian form reverses
//! bytes within each word but keeps the word order.

use byteordered::Endianness;

/// The byte significance order of a stream,
/// as negotiated from the transfer syntax or guessed from structure.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SwapCode {
    /// Proper little endian (byte significance order 1234).
    #[default]
    LittleEndian,
    /// Proper big endian (4321).
    BigEndian,
    /// Word-reversed little endian (3412), a legacy aberration.
    BadLittleEndian,
    /// Byte-swapped words in little endian word order (2143),
    /// a legacy aberration.
    BadBigEndian,
}

impl SwapCode {
    /// The byte order governing bytes within a 16-bit word.
    /// This is what a plain two-byte scalar read must use.
    pub fn endianness(self) -> Endianness {
        match self {
            SwapCode::LittleEndian | SwapCode::BadLittleEndian => Endianness::Little,
            SwapCode::BigEndian | SwapCode::BadBigEndian => Endianness::Big,
        }
    }

    /// Decode a 16-bit scalar from its stream representation.
    pub fn decode_u16(self, bytes: [u8; 2]) -> u16 {
        match self.endianness() {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        }
    }

    /// Encode a 16-bit scalar into its stream representation.
    pub fn encode_u16(self, value: u16) -> [u8; 2] {
        match self.endianness() {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        }
    }

    /// Decode a 32-bit scalar from its stream representation.
    pub fn decode_u32(self, mut bytes: [u8; 4]) -> u32 {
        self.swap_chunk(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    /// Encode a 32-bit scalar into its stream representation.
    pub fn encode_u32(self, value: u32) -> [u8; 4] {
        let mut bytes = value.to_le_bytes();
        self.swap_chunk(&mut bytes);
        bytes
    }

    /// Convert a buffer of contiguous scalars of the given byte width
    /// between stream order and native (little endian) order, in place.
    ///
    /// The same permutation maps in both directions.
    /// Trailing bytes which do not complete one scalar are left as is.
    pub fn swap_in_place(self, data: &mut [u8], width: usize) {
        debug_assert!(matches!(width, 2 | 4 | 8));
        if self == SwapCode::LittleEndian {
            return;
        }
        for chunk in data.chunks_exact_mut(width) {
            self.swap_chunk(chunk);
        }
    }

    /// Permute one scalar between stream order and native order.
    fn swap_chunk(self, chunk: &mut [u8]) {
        match self {
            SwapCode::LittleEndian => {}
            SwapCode::BigEndian => chunk.reverse(),
            SwapCode::BadLittleEndian => {
                // reverse the order of 16-bit words, bytes untouched
                let words = chunk.len() / 2;
                for i in 0..words / 2 {
                    let j = words - 1 - i;
                    chunk.swap(2 * i, 2 * j);
                    chunk.swap(2 * i + 1, 2 * j + 1);
                }
            }
            SwapCode::BadBigEndian => {
                // swap bytes within each 16-bit word, order untouched
                for pair in chunk.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
            }
        }
    }
}
