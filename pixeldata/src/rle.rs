//! The run-length (packbits style) decompression state machine used by
//! the RLE Lossless transfer syntax.
//!
//! Each pixel data fragment holds one frame: a 64-byte header with the
//! segment count and per-segment start offsets, followed by the
//! segments themselves. Segments decompress independently, each to
//! exactly the frame length divided by the segment count.

use snafu::{ensure, Backtrace, Snafu};

/// The maximum number of segments a frame header may declare.
pub const MAX_SEGMENTS: u32 = 15;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Fragment of {} bytes is too short for the frame header", len))]
    HeaderTooShort { len: usize, backtrace: Backtrace },
    #[snafu(display("Frame header declares {} segments, admissible are 1 to 15", count))]
    BadSegmentCount { count: u32, backtrace: Backtrace },
    #[snafu(display(
        "Expected frame length {} is not divisible into {} segments",
        expected,
        segments
    ))]
    UnevenSegmentLength {
        expected: usize,
        segments: u32,
        backtrace: Backtrace,
    },
    #[snafu(display(
        "Segment {} overran its expected size: {} of {} bytes",
        segment,
        produced,
        expected
    ))]
    SegmentOverrun {
        segment: u32,
        produced: usize,
        expected: usize,
        backtrace: Backtrace,
    },
    #[snafu(display(
        "Segment {} ended prematurely: {} of {} bytes",
        segment,
        produced,
        expected
    ))]
    SegmentUnderrun {
        segment: u32,
        produced: usize,
        expected: usize,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// The fixed 64-byte frame header: a segment count and up to 15
/// segment start offsets, all little endian, offsets relative to the
/// start of the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of segments in the frame.
    pub num_segments: u32,
    /// Start offset of each segment; only the first
    /// `num_segments` entries are meaningful.
    pub offsets: [u32; 15],
}

impl FrameHeader {
    /// Parse the frame header from the start of a fragment.
    pub fn read(fragment: &[u8]) -> Result<Self> {
        ensure!(
            fragment.len() >= 64,
            HeaderTooShortSnafu {
                len: fragment.len()
            }
        );
        let num_segments = u32::from_le_bytes([fragment[0], fragment[1], fragment[2], fragment[3]]);
        ensure!(
            (1..=MAX_SEGMENTS).contains(&num_segments),
            BadSegmentCountSnafu {
                count: num_segments
            }
        );
        let mut offsets = [0u32; 15];
        for (i, offset) in offsets.iter_mut().enumerate() {
            let at = 4 + 4 * i;
            *offset = u32::from_le_bytes([
                fragment[at],
                fragment[at + 1],
                fragment[at + 2],
                fragment[at + 3],
            ]);
        }
        Ok(FrameHeader {
            num_segments,
            offsets,
        })
    }
}

/// Decompress one frame fragment into exactly `expected_len` bytes,
/// segment by segment.
///
/// A mismatch between the running stream position and a segment's
/// declared start offset is tolerated by seeking to the declared
/// offset; an output overrun or underrun is fatal.
pub fn decode_fragment(fragment: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let header = FrameHeader::read(fragment)?;
    let segments = header.num_segments;
    ensure!(
        expected_len % segments as usize == 0,
        UnevenSegmentLengthSnafu {
            expected: expected_len,
            segments
        }
    );
    let segment_len = expected_len / segments as usize;

    let mut out = Vec::with_capacity(expected_len);
    let mut pos = 64usize;
    for segment in 0..segments {
        let declared = header.offsets[segment as usize] as usize;
        if declared != pos {
            // usually just NUL padding between segments
            tracing::debug!(
                "segment {} declared at offset {}, stream is at {}",
                segment,
                declared,
                pos
            );
            pos = declared;
        }
        pos = decode_segment(fragment, pos, segment, segment_len, &mut out)?;
    }
    Ok(out)
}

/// Expand a single segment, returning the input position after its
/// last control byte.
fn decode_segment(
    input: &[u8],
    mut pos: usize,
    segment: u32,
    expected: usize,
    out: &mut Vec<u8>,
) -> Result<usize> {
    let mut produced = 0usize;
    while produced < expected {
        let control = match input.get(pos) {
            Some(&byte) => byte as i8,
            None => {
                return SegmentUnderrunSnafu {
                    segment,
                    produced,
                    expected,
                }
                .fail()
            }
        };
        pos += 1;
        if control >= 0 {
            // literal run: the next control+1 bytes verbatim
            let count = control as usize + 1;
            ensure!(
                produced + count <= expected,
                SegmentOverrunSnafu {
                    segment,
                    produced: produced + count,
                    expected,
                }
            );
            let literal = input.get(pos..pos + count).ok_or_else(|| {
                SegmentUnderrunSnafu {
                    segment,
                    produced,
                    expected,
                }
                .build()
            })?;
            out.extend_from_slice(literal);
            pos += count;
            produced += count;
        } else if control != -128 {
            // repeat run: the next byte, -control+1 times
            let count = (-i32::from(control) + 1) as usize;
            ensure!(
                produced + count <= expected,
                SegmentOverrunSnafu {
                    segment,
                    produced: produced + count,
                    expected,
                }
            );
            let value = match input.get(pos) {
                Some(&byte) => byte,
                None => {
                    return SegmentUnderrunSnafu {
                        segment,
                        produced,
                        expected,
                    }
                    .fail()
                }
            };
            pos += 1;
            out.resize(out.len() + count, value);
            produced += count;
        }
        // control == -128 produces nothing
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(num_segments: u32, offsets: &[u32], payload: &[u8]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(64 + payload.len());
        raw.extend_from_slice(&num_segments.to_le_bytes());
        for i in 0..15 {
            let offset = offsets.get(i).copied().unwrap_or(0);
            raw.extend_from_slice(&offset.to_le_bytes());
        }
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn literal_and_repeat_runs() {
        // literal run of 3 ("ABC"), then a repeat run of 4 ('X')
        let payload = [2u8, b'A', b'B', b'C', 0xFD, b'X'];
        let raw = frame(1, &[64], &payload);
        let decoded = decode_fragment(&raw, 7).unwrap();
        assert_eq!(decoded, b"ABCXXXX");
    }

    #[test]
    fn minus_128_is_a_no_op() {
        let payload = [0x80u8, 0x80, 1, b'o', b'k', 0x80, 0xFF, b'!'];
        let raw = frame(1, &[64], &payload);
        let decoded = decode_fragment(&raw, 4).unwrap();
        assert_eq!(decoded, b"ok!!");
    }

    #[test]
    fn two_segments_decode_independently() {
        // segment 1: 4 bytes literal; segment 2: repeat 'z' 4 times
        let payload = [3u8, 1, 2, 3, 4, 0xFD, b'z'];
        let raw = frame(2, &[64, 69], &payload);
        let decoded = decode_fragment(&raw, 8).unwrap();
        assert_eq!(decoded, &[1, 2, 3, 4, b'z', b'z', b'z', b'z']);
    }

    #[test]
    fn declared_offsets_override_the_running_position() {
        // one byte of padding between the two segments
        let payload = [3u8, 1, 2, 3, 4, 0x00, 0xFD, b'z'];
        let raw = frame(2, &[64, 70], &payload);
        let decoded = decode_fragment(&raw, 8).unwrap();
        assert_eq!(decoded, &[1, 2, 3, 4, b'z', b'z', b'z', b'z']);
    }

    #[test]
    fn overrun_is_fatal() {
        // repeat run of 4 against an expected segment size of 3
        let payload = [0xFDu8, b'X'];
        let raw = frame(1, &[64], &payload);
        assert!(matches!(
            decode_fragment(&raw, 3),
            Err(Error::SegmentOverrun { .. })
        ));
    }

    #[test]
    fn underrun_is_fatal() {
        // segment input runs dry before 8 bytes are produced
        let payload = [1u8, b'a', b'b'];
        let raw = frame(1, &[64], &payload);
        assert!(matches!(
            decode_fragment(&raw, 8),
            Err(Error::SegmentUnderrun { .. })
        ));
    }

    #[test]
    fn bad_segment_counts_are_refused() {
        let raw = frame(0, &[], &[]);
        assert!(matches!(
            FrameHeader::read(&raw),
            Err(Error::BadSegmentCount { .. })
        ));
        let raw = frame(16, &[], &[]);
        assert!(matches!(
            FrameHeader::read(&raw),
            Err(Error::BadSegmentCount { .. })
        ));
    }
}
