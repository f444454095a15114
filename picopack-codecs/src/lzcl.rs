//! LZCL codec: LZ77 sub-streams, each under its best sub-codec.
//!
//! LZCL runs the same greedy matcher as LZ77 but does not interleave the
//! result. Decisions, literals and match tokens become separate
//! sub-streams; the decision stream may instead travel as run lengths,
//! and the matches either as packed tokens or as separate distance and
//! length streams. Every sub-stream is encoded with each enabled
//! sub-codec (Fixed, Arithmetic, Huffman, Golomb) and the shortest wins,
//! so each stream gets a model suited to its own statistics.
//!
//! The decoder parses one frame per sub-stream up front, keeping a
//! private cursor for each, then reproduces the LZ77 output loop:
//! pull a decision, then a literal or a back-reference copy through the
//! cyclic window.

use crate::MAX_BYTE_LENGTH;
use crate::lz77::{Lz77Options, split_streams, tokenize};
use crate::subcodec::{SubCodecSet, SubDecoder, write_best_frame};
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::Lomont1;
use picopack_core::error::{PicoPackError, Result};
use picopack_core::window::CyclicWindow;

/// LZCL encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzclOptions {
    /// Matcher parameters for the LZ77 pass.
    pub lz: Lz77Options,
    /// Sub-codecs the per-stream selection may choose from.
    pub subcodecs: SubCodecSet,
}

impl LzclOptions {
    /// Default parameters: the LZ77 defaults with every sub-codec enabled.
    pub const DEFAULT: Self = Self {
        lz: Lz77Options::DEFAULT,
        subcodecs: SubCodecSet::ALL,
    };
}

impl Default for LzclOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Collapse a decision stream into its initial value and the lengths of
/// its alternating runs. No run is zero length.
fn decision_runs(decisions: &[u32]) -> (u32, Vec<u32>) {
    let Some(&initial) = decisions.first() else {
        return (0, Vec::new());
    };
    let mut runs = Vec::new();
    let mut current = initial;
    let mut run = 0u32;
    for &decision in decisions {
        if decision == current {
            run += 1;
        } else {
            runs.push(run);
            current = decision;
            run = 1;
        }
    }
    runs.push(run);
    (initial, runs)
}

/// Compress `input` with the default parameters.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with(input, &LzclOptions::DEFAULT)
}

/// Compress `input` with explicit parameters.
pub fn compress_with(input: &[u8], options: &LzclOptions) -> Result<Vec<u8>> {
    if input.len() > MAX_BYTE_LENGTH {
        return Err(PicoPackError::input_too_large(input.len(), MAX_BYTE_LENGTH));
    }
    let tokens = tokenize(input, &options.lz);
    let streams = split_streams(&tokens);
    let set = &options.subcodecs;

    let max_distance = streams.max_distance;
    let packed_tokens = streams
        .lengths
        .iter()
        .zip(&streams.distances)
        .map(|(&length, &distance)| {
            let token = length as u64 * (max_distance as u64 + 1) + distance as u64;
            u32::try_from(token)
                .map_err(|_| PicoPackError::input_too_large(token as usize, u32::MAX as usize))
        })
        .collect::<Result<Vec<u32>>>()?;

    let mut out = BitStream::new();
    Lomont1::BYTE_COUNT.encode(&mut out, input.len() as u32);
    Lomont1::LZCL_DISTANCE.encode(&mut out, max_distance);
    Lomont1::MIN_LENGTH.encode(&mut out, streams.min_length);

    // Decisions, either plain or as run lengths, whichever frames smaller.
    let (initial_value, runs) = decision_runs(&streams.decisions);
    let mut plain_frame = BitStream::new();
    write_best_frame(&mut plain_frame, &streams.decisions, set)?;
    let mut runs_frame = BitStream::new();
    write_best_frame(&mut runs_frame, &runs, set)?;
    if 1 + runs_frame.len() < plain_frame.len() {
        out.push_bit(true);
        out.push_bit(initial_value == 1);
        out.append(&runs_frame);
    } else {
        out.push_bit(false);
        out.append(&plain_frame);
    }

    write_best_frame(&mut out, &streams.literals, set)?;

    // Matches, either packed tokens or separate distance/length streams.
    let mut token_frame = BitStream::new();
    write_best_frame(&mut token_frame, &packed_tokens, set)?;
    let mut pair_frames = BitStream::new();
    write_best_frame(&mut pair_frames, &streams.distances, set)?;
    write_best_frame(&mut pair_frames, &streams.lengths, set)?;
    if token_frame.len() <= pair_frames.len() {
        out.push_bit(false);
        out.append(&token_frame);
    } else {
        out.push_bit(true);
        out.append(&pair_frames);
    }

    Ok(out.to_bytes())
}

/// Where decisions come from during decode.
#[derive(Debug)]
enum DecisionSource<'a> {
    /// One symbol per decision.
    Plain(SubDecoder<'a>),
    /// Run-length collapsed decisions.
    Runs {
        codec: SubDecoder<'a>,
        /// Value of the active run.
        current: u32,
        /// Decisions left in the active run.
        remaining: u32,
        /// Set once the first run has been pulled.
        started: bool,
    },
}

/// Where matches come from during decode.
#[derive(Debug)]
enum MatchSource<'a> {
    /// Packed `(length, distance)` tokens.
    Tokens(SubDecoder<'a>),
    /// Separate distance and length streams.
    Pairs {
        distance: SubDecoder<'a>,
        length: SubDecoder<'a>,
    },
}

/// Incremental LZCL block decoder.
#[derive(Debug)]
pub struct LzclDecoder<'a> {
    reader: BitReader<'a>,
    window: CyclicWindow<'a>,
    byte_length: u32,
    max_distance: u32,
    min_length: u32,
    decisions: DecisionSource<'a>,
    literals: SubDecoder<'a>,
    matches: MatchSource<'a>,
}

impl<'a> LzclDecoder<'a> {
    /// Parse the header and all sub-codec frames, and bind the output
    /// window. For non-empty streams the window must hold the furthest
    /// back-reference: `window.len() >= max_distance + 1`.
    pub fn new(source: &'a [u8], window: &'a mut [u8]) -> Result<Self> {
        let mut reader = BitReader::new(source);
        let byte_length = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let max_distance = Lomont1::LZCL_DISTANCE.decode(&mut reader)?;
        let min_length = Lomont1::MIN_LENGTH.decode(&mut reader)?;

        if byte_length > 0 {
            let needed = max_distance as usize + 1;
            if window.len() < needed {
                return Err(PicoPackError::buffer_too_small(needed, window.len()));
            }
        }

        let decisions = if reader.read_bit()? == 0 {
            DecisionSource::Plain(SubDecoder::read_frame(&mut reader)?)
        } else {
            let initial = reader.read_bit()?;
            DecisionSource::Runs {
                codec: SubDecoder::read_frame(&mut reader)?,
                current: initial,
                remaining: 0,
                started: false,
            }
        };

        let literals = SubDecoder::read_frame(&mut reader)?;

        let matches = if reader.read_bit()? == 0 {
            MatchSource::Tokens(SubDecoder::read_frame(&mut reader)?)
        } else {
            MatchSource::Pairs {
                distance: SubDecoder::read_frame(&mut reader)?,
                length: SubDecoder::read_frame(&mut reader)?,
            }
        };

        Ok(Self {
            reader,
            window: CyclicWindow::new(window),
            byte_length,
            max_distance,
            min_length,
            decisions,
            literals,
            matches,
        })
    }

    /// Declared decompressed byte count.
    pub fn byte_length(&self) -> u32 {
        self.byte_length
    }

    /// Bytes produced so far.
    pub fn byte_index(&self) -> usize {
        self.window.index()
    }

    /// The cyclic window, for the caller to drain produced bytes from.
    pub fn window(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Pull one symbol from a sub-decoder, treating early exhaustion as
    /// corruption (the outer loop knows how many symbols remain).
    fn pull(position: usize, codec: &mut SubDecoder<'a>) -> Result<u32> {
        codec.next_symbol()?.ok_or_else(|| {
            PicoPackError::corrupted(position, "sub-codec stream exhausted early")
        })
    }

    fn next_decision(&mut self) -> Result<u32> {
        let position = self.reader.position();
        match &mut self.decisions {
            DecisionSource::Plain(codec) => Self::pull(position, codec),
            DecisionSource::Runs {
                codec,
                current,
                remaining,
                started,
            } => {
                if !*started {
                    *started = true;
                    *remaining = Self::pull(position, codec)?;
                }
                if *remaining == 0 {
                    *current ^= 1;
                    *remaining = Self::pull(position, codec)?;
                    if *remaining == 0 {
                        return Err(PicoPackError::corrupted(position, "zero-length decision run"));
                    }
                }
                *remaining -= 1;
                Ok(*current)
            }
        }
    }

    /// Decode one block (a literal or a whole run) into the window and
    /// return its byte count; `Ok(None)` at the declared end.
    pub fn next_block(&mut self) -> Result<Option<u32>> {
        if self.window.index() >= self.byte_length as usize {
            return Ok(None);
        }
        let position = self.reader.position();
        if self.next_decision()? == 0 {
            let symbol = Self::pull(position, &mut self.literals)?;
            self.window.push(symbol as u8);
            return Ok(Some(1));
        }

        let (distance, length) = match &mut self.matches {
            MatchSource::Tokens(codec) => {
                let token = Self::pull(position, codec)? as u64;
                let span = self.max_distance as u64 + 1;
                (
                    (token % span) as u32,
                    (token / span) as u32 + self.min_length,
                )
            }
            MatchSource::Pairs { distance, length } => {
                let d = Self::pull(position, distance)?;
                let l = Self::pull(position, length)? + self.min_length;
                (d, l)
            }
        };
        self.window.copy_back(distance as usize, length as usize)?;
        Ok(Some(length))
    }
}

/// Decompress an LZCL stream, failing if the declared byte count exceeds
/// `capacity`. The cyclic window is allocated internally at full output
/// size, which always satisfies the window bound.
pub fn decompress(source: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let length = crate::decoded_len(source)? as usize;
    if length > capacity {
        return Err(PicoPackError::buffer_too_small(length, capacity));
    }
    let mut output = vec![0u8; length];
    {
        let mut decoder = LzclDecoder::new(source, &mut output)?;
        while decoder.next_block()?.is_some() {}
        if decoder.byte_index() != length {
            return Err(PicoPackError::corrupted(
                decoder.reader.position(),
                "short lzcl decode",
            ));
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) {
        let packed = compress(input).unwrap();
        let output = decompress(&packed, input.len()).unwrap();
        assert_eq!(output, input, "lzcl roundtrip ({} bytes)", input.len());
    }

    #[test]
    fn test_decision_runs() {
        assert_eq!(decision_runs(&[]), (0, vec![]));
        assert_eq!(decision_runs(&[0]), (0, vec![1]));
        assert_eq!(decision_runs(&[1, 1, 0, 0, 0, 1]), (1, vec![2, 3, 1]));
        assert_eq!(decision_runs(&[0, 0, 0, 0]), (0, vec![4]));
    }

    #[test]
    fn test_roundtrip_edges() {
        roundtrip(&[]);
        roundtrip(&[0x41]);
        roundtrip(&[0u8; 100]);
        roundtrip(&[0xFF; 100]);
    }

    #[test]
    fn test_roundtrip_repeated_pattern() {
        let input: Vec<u8> = b"abc".repeat(100);
        let packed = compress(&input).unwrap();
        // Three literals and one long run collapse to a handful of bytes.
        assert!(packed.len() * 10 <= input.len(), "got {}", packed.len());
        roundtrip(&input);
    }

    #[test]
    fn test_roundtrip_text() {
        roundtrip(b"it was the best of times, it was the worst of times, \
                    it was the age of wisdom, it was the age of foolishness");
    }

    #[test]
    fn test_roundtrip_structured() {
        let mut input = Vec::new();
        for record in 0..60u32 {
            input.extend_from_slice(b"key=");
            input.extend_from_slice(record.to_string().as_bytes());
            input.extend_from_slice(b";value=");
            input.push((record % 7) as u8 + b'0');
            input.push(b'\n');
        }
        roundtrip(&input);
    }

    #[test]
    fn test_window_too_small() {
        let input: Vec<u8> = (0..200u32)
            .map(|i| (i % 9) as u8)
            .chain((0..200u32).map(|i| (i % 9) as u8))
            .collect();
        let packed = compress(&input).unwrap();
        let mut window = vec![0u8; 1];
        // Any real stream references further back than one byte.
        assert!(matches!(
            LzclDecoder::new(&packed, &mut window),
            Err(PicoPackError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_incremental_drain_matches_oneshot() {
        let input = b"incremental lzcl incremental lzcl incremental lzcl!";
        let packed = compress(input).unwrap();
        let oneshot = decompress(&packed, input.len()).unwrap();

        let mut window = vec![0u8; 2048];
        let mut decoder = LzclDecoder::new(&packed, &mut window).unwrap();
        assert_eq!(decoder.byte_length() as usize, input.len());
        let mut drained = Vec::new();
        let mut src_index = 0usize;
        while let Some(produced) = decoder.next_block().unwrap() {
            for _ in 0..produced {
                drained.push(decoder.window()[src_index % 2048]);
                src_index += 1;
            }
        }
        assert_eq!(drained, oneshot);
        assert_eq!(drained, input);
    }

    #[test]
    fn test_capacity_exceeded() {
        let packed = compress(b"does not fit").unwrap();
        assert!(matches!(
            decompress(&packed, 5),
            Err(PicoPackError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_deterministic_output() {
        let input = b"same bytes in, same bytes out, every single time";
        assert_eq!(compress(input).unwrap(), compress(input).unwrap());
    }
}
