//! Run length encoding: every run of identical bytes becomes one or more (count, byte) pairs.
//!
//! The count is a single byte, so runs longer than 255 are split into several pairs rather than
//! cut short.

use std::io::{Read, Write};

use log::{debug, info};

use crate::compression::compress::read_chunk;
use crate::error::{Error, Result};

/// Longest run a single pair can hold.
pub const MAX_RUN: usize = u8::MAX as usize;

const CHUNK_SIZE: usize = 64 * 1024;

/// One (count, byte) pair of the RLE format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPair {
    pub count: u8,
    pub byte: u8,
}

impl RunPair {
    /// A pair for count copies of byte. The count must fit the one byte counter.
    pub fn new(count: usize, byte: u8) -> Result<Self> {
        match u8::try_from(count) {
            Ok(count) if count > 0 => Ok(Self { count, byte }),
            _ => Err(Error::RunLengthOverflow { count }),
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        [self.count, self.byte]
    }

    /// The bytes this pair stands for.
    pub fn expand(self) -> impl Iterator<Item = u8> {
        std::iter::repeat(self.byte).take(self.count as usize)
    }
}

/// Split a run of any length into full (255, byte) pairs followed by the remainder.
pub fn split_run(byte: u8, mut count: usize) -> impl Iterator<Item = RunPair> {
    std::iter::from_fn(move || {
        if count == 0 {
            return None;
        }
        let n = count.min(MAX_RUN);
        count -= n;
        Some(RunPair {
            count: n as u8,
            byte,
        })
    })
}

/// Tracks the run in progress, across buffer boundaries when streaming.
#[derive(Debug, Default)]
struct RunEncoder {
    run: Option<(u8, usize)>,
}

impl RunEncoder {
    fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        if let Some((current, count)) = &mut self.run {
            if *current == byte {
                *count += 1;
                return;
            }
        }
        self.finish(out);
        self.run = Some((byte, 1));
    }

    /// Write out the run in progress, if any.
    fn finish(&mut self, out: &mut Vec<u8>) {
        if let Some((byte, count)) = self.run.take() {
            split_run(byte, count).for_each(|pair| out.extend(pair.to_bytes()));
        }
    }
}

/// Run length encode a buffer.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 2);
    let mut encoder = RunEncoder::default();
    data.iter().for_each(|&byte| encoder.push(byte, &mut out));
    encoder.finish(&mut out);
    debug!("RLE encoded {} bytes into {} bytes.", data.len(), out.len());
    out
}

/// Expand a buffer of (count, byte) pairs. A zero count pair expands to nothing.
pub fn rle_decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 2 == 1 {
        return Err(Error::TruncatedRun {
            offset: data.len() as u64 - 1,
        });
    }
    let out: Vec<u8> = data
        .chunks_exact(2)
        .flat_map(|pair| RunPair {
            count: pair[0],
            byte: pair[1],
        }
        .expand())
        .collect();
    debug!("RLE decoded {} bytes into {} bytes.", data.len(), out.len());
    Ok(out)
}

/// Run length encode everything from reader into writer. Same output as rle_encode.
pub fn rle_encode_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<()> {
    let mut buf = vec![0_u8; CHUNK_SIZE];
    let mut out = Vec::with_capacity(CHUNK_SIZE + 2);
    let mut encoder = RunEncoder::default();
    let (mut read, mut written) = (0_u64, 0_u64);

    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        read += n as u64;
        buf[..n].iter().for_each(|&byte| encoder.push(byte, &mut out));
        if out.len() >= CHUNK_SIZE {
            writer.write_all(&out)?;
            written += out.len() as u64;
            out.clear();
        }
    }
    encoder.finish(&mut out);
    writer.write_all(&out)?;
    writer.flush()?;
    written += out.len() as u64;

    info!("RLE encoded {} bytes into {} bytes.", read, written);
    Ok(())
}

/// Expand (count, byte) pairs from reader into writer. Same output as rle_decode.
pub fn rle_decode_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<()> {
    let mut buf = vec![0_u8; CHUNK_SIZE];
    let mut out = Vec::with_capacity(CHUNK_SIZE + MAX_RUN);
    // A count whose byte is still to come in the next read
    let mut pending: Option<u8> = None;
    let (mut read, mut written) = (0_u64, 0_u64);

    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        read += n as u64;
        for &value in &buf[..n] {
            match pending.take() {
                None => pending = Some(value),
                Some(count) => out.extend(RunPair { count, byte: value }.expand()),
            }
        }
        if out.len() >= CHUNK_SIZE {
            writer.write_all(&out)?;
            written += out.len() as u64;
            out.clear();
        }
    }
    if pending.is_some() {
        return Err(Error::TruncatedRun { offset: read - 1 });
    }
    writer.write_all(&out)?;
    writer.flush()?;
    written += out.len() as u64;

    info!("RLE decoded {} bytes into {} bytes.", read, written);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{self, Read};

    #[test]
    fn encode_test() {
        assert_eq!(rle_encode(b"AAABBCCCC"), [3, b'A', 2, b'B', 4, b'C']);
        assert_eq!(rle_encode(b"abc"), [1, b'a', 1, b'b', 1, b'c']);
        assert!(rle_encode(&[]).is_empty());
    }

    #[test]
    fn long_run_test() {
        let data = vec![0x5a; 300];
        let encoded = rle_encode(&data);
        assert_eq!(encoded, [0xff, 0x5a, 0x2d, 0x5a]);
        assert_eq!(rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn exact_run_boundaries_test() {
        assert_eq!(rle_encode(&[7; 255]), [255, 7]);
        assert_eq!(rle_encode(&[7; 510]), [255, 7, 255, 7]);
        assert_eq!(rle_encode(&[7; 256]), [255, 7, 1, 7]);
    }

    #[test]
    fn decode_test() {
        assert_eq!(rle_decode(&[3, b'x', 0, b'y', 1, b'z']).unwrap(), b"xxxz");
        assert!(rle_decode(&[]).unwrap().is_empty());
        assert!(matches!(
            rle_decode(&[3, b'x', 2]),
            Err(Error::TruncatedRun { offset: 2 })
        ));
    }

    #[test]
    fn run_pair_test() {
        assert_eq!(
            RunPair::new(255, 1).unwrap(),
            RunPair { count: 255, byte: 1 }
        );
        assert!(matches!(
            RunPair::new(256, 1),
            Err(Error::RunLengthOverflow { count: 256 })
        ));
        assert!(matches!(
            RunPair::new(0, 1),
            Err(Error::RunLengthOverflow { count: 0 })
        ));
        let pairs: Vec<RunPair> = split_run(9, 600).collect();
        assert_eq!(
            pairs.iter().map(|p| p.count).collect::<Vec<_>>(),
            vec![255, 255, 90]
        );
        assert_eq!(split_run(9, 0).count(), 0);
    }

    /// Hands out at most `step` bytes per read() call.
    struct Dribble<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Dribble<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn stream_matches_buffer_test() {
        let mut data = vec![1_u8; 1000];
        data.extend(b"abcdeeeeeeef");
        data.extend(vec![0_u8; 70_000]);
        for step in [1, 3, 255, 100_000] {
            let mut encoded = Vec::<u8>::new();
            rle_encode_stream(&mut Dribble { data: &data, step }, &mut encoded).unwrap();
            assert_eq!(encoded, rle_encode(&data));

            let mut decoded = Vec::<u8>::new();
            rle_decode_stream(&mut Dribble { data: &encoded, step }, &mut decoded).unwrap();
            assert_eq!(decoded, data);
        }
    }

    #[test]
    fn stream_truncated_test() {
        let mut out = Vec::<u8>::new();
        assert!(matches!(
            rle_decode_stream(&mut [2, b'a', 5].as_slice(), &mut out),
            Err(Error::TruncatedRun { offset: 2 })
        ));
    }
}
