//! BitReader: the input half of the bitstream subsystem.
//!
//! Reads a packed bitstream MSB-first. Byte aligned fields (container length, header) and the
//! unaligned huffman body come through the same reader, so the decoder never has to know where
//! one buffer refill ends and the next one starts.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. I/O errors are
//! handed back to the caller, running out of data is reported as `None`.
//!
use std::io::{self, ErrorKind, Read};

const BUFFER_SIZE: usize = 64 * 1024;
const BIT_MASK: u8 = 0xff;

/// Reads a packed bitstream.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    cursor: usize,
    bit_index: usize,
    consumed: u64,
    source: R,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader (with a 64k buffer).
    pub fn new(source: R) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            bit_index: 0,
            consumed: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> io::Result<bool> {
        // Only try to read more data when the buffer length is equal to the buffer cursor location
        if self.cursor == self.buffer.len() {
            self.consumed += self.buffer.len() as u64;
            self.buffer.resize(BUFFER_SIZE, 0);
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(size) => break size,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buffer.clear();
                        self.cursor = 0;
                        return Err(e);
                    }
                }
            };
            // Adjust the buffer if we read less than the buffer size
            self.buffer.truncate(size);
            // Reset the cursor and bit index
            self.cursor = 0;
            self.bit_index = 0;
            // If nothing came back from our read attempt, then we have no more data.
            if size == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Return the next bit, *true* for 1 and *false* for 0, or None if there is no more
    /// data to read
    pub fn bit(&mut self) -> io::Result<Option<bool>> {
        // If bit_index is == 0, check if we have a byte to read. Return None if we have no data
        if self.bit_index == 0 && !self.have_data()? {
            return Ok(None);
        }
        let bit = (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        self.bit_index %= 8;
        if self.bit_index == 0 {
            self.cursor += 1;
        }
        Ok(Some(bit == 1))
    }

    /// Return the next n bits (n <= 64) as an integer, or None if there is no more data to read.
    pub fn bint(&mut self, mut n: usize) -> io::Result<Option<u64>> {
        debug_assert!(n <= 64);
        let mut result = 0_u64;

        // While we are byte aligned, take whole bytes at a time.
        while n >= 8 && self.bit_index == 0 {
            if !self.have_data()? {
                return Ok(None);
            }
            result = result << 8 | self.buffer[self.cursor] as u64;
            self.cursor += 1;
            n -= 8;
        }
        // Whatever is left (or all of it if we started mid-byte) goes a bit at a time.
        for _ in 0..n {
            match self.bit()? {
                Some(bit) => result = result << 1 | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Returns a byte, or None if there is no more data to read. This is
    /// a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.bint(8)?.map(|byte| byte as u8))
    }

    /// Returns n bytes, or None if the source ends before all of them are read.
    pub fn bytes(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut result: Vec<u8> = Vec::with_capacity(n.min(BUFFER_SIZE));
        for _ in 0..n {
            match self.byte()? {
                Some(byte) => result.push(byte),
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Number of whole bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.consumed + self.cursor as u64
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

/// Unpacks exactly `count` bits MSB-first from `bytes`. Returns None if the slice is too short.
/// Any bits past `count` are padding and are ignored.
pub fn unpack_bits(bytes: &[u8], count: usize) -> Option<Vec<bool>> {
    if bytes.len() * 8 < count {
        return None;
    }
    Some(
        (0..count)
            .map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
            .collect(),
    )
}

#[cfg(test)]
mod test {
    use super::{unpack_bits, BitReader};
    use std::io::{self, Read};

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bit().unwrap(), Some(true));
        for _ in 0..6 {
            assert_eq!(br.bit().unwrap(), Some(false));
        }
        assert_eq!(br.bit().unwrap(), Some(true));
        assert_eq!(br.bit().unwrap(), None);
    }

    #[test]
    fn bint_test() {
        let x = [0b00011011].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bint(5).unwrap(), Some(3));
        assert_eq!(br.bint(1).unwrap(), Some(0));
        assert_eq!(br.bint(2).unwrap(), Some(3));
        assert_eq!(br.bint(1).unwrap(), None);
    }

    #[test]
    fn bint_across_bytes_test() {
        let x = [0x00, 0x00, 0x01, 0x2c, 0b1010_0000].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bint(32).unwrap(), Some(300));
        assert_eq!(br.bit().unwrap(), Some(true));
        // Unaligned 8 bit read spanning the rest of the stream
        assert_eq!(br.bint(8).unwrap(), None);
    }

    #[test]
    fn byte_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(br.byte().unwrap(), Some(b'H'));
        assert_eq!(br.byte().unwrap(), Some(b'e'));
        assert_eq!(br.byte().unwrap(), Some(b'l'));
        assert_eq!(br.byte().unwrap(), Some(b'l'));
    }

    #[test]
    fn bytes_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(br.bytes(5).unwrap(), Some("Hello".as_bytes().to_vec()));
        assert_eq!(br.bytes(100).unwrap(), None);
    }

    #[test]
    fn loc_and_position_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        br.bytes(5).unwrap();
        br.bit().unwrap();
        assert_eq!(br.loc(), "[5.1]");
        assert_eq!(br.position(), 5);
    }

    #[test]
    fn small_reads_test() {
        // A source that hands out one byte per read() call
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }
        let mut br = BitReader::new(Trickle(&[0xab, 0xcd, 0xef]));
        assert_eq!(br.bit().unwrap(), Some(true));
        assert_eq!(br.bint(16).unwrap(), Some(0b0101011_11001101_1));
        assert_eq!(br.position(), 2);
        assert_eq!(br.bint(7).unwrap(), Some(0b1101111));
        assert_eq!(br.bit().unwrap(), None);
    }

    #[test]
    fn read_error_test() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        let mut br = BitReader::new(Broken);
        assert!(br.bit().is_err());
    }

    #[test]
    fn unpack_bits_test() {
        assert_eq!(unpack_bits(&[0b1100_0000], 2), Some(vec![true, true]));
        assert_eq!(
            unpack_bits(&[0xff, 0b0100_0000], 10),
            Some(vec![true, true, true, true, true, true, true, true, false, true])
        );
        assert_eq!(unpack_bits(&[], 0), Some(vec![]));
        assert_eq!(unpack_bits(&[0xff], 9), None);
    }
}
