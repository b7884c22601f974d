use log::error;

/// Creates a bitstream for output.
pub struct BitPacker {
    pub output: Vec<u8>,
    pub last_bits: u8,
    queue: u64,
    q_bits: u8,
    written: u64,
}

impl BitPacker {
    /// Create a new BitPacker with an output buffer of size specified. Call flush() to
    /// flush the bit queue to the buffer before using the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            last_bits: 0,
            queue: 0,
            q_bits: 0,
            written: 0,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Puts a single bit on the stream.
    pub fn out_bit(&mut self, bit: bool) {
        self.queue <<= 1;
        self.queue |= bit as u64;
        self.q_bits += 1;
        self.written += 1;
        self.write_stream();
    }

    /// Puts a sequence of bits on the stream, first bit first. Used for huffman codes.
    pub fn out_bits<I: IntoIterator<Item = bool>>(&mut self, bits: I) {
        bits.into_iter().for_each(|bit| self.out_bit(bit));
    }

    /// Puts a byte of pre-packed binary encoded data on the stream.
    pub fn out8(&mut self, data: u8) {
        self.queue <<= 8; //shift queue by one byte
        self.queue |= data as u64; //add the byte to queue
        self.q_bits += 8; //update depth of queue bits
        self.written += 8;
        self.write_stream();
    }

    /// Puts a 16 bit word of pre-packed binary encoded data on the stream.
    pub fn out16(&mut self, data: u16) {
        self.queue <<= 16; //shift queue by bit length
        self.queue |= data as u64; //add data portion to queue
        self.q_bits += 16; //update depth of queue bits
        self.written += 16;
        self.write_stream();
    }

    /// Puts a 32 bit word of pre-packed binary encoded data on the stream.
    pub fn out32(&mut self, data: u32) {
        self.queue <<= 32; //shift queue by bit length
        self.queue |= data as u64; //add data portion to queue
        self.q_bits += 32; //update depth of queue bits
        self.written += 32;
        self.write_stream();
    }

    /// Puts a slice of bytes on the stream.
    pub fn out_bytes(&mut self, data: &[u8]) {
        data.iter().for_each(|&byte| self.out8(byte));
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits. Returns the number of padding bits added. The packer is byte
    /// aligned afterwards and can keep taking data.
    pub fn flush(&mut self) -> u8 {
        self.last_bits = self.q_bits % 8;
        let mut padding = 0;
        if self.q_bits > 0 {
            padding = 8 - self.q_bits;
            self.queue <<= padding; //pad the queue with zeros
            self.q_bits += padding;
            self.write_stream(); // write out all that is left
            if self.q_bits > 0 {
                error!("Stuff left in the BitPacker queue.");
            }
        }
        padding
    }

    /// Number of bits put on the stream so far, not counting padding.
    pub fn bits_written(&self) -> u64 {
        self.written
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format! {"[{}.{}]",((self.output.len() * 8) + self.q_bits as usize)/8, ((self.output.len() * 8) + self.q_bits as usize)%8}
    }
}

/// Packs a sequence of bits MSB-first into bytes, zero padding the last byte.
pub fn pack_bits<I: IntoIterator<Item = bool>>(bits: I) -> Vec<u8> {
    let mut bp = BitPacker::new(4);
    bp.out_bits(bits);
    bp.flush();
    bp.output
}

#[cfg(test)]
mod test {
    use super::{pack_bits, BitPacker};

    #[test]
    fn out16_test() {
        let mut bp = BitPacker::new(100);
        let data = 0b00100001_00100000;
        bp.out16(data);
        bp.flush();
        let out = bp.output;
        assert_eq!(out, "! ".as_bytes());
    }

    #[test]
    fn out32_test() {
        let mut bp = BitPacker::new(100);
        let data = 0b00100001_00100000_00100001_00100000;
        bp.out32(data);
        bp.flush();
        let out = bp.output;
        assert_eq!(out, [33, 32, 33, 32]);
    }

    #[test]
    fn out_bit_and_loc_test() {
        let mut bp = BitPacker::new(100);
        bp.out_bits([true, false, true]);
        assert_eq!("[0.3]", &bp.loc());
        assert!(bp.output.is_empty());
        bp.out_bits([true, true, true, true, true, false]);
        assert_eq!("[1.1]", &bp.loc());
        assert_eq!(bp.output, [0b1011_1111]);
        assert_eq!(bp.bits_written(), 9);
    }

    #[test]
    fn flush_pads_low_bits_test() {
        let mut bp = BitPacker::new(100);
        bp.out_bits([true, true, false]);
        assert_eq!(bp.flush(), 5);
        assert_eq!(bp.last_bits, 3);
        assert_eq!(bp.output, [0b1100_0000]);
        // Already aligned, nothing to pad
        assert_eq!(bp.flush(), 0);
        assert_eq!(bp.output, [0b1100_0000]);
    }

    #[test]
    fn unaligned_words_test() {
        let mut bp = BitPacker::new(100);
        bp.out_bit(true);
        bp.out8(0xff);
        bp.out16(0);
        bp.flush();
        assert_eq!(bp.output, [0xff, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn pack_bits_test() {
        assert!(pack_bits(Vec::<bool>::new()).is_empty());
        assert_eq!(pack_bits([false]), [0]);
        assert_eq!(pack_bits([true; 9]), [0xff, 0x80]);
    }
}
