use rayon::prelude::*;

/// Byte occurrence counts, indexed by byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteFrequency {
    counts: [u64; 256],
}

impl ByteFrequency {
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Returns a frequency count of the input data.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut freqs = Self::new();
        freqs.add(data);
        freqs
    }

    /// Adds the bytes in data to the count. Uses parallelism when data set is over 64k.
    pub fn add(&mut self, data: &[u8]) {
        if data.len() > 64_000 {
            // 16k is pretty much the sweet spot for chunk size.
            let counts = data
                .par_chunks(16_000)
                .fold(
                    || [0_u64; 256],
                    |mut freqs, chunk| {
                        chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                        freqs
                    },
                )
                .reduce(
                    || [0_u64; 256],
                    |mut s, f| {
                        s.iter_mut().zip(&f).for_each(|(a, b)| *a += b);
                        s
                    },
                );
            self.counts
                .iter_mut()
                .zip(&counts)
                .for_each(|(a, b)| *a += b);
        } else {
            data.iter().for_each(|&el| self.counts[el as usize] += 1);
        }
    }

    /// Count for a single byte value.
    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// (byte, count) for every byte that occurs at least once, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count))
    }

    /// Number of distinct byte values seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl Default for ByteFrequency {
    fn default() -> Self {
        Self::new()
    }
}
