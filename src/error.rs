//! Error type shared by both codecs.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while encoding or decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// A Huffman tree was requested for a frequency table with no symbols.
    #[error("cannot build a huffman tree from empty input")]
    EmptyInput,

    /// The code table header is inconsistent with its declared framing.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The container is too short to hold its fixed fields.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The body ran out of bits before every symbol was decoded.
    #[error("body truncated after {decoded} of {expected} symbols")]
    TruncatedBody { decoded: u64, expected: u64 },

    /// A bit path fell off the decode tree.
    #[error("invalid code in body after {decoded} symbols")]
    InvalidCode { decoded: u64 },

    /// A code is longer than the one byte length field can describe.
    #[error("code for symbol 0x{symbol:02x} is {length} bits, the limit is 255")]
    UnsupportedCodeLength { symbol: u8, length: usize },

    /// A byte has no code in the table used to encode it.
    #[error("no code for symbol 0x{0:02x}")]
    UnknownSymbol(u8),

    /// The serialized entries do not fit the two byte length field.
    #[error("header of {length} bytes does not fit a 16 bit length field")]
    HeaderOverflow { length: usize },

    /// The input does not fit the four byte length field.
    #[error("input of {length} bytes exceeds the 4 GiB container limit")]
    InputTooLarge { length: u64 },

    /// The stream returned a different amount of data on the second pass.
    #[error("input changed between passes: expected {expected} bytes, read {actual}")]
    StreamChanged { expected: u64, actual: u64 },

    /// A run length does not fit the one byte run counter.
    #[error("run of {count} bytes does not fit a run counter of 1..=255")]
    RunLengthOverflow { count: usize },

    /// An RLE stream ended in the middle of a (count, byte) pair.
    #[error("run length data ends mid-pair at offset {offset}")]
    TruncatedRun { offset: u64 },

    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
