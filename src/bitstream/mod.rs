//! The bitstream module forms the I/O subsystem for huffle.
//!
//! Huffman codes have no fixed width, so the compressed body is a continuous run of bits that
//! only becomes byte aligned again at the very end. The header, on the other hand, is byte
//! aligned throughout and only packs the individual codes bit by bit.
//!
//! BitPacker collects bits (or whole words) MSB-first into an output buffer and pads the final
//! byte with zeros. BitReader reads them back from any source that implements `Read`.
//!
//! Padding bits carry no meaning. Consumers always know how many bits they need (the original
//! length for the body, the code length for each header entry) and never look at the rest.
//!
pub mod bitpacker;
pub mod bitreader;
