//! The tools module provides the helpers around the two codecs.
//!
//! The tools are:
//! - cli: Command line interface, parsed with clap into `HuffOpts`.
//! - freq_count: Byte frequency count, parallel for large inputs.
//! - rle: Run length encoding as (count, byte) pairs, buffer and stream versions.
//!
pub mod cli;
pub mod freq_count;
pub mod rle;
