use std::io::{Read, Write};

use log::{debug, info, trace};

use super::container::read_length;
use crate::bitstream::bitreader::BitReader;
use crate::error::{Error, Result};
use crate::huffman_coding::decode_tree::{DecodeTree, Step, ROOT};
use crate::huffman_coding::header;

/// Decoded bytes are handed to the writer in chunks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Decode a whole container held in memory.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut source = data;
    decode_stream(&mut source, &mut out)?;
    Ok(out)
}

/// Decode a container from reader, writing the original bytes to writer.
///
/// Decoding is driven by the symbol count in the container, not by running out of bits: padding
/// after the last code and anything following the container are never read as symbols.
pub fn decode_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<()> {
    let mut br = BitReader::new(reader);

    let expected = read_length(&mut br)? as u64;
    let table = header::read_header(&mut br)?;
    info!(
        "Decoding {} bytes with {} symbols.",
        expected,
        table.len()
    );
    if expected > 0 && table.is_empty() {
        return Err(Error::MalformedHeader(format!(
            "container holds {} bytes but its header has no codes",
            expected
        )));
    }

    let tree = DecodeTree::from_code_table(&table)?;
    debug!("Decode tree has {} nodes.", tree.len());
    trace!("Body starts at {}", br.loc());

    let mut out = Vec::with_capacity(CHUNK_SIZE.min(expected as usize));
    let mut decoded = 0_u64;
    let mut node = ROOT;
    while decoded < expected {
        let Some(bit) = br.bit()? else {
            return Err(Error::TruncatedBody { decoded, expected });
        };
        match tree.step(node, bit) {
            Some(Step::Branch(next)) => node = next,
            Some(Step::Symbol(symbol)) => {
                out.push(symbol);
                decoded += 1;
                node = ROOT;
                if out.len() >= CHUNK_SIZE {
                    writer.write_all(&out)?;
                    out.clear();
                }
            }
            None => return Err(Error::InvalidCode { decoded }),
        }
    }
    writer.write_all(&out)?;
    writer.flush()?;

    info!("Decoded {} bytes.", decoded);
    Ok(())
}
