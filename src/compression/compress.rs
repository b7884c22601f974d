use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use log::{debug, info, trace};

use super::container::{CompressedContainer, LENGTH_FIELD};
use crate::bitstream::bitpacker::BitPacker;
use crate::error::{Error, Result};
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::header;
use crate::tools::freq_count::ByteFrequency;

/// Read size for stream input, and the output size at which packed bytes are written out.
const CHUNK_SIZE: usize = 64 * 1024;

/// Huffman encode a whole buffer into a container. Empty input gives the six byte empty
/// container (zero length, empty header, no body).
pub fn encode(data: &[u8]) -> Result<CompressedContainer> {
    let original_length = check_length(data.len() as u64)?;
    info!("Encoding {} bytes.", original_length);

    let freqs = ByteFrequency::from_bytes(data);
    let (table, header) = prepare_table(&freqs)?;

    // Size the output exactly: length field, header, body
    let body_bits = table.encoded_bits(&freqs);
    let mut bp = BitPacker::new(LENGTH_FIELD + header.len() + ((body_bits + 7) / 8) as usize);
    bp.out32(original_length);
    bp.out_bytes(&header);
    trace!("Body starts at {}", bp.loc());

    pack_body(&mut bp, &table, data)?;
    let padding = bp.flush();
    debug!("Body is {} bits plus {} padding bits.", body_bits, padding);

    info!(
        "Encoded {} bytes into {} bytes.",
        original_length,
        bp.output.len()
    );
    Ok(CompressedContainer::from_bytes(bp.output))
}

/// Huffman encode everything from the reader's current position to its end, writing the container
/// to writer as it goes. The reader is read twice: once to count, then once more (after seeking
/// back to where it started) to emit the codes.
pub fn encode_stream<R: Read + Seek, W: Write>(reader: &mut R, writer: &mut W) -> Result<()> {
    let start = reader.stream_position()?;
    let mut buf = vec![0_u8; CHUNK_SIZE];

    // First pass: frequencies only
    let mut freqs = ByteFrequency::new();
    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        freqs.add(&buf[..n]);
    }
    let total = freqs.total();
    let original_length = check_length(total)?;
    info!("Encoding {} bytes from stream.", original_length);

    let (table, header) = prepare_table(&freqs)?;
    let mut bp = BitPacker::new(CHUNK_SIZE + 64);
    bp.out32(original_length);
    bp.out_bytes(&header);

    // Second pass: emit the codes, writing out full chunks of output as we go
    reader.seek(SeekFrom::Start(start))?;
    let mut read = 0_u64;
    let mut written = 0_u64;
    loop {
        let n = read_chunk(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        read += n as u64;
        if read > total {
            return Err(Error::StreamChanged {
                expected: total,
                actual: read,
            });
        }
        pack_body(&mut bp, &table, &buf[..n])?;
        if bp.output.len() >= CHUNK_SIZE {
            writer.write_all(&bp.output)?;
            written += bp.output.len() as u64;
            bp.output.clear();
        }
    }
    if read != total {
        return Err(Error::StreamChanged {
            expected: total,
            actual: read,
        });
    }

    bp.flush();
    writer.write_all(&bp.output)?;
    writer.flush()?;
    written += bp.output.len() as u64;

    info!("Encoded {} bytes into {} bytes.", total, written);
    Ok(())
}

/// Build the code table and its header for a frequency count. The tree is gone by the time this
/// returns; only the codes are needed from here on.
fn prepare_table(freqs: &ByteFrequency) -> Result<(CodeTable, Vec<u8>)> {
    let table = CodeTable::from_frequencies(freqs)?;
    debug!(
        "{} distinct bytes, longest code {} bits.",
        table.len(),
        table.max_len()
    );
    let header = header::serialize(&table)?;
    Ok((table, header))
}

/// Pack the code of every byte in data, in order.
fn pack_body(bp: &mut BitPacker, table: &CodeTable, data: &[u8]) -> Result<()> {
    for &byte in data {
        bp.out_bits(table.code(byte)?.iter());
    }
    Ok(())
}

/// The container stores the original length in four bytes.
fn check_length(length: u64) -> Result<u32> {
    u32::try_from(length).map_err(|_| Error::InputTooLarge { length })
}

/// Fill as much of buf as a single read gives us, retrying on interrupts.
pub(crate) fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
