//! Header codec: ships the code table so the decoder never needs the original frequencies.
//!
//! Layout (big endian, bits MSB-first):
//!
//! ```text
//! [u16 entry byte count] { [symbol u8] [code length u8] [ceil(length / 8) code bytes] }*
//! ```
//!
//! The count covers the entries only, not the two bytes of the count itself. Entries are
//! written in ascending symbol order. Code bytes are zero padded in their low bits.

use std::io::Read;

use log::{debug, trace};

use super::code_table::{BitCode, CodeTable};
use crate::bitstream::bitpacker::BitPacker;
use crate::bitstream::bitreader::{unpack_bits, BitReader};
use crate::error::{Error, Result};

/// Size of the header length field.
pub const LENGTH_FIELD: usize = 2;

/// Number of entry bytes the table serializes to (excluding the length field).
pub fn entries_len(table: &CodeTable) -> usize {
    table
        .iter()
        .map(|(_, code)| 2 + (code.len() + 7) / 8)
        .sum()
}

/// Serialize the table, length field included.
pub fn serialize(table: &CodeTable) -> Result<Vec<u8>> {
    let length = entries_len(table);
    let field = u16::try_from(length).map_err(|_| Error::HeaderOverflow { length })?;

    let mut bp = BitPacker::new(LENGTH_FIELD + length);
    bp.out16(field);
    for (symbol, code) in table.iter() {
        bp.out8(symbol);
        // CodeTable never holds codes longer than 255 bits
        bp.out8(code.len() as u8);
        bp.out_bits(code.iter());
        // Each entry starts on a byte boundary
        bp.flush();
    }
    debug!(
        "Header: {} symbols in {} bytes, longest code {} bits",
        table.len(),
        length,
        table.max_len()
    );
    Ok(bp.output)
}

/// Parse the entries that follow the length field. entries must be exactly the declared length.
pub fn parse_entries(entries: &[u8]) -> Result<CodeTable> {
    let mut table = CodeTable::new();
    let mut offset = 0;

    while offset < entries.len() {
        // Symbol and code length
        let (symbol, bit_len) = match entries.get(offset..offset + 2) {
            Some(&[symbol, bit_len]) => (symbol, bit_len),
            _ => {
                return Err(Error::MalformedHeader(format!(
                    "entry at offset {} is cut off by the header length {}",
                    offset,
                    entries.len()
                )))
            }
        };
        if bit_len == 0 {
            return Err(Error::MalformedHeader(format!(
                "symbol 0x{:02x} has a zero length code",
                symbol
            )));
        }
        if table.contains(symbol) {
            return Err(Error::MalformedHeader(format!(
                "symbol 0x{:02x} appears twice",
                symbol
            )));
        }
        offset += 2;

        // Packed code bytes
        let code_bytes = (bit_len as usize + 7) / 8;
        let bits = entries
            .get(offset..offset + code_bytes)
            .and_then(|bytes| unpack_bits(bytes, bit_len as usize))
            .ok_or_else(|| {
                Error::MalformedHeader(format!(
                    "code for symbol 0x{:02x} needs {} bytes at offset {}, header length is {}",
                    symbol,
                    code_bytes,
                    offset,
                    entries.len()
                ))
            })?;
        offset += code_bytes;

        table.insert(symbol, BitCode::from(bits))?;
    }
    trace!("Parsed {} header entries", table.len());
    Ok(table)
}

/// Deserialize a header at the start of data. Returns the table and the number of bytes used
/// (length field included).
pub fn deserialize(data: &[u8]) -> Result<(CodeTable, usize)> {
    let Some(&[hi, lo]) = data.get(..LENGTH_FIELD) else {
        return Err(Error::MalformedHeader(
            "missing header length field".to_string(),
        ));
    };
    let length = u16::from_be_bytes([hi, lo]) as usize;
    let entries = data.get(LENGTH_FIELD..LENGTH_FIELD + length).ok_or_else(|| {
        Error::MalformedHeader(format!(
            "header declares {} bytes but only {} follow",
            length,
            data.len() - LENGTH_FIELD
        ))
    })?;
    Ok((parse_entries(entries)?, LENGTH_FIELD + length))
}

/// Read a header from a bitstream positioned at its length field.
pub fn read_header<R: Read>(br: &mut BitReader<R>) -> Result<CodeTable> {
    let length = br
        .bint(16)?
        .ok_or_else(|| Error::MalformedHeader("missing header length field".to_string()))?
        as usize;
    let entries = br.bytes(length)?.ok_or_else(|| {
        Error::MalformedHeader(format!(
            "header declares {} bytes but the input ends first",
            length
        ))
    })?;
    parse_entries(&entries)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::freq_count::ByteFrequency;

    const LITERAL_HEADER: [u8; 11] = [
        0x00, 0x09, // entry bytes
        0x41, 0x02, 0b1100_0000, // A = 11
        0x42, 0x02, 0b1000_0000, // B = 10
        0x43, 0x01, 0b0000_0000, // C = 0
    ];

    fn literal_table() -> CodeTable {
        CodeTable::from_frequencies(&ByteFrequency::from_bytes(b"AAABBCCCC")).unwrap()
    }

    #[test]
    fn serialize_literal_test() {
        let table = literal_table();
        assert_eq!(entries_len(&table), 9);
        assert_eq!(serialize(&table).unwrap(), LITERAL_HEADER);
    }

    #[test]
    fn deserialize_literal_test() {
        let mut data = LITERAL_HEADER.to_vec();
        // Trailing body bytes are left alone
        data.extend([0xfe, 0x80]);
        let (table, used) = deserialize(&data).unwrap();
        assert_eq!(used, 11);
        assert_eq!(table, literal_table());
    }

    #[test]
    fn read_header_test() {
        let mut br = BitReader::new(LITERAL_HEADER.as_slice());
        assert_eq!(read_header(&mut br).unwrap(), literal_table());
        assert_eq!(br.position(), 11);
    }

    #[test]
    fn long_code_test() {
        let mut table = CodeTable::new();
        let code: Vec<bool> = (0..12).map(|i| i % 3 == 0).collect();
        table.insert(0xee, BitCode::from(code)).unwrap();
        let bytes = serialize(&table).unwrap();
        assert_eq!(bytes, [0x00, 0x04, 0xee, 12, 0b1001_0010, 0b0100_0000]);
        assert_eq!(deserialize(&bytes).unwrap().0, table);
    }

    #[test]
    fn empty_table_test() {
        let bytes = serialize(&CodeTable::new()).unwrap();
        assert_eq!(bytes, [0, 0]);
        let (table, used) = deserialize(&bytes).unwrap();
        assert!(table.is_empty());
        assert_eq!(used, 2);
    }

    #[test]
    fn padding_bits_are_ignored_test() {
        let header = [0x00, 0x03, 0x41, 0x01, 0b0111_1111];
        let (table, _) = deserialize(&header).unwrap();
        assert_eq!(table.get(0x41).unwrap().to_string(), "0");
    }

    #[test]
    fn malformed_test() {
        let cases: [&[u8]; 6] = [
            // No length field
            &[0x00],
            // Declares more than there is
            &[0x00, 0x05, 0x41, 0x01, 0x00],
            // Entry cut off after the symbol byte
            &[0x00, 0x04, 0x41, 0x01, 0x00, 0x42],
            // Code bytes cut off by the declared length
            &[0x00, 0x05, 0x41, 0x01, 0x00, 0x42, 0x09, 0x00, 0x00],
            // Zero length code
            &[0x00, 0x02, 0x41, 0x00],
            // Duplicate symbol
            &[0x00, 0x06, 0x41, 0x01, 0x00, 0x41, 0x01, 0x80],
        ];
        for case in cases {
            assert!(
                matches!(deserialize(case), Err(Error::MalformedHeader(_))),
                "{:?} should be rejected",
                case
            );
        }
    }

    #[test]
    fn read_header_truncated_test() {
        let mut br = BitReader::new([0x00, 0x09, 0x41].as_slice());
        assert!(matches!(
            read_header(&mut br),
            Err(Error::MalformedHeader(_))
        ));
        let mut br = BitReader::new([0x00].as_slice());
        assert!(matches!(
            read_header(&mut br),
            Err(Error::MalformedHeader(_))
        ));
    }
}
