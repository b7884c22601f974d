use std::fmt;
use std::io::Read;

use crate::bitstream::bitreader::BitReader;
use crate::error::{Error, Result};
use crate::huffman_coding::header;

/// Size of the original length field.
pub const LENGTH_FIELD: usize = 4;

/// Output of the huffman encoder: `[u32 length][header][body]`. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedContainer {
    bytes: Vec<u8>,
}

impl CompressedContainer {
    /// Wrap bytes that are believed to hold a container. Nothing is checked until decode.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Summary of the container fields. Parses the header but not the body.
    pub fn info(&self) -> Result<ContainerInfo> {
        ContainerInfo::parse(&self.bytes)
    }
}

impl AsRef<[u8]> for CompressedContainer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<CompressedContainer> for Vec<u8> {
    fn from(container: CompressedContainer) -> Self {
        container.bytes
    }
}

/// What a container holds, without decoding the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub original_length: u32,
    /// Header bytes, length field included.
    pub header_length: usize,
    pub symbols: usize,
    pub body_length: usize,
}

impl ContainerInfo {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(&[a, b, c, d]) = data.get(..LENGTH_FIELD) else {
            return Err(missing_length());
        };
        let original_length = u32::from_be_bytes([a, b, c, d]);
        let (table, header_length) = header::deserialize(&data[LENGTH_FIELD..])?;
        Ok(Self {
            original_length,
            header_length,
            symbols: table.len(),
            body_length: data.len() - LENGTH_FIELD - header_length,
        })
    }

    /// Total container size.
    pub fn compressed_length(&self) -> usize {
        LENGTH_FIELD + self.header_length + self.body_length
    }

    /// Compressed size over original size. 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_length == 0 {
            return 0.0;
        }
        self.compressed_length() as f64 / self.original_length as f64
    }
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes -> {} bytes ({} symbols, {} byte header, {} byte body, ratio {:.3})",
            self.original_length,
            self.compressed_length(),
            self.symbols,
            self.header_length,
            self.body_length,
            self.ratio()
        )
    }
}

/// Read the original length field from the start of a container stream.
pub fn read_length<R: Read>(br: &mut BitReader<R>) -> Result<u32> {
    match br.bint(32)? {
        Some(length) => Ok(length as u32),
        None => Err(missing_length()),
    }
}

fn missing_length() -> Error {
    Error::MalformedContainer(format!(
        "container is shorter than its {} byte length field",
        LENGTH_FIELD
    ))
}
