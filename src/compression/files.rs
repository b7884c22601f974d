//! File and pipe plumbing for the command line: choose names, open inputs and outputs, and hand
//! them to the stream codecs.

use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use log::{info, warn};

use super::compress::{encode, encode_stream, read_chunk};
use super::container::ContainerInfo;
use super::decompress::decode_stream;
use crate::error::Result;
use crate::huffman_coding::huffman::HuffmanTree;
use crate::tools::cli::{Codec, HuffOpts, Output};
use crate::tools::freq_count::ByteFrequency;
use crate::tools::rle::{rle_decode_stream, rle_encode, rle_encode_stream};

/// Suffix given to decompressed files whose name does not end in the codec suffix.
const UNKNOWN_SUFFIX: &str = "out";

/// Compress the input named in opts, or stdin when there is none.
pub fn compress_file(opts: &HuffOpts) -> Result<()> {
    let Some(path) = opts.file.as_deref() else {
        // Stdin cannot be rewound, so it is read into memory and encoded in one go
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        let encoded = match opts.codec {
            Codec::Huffman => {
                if opts.show_tree {
                    show_tree(&ByteFrequency::from_bytes(&data))?;
                }
                encode(&data)?.into_bytes()
            }
            Codec::Rle => rle_encode(&data),
        };
        let mut out = io::stdout().lock();
        out.write_all(&encoded)?;
        out.flush()?;
        return Ok(());
    };

    if opts.show_tree && opts.codec == Codec::Huffman {
        show_tree(&count_file(path)?)?;
    }

    let out_name = compressed_name(path, opts.codec);
    let mut fin = File::open(path)?;
    write_output(opts, &out_name, |mut writer| match opts.codec {
        Codec::Huffman => encode_stream(&mut fin, &mut writer),
        Codec::Rle => rle_encode_stream(&mut fin, &mut writer),
    })?;
    remove_input(opts, path)
}

/// Decompress the input named in opts, or stdin when there is none.
pub fn decompress_file(opts: &HuffOpts) -> Result<()> {
    let Some(path) = opts.file.as_deref() else {
        let mut fin = io::stdin().lock();
        let mut out = io::stdout().lock();
        return decode_with(opts.codec, &mut fin, &mut out);
    };

    let out_name = decompressed_name(path, opts.codec);
    let mut fin = File::open(path)?;
    write_output(opts, &out_name, |mut writer| {
        decode_with(opts.codec, &mut fin, &mut writer)
    })?;
    remove_input(opts, path)
}

/// Decode the input without keeping the output, and report what it held.
pub fn test_file(opts: &HuffOpts) -> Result<()> {
    let name = opts.file.as_deref().unwrap_or("(stdin)");
    let mut data = Vec::new();
    match opts.file.as_deref() {
        Some(path) => File::open(path)?.read_to_end(&mut data)?,
        None => io::stdin().lock().read_to_end(&mut data)?,
    };

    if opts.codec == Codec::Huffman {
        let info = ContainerInfo::parse(&data)?;
        info!("{}: {}", name, info);
    }
    decode_with(opts.codec, &mut data.as_slice(), &mut io::sink())?;
    info!("{}: ok", name);
    Ok(())
}

fn decode_with<R: Read, W: Write>(codec: Codec, reader: &mut R, writer: &mut W) -> Result<()> {
    match codec {
        Codec::Huffman => decode_stream(reader, writer),
        Codec::Rle => rle_decode_stream(reader, writer),
    }
}

/// Run job against the output channel chosen in opts. A file output that job fails to fill is
/// removed again.
fn write_output<F>(opts: &HuffOpts, out_name: &str, job: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if opts.output == Output::Stdout {
        let mut out = io::stdout().lock();
        return job(&mut out);
    }

    if Path::new(out_name).exists() && !opts.force_overwrite {
        return Err(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("{} already exists, use -f to overwrite it", out_name),
        )
        .into());
    }
    info!("Writing {}", out_name);
    let mut writer = BufWriter::new(File::create(out_name)?);
    let result = job(&mut writer);
    drop(writer);
    if result.is_err() {
        if let Err(e) = fs::remove_file(out_name) {
            warn!("Could not remove partial output {}: {}", out_name, e);
        }
    }
    result
}

/// Input files go away once their output is safely written, unless asked to keep them.
fn remove_input(opts: &HuffOpts, path: &str) -> Result<()> {
    if opts.keep_input_files || opts.output == Output::Stdout {
        return Ok(());
    }
    info!("Removing {}", path);
    fs::remove_file(path)?;
    Ok(())
}

/// Output name when compressing: the input name plus the codec suffix.
pub fn compressed_name(path: &str, codec: Codec) -> String {
    format!("{}.{}", path, codec.suffix())
}

/// Output name when decompressing: the codec suffix stripped, or `.out` added if it isn't there.
pub fn decompressed_name(path: &str, codec: Codec) -> String {
    match path.strip_suffix(codec.suffix()) {
        Some(stem) if stem.len() > 1 && stem.ends_with('.') => stem[..stem.len() - 1].to_string(),
        _ => {
            warn!(
                "{} does not end in .{}, writing to .{}",
                path,
                codec.suffix(),
                UNKNOWN_SUFFIX
            );
            format!("{}.{}", path, UNKNOWN_SUFFIX)
        }
    }
}

/// Byte frequencies of a whole file.
fn count_file(path: &str) -> Result<ByteFrequency> {
    let mut fin = File::open(path)?;
    let mut buf = vec![0_u8; 64 * 1024];
    let mut freqs = ByteFrequency::new();
    loop {
        let n = read_chunk(&mut fin, &mut buf)?;
        if n == 0 {
            break;
        }
        freqs.add(&buf[..n]);
    }
    Ok(freqs)
}

fn show_tree(freqs: &ByteFrequency) -> Result<()> {
    if freqs.is_empty() {
        info!("Empty input has no huffman tree.");
        return Ok(());
    }
    let tree = HuffmanTree::from_frequencies(freqs)?;
    info!(
        "Huffman tree, {} leaves, depth {}:\n{}",
        tree.leaves(),
        tree.depth(),
        tree
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::tools::cli::Mode;
    use std::path::PathBuf;

    /// A scratch directory that is removed when dropped.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("huffle-{}-{}", name, std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }

        fn file(&self, name: &str, data: &[u8]) -> String {
            let path = self.0.join(name);
            fs::write(&path, data).unwrap();
            path.to_string_lossy().into_owned()
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn opts_for(path: &str, op_mode: Mode, codec: Codec) -> HuffOpts {
        HuffOpts {
            codec,
            file: Some(path.to_string()),
            op_mode,
            ..HuffOpts::new()
        }
    }

    #[test]
    fn names_test() {
        assert_eq!(compressed_name("a.txt", Codec::Huffman), "a.txt.huf");
        assert_eq!(compressed_name("a.txt", Codec::Rle), "a.txt.rle");
        assert_eq!(decompressed_name("a.txt.huf", Codec::Huffman), "a.txt");
        assert_eq!(decompressed_name("a.txt.rle", Codec::Rle), "a.txt");
        assert_eq!(decompressed_name("a.txt.rle", Codec::Huffman), "a.txt.rle.out");
        assert_eq!(decompressed_name("ahuf", Codec::Huffman), "ahuf.out");
        assert_eq!(decompressed_name(".huf", Codec::Huffman), ".huf.out");
    }

    #[test]
    fn file_roundtrip_test() {
        let scratch = Scratch::new("roundtrip");
        let data = "she sells sea shells by the sea shore\n".repeat(200);
        for codec in [Codec::Huffman, Codec::Rle] {
            let path = scratch.file("shells.txt", data.as_bytes());
            compress_file(&opts_for(&path, Mode::Compress, codec)).unwrap();
            // Input is gone unless -k
            assert!(!Path::new(&path).exists());

            let packed = compressed_name(&path, codec);
            test_file(&opts_for(&packed, Mode::Test, codec)).unwrap();

            let mut opts = opts_for(&packed, Mode::Decompress, codec);
            opts.keep_input_files = true;
            decompress_file(&opts).unwrap();
            assert!(Path::new(&packed).exists());
            assert_eq!(fs::read(&path).unwrap(), data.as_bytes());
            fs::remove_file(&packed).unwrap();
        }
    }

    #[test]
    fn no_overwrite_test() {
        let scratch = Scratch::new("overwrite");
        let path = scratch.file("a.txt", b"abcabc");
        let existing = scratch.file("a.txt.huf", b"keep me");

        let mut opts = opts_for(&path, Mode::Compress, Codec::Huffman);
        match compress_file(&opts) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::AlreadyExists),
            other => panic!("expected AlreadyExists, got {:?}", other),
        }
        assert_eq!(fs::read(&existing).unwrap(), b"keep me");
        assert!(Path::new(&path).exists());

        opts.force_overwrite = true;
        opts.keep_input_files = true;
        compress_file(&opts).unwrap();
        assert_eq!(
            fs::read(&existing).unwrap(),
            encode(b"abcabc").unwrap().into_bytes()
        );
        assert!(Path::new(&path).exists());
    }

    #[test]
    fn failed_decode_removes_output_test() {
        let scratch = Scratch::new("corrupt");
        // Claims 9 bytes but the body stops after 4 symbols
        let path = scratch.file(
            "bad.huf",
            &[
                0x00, 0x00, 0x00, 0x09, 0x00, 0x09, 0x41, 0x02, 0xc0, 0x42, 0x02, 0x80, 0x43, 0x01,
                0x00, 0xfe,
            ],
        );
        let opts = opts_for(&path, Mode::Decompress, Codec::Huffman);
        assert!(matches!(
            decompress_file(&opts),
            Err(Error::TruncatedBody { .. })
        ));
        assert!(!Path::new(&decompressed_name(&path, Codec::Huffman)).exists());
        // A failed run leaves its input alone
        assert!(Path::new(&path).exists());
        assert!(test_file(&opts_for(&path, Mode::Test, Codec::Huffman)).is_err());
    }

    #[test]
    fn show_tree_test() {
        show_tree(&ByteFrequency::new()).unwrap();
        show_tree(&ByteFrequency::from_bytes(b"AAABBCCCC")).unwrap();
    }
}
