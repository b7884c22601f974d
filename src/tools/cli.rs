use std::fmt::{Display, Formatter};

use clap::Parser;
use log::{info, warn, LevelFilter};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// Quiet wins over any number of -v.
    fn from_flags(quiet: bool, count: u8) -> Self {
        match (quiet, count) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Warnings,
            (false, 1) => Verbosity::Info,
            (false, 2) => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Compress, Decompress, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Which format to read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Huffman,
    Rle,
}
impl Codec {
    /// File name suffix of compressed output, without the dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Codec::Huffman => "huf",
            Codec::Rle => "rle",
        }
    }
}
impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffOpts {
    /// Huffman container or run length pairs
    pub codec: Codec,
    /// File to read for input. None means stdin.
    pub file: Option<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Log the huffman tree when compressing
    pub show_tree: bool,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new() -> Self {
        Self {
            codec: Codec::Huffman,
            file: None,
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Compress,
            output: Output::File,
            show_tree: false,
            verbose: Verbosity::Warnings,
        }
    }
}

impl Default for HuffOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Byte oriented huffman and run length compressor",
    long_about = "
    Compresses a file by building a huffman tree over its byte frequencies and
    writing a self describing container: original length, code table, packed codes.
    With --rle the file is written as (count, byte) pairs instead.

    Output goes to FILE.huf (or FILE.rle). Without a file name, input is read from
    stdin and output written to stdout."
)]
#[clap(group(clap::ArgGroup::new("mode").args(&["compress", "decompress", "test"])))]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    filename: Option<String>,

    /// Perform compression on the input file (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Use run length encoding instead of huffman coding
    #[clap(long = "rle")]
    rle: bool,

    /// Keep input file
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Only report errors
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose, -vv and -vvv give more
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Log the huffman tree built for the input
    #[clap(long = "show-tree")]
    show_tree: bool,
}

/// Put command line information from CLAP into our internal structure.
pub fn from_args(args: Args) -> HuffOpts {
    let op_mode = if args.test {
        Mode::Test
    } else if args.decompress {
        Mode::Decompress
    } else {
        Mode::Compress
    };

    HuffOpts {
        codec: if args.rle { Codec::Rle } else { Codec::Huffman },
        // No file means a pipe, so output can only go to stdout
        output: if args.stdout || args.filename.is_none() {
            Output::Stdout
        } else {
            Output::File
        },
        file: args.filename,
        force_overwrite: args.force,
        keep_input_files: args.keep,
        op_mode,
        show_tree: args.show_tree,
        verbose: Verbosity::from_flags(args.quiet, args.verbose),
    }
}

/// Parse the command line, set the log level and report what we are about to do.
pub fn init_opts() -> HuffOpts {
    let opts = from_args(Args::parse());

    log::set_max_level(opts.verbose.level_filter());

    // Below we report initialization status to the user
    info!("---- Huffle Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Codec set to {}", opts.codec);
    match &opts.file {
        Some(s) => info!("Getting input from the file {}", s),
        None => info!("Getting input from stdin"),
    }
    if opts.output == Output::Stdout && opts.op_mode != Mode::Test {
        warn!("Sending output to stdout")
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    if opts.show_tree && (opts.codec == Codec::Rle || opts.op_mode != Mode::Compress) {
        warn!("--show-tree only applies to huffman compression")
    }
    info!("---- Huffle Initialization End ----\n");
    opts
}
