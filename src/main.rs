#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use huffle::compression::files::{compress_file, decompress_file, test_file};
use huffle::tools::cli::{init_opts, Mode};

fn main() -> Result<(), huffle::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace. The real level is set from the
    // command line in init_opts. Logs go to stderr so they never mix with data on stdout.
    if TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("Could not start the terminal logger.");
    }

    let options = init_opts();

    //----- Figure out what we need to do and go do it
    let result = match options.op_mode {
        Mode::Compress => compress_file(&options),
        Mode::Decompress => decompress_file(&options),
        Mode::Test => test_file(&options),
    };

    match &result {
        Ok(()) => info!("Done.\n"),
        Err(e) => error!("{}", e),
    }
    result
}
