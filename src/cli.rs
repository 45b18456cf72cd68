// Command-line front end for NanoZip.
//
// Subcommands compress / decompress whole inputs (file or stdio), inspect a
// compressed stream, or print the build configuration.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::compress::decoder::{self, DecodeError};
use crate::compress::encoder::{self, CompressOptions};
use crate::format::{HEADER_SIZE, Header, MAGIC, Token, Tokens};
use crate::hash::compare::{Comparator, Lanes};
use crate::hash::config::{
    DEFAULT_WINDOW, HASH_BITS, MATCH_SEARCH_LIMIT, MAX_MATCH, MAX_WINDOW, MIN_MATCH, MIN_WINDOW,
};

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// LZ77 byte-stream compressor.
#[derive(Parser, Debug)]
#[command(
    name = "nanozip",
    version,
    about = "LZ77 compressor with CRC32-checked streams",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress an input file or stdin.
    Compress(CompressArgs),
    /// Decompress a NanoZip stream.
    Decompress(StreamArgs),
    /// Print the header and token summary of a NanoZip stream.
    Info(InfoArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Auto,
    Scalar,
    Sse2,
    Avx2,
    Neon,
}

impl BackendArg {
    fn lanes(self) -> Option<Lanes> {
        match self {
            Self::Auto => None,
            Self::Scalar => Some(Lanes::Scalar),
            Self::Sse2 => Some(Lanes::Sse2),
            Self::Avx2 => Some(Lanes::Avx2),
            Self::Neon => Some(Lanes::Neon),
        }
    }
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Match window size (supports K suffix; clamped to 1K..=65535).
    #[arg(long = "window-size", short = 'w', value_parser = parse_byte_size, default_value_t = DEFAULT_WINDOW as u64)]
    window_size: u64,

    /// Byte comparator backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Args, Debug)]
struct StreamArgs {
    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Compressed input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Info,
    Config,
}

struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    window_size: usize,
    lanes: Option<Lanes>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        window_size: DEFAULT_WINDOW,
        lanes: None,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => {
            opts.command = Command::Compress;
            opts.window_size = usize::try_from(args.window_size).unwrap_or(usize::MAX);
            opts.lanes = args.backend.lanes();
            opts.use_stdout = args.stream.stdout;
            opts.input_file = args.stream.input;
            opts.output_file = args.stream.output;
        }
        Cmd::Decompress(args) => {
            opts.command = Command::Decompress;
            opts.use_stdout = args.stdout;
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Info(args) => {
            opts.command = Command::Info;
            opts.input_file = args.input;
        }
        Cmd::Config => {}
    }

    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("nanozip".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Input / output helpers
// ---------------------------------------------------------------------------

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    match path {
        Some(path) => {
            std::fs::read(path).map_err(|e| format!("input file: {}: {e}", path.display()))
        }
        None => {
            let mut data = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .map_err(|e| format!("read error: {e}"))?;
            Ok(data)
        }
    }
}

fn check_output(opts: &Options) -> Result<(), String> {
    match &opts.output_file {
        Some(path) if !opts.use_stdout && path.exists() && !opts.force => Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        )),
        _ => Ok(()),
    }
}

fn write_output(opts: &Options, data: &[u8]) -> Result<(), String> {
    match (opts.use_stdout, &opts.output_file) {
        (false, Some(path)) => crate::io::write_file(path, data)
            .map_err(|e| format!("output file: {}: {e}", path.display())),
        _ => {
            let mut out = io::stdout().lock();
            out.write_all(data)
                .and_then(|()| out.flush())
                .map_err(|e| format!("write error: {e}"))
        }
    }
}

fn emit_json(value: serde_json::Value) {
    eprintln!("{value:#}");
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> Result<(), String> {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("nanozip version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();
    let backend = Comparator::detect().lanes();
    let available: Vec<&str> = Lanes::available().into_iter().map(Lanes::name).collect();

    eprintln!("MAGIC={MAGIC:#010X}");
    eprintln!("HEADER_SIZE={HEADER_SIZE}");
    eprintln!("MIN_MATCH={MIN_MATCH}");
    eprintln!("MAX_MATCH={MAX_MATCH}");
    eprintln!("HASH_BITS={HASH_BITS}");
    eprintln!("MATCH_SEARCH_LIMIT={MATCH_SEARCH_LIMIT}");
    eprintln!("MIN_WINDOW={MIN_WINDOW}");
    eprintln!("MAX_WINDOW={MAX_WINDOW}");
    eprintln!("DEFAULT_WINDOW={DEFAULT_WINDOW}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("COMPARATOR={backend}");
    eprintln!("COMPARATORS_AVAILABLE={}", available.join(","));
    eprintln!("sizeof(usize)={ptr_size}");

    Ok(())
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn build_compress_options(opts: &Options) -> CompressOptions {
    CompressOptions {
        window_size: opts.window_size,
        lanes: opts.lanes,
    }
}

fn cmd_compress(opts: &Options) -> Result<(), String> {
    check_output(opts)?;
    let input = read_input(opts.input_file.as_deref())?;

    let compress_opts = build_compress_options(opts);
    let mut packed = vec![0u8; encoder::max_compressed_len(input.len())];
    let stats = encoder::compress_with_stats(&input, &mut packed, &compress_opts)
        .map_err(|e| format!("compress error: {e}"))?;
    packed.truncate(stats.written);

    write_output(opts, &packed)?;

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "nanozip: compress: input size: {}, output size: {}, window: {}, \
             matches: {}, literals: {} ({} escaped), ratio: {:.3}",
            stats.input_len,
            stats.written,
            stats.window_size,
            stats.matches,
            stats.literals,
            stats.escaped,
            stats.ratio(),
        );
    }

    if opts.json_output {
        emit_json(serde_json::json!({
            "command": "compress",
            "input_size": stats.input_len,
            "output_size": stats.written,
            "window_size": stats.window_size,
            "matches": stats.matches,
            "matched_bytes": stats.matched_bytes,
            "literals": stats.literals,
            "escaped": stats.escaped,
            "ratio": stats.ratio(),
        }));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> Result<(), String> {
    check_output(opts)?;
    let packed = read_input(opts.input_file.as_deref())?;

    let plain =
        decoder::decompress_to_vec(&packed).map_err(|e| format!("decompress error: {e}"))?;

    write_output(opts, &plain)?;

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "nanozip: decompress: input size: {}, output size: {}",
            packed.len(),
            plain.len()
        );
    }

    if opts.json_output {
        emit_json(serde_json::json!({
            "command": "decompress",
            "input_size": packed.len(),
            "output_size": plain.len(),
        }));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

/// Header plus a token census of one stream.
#[derive(Debug, Default, PartialEq, Eq)]
struct StreamInfo {
    header: Option<Header>,
    compressed_size: usize,
    literals: usize,
    escaped: usize,
    matches: usize,
    matched_bytes: usize,
    longest_match: usize,
    farthest_distance: usize,
}

/// Walk the tokens until the declared size is covered.
///
/// Counts only; full validation is left to `decompress`.
fn inspect(data: &[u8]) -> Result<StreamInfo, DecodeError> {
    let header = Header::parse(data)?;
    let mut info = StreamInfo {
        header: Some(header),
        compressed_size: data.len(),
        ..StreamInfo::default()
    };

    let target = header.original_size as usize;
    let mut produced = 0usize;
    let mut tokens = Tokens::new(&data[HEADER_SIZE..]);
    while produced < target {
        let Some(token) = tokens.next() else {
            break;
        };
        match token? {
            t @ Token::Literal(_) => {
                info.literals += 1;
                if t.encoded_len() > 1 {
                    info.escaped += 1;
                }
                produced += 1;
            }
            Token::Match { distance, length } => {
                info.matches += 1;
                info.matched_bytes += length as usize;
                info.longest_match = info.longest_match.max(length as usize);
                info.farthest_distance = info.farthest_distance.max(distance as usize);
                produced += length as usize;
            }
        }
    }

    Ok(info)
}

fn cmd_info(opts: &Options) -> Result<(), String> {
    let data = read_input(opts.input_file.as_deref())?;
    let info = inspect(&data).map_err(|e| format!("invalid stream: {e}"))?;
    let verdict = decoder::decompress_to_vec(&data).map(|_| ());

    let Some(header) = info.header else {
        return Err("invalid stream: missing header".into());
    };

    if opts.json_output {
        emit_json(serde_json::json!({
            "command": "info",
            "original_size": header.original_size,
            "crc32": format!("{:#010X}", header.crc),
            "window_size": header.window_size,
            "compressed_size": info.compressed_size,
            "literals": info.literals,
            "escaped": info.escaped,
            "matches": info.matches,
            "matched_bytes": info.matched_bytes,
            "longest_match": info.longest_match,
            "farthest_distance": info.farthest_distance,
            "valid": verdict.is_ok(),
        }));
    }

    if !opts.quiet {
        println!("Magic:              {MAGIC:#010X}");
        println!("Original size:      {}", header.original_size);
        println!("CRC32:              {:#010X}", header.crc);
        println!("Window size:        {}", header.window_size);
        println!("Compressed size:    {}", info.compressed_size);
        println!(
            "Tokens:             {} ({} literals, {} escaped, {} matches)",
            info.literals + info.matches,
            info.literals,
            info.escaped,
            info.matches
        );
        println!("Matched bytes:      {}", info.matched_bytes);
        if opts.verbose > 0 {
            println!("Longest match:      {}", info.longest_match);
            println!("Farthest distance:  {}", info.farthest_distance);
        }
        match &verdict {
            Ok(()) => println!("Status:             ok"),
            Err(e) => println!("Status:             {e}"),
        }
    }

    verdict.map_err(|e| format!("invalid stream: {e}"))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    if let Some(path) = &opts.output_file
        && opts.use_stdout
        && !opts.quiet
    {
        eprintln!(
            "nanozip: warning: -c option overrides output filename: {}",
            path.display()
        );
    }

    let result = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Info => cmd_info(&opts),
        Command::Config => cmd_config(),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(msg) => {
            eprintln!("nanozip: {msg}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
