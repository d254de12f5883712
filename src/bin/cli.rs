//! Command-line front-end shared by the `xform` binary and its tests.
//!
//! [`run`] parses arguments with a clap builder, initialises tracing and
//! drives one of three pipelines: `encode`/`decode` through a transformer
//! selected by kind tag, or `transcode` through two text streamers.
//!
//! Exit statuses: `0` success, `1` usage error, `2` malformed input,
//! `3` I/O failure.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use compress::zlib::{CompressionLevel, WindowBits};
use text::{LineFormat, MalformedPolicy, StreamerOptions, TextError, TextFormat};
use tracing_subscriber::EnvFilter;
use transform::zlib::{ZlibDecoder, ZlibEncoder};
use transform::{AnyTransformer, TransformError, TransformKind, TransformMode};
use transform_io::{TransformReader, TransformWriter};

const PROGRAM_NAME: &str = "xform";
const LOG_ENV: &str = "XFORM_LOG";
const CLI_TARGET: &str = "xform::cli";

const EXIT_USAGE: i32 = 1;
const EXIT_DATA: i32 = 2;
const EXIT_IO: i32 = 3;

/// Parses `args`, runs the selected subcommand and returns the exit status.
///
/// Data streams use `stdin`/`stdout` unless files are named; diagnostics go
/// to `stderr`.
pub fn run<I, In, Out, Err>(args: I, stdin: &mut In, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    In: Read,
    Out: Write,
    Err: Write,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{err}");
                    0
                }
                _ => {
                    let _ = write!(stderr, "{err}");
                    EXIT_USAGE
                }
            };
        }
    };

    init_logging(matches.get_count("verbose"));

    match execute(&matches, stdin, stdout) {
        Ok(()) => 0,
        Err(failure) => {
            tracing::debug!(target: CLI_TARGET, error = %failure, "failed");
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {failure}");
            failure.exit_code()
        }
    }
}

/// Converts a numeric exit status into an [`ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    ExitCode::from(status.clamp(0, i32::from(u8::MAX)) as u8)
}

fn command() -> Command {
    let input = Arg::new("input")
        .value_name("INPUT")
        .help("Input file; '-' or absent reads standard input.")
        .value_parser(value_parser!(PathBuf));
    let output = Arg::new("output")
        .long("output")
        .short('o')
        .value_name("FILE")
        .help("Output file; standard output when absent.")
        .value_parser(value_parser!(PathBuf));

    let codec = |name: &'static str, about: &'static str| {
        Command::new(name)
            .about(about)
            .arg(
                Arg::new("kind")
                    .long("kind")
                    .short('k')
                    .value_name("KIND")
                    .required(true)
                    .help("Transformer kind: zlib, base16, base32 or base64."),
            )
            .arg(
                Arg::new("level")
                    .long("level")
                    .value_name("LEVEL")
                    .value_parser(value_parser!(f32))
                    .help("zlib compression level from 0.0 (store) to 1.0 (best)."),
            )
            .arg(
                Arg::new("window-bits")
                    .long("window-bits")
                    .value_name("BITS")
                    .value_parser(value_parser!(u8).range(9..=15))
                    .help("zlib window size as a power of two."),
            )
            .arg(
                Arg::new("raw")
                    .long("raw")
                    .help("Use raw deflate framing without the zlib header.")
                    .action(ArgAction::SetTrue),
            )
            .arg(input.clone())
            .arg(output.clone())
    };

    let transcode = Command::new("transcode")
        .about("Convert text between encodings and line endings.")
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("ENCODING")
                .default_value("unknown")
                .help("Input encoding; 'unknown' relies on byte-order-mark detection."),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("ENCODING")
                .default_value("utf-8")
                .help("Output encoding."),
        )
        .arg(
            Arg::new("line-ending")
                .long("line-ending")
                .value_name("STYLE")
                .default_value("unknown")
                .help("cr, lf, crlf or system; 'unknown' keeps each terminator as read."),
        )
        .arg(
            Arg::new("no-bom")
                .long("no-bom")
                .help("Do not write a byte-order mark.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Replace malformed input with U+FFFD instead of failing.")
                .action(ArgAction::SetTrue),
        )
        .arg(input.clone())
        .arg(output.clone());

    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Stream data through Base-N, zlib and Unicode transformers.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase diagnostic output; repeat for more.")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(codec("encode", "Encode or compress the input."))
        .subcommand(codec("decode", "Decode or decompress the input."))
        .subcommand(transcode)
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when run() is called repeatedly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

fn execute(matches: &ArgMatches, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<(), Failure> {
    match matches.subcommand() {
        Some(("encode", sub)) => run_codec(sub, TransformMode::Encode, stdin, stdout),
        Some(("decode", sub)) => run_codec(sub, TransformMode::Decode, stdin, stdout),
        Some(("transcode", sub)) => run_transcode(sub, stdin, stdout),
        _ => Err(Failure::Usage("a subcommand is required".to_owned())),
    }
}

fn run_codec(
    matches: &ArgMatches,
    mode: TransformMode,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<(), Failure> {
    let tag = matches.get_one::<String>("kind").map_or("", String::as_str);
    let transformer = build_transformer(matches, tag, mode)?;

    let mut input = open_input(matches.get_one::<PathBuf>("input"), stdin)?;
    let mut output = open_output(matches.get_one::<PathBuf>("output"), stdout)?;

    let copied = match transformer {
        Some(transformer) => pump(transformer, mode, &mut input, &mut output)?,
        None => {
            tracing::warn!(
                target: CLI_TARGET,
                kind = %tag,
                "unknown transformer kind, copying input unchanged"
            );
            io::copy(&mut input, &mut output)?
        }
    };
    output.flush()?;

    tracing::info!(target: CLI_TARGET, kind = %tag, mode = mode.name(), bytes = copied, "done");
    Ok(())
}

fn build_transformer(
    matches: &ArgMatches,
    tag: &str,
    mode: TransformMode,
) -> Result<Option<AnyTransformer>, Failure> {
    let level = matches.get_one::<f32>("level").copied();
    let bits = matches.get_one::<u8>("window-bits").copied();
    let raw = matches.get_flag("raw");

    let kind = tag.parse::<TransformKind>().ok();
    if kind != Some(TransformKind::Zlib) && (level.is_some() || bits.is_some() || raw) {
        return Err(Failure::Usage(format!("zlib options do not apply to {tag}")));
    }

    let Some(kind) = kind else {
        return Ok(None);
    };
    if kind != TransformKind::Zlib {
        return Ok(Some(kind.create(mode)));
    }

    let window = WindowBits::new(bits.unwrap_or(WindowBits::MAX), !raw)?;
    let transformer = match mode {
        TransformMode::Encode => {
            let level = match level {
                Some(value) => {
                    CompressionLevel::new(value).map_err(|err| Failure::Usage(err.to_string()))?
                }
                None => CompressionLevel::DEFAULT,
            };
            ZlibEncoder::with_window_bits(level, window).into()
        }
        TransformMode::Decode => {
            if level.is_some() {
                return Err(Failure::Usage("--level only applies when encoding".to_owned()));
            }
            ZlibDecoder::with_window_bits(window).into()
        }
    };
    Ok(Some(transformer))
}

fn pump(
    transformer: AnyTransformer,
    mode: TransformMode,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<u64, Failure> {
    match mode {
        TransformMode::Encode => {
            let mut writer = TransformWriter::new(transformer, output)?;
            let copied = io::copy(input, &mut writer)?;
            writer.finish()?;
            Ok(copied)
        }
        TransformMode::Decode => {
            let mut reader = TransformReader::new(transformer, input)?;
            Ok(io::copy(&mut reader, output)?)
        }
    }
}

fn run_transcode(
    matches: &ArgMatches,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<(), Failure> {
    let label = |name: &str| matches.get_one::<String>(name).map_or("unknown", String::as_str);
    let from = TextFormat::new(label("from").parse()?, LineFormat::Unknown);
    let to = TextFormat::new(label("to").parse()?, label("line-ending").parse()?);
    let policy = if matches.get_flag("lenient") {
        MalformedPolicy::Replace
    } else {
        MalformedPolicy::Fail
    };
    let options = StreamerOptions::default()
        .with_suppressed_byte_order_mark(matches.get_flag("no-bom"))
        .with_policy(policy);

    let input = open_input(matches.get_one::<PathBuf>("input"), stdin)?;
    let mut output = open_output(matches.get_one::<PathBuf>("output"), stdout)?;
    let summary = text::transcode(input, &mut output, from, to, options)?;

    tracing::info!(
        target: CLI_TARGET,
        lines = summary.lines,
        chars = summary.chars,
        from = %summary.source.encoding,
        to = %summary.target.encoding,
        "transcoded"
    );
    Ok(())
}

fn open_input<'a>(
    path: Option<&PathBuf>,
    stdin: &'a mut dyn Read,
) -> Result<Box<dyn Read + 'a>, Failure> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path).map_err(|err| Failure::io_at(path, err))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(stdin)),
    }
}

fn open_output<'a>(
    path: Option<&PathBuf>,
    stdout: &'a mut dyn Write,
) -> Result<Box<dyn Write + 'a>, Failure> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::create(path).map_err(|err| Failure::io_at(path, err))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(stdout)),
    }
}

/// Reason a subcommand did not complete.
#[derive(Debug)]
enum Failure {
    Usage(String),
    Data(String),
    Io(io::Error),
}

impl Failure {
    fn io_at(path: &Path, err: io::Error) -> Self {
        Self::Io(io::Error::new(err.kind(), format!("{}: {err}", path.display())))
    }

    const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Data(_) => EXIT_DATA,
            Self::Io(_) => EXIT_IO,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "usage error: {message}"),
            Self::Data(message) => write!(f, "invalid input: {message}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::InvalidData {
            Self::Data(err.to_string())
        } else {
            Self::Io(err)
        }
    }
}

impl From<TransformError> for Failure {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Unsupported(_) => Self::Usage(err.to_string()),
            other => io::Error::from(other).into(),
        }
    }
}

impl From<TextError> for Failure {
    fn from(err: TextError) -> Self {
        match err {
            TextError::UnknownEncoding(_) | TextError::UnknownLineFormat(_) => {
                Self::Usage(err.to_string())
            }
            other => io::Error::from(other).into(),
        }
    }
}
