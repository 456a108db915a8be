use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use markdraw::{
    CodecConfig, ConfigError, MarkdrawDocument, MarkdrawError, ParseResult, ParseWarning, parse_document,
    parse_excalidraw, parse_library, serialize_document, serialize_excalidraw_with, serialize_excalidrawlib_with,
    serialize_native_library,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("invalid log level '{0}' (expected error, warn, info, debug or trace)")]
    LogLevel(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{input}: {err}")]
    Strict { input: String, err: MarkdrawError },
}

#[derive(Parser, Debug)]
#[command(name = "markdraw", about = "Convert and check markdraw documents, Excalidraw files and libraries")]
struct Cli {
    /// Maximum log level written to stderr.
    #[arg(long, env = "MARKDRAW_LOG", default_value = "warn")]
    log: String,

    /// Excalidraw envelope `source` string.
    #[arg(long, env = "MARKDRAW_SOURCE")]
    source: Option<String>,

    /// Indent JSON output (also enabled by MARKDRAW_PRETTY_JSON).
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert between markdraw text and Excalidraw JSON.
    Convert(ConvertArgs),
    /// Parse a document and report its warnings.
    Check(CheckArgs),
    /// Convert a library between the native and excalidrawlib dialects.
    Library(LibraryArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(short, long, help = "Output file path; stdout when absent")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, help = "Output format; the other format than the input when absent")]
    to: Option<DocumentFormat>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, help = "Fail when any warning is reported")]
    strict: bool,
}

#[derive(Args, Debug)]
struct LibraryArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(short, long, help = "Output file path; stdout when absent")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, help = "Output dialect; the other dialect than the input when absent")]
    to: Option<LibraryFormat>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Md,
    Excalidraw,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LibraryFormat {
    Native,
    Excalidrawlib,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let mut config = CodecConfig::from_env()?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    config.pretty_json |= cli.pretty;

    match cli.command {
        Command::Convert(args) => run_convert(&config, args),
        Command::Check(args) => run_check(args),
        Command::Library(args) => run_library(&config, args),
    }
}

fn init_tracing(level: &str) -> Result<(), CliError> {
    let level: tracing::Level = level.parse().map_err(|_| CliError::LogLevel(level.to_owned()))?;
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
    Ok(())
}

fn run_convert(config: &CodecConfig, args: ConvertArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    let from_json = looks_like_json(&text);
    let result = if from_json { parse_excalidraw(&text) } else { parse_document(&text) };
    report(&args.input, &result.warnings);

    let to = args.to.unwrap_or(if from_json { DocumentFormat::Md } else { DocumentFormat::Excalidraw });
    let rendered = render_document(&result.value, to, config);
    tracing::info!(input = %args.input, ?to, elements = result.value.element_count(), "converted document");
    write_output(args.output.as_ref(), &rendered)
}

fn render_document(doc: &MarkdrawDocument, to: DocumentFormat, config: &CodecConfig) -> String {
    match to {
        DocumentFormat::Md => serialize_document(doc),
        DocumentFormat::Excalidraw => serialize_excalidraw_with(doc, config),
    }
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    let result: ParseResult<MarkdrawDocument> =
        if looks_like_json(&text) { parse_excalidraw(&text) } else { parse_document(&text) };
    report(&args.input, &result.warnings);
    let summary = format!(
        "{}: {} element(s), {} section(s), {} warning(s)",
        args.input,
        result.value.element_count(),
        result.value.sections.len(),
        result.warnings.len()
    );
    if args.strict {
        let input = args.input.clone();
        result.into_result().map_err(|err| CliError::Strict { input, err })?;
    }
    eprintln!("{summary}");
    Ok(())
}

fn run_library(config: &CodecConfig, args: LibraryArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    let from_json = looks_like_json(&text);
    let result = parse_library(&text);
    report(&args.input, &result.warnings);

    let to = args.to.unwrap_or(if from_json { LibraryFormat::Native } else { LibraryFormat::Excalidrawlib });
    let rendered = match to {
        LibraryFormat::Native => serialize_native_library(&result.value),
        LibraryFormat::Excalidrawlib => serialize_excalidrawlib_with(&result.value, config),
    };
    tracing::info!(input = %args.input, ?to, items = result.value.items.len(), "converted library");
    write_output(args.output.as_ref(), &rendered)
}

fn looks_like_json(text: &str) -> bool {
    text.trim_start().starts_with('{')
}

fn report(input: &str, warnings: &[ParseWarning]) {
    for warning in warnings {
        eprintln!("{input}: {warning}");
    }
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read = if path == "-" { io::read_to_string(io::stdin()) } else { fs::read_to_string(path) };
    read.map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn write_output(path: Option<&PathBuf>, rendered: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, rendered)
            .map_err(|source| CliError::Write { path: path.display().to_string(), source }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| if rendered.ends_with('\n') { Ok(()) } else { stdout.write_all(b"\n") })
                .map_err(|source| CliError::Write { path: "stdout".to_owned(), source })
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
