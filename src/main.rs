//! Purpose: `doclib` CLI entry point: parse args, build the API client, dispatch commands.
//! Role: Binary crate root; commands print rendered views (or JSON with `--json`) on stdout.
//! Invariants: Errors go to stderr as text on a TTY and as JSON otherwise.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Logging goes to stderr so stdout stays parseable.
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod interactive;

use doclib::api::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, Error, ErrorKind,
    FileUpload, to_exit_code,
};
use doclib::core::validate::{MAX_UPLOAD_BYTES, guess_mime};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `doclib --help`."));
            }
        },
    };

    init_tracing();

    let mut config = ClientConfig::new(cli.base_url.clone());
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("--timeout-ms must be greater than zero")
                .with_hint("Omit the flag to use no timeout, or pass a value like 30000."));
        }
        config = config.with_timeout(Duration::from_millis(timeout_ms));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to start runtime")
                .with_source(err)
        })?;
    let output = if cli.json { Output::Json } else { Output::Human };
    let result = runtime.block_on(command_dispatch::dispatch_command(
        cli.command,
        config,
        output,
    ));

    result
        .map_err(|err| add_network_hint(err, &cli.base_url))
        .map_err(add_internal_hint)
}

#[derive(Parser)]
#[command(
    name = "doclib",
    version,
    about = "Search, upload, and manage documents in a remote document library",
    long_about = None,
    after_help = r#"EXAMPLES
  $ doclib search neural networks
  $ doclib upload paper.pdf --authors "Ada Lovelace, Alan Turing" --tags "math, history"
  $ doclib list --tags math
  $ doclib update 65f0c2 --tags "nlp, transformers"
  $ doclib delete 65f0c2
  $ doclib shell                      # interactive search / upload / manage views

ENVIRONMENT
  DOCLIB_BASE_URL    API base url (default: http://localhost:8000)
  DOCLIB_TIMEOUT_MS  request timeout in milliseconds (default: none)
  RUST_LOG           log filter for stderr diagnostics (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        env = "DOCLIB_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        value_hint = ValueHint::Url,
        help = "Base url of the document API"
    )]
    base_url: String,
    #[arg(
        long,
        env = "DOCLIB_TIMEOUT_MS",
        help = "Per-request timeout in milliseconds (default: none)"
    )]
    timeout_ms: Option<u64>,
    #[arg(long, global = true, help = "Emit raw JSON records instead of rendered views")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Output {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Search documents by meaning")]
    Search {
        #[arg(required = true, num_args = 1.., help = "Query text (words are joined with spaces)")]
        query: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, help = "Maximum results")]
        limit: u32,
    },
    #[command(about = "List documents, newest first")]
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
        #[arg(long, help = "Comma-separated tags, passed to the server as-is")]
        tags: Option<String>,
    },
    #[command(about = "Show one document")]
    Get { id: String },
    #[command(about = "Create a document from text")]
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,
        #[arg(long, value_hint = ValueHint::FilePath)]
        content_file: Option<PathBuf>,
        #[arg(long, default_value = "", help = "Comma-separated authors")]
        authors: String,
        #[arg(long, default_value = "", help = "Comma-separated tags")]
        tags: String,
    },
    #[command(about = "Upload a PDF, DOCX, DOC, or TXT file (max 10MB)")]
    Upload {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Title (default: file name without extension)")]
        title: Option<String>,
        #[arg(long, default_value = "", help = "Comma-separated authors")]
        authors: String,
        #[arg(long, default_value = "", help = "Comma-separated tags")]
        tags: String,
        #[arg(long, help = "MIME type (default: inferred from the extension)")]
        mime: Option<String>,
    },
    #[command(about = "Update fields of a document")]
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Comma-separated authors (replaces the list)")]
        authors: Option<String>,
        #[arg(long, help = "Comma-separated tags (replaces the list)")]
        tags: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    #[command(about = "Delete a document (asks for confirmation)")]
    Delete {
        id: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Interactive shell over the search, upload, and manage views")]
    Shell,
    #[command(about = "Generate shell completion scripts")]
    Completion { shell: Shell },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Reads a file for upload. Files over the upload limit come back unread so
/// the upload form rejects them through its usual validation.
async fn load_upload_file(path: &Path, mime: Option<&str>) -> Result<FileUpload, Error> {
    let read_error = |err: io::Error| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    };
    let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime
        .map(str::to_string)
        .or_else(|| guess_mime(path).map(str::to_string))
        .unwrap_or_else(|| "application/octet-stream".to_string());
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Ok(FileUpload::unread(name, mime, metadata.len()));
    }
    let bytes = tokio::fs::read(path).await.map_err(read_error)?;
    Ok(FileUpload::new(name, mime, bytes))
}

fn add_network_hint(err: Error, base_url: &str) -> Error {
    if err.kind() != ErrorKind::Network || err.hint().is_some() {
        return err;
    }
    err.with_hint(format!(
        "Is the document API running at {base_url}? Set --base-url or DOCLIB_BASE_URL."
    ))
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_record<T: Serialize>(record: &T) -> Result<(), Error> {
    let value = serde_json::to_value(record).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output json")
            .with_source(err)
    })?;
    emit_json(value);
    Ok(())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(err.detail()));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", err.detail())];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(status) = err.status() {
        lines.push(format!("status: {status}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
