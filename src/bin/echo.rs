//! Echo CLI - Command-line interface for Echo Metrics
//!
//! Commands:
//! - analyze: Summarize a two-person chat export
//! - diff: Compare a followers export with a following export
//! - history: List analyses saved in a store file
//! - show: Print one saved analysis

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use echo_metrics::graph::FollowGraphDiffer;
use echo_metrics::store::AnalysisStore;
use echo_metrics::{ComputeError, ConversationAnalyzer, ECHO_VERSION};

/// Echo - Analytics for chat and follow-list exports
#[derive(Parser)]
#[command(name = "echo")]
#[command(version = ECHO_VERSION)]
#[command(about = "Summarize chat exports and diff follow lists", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a two-person chat export
    Analyze {
        /// Conversation file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Append the analysis to this store file and print the stored record
        #[arg(long)]
        store: Option<PathBuf>,

        /// File name recorded in the store (defaults to messages.json)
        #[arg(long)]
        file_name: Option<String>,
    },

    /// Compare a followers export with a following export
    Diff {
        /// Followers export file path
        #[arg(long)]
        followers: PathBuf,

        /// Following export file path
        #[arg(long)]
        following: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Maximum export nesting depth
        #[arg(long, default_value_t = echo_metrics::graph::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// List analyses saved in a store file, newest first
    History {
        /// Store file path
        #[arg(long)]
        store: PathBuf,

        /// Maximum number of analyses to list
        #[arg(long, default_value_t = echo_metrics::store::DEFAULT_LIST_LIMIT)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one saved analysis including its conversation
    Show {
        /// Store file path
        #[arg(long)]
        store: PathBuf,

        /// Analysis id
        id: u64,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let rendered = serde_json::to_string(&CliError::from(e))
                .unwrap_or_else(|_| "Unknown error".to_string());
            eprintln!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}

/// Initialise the global `tracing` subscriber on stderr
fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), EchoCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            output_format,
            store,
            file_name,
        } => cmd_analyze(
            &input,
            &output,
            &output_format,
            store.as_deref(),
            file_name.as_deref(),
        ),

        Commands::Diff {
            followers,
            following,
            output,
            output_format,
            max_depth,
        } => cmd_diff(&followers, &following, &output, &output_format, max_depth),

        Commands::History { store, limit, json } => cmd_history(&store, limit, json),

        Commands::Show { store, id } => cmd_show(&store, id),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    output_format: &OutputFormat,
    store_path: Option<&Path>,
    file_name: Option<&str>,
) -> Result<(), EchoCliError> {
    let conversation: serde_json::Value = serde_json::from_str(&read_input(input)?)?;
    let analyzer = ConversationAnalyzer::new();

    let Some(store_path) = store_path else {
        let summary = analyzer.analyze(&conversation)?;
        info!(total_messages = summary.totals.total_messages, "conversation analyzed");
        return write_output(output, &format_output(&summary, output_format)?);
    };

    let mut store = load_store(store_path)?;
    let record = analyzer.analyze_and_record(&mut store, file_name, conversation)?;
    info!(id = record.id, file_name = %record.file_name, "analysis stored");
    let rendered = format_output(record, output_format)?;

    fs::write(store_path, store.to_json()?)?;
    write_output(output, &rendered)
}

fn cmd_diff(
    followers: &Path,
    following: &Path,
    output: &Path,
    output_format: &OutputFormat,
    max_depth: usize,
) -> Result<(), EchoCliError> {
    let followers: serde_json::Value = serde_json::from_str(&read_input(followers)?)?;
    let following: serde_json::Value = serde_json::from_str(&read_input(following)?)?;

    let differ = FollowGraphDiffer::with_max_depth(max_depth);
    let diff = differ.diff(Some(&followers), Some(&following))?;
    info!(
        not_following_back = diff.not_following_back_count,
        you_dont_follow_back = diff.you_dont_follow_back_count,
        "follow graph compared"
    );

    write_output(output, &format_output(&diff, output_format)?)
}

fn cmd_history(store_path: &Path, limit: usize, json: bool) -> Result<(), EchoCliError> {
    let store = load_store(store_path)?.with_list_limit(limit);
    let listings = store.list_recent();

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    println!("Stored Analyses");
    println!("===============");
    if listings.is_empty() {
        println!("(none)");
    }
    for listing in &listings {
        let [first, second] = &listing.summary.participants;
        println!(
            "  #{:<4} {}  {:<24} {} & {} ({} messages)",
            listing.id,
            listing.created_at.format("%Y-%m-%d %H:%M:%S"),
            listing.file_name,
            first,
            second,
            listing.summary.totals.total_messages
        );
    }

    Ok(())
}

fn cmd_show(store_path: &Path, id: u64) -> Result<(), EchoCliError> {
    let store = load_store(store_path)?;
    let record = store.get(id)?;
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, EchoCliError> {
    if input.to_string_lossy() != "-" {
        debug!(path = %input.display(), "reading input file");
        return Ok(fs::read_to_string(input)?);
    }

    if atty::is(atty::Stream::Stdin) {
        return Err(EchoCliError::NoInput);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn write_output(output: &Path, data: &str) -> Result<(), EchoCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: Serialize + ?Sized>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, EchoCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Load a store file; a missing file is an empty store
fn load_store(path: &Path) -> Result<AnalysisStore, EchoCliError> {
    if !path.exists() {
        debug!(path = %path.display(), "store file missing, starting empty");
        return Ok(AnalysisStore::new());
    }
    Ok(AnalysisStore::from_json(&fs::read_to_string(path)?)?)
}

// Error types

#[derive(Debug)]
enum EchoCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoInput,
}

impl From<io::Error> for EchoCliError {
    fn from(e: io::Error) -> Self {
        EchoCliError::Io(e)
    }
}

impl From<ComputeError> for EchoCliError {
    fn from(e: ComputeError) -> Self {
        EchoCliError::Compute(e)
    }
}

impl From<serde_json::Error> for EchoCliError {
    fn from(e: serde_json::Error) -> Self {
        EchoCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<EchoCliError> for CliError {
    fn from(e: EchoCliError) -> Self {
        match e {
            EchoCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            EchoCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            EchoCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, nothing to read".to_string(),
                hint: Some("Pipe a file into stdin or pass a path".to_string()),
            },
            EchoCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InsufficientParticipants => (
                        "INSUFFICIENT_PARTICIPANTS",
                        Some("The export must list two participants with non-blank names"),
                    ),
                    ComputeError::MissingPayload(_) | ComputeError::InvalidPayload(_) => {
                        ("INVALID_PAYLOAD", Some("Check that the right export files were passed"))
                    }
                    ComputeError::DepthExceeded { .. } => {
                        ("DEPTH_EXCEEDED", Some("Raise --max-depth if the export is genuine"))
                    }
                    ComputeError::NotFound(_) => {
                        ("NOT_FOUND", Some("Run 'echo history' to list ids"))
                    }
                    ComputeError::StoreError(_) => {
                        ("STORE_ERROR", Some("The store file may be corrupt"))
                    }
                    ComputeError::JsonError(_) | ComputeError::ParseError(_) => {
                        ("PARSE_ERROR", Some("Check JSON syntax"))
                    }
                    ComputeError::Sentiment(_) => ("SENTIMENT_ERROR", None),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
        }
    }
}
