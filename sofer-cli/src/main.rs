//! Sofer CLI - Command-line interface for collating transcriptions

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::CollateOptions;
use sofer_core::normalize::{MarkClass, SpellingScheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "sofer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collate a transcription against the reference edition
    Collate {
        /// Reference edition (TEI or plain text)
        reference: String,

        /// Transcription to collate
        transcription: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Output format (tei, context, latex, usfm, json)
        #[arg(short, long, default_value = "tei")]
        format: String,

        #[command(flatten)]
        options: CollateOptions,
    },

    /// Collate every transcription in a directory
    Batch {
        /// Reference edition (TEI or plain text)
        reference: String,

        /// Directory of transcriptions
        input_dir: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: String,

        /// Output format (tei, context, latex, usfm, json)
        #[arg(short, long, default_value = "tei")]
        format: String,

        /// Number of parallel jobs (must be at least 1)
        #[arg(short, long, default_value = "4", value_parser = parse_jobs)]
        jobs: usize,

        #[command(flatten)]
        options: CollateOptions,
    },

    /// Display a summary of a witness
    Info {
        /// Input file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report unreadable units and suspicious words in a witness
    Check {
        /// Input file path
        input: String,

        /// Fail on lint findings as well as unit issues
        #[arg(long)]
        strict: bool,
    },

    /// Normalize the words of a TEI transcription
    Normalize {
        /// Input TEI file
        input: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Spelling table to apply (none, sro, sro-chronicles)
        #[arg(long, default_value = "none")]
        spelling: SpellingScheme,

        /// Mark classes to strip (cantillation, pointing, extraordinaire)
        #[arg(short = 'a', long = "strip", value_delimiter = ',')]
        strip: Vec<MarkClass>,
    },

    /// Print the bibliography field sets
    Fields {
        /// Only this category
        #[arg(long)]
        category: Option<String>,

        /// Field sets file to use instead of the built-in one
        #[arg(long)]
        spec: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "sofer_cli=debug,sofer_core=debug"
    } else {
        "sofer_cli=info,sofer_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Collate {
            reference,
            transcription,
            output,
            format,
            options,
        } => commands::collate(&reference, &transcription, &output, &format, &options),

        Commands::Batch {
            reference,
            input_dir,
            output_dir,
            format,
            jobs,
            options,
        } => commands::batch(&reference, &input_dir, &output_dir, &format, jobs, &options),

        Commands::Info { input, json } => commands::info(&input, json),

        Commands::Check { input, strict } => commands::check(&input, strict),

        Commands::Normalize {
            input,
            output,
            spelling,
            strip,
        } => commands::normalize(&input, &output, spelling, &strip),

        Commands::Fields {
            category,
            spec,
            json,
        } => commands::fields(category.as_deref(), spec.as_deref(), json),
    }
}
