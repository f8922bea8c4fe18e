//! litscore CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "litscore",
    version,
    about = "Questionnaire scoring and cohort analytics"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an answer sheet and append it to the record store
    Submit {
        /// Path to the answer sheet TOML
        #[arg(long)]
        answers: PathBuf,

        /// Extra respondent metadata (repeatable, e.g. --info major=Arts)
        #[arg(long = "info", value_parser = commands::parse_key_val)]
        info: Vec<(String, String)>,

        /// Question bank TOML (defaults to the configured or bundled bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Record store path
        #[arg(long)]
        store: Option<PathBuf>,

        /// Score without storing
        #[arg(long)]
        dry_run: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summarize the stored cohort
    Stats {
        /// Respondent field to group total scores by (repeatable)
        #[arg(long = "group-by")]
        group_by: Vec<String>,

        /// Show the percentile rank of this total score
        #[arg(long)]
        score: Option<f64>,

        /// Record store path
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Render a previously saved JSON report instead of reading the store
        #[arg(long, conflicts_with_all = ["group_by", "score", "store", "output"])]
        input: Option<PathBuf>,
    },

    /// Show dimension weights and maximum scores
    Weights {
        /// Question bank TOML
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to question bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and question bank
    Init,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("litscore=info,litscore_core=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Submit {
            answers,
            info,
            bank,
            store,
            dry_run,
            format,
        } => commands::submit::execute(answers, info, bank, store, dry_run, format, config),
        Commands::Stats {
            group_by,
            score,
            store,
            format,
            output,
            input,
        } => match input {
            Some(input) => commands::stats::render_saved(input, format),
            None => commands::stats::execute(group_by, score, store, format, output, config),
        },
        Commands::Weights { bank } => commands::weights::execute(bank, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
