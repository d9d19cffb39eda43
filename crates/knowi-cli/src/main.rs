//! knowi CLI: practice quizzes and math drills from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "knowi", version, about = "Quiz scoring and practice drills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one answer against a catalog question
    Evaluate {
        /// Question id
        #[arg(long)]
        question: String,

        /// The answer text
        #[arg(long)]
        answer: String,

        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the questions in a catalog
    Questions {
        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only show one difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Validate catalog TOML files
    Validate {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Generate math problems for the motion challenge
    Math {
        /// Difficulty tier, 1-3
        #[arg(long, default_value = "1")]
        tier: u8,

        /// Number of problems
        #[arg(long, default_value = "5")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Print problems as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer catalog questions interactively, one line per answer
    Practice {
        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only ask one difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Maximum number of questions
        #[arg(long)]
        limit: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the session summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("knowi=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            question,
            answer,
            catalog,
            config,
            json,
        } => commands::evaluate::execute(question, answer, catalog, config, json).await,
        Commands::Questions {
            catalog,
            difficulty,
        } => commands::questions::execute(catalog, difficulty),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Math {
            tier,
            count,
            seed,
            json,
        } => commands::math::execute(tier, count, seed, json),
        Commands::Practice {
            catalog,
            difficulty,
            limit,
            config,
            json,
        } => commands::practice::execute(catalog, difficulty, limit, config, json).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
