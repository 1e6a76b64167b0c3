//! acrodrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "acrodrill", version, about = "Adaptive acronym and exam-question drills")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swipe through a training deck (reads l/r per card from stdin)
    Train {
        /// Deck policy: random, reinforcement
        #[arg(long, default_value = "reinforcement")]
        mode: String,

        /// Cards in the deck (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Learner id (default from config)
        #[arg(long)]
        user: Option<String>,

        /// Only print the planned deck
        #[arg(long)]
        plan_only: bool,
    },

    /// Answer drill questions (reads one answer per line from stdin)
    Drill {
        /// Drill mode: normal, hard
        #[arg(long, default_value = "normal")]
        mode: String,

        /// Questions in the drill (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Restrict to a domain (1-5 or D1-D5)
        #[arg(long)]
        domain: Option<String>,

        /// Restrict to a category (e.g. crypto)
        #[arg(long)]
        category: Option<String>,

        /// Learner id (default from config)
        #[arg(long)]
        user: Option<String>,
    },

    /// Select an exam paper and write it to a file
    Exam {
        /// Exam preset: quick, standard, full
        #[arg(long, default_value = "quick")]
        preset: String,

        /// Learner id (default from config)
        #[arg(long)]
        user: Option<String>,

        /// Where to write the paper JSON
        #[arg(long, default_value = "exam-paper.json")]
        output: PathBuf,
    },

    /// Grade an answer sheet against an exam paper
    Grade {
        /// Paper written by `acrodrill exam`
        #[arg(long)]
        paper: PathBuf,

        /// JSON object of question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Learner id (default from config)
        #[arg(long)]
        user: Option<String>,

        /// Add an offline study summary of missed questions
        #[arg(long)]
        summary: bool,

        /// Report output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare two exam reports per domain
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in percentage points
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show mastery and exam statistics for a learner
    Stats {
        /// Learner id (default from config)
        #[arg(long)]
        user: Option<String>,

        /// Directory of exam reports (default: output_dir from config)
        #[arg(long)]
        reports: Option<PathBuf>,

        /// Number of weakest items to list
        #[arg(long, default_value = "10")]
        weakest: usize,
    },

    /// Validate the catalogue and question bank
    Validate {
        /// Catalogue file or directory (default from config)
        #[arg(long)]
        catalogue: Option<PathBuf>,

        /// Question bank JSON (default from config)
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Create starter config and sample data
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("acrodrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Train {
            mode,
            count,
            user,
            plan_only,
        } => commands::train::execute(config, mode, count, user, plan_only).await,
        Commands::Drill {
            mode,
            count,
            domain,
            category,
            user,
        } => commands::drill::execute(config, mode, count, domain, category, user).await,
        Commands::Exam {
            preset,
            user,
            output,
        } => commands::exam::execute(config, preset, user, output).await,
        Commands::Grade {
            paper,
            answers,
            user,
            summary,
            output,
        } => commands::grade::execute(config, paper, answers, user, summary, output).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Stats {
            user,
            reports,
            weakest,
        } => commands::stats::execute(config, user, reports, weakest).await,
        Commands::Validate { catalogue, bank } => {
            commands::validate::execute(config, catalogue, bank)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
