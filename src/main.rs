use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gcovrs::aggregate::RelevantDirs;
use gcovrs::cli::{self, ReportOptions};
use gcovrs::collect::CollectOptions;

/// gcovrs — gcov coverage aggregation and reporting.
#[derive(Parser)]
#[command(name = "gcovrs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run gcov over a build tree and write a Coveralls JSON snapshot.
    Collect {
        /// Path to the git binary.
        #[arg(long, default_value = "git")]
        git: PathBuf,

        /// Path to the gcov program.
        #[arg(long)]
        gcov: PathBuf,

        /// Directory for source files.
        #[arg(long)]
        src_dir: PathBuf,

        /// Directory for generated files.
        #[arg(long)]
        bin_dir: PathBuf,

        /// Directory for temporary gcov files.
        #[arg(long)]
        int_dir: PathBuf,

        /// Relevant source directories, separated with ':'.
        #[arg(long)]
        dirs: String,

        /// Output JSON file.
        #[arg(long)]
        out: PathBuf,
    },

    /// Print a coverage report, optionally diffed and rendered as HTML.
    Report {
        /// Coverage JSON file.
        #[arg(long = "in")]
        input: PathBuf,

        /// Coverage JSON file of the previous build.
        #[arg(long)]
        prev: Option<PathBuf>,

        /// Output directory for the HTML report.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Read listings from the working tree instead of the recorded commit.
        #[arg(long)]
        dirty: bool,

        /// Path to the git binary.
        #[arg(long, default_value = "git")]
        git: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Collect {
            git,
            gcov,
            src_dir,
            bin_dir,
            int_dir,
            dirs,
            out,
        } => {
            let opts = CollectOptions {
                git,
                gcov,
                src_dir,
                bin_dir,
                int_dir,
                dirs: RelevantDirs::parse(&dirs),
            };
            cli::cmd_collect(&opts, &out)?
        }
        Commands::Report {
            input,
            prev,
            out,
            dirty,
            git,
        } => cli::cmd_report(&ReportOptions {
            input,
            previous: prev,
            out,
            dirty,
            git,
        })?,
    };

    print!("{output}");
    Ok(())
}
