use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use oxiscan_api_usage::{AnalysisConfig, Analyzer, ScoreMode};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oxiscan")]
#[command(about = "Scan TypeScript projects for how they use a dependency", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect every use of one dependency's API across projects
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// JSON config naming the projects and the target dependency
    #[arg(long, short)]
    config: PathBuf,

    /// Write the full report as JSON to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Score the result even if the config disables scoring
    #[arg(long)]
    score: bool,

    /// Number of APIs listed per table
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Exit non-zero when a black-listed API is used
    #[arg(long)]
    fail_on_black: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    // stdout is line buffered, batch writes instead.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Analyze(args) => {
            let mut cfg = AnalysisConfig::from_file(&args.config)?;
            if args.score {
                cfg.score_plugin = ScoreMode::Default;
            }
            let num_threads = rayon::current_num_threads();
            info!(
                "Analyzing usage of '{}' in {} projects (using {} threads)",
                cfg.analysis_target,
                cfg.scan_source.len(),
                num_threads
            );

            let report = Analyzer::new(cfg).run()?;
            let elapsed_ms = start.elapsed().as_millis();

            oxiscan_api_usage::print_summary(&mut stdout, &report, args.top)?;

            if let Some(path) = &args.output {
                let json = serde_json::to_string_pretty(&report)?;
                fs::write(path, json)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                writeln!(stdout, "\n{} Report written to {}", "●".bright_blue(), path.display())?;
            }

            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files (using {} threads).",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                report.files_analyzed.to_string().cyan(),
                num_threads.to_string().cyan()
            )?;
            stdout.flush()?;

            let black = oxiscan_api_usage::black_listed_usages(&report);
            if args.fail_on_black && black > 0 {
                info!("{} black-listed APIs in use", black);
                // Non-zero exit to fail CI
                std::process::exit(1);
            }

            Ok(())
        }
    }
}
