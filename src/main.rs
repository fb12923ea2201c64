use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use covdiff::badge::{Thresholds, DEFAULT_THRESHOLD_GREEN, DEFAULT_THRESHOLD_ORANGE};
use covdiff::cli::{self, Style};
use covdiff::diff::{DiffOptions, DEFAULT_DECIMALS};
use covdiff::github;

/// covdiff — compare a head coverage summary against a base summary.
#[derive(Parser)]
#[command(name = "covdiff", version, about)]
struct Cli {
    /// Decimal places for rendered percentages.
    #[arg(long, global = true, env = "COVDIFF_DECIMALS", default_value_t = DEFAULT_DECIMALS)]
    decimals: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff head coverage against the base summary.
    Diff {
        /// Base coverage-summary.json (e.g. from the default branch).
        #[arg(long, env = "COVDIFF_BASE")]
        base: PathBuf,

        /// Head coverage-summary.json, or a glob matching several of them.
        #[arg(long, env = "COVDIFF_HEAD", default_value = "coverage/coverage-summary.json")]
        head: String,

        /// Report a coverage drop without failing.
        #[arg(long, env = "COVDIFF_ALLOWED_TO_FAIL")]
        allowed_to_fail: bool,

        /// Output style when not commenting.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,

        /// Post the markdown report as a PR comment; prints the text results
        /// when the run is not for a pull request.
        #[arg(long)]
        comment: bool,
    },

    /// Write a shields.io endpoint badge for the total coverage.
    Badge {
        /// Coverage-summary.json, or a glob matching several of them.
        #[arg(long, env = "COVDIFF_HEAD", default_value = "coverage/coverage-summary.json")]
        summary: String,

        /// Coverage above this is green.
        #[arg(
            long,
            env = "COVDIFF_BADGE_THRESHOLD_GREEN",
            default_value_t = DEFAULT_THRESHOLD_GREEN
        )]
        green: f64,

        /// Coverage above this (and not green) is orange.
        #[arg(
            long,
            env = "COVDIFF_BADGE_THRESHOLD_ORANGE",
            default_value_t = DEFAULT_THRESHOLD_ORANGE
        )]
        orange: f64,

        /// File to write the badge JSON to (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Public URL the badge JSON will be served from; prints the image URL.
        #[arg(long)]
        url: Option<String>,
    },

    /// Show total coverage of a summary.
    Summary {
        /// Coverage-summary.json, or a glob matching several of them.
        #[arg(long, env = "COVDIFF_HEAD", default_value = "coverage/coverage-summary.json")]
        summary: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diff {
            base,
            head,
            allowed_to_fail,
            style,
            comment,
        } => {
            let options = DiffOptions {
                allowed_to_fail,
                decimals: cli.decimals,
            };
            let Some(result) = cli::cmd_diff(&base, &head, &options)? else {
                log::info!("No base coverage summary found at {}", base.display());
                return Ok(());
            };

            if !comment {
                print!("{}", cli::render(&result, &style)?);
            } else if let Some(context) = github::Context::from_env()? {
                log::info!(
                    "Adding a comment with the coverage diff to PR #{}",
                    context.pr_number()
                );
                context.replace_comment(&result.markdown)?;
            } else {
                log::info!("No pull request context, printing the results instead");
                print!("{}", result.results);
            }

            if result.dropped_below_base && !result.should_fail_build {
                log::warn!("Total coverage dropped, but failures are allowed");
            }
            if result.should_fail_build {
                bail!("Total coverage is lower than the base");
            }
            Ok(())
        }
        Commands::Badge {
            summary,
            green,
            orange,
            output,
            url,
        } => {
            let thresholds = Thresholds { green, orange };
            let out = cli::cmd_badge(
                &summary,
                thresholds,
                cli.decimals,
                output.as_deref(),
                url.as_deref(),
            )?;
            print!("{out}");
            Ok(())
        }
        Commands::Summary { summary } => {
            print!("{}", cli::cmd_summary(&summary, cli.decimals)?);
            Ok(())
        }
    }
}
