// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the ghmetrics binary.
//!
//! One invocation performs a full tracking pass and writes the selected
//! reports.

use std::{path::PathBuf, process};

use clap::Parser;
use ghmetrics::{
    Collector, Error, Fetcher, GitHubTransport, MetricsReport, OutputFormat, Overrides,
    SystemClock, TrackSettings, Tracker, export, load_config,
};
use tracing_subscriber::EnvFilter;

/// Collect metrics for every repository of a GitHub account.
#[derive(Debug, Parser,)]
#[command(name = "ghmetrics", version, about = "Track GitHub repository metrics")]
struct Cli
{
    /// GitHub personal access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Account to track (defaults to the authenticated account).
    #[arg(long = "username", value_name = "LOGIN")]
    username: Option<String,>,

    /// Prefix of the report files [default: github_metrics].
    #[arg(long = "output", value_name = "PREFIX")]
    output: Option<String,>,

    /// Report format [default: all].
    #[arg(long = "format", value_enum)]
    format: Option<OutputFormat,>,

    /// Optional YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter,) => filter,
        Err(_,) => EnvFilter::new("info",),
    };

    tracing_subscriber::fmt().with_env_filter(env_filter,).with_target(false,).init();
}

/// Tracks the configured account and writes the requested reports.
///
/// # Errors
///
/// Propagates configuration, identity and report output errors.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let settings = resolve_settings(&cli,)?;

    let transport = GitHubTransport::new(cli.token.as_deref(),)?;
    let tracker = Tracker::new(Collector::new(Fetcher::new(transport, SystemClock,),),);
    let report = tracker.run(&settings,).await?;

    export::export_reports(&report, &settings.output, settings.format,)?;

    print_totals(&report,);
    Ok((),)
}

fn resolve_settings(cli: &Cli,) -> Result<TrackSettings, Error,>
{
    let config = cli.config.as_deref().map(load_config,).transpose()?;

    Ok(TrackSettings::resolve(
        config,
        Overrides {
            username: cli.username.clone(),
            output:   cli.output.clone(),
            format:   cli.format,
        },
    ),)
}

fn print_totals(report: &MetricsReport,)
{
    println!("Metrics tracking complete");
    println!("Total repositories tracked: {}", report.repositories.len());
    println!("Total stars: {}", report.summary.total_stars);
    println!("Total forks: {}", report.summary.total_forks);
}
