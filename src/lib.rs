// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Collection and aggregation of GitHub repository metrics.
//!
//! A [`Tracker`] resolves an account, walks its repositories one at a time
//! through a [`Collector`], and folds the resulting [`RepositoryRecord`]s
//! into a [`Summary`]. Requests go through a [`Fetcher`], which waits out
//! GitHub rate limits and turns every other failure into "no data". The
//! [`export`] module writes the final [`MetricsReport`] as JSON, CSV and
//! HTML.
//!
//! ```no_run
//! use ghmetrics::{
//!     Collector, Fetcher, GitHubTransport, SystemClock, TrackSettings, Tracker
//! };
//!
//! # async fn demo() -> Result<(), ghmetrics::Error> {
//! let transport = GitHubTransport::new(std::env::var("GITHUB_TOKEN").ok().as_deref())?;
//! let tracker = Tracker::new(Collector::new(Fetcher::new(transport, SystemClock)));
//! let report = tracker.run(&TrackSettings::default()).await?;
//! println!("{} stars", report.summary.total_stars);
//! # Ok(())
//! # }
//! ```

mod collector;
mod config;
mod error;
pub mod export;
mod fetcher;
mod metrics;
mod model;
mod pagination;
mod retry;
mod summary;
#[cfg(test)]
mod testing;
mod tracker;
mod wire;

pub use collector::Collector;
pub use config::{
    DEFAULT_OUTPUT_PREFIX, OutputFormat, Overrides, TrackSettings, TrackerConfig, load_config,
    parse_config
};
pub use error::{Error, csv_error, io_error, output_error};
pub use fetcher::{DEFAULT_PAGE_SIZE, Fetcher, GitHubTransport, RawResponse, Transport, build_route};
pub use metrics::{ACTIVE_WINDOW_DAYS, CustomMetrics, Popularity, parse_timestamp};
pub use model::{
    AccountMetrics, BasicInfo, BranchEntry, BranchStats, CodeFrequency, CommitActivity,
    CommunityFiles, CommunityHealth, ContributorEntry, IssueStats, LanguageByteMap, Participation,
    PopularPath, PullRequestStats, Referrer, ReleasePreview, ReleaseStats, RepositoryRecord,
    SecurityAlerts, TagStats, TrafficBucket, TrafficCounts, TrafficStats, UserInfo, UserProfile,
    WeeklyCommits, WorkflowStats, WorkflowSummary
};
pub use retry::{Clock, RetryPolicy, SystemClock};
pub use summary::{ForkRanking, LanguageShare, RANKING_LIMIT, StarRanking, Summary, aggregate};
pub use tracker::{MetricsReport, Tracker};
