// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! End-to-end tracking run.
//!
//! The tracker resolves the account, decides which repositories to visit,
//! collects them one after another and aggregates the result. A repository
//! whose collection fails is logged and left out; it never appears in the
//! report or its totals.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    collector::Collector,
    config::TrackSettings,
    error::Error,
    fetcher::Transport,
    model::{RepositoryRecord, UserInfo},
    retry::Clock,
    summary::{Summary, aggregate}
};

/// Result of one tracking run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Instant at which the run finished collecting.
    pub timestamp:    DateTime<Utc>,
    pub user_info:    UserInfo,
    /// Successfully collected repositories in visiting order.
    pub repositories: Vec<RepositoryRecord>,
    pub summary:      Summary
}

/// Drives a [`Collector`] over every tracked repository.
#[derive(Debug)]
pub struct Tracker<T, C> {
    collector: Collector<T, C>
}

impl<T, C> Tracker<T, C>
where
    T: Transport,
    C: Clock
{
    pub fn new(collector: Collector<T, C>) -> Self {
        Self {
            collector
        }
    }

    /// Runs a full pass according to `settings`.
    ///
    /// Repositories come from `settings.repositories` when set and from the
    /// account listing otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the account cannot be resolved, and
    /// [`Error::Decode`] when the repository listing is malformed. Failures of
    /// individual repositories are not errors.
    pub async fn run(&self, settings: &TrackSettings) -> Result<MetricsReport, Error> {
        info!("Fetching account information");
        let user_info = self.collector.user_info(settings.username.as_deref()).await?;

        let repositories = match &settings.repositories {
            Some(repositories) => repositories.clone(),
            None => {
                let login = settings
                    .username
                    .clone()
                    .or_else(|| user_info.basic_info.login.clone())
                    .ok_or_else(|| Error::service("the authenticated account has no login"))?;
                info!("Listing repositories of {login}");
                self.collector.list_repositories(&login).await?
            }
        };
        info!("Tracking {} repositories", repositories.len());

        let progress = progress_bar(repositories.len() as u64);
        let mut records = Vec::with_capacity(repositories.len());

        for repository in &repositories {
            progress.set_message(repository.clone());
            match self.collector.collect(repository).await {
                Ok(record) => records.push(record),
                Err(e) => error!("Skipping {repository}: {e}")
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            collected = records.len(),
            skipped = repositories.len() - records.len(),
            "Aggregating metrics"
        );
        let summary = aggregate(&records);

        Ok(MetricsReport {
            timestamp: self.collector.fetcher().clock().now(),
            user_info,
            repositories: records,
            summary
        })
    }
}

fn progress_bar(length: u64) -> ProgressBar {
    let progress = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.yellow} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        fetcher::Fetcher,
        testing::{FakeClock, ScriptedTransport}
    };

    fn tracker(transport: ScriptedTransport) -> Tracker<ScriptedTransport, FakeClock> {
        let fetcher = Fetcher::new(transport, FakeClock::at_epoch(1_735_689_600));
        Tracker::new(Collector::new(fetcher))
    }

    fn repositories_page(names: &[&str]) -> serde_json::Value {
        json!(names.iter().map(|name| json!({"full_name": name})).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn failed_repository_is_excluded_from_report_and_totals() {
        let transport = ScriptedTransport::new();
        transport
            .json("/user", json!({"login": "octocat"}))
            .json(
                "/users/octocat/repos?page=1&per_page=100",
                repositories_page(&["octocat/good", "octocat/broken", "octocat/other"])
            )
            .json("/repos/octocat/good", json!({"stargazers_count": 5}))
            .json("/repos/octocat/broken", json!({"stargazers_count": "lots"}))
            .json("/repos/octocat/other", json!({"stargazers_count": 1500}));
        let tracker = tracker(transport);

        let report = tracker.run(&TrackSettings::default()).await.expect("run succeeds");

        let names: Vec<_> = report
            .repositories
            .iter()
            .map(|record| record.repository.as_str())
            .collect();
        assert_eq!(names, vec!["octocat/good", "octocat/other"]);
        assert_eq!(report.summary.total_repositories, 2);
        assert_eq!(report.summary.total_stars, 1505);
        assert_eq!(report.summary.most_starred[0].name, "octocat/other");
        assert_eq!(report.user_info.basic_info.login.as_deref(), Some("octocat"));
    }

    #[tokio::test]
    async fn explicit_repository_list_skips_listing() {
        let transport = ScriptedTransport::new();
        transport.json("/users/someone", json!({"login": "someone"}));
        let tracker = tracker(transport);
        let settings = TrackSettings {
            username: Some("someone".to_owned()),
            repositories: Some(vec!["someone/only".to_owned()]),
            ..TrackSettings::default()
        };

        let report = tracker.run(&settings).await.expect("run succeeds");

        assert_eq!(report.repositories.len(), 1);
        assert!(
            !tracker
                .collector
                .fetcher()
                .transport()
                .requests()
                .iter()
                .any(|route| route.starts_with("/users/someone/repos"))
        );
    }

    #[tokio::test]
    async fn unknown_account_aborts_the_run() {
        let tracker = tracker(ScriptedTransport::new());
        let error = tracker.run(&TrackSettings::default()).await.expect_err("no account");
        assert!(matches!(error, Error::Service { .. }));
    }

    #[tokio::test]
    async fn empty_account_produces_default_summary() {
        let transport = ScriptedTransport::new();
        transport.json("/user", json!({"login": "octocat"}));
        let tracker = tracker(transport);

        let report = tracker.run(&TrackSettings::default()).await.expect("run succeeds");
        assert!(report.repositories.is_empty());
        assert_eq!(report.summary, Summary::default());
    }
}
