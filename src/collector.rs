// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-repository metric collection.
//!
//! The collector walks a fixed list of sub-resources for one repository and
//! turns each into a typed record. Missing data never aborts a repository:
//! every sub-resource has an empty value that is used when its fetch yields
//! nothing. Only a payload that arrives with an unexpected shape for a
//! required resource fails the whole repository.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    fetcher::{Fetcher, Transport},
    metrics::CustomMetrics,
    model::{
        BasicInfo, BranchStats, CodeFrequency, CommitActivity, CommunityHealth, ContributorEntry,
        IssueStats, LanguageByteMap, Participation, PopularPath, PullRequestStats, Referrer,
        ReleaseStats, RepositoryRecord, SecurityAlerts, TagStats, TrafficCounts, TrafficStats,
        UserInfo, WorkflowStats, WorkflowSummary
    },
    retry::Clock,
    wire::{
        RawBranch, RawCodeFrequencyWeek, RawCodeScanningAlert, RawCommitWeek, RawCommunityProfile,
        RawContributor, RawDependabotAlert, RawIssue, RawListedRepository, RawParticipation,
        RawPopularPath, RawPullRequest, RawReferrer, RawRelease, RawRepository, RawTag,
        RawTrafficCounts, RawUser, RawWorkflowList, RawWorkflowRuns, decode, decode_list
    }
};

/// Page size requested for workflow runs (a single page per workflow).
const WORKFLOW_RUNS_PER_PAGE: usize = 100;

/// Collects [`RepositoryRecord`]s through a [`Fetcher`].
#[derive(Debug)]
pub struct Collector<T, C> {
    fetcher: Fetcher<T, C>
}

impl<T, C> Collector<T, C>
where
    T: Transport,
    C: Clock
{
    /// Wraps a fetcher.
    pub fn new(fetcher: Fetcher<T, C>) -> Self {
        Self {
            fetcher
        }
    }

    /// Underlying fetcher.
    pub fn fetcher(&self) -> &Fetcher<T, C> {
        &self.fetcher
    }

    /// Fetches the profile of `target`, or of the authenticated account when
    /// `target` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the profile cannot be fetched; without
    /// it the run has no identity to work with.
    pub async fn user_info(&self, target: Option<&str>) -> Result<UserInfo, Error> {
        let path = match target {
            Some(login) => format!("/users/{login}"),
            None => "/user".to_owned()
        };

        let value = self.fetcher.fetch(&path, &[]).await.ok_or_else(|| {
            Error::service(format!("unable to fetch account information from {path}"))
        })?;
        let raw: RawUser = decode("user", value)?;

        Ok(UserInfo::from_raw(raw))
    }

    /// Lists the `owner/name` identifiers of every repository of `login`, in
    /// the order returned by the API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when a listing entry has an unexpected shape.
    pub async fn list_repositories(&self, login: &str) -> Result<Vec<String>, Error> {
        let items = self.fetcher.fetch_all(&format!("/users/{login}/repos"), &[]).await;
        let listed: Vec<RawListedRepository> = decode_list("repositories", items)?;

        Ok(listed.into_iter().filter_map(|repo| repo.full_name).collect())
    }

    /// Collects every sub-resource of `repository` (`owner/name`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when a required resource answers with a
    /// payload that does not match its expected shape. Failed fetches are
    /// not errors.
    pub async fn collect(&self, repository: &str) -> Result<RepositoryRecord, Error> {
        info!("Collecting metrics for {repository}");
        let collected_at = self.fetcher.clock().now();
        let base = format!("/repos/{repository}");

        let basic = self.basic(&base).await?;
        let languages = self.languages(&base).await?;
        let contributors = self.contributors(&base).await?;
        let commit_activity = self.commit_activity(&base).await?;
        let code_frequency = self.code_frequency(&base).await?;
        let participation = self.participation(&base).await?;
        let issues = self.issues(&base).await?;
        let pull_requests = self.pull_requests(&base).await?;
        let releases = self.releases(&base).await?;
        let branches = self.branches(&base).await?;
        let tags = self.tags(&base).await?;
        let traffic = self.traffic(&base).await;
        let community = best_effort("community", self.community(&base).await);
        let vulnerability_alerts_enabled =
            self.fetcher.probe(&format!("{base}/vulnerability-alerts")).await;
        let dependabot_alerts = best_effort("dependabot_alerts", self.dependabot_alerts(&base).await);
        let code_scanning_alerts =
            best_effort("code_scanning_alerts", self.code_scanning_alerts(&base).await);
        let workflows = self.workflows(&base).await?;
        let custom = CustomMetrics::derive(&basic, self.fetcher.clock().now());

        Ok(RepositoryRecord {
            repository: repository.to_owned(),
            collected_at,
            contributor_count: contributors.len() as u64,
            basic,
            languages,
            contributors,
            commit_activity,
            code_frequency,
            participation,
            issues,
            pull_requests,
            releases,
            branches,
            tags,
            traffic,
            community,
            vulnerability_alerts_enabled,
            dependabot_alerts,
            code_scanning_alerts,
            workflows,
            custom
        })
    }

    async fn basic(&self, base: &str) -> Result<BasicInfo, Error> {
        match self.fetcher.fetch(base, &[]).await {
            Some(value) => Ok(BasicInfo::from_raw(decode::<RawRepository>("basic", value)?)),
            None => {
                warn!("no repository metadata for {base}, using empty defaults");
                Ok(BasicInfo::default())
            }
        }
    }

    async fn languages(&self, base: &str) -> Result<LanguageByteMap, Error> {
        match self.fetcher.fetch(&format!("{base}/languages"), &[]).await {
            Some(value @ Value::Object(_)) => decode::<BTreeMap<String, u64>>("languages", value),
            _ => Ok(LanguageByteMap::new())
        }
    }

    async fn contributors(&self, base: &str) -> Result<Vec<ContributorEntry>, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/contributors"), &[]).await;
        let raw: Vec<RawContributor> = decode_list("contributors", items)?;

        Ok(raw.into_iter().map(ContributorEntry::from_raw).collect())
    }

    async fn commit_activity(&self, base: &str) -> Result<CommitActivity, Error> {
        match self.stats_rows(base, "commit_activity").await {
            Some(value) => Ok(CommitActivity::from_weeks(decode::<Vec<RawCommitWeek>>(
                "commit_activity",
                value
            )?)),
            None => Ok(CommitActivity::default())
        }
    }

    async fn code_frequency(&self, base: &str) -> Result<CodeFrequency, Error> {
        match self.stats_rows(base, "code_frequency").await {
            Some(value) => {
                let weeks: Vec<RawCodeFrequencyWeek> = decode("code_frequency", value)?;
                Ok(CodeFrequency::from_weeks(&weeks))
            }
            None => Ok(CodeFrequency::default())
        }
    }

    /// Fetches a `/stats/*` endpoint that answers with an array.
    ///
    /// GitHub answers `202 Accepted` with an empty object while it computes
    /// statistics; anything other than a non-empty array counts as no data.
    async fn stats_rows(&self, base: &str, statistic: &str) -> Option<Value> {
        match self.fetcher.fetch(&format!("{base}/stats/{statistic}"), &[]).await {
            Some(Value::Array(rows)) if !rows.is_empty() => Some(Value::Array(rows)),
            Some(_) => {
                debug!("{statistic} statistics not available yet for {base}");
                None
            }
            None => None
        }
    }

    async fn participation(&self, base: &str) -> Result<Option<Participation>, Error> {
        match self.fetcher.fetch(&format!("{base}/stats/participation"), &[]).await {
            Some(Value::Object(fields)) if !fields.is_empty() => {
                let raw: RawParticipation = decode("participation", Value::Object(fields))?;
                Ok(Some(Participation::from_raw(&raw)))
            }
            _ => Ok(None)
        }
    }

    async fn issues(&self, base: &str) -> Result<IssueStats, Error> {
        let path = format!("{base}/issues");
        let open: Vec<RawIssue> = decode_list("issues", self.listing_in_state(&path, "open").await)?;
        let closed: Vec<RawIssue> =
            decode_list("issues", self.listing_in_state(&path, "closed").await)?;

        Ok(IssueStats::partition(&open, &closed))
    }

    async fn pull_requests(&self, base: &str) -> Result<PullRequestStats, Error> {
        let path = format!("{base}/pulls");
        let open: Vec<RawPullRequest> =
            decode_list("pull_requests", self.listing_in_state(&path, "open").await)?;
        let closed: Vec<RawPullRequest> =
            decode_list("pull_requests", self.listing_in_state(&path, "closed").await)?;

        Ok(PullRequestStats::from_lists(&open, &closed))
    }

    async fn listing_in_state(&self, path: &str, state: &str) -> Vec<Value> {
        self.fetcher.fetch_all(path, &[("state", state.to_owned())]).await
    }

    async fn releases(&self, base: &str) -> Result<ReleaseStats, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/releases"), &[]).await;
        let raw: Vec<RawRelease> = decode_list("releases", items)?;

        Ok(ReleaseStats::from_releases(raw))
    }

    async fn branches(&self, base: &str) -> Result<BranchStats, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/branches"), &[]).await;
        let raw: Vec<RawBranch> = decode_list("branches", items)?;

        Ok(BranchStats::from_raw(raw))
    }

    async fn tags(&self, base: &str) -> Result<TagStats, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/tags"), &[]).await;
        let raw: Vec<RawTag> = decode_list("tags", items)?;

        Ok(TagStats::from_raw(raw))
    }

    /// Traffic requires push access; every part is optional and unusable
    /// payloads are dropped with a warning.
    async fn traffic(&self, base: &str) -> TrafficStats {
        let views = self.traffic_part::<RawTrafficCounts>(base, "views").await;
        let clones = self.traffic_part::<RawTrafficCounts>(base, "clones").await;
        let referrers = self
            .traffic_part::<Vec<RawReferrer>>(base, "popular/referrers")
            .await;
        let paths = self.traffic_part::<Vec<RawPopularPath>>(base, "popular/paths").await;

        TrafficStats {
            views:         views.map(TrafficCounts::from_raw),
            clones:        clones.map(TrafficCounts::from_raw),
            top_referrers: referrers.map(Referrer::top),
            top_paths:     paths.map(PopularPath::top)
        }
    }

    async fn traffic_part<P>(&self, base: &str, part: &str) -> Option<P>
    where
        P: serde::de::DeserializeOwned
    {
        let value = self.fetcher.fetch(&format!("{base}/traffic/{part}"), &[]).await?;
        match decode(part, value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("ignoring traffic data for {base}: {e}");
                None
            }
        }
    }

    async fn community(&self, base: &str) -> Result<Option<CommunityHealth>, Error> {
        match self.fetcher.fetch(&format!("{base}/community/profile"), &[]).await {
            Some(value) => {
                let raw: RawCommunityProfile = decode("community", value)?;
                Ok(Some(CommunityHealth::from_raw(raw)))
            }
            None => Ok(None)
        }
    }

    async fn dependabot_alerts(&self, base: &str) -> Result<SecurityAlerts, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/dependabot/alerts"), &[]).await;
        if items.is_empty() {
            return Ok(SecurityAlerts::default());
        }

        let raw: Vec<RawDependabotAlert> = decode_list("dependabot_alerts", items)?;
        Ok(SecurityAlerts::from_dependabot(&raw))
    }

    async fn code_scanning_alerts(&self, base: &str) -> Result<SecurityAlerts, Error> {
        let items = self.fetcher.fetch_all(&format!("{base}/code-scanning/alerts"), &[]).await;
        if items.is_empty() {
            return Ok(SecurityAlerts::default());
        }

        let raw: Vec<RawCodeScanningAlert> = decode_list("code_scanning_alerts", items)?;
        Ok(SecurityAlerts::from_code_scanning(&raw))
    }

    /// Lists workflows, then fetches one page of runs per workflow.
    async fn workflows(&self, base: &str) -> Result<WorkflowSummary, Error> {
        let Some(value) = self.fetcher.fetch(&format!("{base}/actions/workflows"), &[]).await else {
            return Ok(WorkflowSummary::default());
        };
        let Some(workflows) = decode::<RawWorkflowList>("workflows", value)?.workflows else {
            return Ok(WorkflowSummary::default());
        };

        let mut stats = Vec::with_capacity(workflows.len());
        for workflow in &workflows {
            let runs_path = format!("{base}/actions/workflows/{}/runs", workflow.id);
            let query = [("per_page", WORKFLOW_RUNS_PER_PAGE.to_string())];
            let Some(value) = self.fetcher.fetch(&runs_path, &query).await else {
                continue;
            };

            if let Some(runs) = decode::<RawWorkflowRuns>("workflow_runs", value)?.workflow_runs {
                stats.push(WorkflowStats::from_runs(workflow, &runs));
            }
        }

        Ok(WorkflowSummary {
            total_workflows:  workflows.len() as u64,
            active_workflows: workflows
                .iter()
                .filter(|workflow| workflow.state.as_deref() == Some("active"))
                .count() as u64,
            workflows:        stats
        })
    }
}

/// Replaces an unusable best-effort result with its empty value.
fn best_effort<V>(resource: &str, result: Result<V, Error>) -> V
where
    V: Default
{
    result.unwrap_or_else(|e| {
        warn!("ignoring {resource}: {e}");
        V::default()
    })
}
