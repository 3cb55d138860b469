// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Validated per-repository records.
//!
//! Each record has a well-defined empty value (`Default`) which is what the
//! collector stores when the corresponding API call yields no data. Records
//! are built once from the wire shapes in [`crate::wire`] and never mutated
//! afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    metrics::CustomMetrics,
    wire::{
        RawBranch, RawCodeFrequencyWeek, RawCodeScanningAlert, RawCommitWeek, RawCommunityProfile,
        RawContributor, RawDependabotAlert, RawIssue, RawParticipation, RawPopularPath,
        RawPullRequest, RawReferrer, RawRelease, RawRepository, RawTag, RawTrafficCounts,
        RawUser, RawWorkflow, RawWorkflowRun
    }
};

/// Maximum number of releases kept in [`ReleaseStats::releases`].
pub const RELEASE_PREVIEW_LIMIT: usize = 10;
/// Maximum number of tag names kept in [`TagStats::latest_tags`].
pub const TAG_PREVIEW_LIMIT: usize = 10;
/// Maximum number of referrers and paths kept in [`TrafficStats`].
pub const TRAFFIC_TOP_LIMIT: usize = 10;

const UNKNOWN: &str = "unknown";

/// Language name to byte count for one repository.
pub type LanguageByteMap = BTreeMap<String, u64>;

/// Everything collected for a single repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryRecord {
    /// `owner/name` identifier the record was collected for.
    pub repository:                   String,
    /// Instant at which collection of this repository started.
    pub collected_at:                 DateTime<Utc>,
    pub basic:                        BasicInfo,
    pub languages:                    LanguageByteMap,
    pub contributors:                 Vec<ContributorEntry>,
    pub contributor_count:            u64,
    pub commit_activity:              CommitActivity,
    pub code_frequency:               CodeFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation:                Option<Participation>,
    pub issues:                       IssueStats,
    pub pull_requests:                PullRequestStats,
    pub releases:                     ReleaseStats,
    pub branches:                     BranchStats,
    pub tags:                         TagStats,
    pub traffic:                      TrafficStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community:                    Option<CommunityHealth>,
    pub vulnerability_alerts_enabled: bool,
    pub dependabot_alerts:            SecurityAlerts,
    pub code_scanning_alerts:         SecurityAlerts,
    pub workflows:                    WorkflowSummary,
    pub custom:                       CustomMetrics
}

/// Repository metadata from `/repos/{owner}/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BasicInfo {
    pub name:              Option<String>,
    pub full_name:         Option<String>,
    pub description:       Option<String>,
    pub private:           bool,
    pub fork:              bool,
    pub created_at:        Option<String>,
    pub updated_at:        Option<String>,
    pub pushed_at:         Option<String>,
    /// Repository size in kilobytes.
    pub size:              u64,
    pub stargazers_count:  u64,
    pub watchers_count:    u64,
    pub forks_count:       u64,
    pub open_issues_count: u64,
    pub default_branch:    Option<String>,
    pub language:          Option<String>,
    pub has_issues:        bool,
    pub has_projects:      bool,
    pub has_downloads:     bool,
    pub has_wiki:          bool,
    pub has_pages:         bool,
    pub has_discussions:   bool,
    pub archived:          bool,
    pub disabled:          bool,
    pub visibility:        Option<String>,
    /// Display name of the license.
    pub license:           Option<String>,
    pub topics:            Vec<String>,
    pub homepage:          Option<String>,
    pub network_count:     u64,
    pub subscribers_count: u64
}

impl BasicInfo {
    pub(crate) fn from_raw(raw: RawRepository) -> Self {
        Self {
            name:              raw.name,
            full_name:         raw.full_name,
            description:       raw.description,
            private:           raw.private,
            fork:              raw.fork,
            created_at:        raw.created_at,
            updated_at:        raw.updated_at,
            pushed_at:         raw.pushed_at,
            size:              raw.size,
            stargazers_count:  raw.stargazers_count,
            watchers_count:    raw.watchers_count,
            forks_count:       raw.forks_count,
            open_issues_count: raw.open_issues_count,
            default_branch:    raw.default_branch,
            language:          raw.language,
            has_issues:        raw.has_issues,
            has_projects:      raw.has_projects,
            has_downloads:     raw.has_downloads,
            has_wiki:          raw.has_wiki,
            has_pages:         raw.has_pages,
            has_discussions:   raw.has_discussions,
            archived:          raw.archived,
            disabled:          raw.disabled,
            visibility:        raw.visibility,
            license:           raw.license.and_then(|license| license.name),
            topics:            raw.topics,
            homepage:          raw.homepage,
            network_count:     raw.network_count,
            subscribers_count: raw.subscribers_count
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContributorEntry {
    pub login:         Option<String>,
    pub contributions: u64,
    /// Account type reported by GitHub (`User`, `Bot`, ...).
    #[serde(rename = "type")]
    pub account_type:  Option<String>
}

impl ContributorEntry {
    pub(crate) fn from_raw(raw: RawContributor) -> Self {
        Self {
            login:         raw.login,
            contributions: raw.contributions,
            account_type:  raw.account_type
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyCommits {
    /// Start of the week as a Unix timestamp.
    pub week:  i64,
    pub total: u64,
    /// Commits per day, Sunday first.
    pub days:  Vec<u64>
}

/// Commit counts over the last 52 weeks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitActivity {
    pub total_commits_last_year: u64,
    pub weekly_activity:         Vec<WeeklyCommits>
}

impl CommitActivity {
    pub(crate) fn from_weeks(weeks: Vec<RawCommitWeek>) -> Self {
        let weekly_activity: Vec<WeeklyCommits> = weeks
            .into_iter()
            .map(|week| WeeklyCommits {
                week:  week.week,
                total: week.total,
                days:  week.days
            })
            .collect();

        Self {
            total_commits_last_year: weekly_activity.iter().map(|week| week.total).sum(),
            weekly_activity
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeFrequency {
    pub total_additions: u64,
    /// Sum of absolute weekly deletions.
    pub total_deletions: u64,
    pub net_lines:       i64
}

impl CodeFrequency {
    pub(crate) fn from_weeks(weeks: &[RawCodeFrequencyWeek]) -> Self {
        let total_additions: u64 = weeks.iter().map(|(_, additions, _)| additions.unsigned_abs()).sum();
        let total_deletions: u64 = weeks.iter().map(|(_, _, deletions)| deletions.unsigned_abs()).sum();

        Self {
            total_additions,
            total_deletions,
            net_lines: total_additions as i64 - total_deletions as i64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Participation {
    pub owner_commits:     u64,
    pub all_commits:       u64,
    pub community_commits: u64
}

impl Participation {
    pub(crate) fn from_raw(raw: &RawParticipation) -> Self {
        let owner_commits: u64 = raw.owner.iter().sum();
        let all_commits: u64 = raw.all.iter().sum();

        Self {
            owner_commits,
            all_commits,
            community_commits: all_commits.saturating_sub(owner_commits)
        }
    }
}

/// Issue counts recovered from the issues endpoint.
///
/// The endpoint lists pull requests alongside issues; items carrying a
/// `pull_request` marker are counted in `open_prs`/`closed_prs` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub open_count:   u64,
    pub closed_count: u64,
    pub total_count:  u64,
    pub open_prs:     u64,
    pub closed_prs:   u64
}

impl IssueStats {
    pub(crate) fn partition(open: &[RawIssue], closed: &[RawIssue]) -> Self {
        let (open_count, open_prs) = count_issues_and_pulls(open);
        let (closed_count, closed_prs) = count_issues_and_pulls(closed);

        Self {
            open_count,
            closed_count,
            total_count: open_count + closed_count,
            open_prs,
            closed_prs
        }
    }
}

fn count_issues_and_pulls(items: &[RawIssue]) -> (u64, u64) {
    let pulls = items.iter().filter(|item| item.pull_request.is_some()).count() as u64;
    (items.len() as u64 - pulls, pulls)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PullRequestStats {
    pub open_count:   u64,
    pub closed_count: u64,
    pub merged_count: u64,
    pub total_count:  u64,
    /// `merged_count / closed_count`, 0 when nothing was closed.
    pub merge_rate:   f64
}

impl PullRequestStats {
    pub(crate) fn from_lists(open: &[RawPullRequest], closed: &[RawPullRequest]) -> Self {
        let merged = closed.iter().filter(|pull| pull.merged_at.is_some()).count() as u64;
        Self::from_counts(open.len() as u64, closed.len() as u64, merged)
    }

    /// Builds the stats from raw counts.
    pub fn from_counts(open_count: u64, closed_count: u64, merged_count: u64) -> Self {
        let merge_rate = if closed_count == 0 {
            0.0
        } else {
            merged_count as f64 / closed_count as f64
        };

        Self {
            open_count,
            closed_count,
            merged_count,
            total_count: open_count + closed_count,
            merge_rate
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleasePreview {
    pub tag_name:     Option<String>,
    pub name:         Option<String>,
    pub published_at: Option<String>,
    pub draft:        bool,
    pub prerelease:   bool,
    pub assets_count: u64
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseStats {
    pub total_releases:        u64,
    /// Tag of the first release returned by the API (the most recent).
    pub latest_release:        Option<String>,
    pub latest_release_date:   Option<String>,
    pub total_asset_downloads: u64,
    pub releases:              Vec<ReleasePreview>
}

impl ReleaseStats {
    pub(crate) fn from_releases(releases: Vec<RawRelease>) -> Self {
        let total_asset_downloads = releases
            .iter()
            .flat_map(|release| release.assets.iter())
            .map(|asset| asset.download_count)
            .sum();
        let latest = releases.first();

        Self {
            total_releases: releases.len() as u64,
            latest_release: latest.and_then(|release| release.tag_name.clone()),
            latest_release_date: latest.and_then(|release| release.published_at.clone()),
            total_asset_downloads,
            releases: releases
                .iter()
                .take(RELEASE_PREVIEW_LIMIT)
                .map(|release| ReleasePreview {
                    tag_name:     release.tag_name.clone(),
                    name:         release.name.clone(),
                    published_at: release.published_at.clone(),
                    draft:        release.draft,
                    prerelease:   release.prerelease,
                    assets_count: release.assets.len() as u64
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchEntry {
    pub name:      Option<String>,
    pub protected: bool
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchStats {
    pub total_branches: u64,
    pub branches:       Vec<BranchEntry>
}

impl BranchStats {
    pub(crate) fn from_raw(branches: Vec<RawBranch>) -> Self {
        Self {
            total_branches: branches.len() as u64,
            branches:       branches
                .into_iter()
                .map(|branch| BranchEntry {
                    name:      branch.name,
                    protected: branch.protected
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagStats {
    pub total_tags:  u64,
    pub latest_tags: Vec<String>
}

impl TagStats {
    pub(crate) fn from_raw(tags: Vec<RawTag>) -> Self {
        Self {
            total_tags:  tags.len() as u64,
            latest_tags: tags
                .into_iter()
                .filter_map(|tag| tag.name)
                .take(TAG_PREVIEW_LIMIT)
                .collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrafficBucket {
    pub timestamp: Option<String>,
    pub count:     u64,
    pub uniques:   u64
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrafficCounts {
    pub count:   u64,
    pub uniques: u64,
    pub daily:   Vec<TrafficBucket>
}

impl TrafficCounts {
    pub(crate) fn from_raw(raw: RawTrafficCounts) -> Self {
        Self {
            count:   raw.count,
            uniques: raw.uniques,
            daily:   raw
                .daily
                .into_iter()
                .map(|bucket| TrafficBucket {
                    timestamp: bucket.timestamp,
                    count:     bucket.count,
                    uniques:   bucket.uniques
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Referrer {
    pub referrer: Option<String>,
    pub count:    u64,
    pub uniques:  u64
}

impl Referrer {
    pub(crate) fn top(referrers: Vec<RawReferrer>) -> Vec<Self> {
        referrers
            .into_iter()
            .take(TRAFFIC_TOP_LIMIT)
            .map(|raw| Self {
                referrer: raw.referrer,
                count:    raw.count,
                uniques:  raw.uniques
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopularPath {
    pub path:    Option<String>,
    pub title:   Option<String>,
    pub count:   u64,
    pub uniques: u64
}

impl PopularPath {
    pub(crate) fn top(paths: Vec<RawPopularPath>) -> Vec<Self> {
        paths
            .into_iter()
            .take(TRAFFIC_TOP_LIMIT)
            .map(|raw| Self {
                path:    raw.path,
                title:   raw.title,
                count:   raw.count,
                uniques: raw.uniques
            })
            .collect()
    }
}

/// Traffic insights; every part requires push access and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrafficStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views:         Option<TrafficCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clones:        Option<TrafficCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_referrers: Option<Vec<Referrer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_paths:     Option<Vec<PopularPath>>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommunityFiles {
    pub code_of_conduct:       bool,
    pub contributing:          bool,
    pub issue_template:        bool,
    pub pull_request_template: bool,
    pub license:               bool,
    pub readme:                bool
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommunityHealth {
    pub health_percentage: u64,
    pub files:             CommunityFiles
}

impl CommunityHealth {
    pub(crate) fn from_raw(raw: RawCommunityProfile) -> Self {
        let present = |file: &Option<serde_json::Value>| file.as_ref().is_some_and(|v| !v.is_null());
        let files = &raw.files;

        Self {
            health_percentage: raw.health_percentage,
            files:             CommunityFiles {
                code_of_conduct:       present(&files.code_of_conduct),
                contributing:          present(&files.contributing),
                issue_template:        present(&files.issue_template),
                pull_request_template: present(&files.pull_request_template),
                license:               present(&files.license),
                readme:                present(&files.readme)
            }
        }
    }
}

/// Alert counts for one security feature.
///
/// A failed fetch and "no alerts" both produce the zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityAlerts {
    pub total_alerts:  u64,
    pub by_severity:   BTreeMap<String, u64>,
    pub by_state:      BTreeMap<String, u64>,
    /// Open alerts with `critical` severity; Dependabot only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_critical: Option<u64>
}

impl SecurityAlerts {
    pub(crate) fn from_dependabot(alerts: &[RawDependabotAlert]) -> Self {
        let entries: Vec<(Option<&str>, Option<&str>)> = alerts
            .iter()
            .map(|alert| {
                (
                    alert
                        .security_advisory
                        .as_ref()
                        .and_then(|advisory| advisory.severity.as_deref()),
                    alert.state.as_deref()
                )
            })
            .collect();

        let open_critical = entries
            .iter()
            .filter(|(severity, state)| *state == Some("open") && *severity == Some("critical"))
            .count() as u64;

        Self {
            open_critical: Some(open_critical),
            ..Self::tally(&entries)
        }
    }

    pub(crate) fn from_code_scanning(alerts: &[RawCodeScanningAlert]) -> Self {
        let entries: Vec<(Option<&str>, Option<&str>)> = alerts
            .iter()
            .map(|alert| {
                (
                    alert.rule.as_ref().and_then(|rule| rule.severity.as_deref()),
                    alert.state.as_deref()
                )
            })
            .collect();

        Self::tally(&entries)
    }

    fn tally(entries: &[(Option<&str>, Option<&str>)]) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut by_state = BTreeMap::new();

        for (severity, state) in entries {
            *by_severity
                .entry(severity.unwrap_or(UNKNOWN).to_owned())
                .or_insert(0) += 1;
            *by_state.entry(state.unwrap_or(UNKNOWN).to_owned()).or_insert(0) += 1;
        }

        Self {
            total_alerts: entries.len() as u64,
            by_severity,
            by_state,
            open_critical: None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowStats {
    pub name:            Option<String>,
    pub state:           Option<String>,
    pub path:            Option<String>,
    pub total_runs:      u64,
    pub successful_runs: u64,
    pub failed_runs:     u64,
    /// `successful_runs / total_runs`, 0 without runs.
    pub success_rate:    f64
}

impl WorkflowStats {
    pub(crate) fn from_runs(workflow: &RawWorkflow, runs: &[RawWorkflowRun]) -> Self {
        let conclusion_count = |expected: &str| {
            runs.iter()
                .filter(|run| run.conclusion.as_deref() == Some(expected))
                .count() as u64
        };
        let total_runs = runs.len() as u64;
        let successful_runs = conclusion_count("success");

        Self {
            name: workflow.name.clone(),
            state: workflow.state.clone(),
            path: workflow.path.clone(),
            total_runs,
            successful_runs,
            failed_runs: conclusion_count("failure"),
            success_rate: if total_runs == 0 {
                0.0
            } else {
                successful_runs as f64 / total_runs as f64
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowSummary {
    pub total_workflows:  u64,
    pub active_workflows: u64,
    /// Stats for workflows whose runs could be fetched.
    pub workflows:        Vec<WorkflowStats>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub login:            Option<String>,
    pub name:             Option<String>,
    pub company:          Option<String>,
    pub blog:             Option<String>,
    pub location:         Option<String>,
    pub email:            Option<String>,
    pub bio:              Option<String>,
    pub twitter_username: Option<String>,
    pub created_at:       Option<String>,
    pub updated_at:       Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountMetrics {
    pub public_repos:        u64,
    pub public_gists:        u64,
    pub followers:           u64,
    pub following:           u64,
    pub total_private_repos: u64,
    pub owned_private_repos: u64,
    pub disk_usage:          u64,
    pub collaborators:       u64
}

/// Profile of the tracked account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub basic_info:      UserProfile,
    pub account_metrics: AccountMetrics
}

impl UserInfo {
    pub(crate) fn from_raw(raw: RawUser) -> Self {
        Self {
            basic_info:      UserProfile {
                login:            raw.login,
                name:             raw.name,
                company:          raw.company,
                blog:             raw.blog,
                location:         raw.location,
                email:            raw.email,
                bio:              raw.bio,
                twitter_username: raw.twitter_username,
                created_at:       raw.created_at,
                updated_at:       raw.updated_at
            },
            account_metrics: AccountMetrics {
                public_repos:        raw.public_repos,
                public_gists:        raw.public_gists,
                followers:           raw.followers,
                following:           raw.following,
                total_private_repos: raw.total_private_repos,
                owned_private_repos: raw.owned_private_repos,
                disk_usage:          raw.disk_usage,
                collaborators:       raw.collaborators
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wire::{RawAsset, RawSeverity, decode_list};

    fn issues(markers: &[bool]) -> Vec<RawIssue> {
        markers
            .iter()
            .map(|is_pull| RawIssue {
                pull_request: is_pull.then(|| json!({"url": "https://example.test/pull"}))
            })
            .collect()
    }

    #[test]
    fn issues_page_with_one_pull_request_is_partitioned() {
        let stats = IssueStats::partition(&issues(&[false, true, false]), &[]);
        assert_eq!(stats.open_count, 2);
        assert_eq!(stats.open_prs, 1);
        assert_eq!(stats.closed_count, 0);
        assert_eq!(stats.total_count, 2);
    }

    #[test]
    fn closed_issues_are_partitioned_separately() {
        let stats = IssueStats::partition(&issues(&[false]), &issues(&[true, true, false]));
        assert_eq!(stats.closed_count, 1);
        assert_eq!(stats.closed_prs, 2);
        assert_eq!(stats.total_count, 2);
    }

    #[test]
    fn merge_rate_is_zero_without_closed_pull_requests() {
        let stats = PullRequestStats::from_counts(4, 0, 0);
        assert_eq!(stats.merge_rate, 0.0);
        assert_eq!(stats.total_count, 4);
    }

    #[test]
    fn merge_rate_counts_merged_among_closed() {
        let closed = vec![
            RawPullRequest {
                merged_at: Some("2024-01-01T00:00:00Z".to_owned())
            },
            RawPullRequest {
                merged_at: None
            },
        ];
        let stats = PullRequestStats::from_lists(&[], &closed);
        assert_eq!(stats.merged_count, 1);
        assert_eq!(stats.merge_rate, 0.5);
    }

    #[test]
    fn release_preview_is_bounded_and_downloads_are_summed() {
        let releases: Vec<RawRelease> = (0..12)
            .map(|index| RawRelease {
                tag_name: Some(format!("v{}", 12 - index)),
                assets: vec![RawAsset {
                    download_count: 5
                }],
                ..RawRelease::default()
            })
            .collect();

        let stats = ReleaseStats::from_releases(releases);
        assert_eq!(stats.total_releases, 12);
        assert_eq!(stats.releases.len(), RELEASE_PREVIEW_LIMIT);
        assert_eq!(stats.latest_release.as_deref(), Some("v12"));
        assert_eq!(stats.total_asset_downloads, 60);
        assert_eq!(stats.releases[0].assets_count, 1);
    }

    #[test]
    fn empty_release_list_has_no_latest_release() {
        let stats = ReleaseStats::from_releases(Vec::new());
        assert_eq!(stats, ReleaseStats::default());
    }

    #[test]
    fn code_frequency_uses_absolute_deletions() {
        let stats = CodeFrequency::from_weeks(&[(0, 100, -40), (1, 20, -80)]);
        assert_eq!(stats.total_additions, 120);
        assert_eq!(stats.total_deletions, 120);
        assert_eq!(stats.net_lines, 0);
    }

    #[test]
    fn participation_derives_community_commits() {
        let stats = Participation::from_raw(&RawParticipation {
            all:   vec![5, 5],
            owner: vec![3, 1]
        });
        assert_eq!(stats.community_commits, 6);
    }

    #[test]
    fn dependabot_alerts_are_tallied_by_severity_and_state() {
        let alerts: Vec<RawDependabotAlert> = decode_list("dependabot", vec![
            json!({"state": "open", "security_advisory": {"severity": "critical"}}),
            json!({"state": "fixed", "security_advisory": {"severity": "critical"}}),
            json!({"state": "open", "security_advisory": {"severity": "low"}}),
            json!({"state": "dismissed"}),
        ])
        .unwrap();

        let stats = SecurityAlerts::from_dependabot(&alerts);
        assert_eq!(stats.total_alerts, 4);
        assert_eq!(stats.open_critical, Some(1));
        assert_eq!(stats.by_severity.get("critical"), Some(&2));
        assert_eq!(stats.by_severity.get("unknown"), Some(&1));
        assert_eq!(stats.by_state.get("open"), Some(&2));
    }

    #[test]
    fn code_scanning_alerts_have_no_critical_counter() {
        let alerts = vec![RawCodeScanningAlert {
            state: Some("open".to_owned()),
            rule:  Some(RawSeverity {
                severity: Some("error".to_owned())
            })
        }];
        let stats = SecurityAlerts::from_code_scanning(&alerts);
        assert_eq!(stats.total_alerts, 1);
        assert_eq!(stats.open_critical, None);
        assert_eq!(stats.by_severity.get("error"), Some(&1));
    }

    #[test]
    fn workflow_success_rate_is_zero_without_runs() {
        let stats = WorkflowStats::from_runs(&RawWorkflow::default(), &[]);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[test]
    fn workflow_counts_successes_and_failures() {
        let runs: Vec<RawWorkflowRun> = ["success", "failure", "success", "cancelled"]
            .iter()
            .map(|conclusion| RawWorkflowRun {
                conclusion: Some((*conclusion).to_owned())
            })
            .collect();
        let stats = WorkflowStats::from_runs(&RawWorkflow::default(), &runs);
        assert_eq!(stats.total_runs, 4);
        assert_eq!(stats.successful_runs, 2);
        assert_eq!(stats.failed_runs, 1);
        assert_eq!(stats.success_rate, 0.5);
    }

    #[test]
    fn community_files_treat_null_as_missing() {
        let raw: RawCommunityProfile = crate::wire::decode(
            "community",
            json!({
                "health_percentage": 71,
                "files": {"readme": {"url": "x"}, "license": null, "contributing": {"url": "y"}}
            })
        )
        .unwrap();
        let health = CommunityHealth::from_raw(raw);
        assert_eq!(health.health_percentage, 71);
        assert!(health.files.readme);
        assert!(health.files.contributing);
        assert!(!health.files.license);
        assert!(!health.files.code_of_conduct);
    }

    #[test]
    fn tags_keep_ten_latest_names() {
        let tags: Vec<RawTag> = (0..15)
            .map(|index| RawTag {
                name: Some(format!("t{index}"))
            })
            .collect();
        let stats = TagStats::from_raw(tags);
        assert_eq!(stats.total_tags, 15);
        assert_eq!(stats.latest_tags.len(), TAG_PREVIEW_LIMIT);
        assert_eq!(stats.latest_tags[0], "t0");
    }
}
