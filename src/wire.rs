// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Raw GitHub REST payload shapes.
//!
//! Every field is defaulted so that absent keys decode to empty values. The
//! collector converts these into the domain records of [`crate::model`];
//! nothing outside the collector sees a wire type.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Error;

/// Decodes a JSON value into a wire type, naming `resource` on failure.
pub(crate) fn decode<T>(resource: &str, value: Value) -> Result<T, Error>
where
    T: DeserializeOwned
{
    serde_json::from_value(value).map_err(|source| Error::decode(resource, source))
}

/// Decodes every item of a paginated listing.
pub(crate) fn decode_list<T>(resource: &str, values: Vec<Value>) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned
{
    values
        .into_iter()
        .map(|value| decode(resource, value))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawUser {
    pub login:               Option<String>,
    pub name:                Option<String>,
    pub company:             Option<String>,
    pub blog:                Option<String>,
    pub location:            Option<String>,
    pub email:               Option<String>,
    pub bio:                 Option<String>,
    pub twitter_username:    Option<String>,
    pub created_at:          Option<String>,
    pub updated_at:          Option<String>,
    pub public_repos:        u64,
    pub public_gists:        u64,
    pub followers:           u64,
    pub following:           u64,
    pub total_private_repos: u64,
    pub owned_private_repos: u64,
    pub disk_usage:          u64,
    pub collaborators:       u64
}

/// Entry of `/users/{login}/repos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawListedRepository {
    pub full_name: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawRepository {
    pub name:              Option<String>,
    pub full_name:         Option<String>,
    pub description:       Option<String>,
    pub private:           bool,
    pub fork:              bool,
    pub created_at:        Option<String>,
    pub updated_at:        Option<String>,
    pub pushed_at:         Option<String>,
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
    pub license:           Option<RawLicense>,
    pub topics:            Vec<String>,
    pub homepage:          Option<String>,
    pub network_count:     u64,
    pub subscribers_count: u64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawLicense {
    pub name: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawContributor {
    pub login:         Option<String>,
    pub contributions: u64,
    #[serde(rename = "type")]
    pub account_type:  Option<String>
}

/// One bucket of `/stats/commit_activity`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCommitWeek {
    pub week:  i64,
    pub total: u64,
    pub days:  Vec<u64>
}

/// One `[week, additions, deletions]` row of `/stats/code_frequency`.
pub(crate) type RawCodeFrequencyWeek = (i64, i64, i64);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawParticipation {
    pub all:   Vec<u64>,
    pub owner: Vec<u64>
}

/// Item of the issues endpoint; pull requests carry a `pull_request` key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawIssue {
    pub pull_request: Option<Value>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPullRequest {
    pub merged_at: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawRelease {
    pub tag_name:     Option<String>,
    pub name:         Option<String>,
    pub published_at: Option<String>,
    pub draft:        bool,
    pub prerelease:   bool,
    pub assets:       Vec<RawAsset>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawAsset {
    pub download_count: u64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawBranch {
    pub name:      Option<String>,
    pub protected: bool
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTag {
    pub name: Option<String>
}

/// Body of `/traffic/views` and `/traffic/clones`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTrafficCounts {
    pub count:   u64,
    pub uniques: u64,
    #[serde(alias = "views", alias = "clones")]
    pub daily:   Vec<RawTrafficBucket>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTrafficBucket {
    pub timestamp: Option<String>,
    pub count:     u64,
    pub uniques:   u64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawReferrer {
    pub referrer: Option<String>,
    pub count:    u64,
    pub uniques:  u64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPopularPath {
    pub path:    Option<String>,
    pub title:   Option<String>,
    pub count:   u64,
    pub uniques: u64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCommunityProfile {
    pub health_percentage: u64,
    pub files:             RawCommunityFiles
}

/// Each entry is an object when the file exists and `null` otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCommunityFiles {
    pub code_of_conduct:       Option<Value>,
    pub contributing:          Option<Value>,
    pub issue_template:        Option<Value>,
    pub pull_request_template: Option<Value>,
    pub license:               Option<Value>,
    pub readme:                Option<Value>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawDependabotAlert {
    pub state:             Option<String>,
    pub security_advisory: Option<RawSeverity>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCodeScanningAlert {
    pub state: Option<String>,
    pub rule:  Option<RawSeverity>
}

/// Advisory or rule object; only the severity is read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSeverity {
    pub severity: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWorkflowList {
    pub workflows: Option<Vec<RawWorkflow>>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWorkflow {
    pub id:    u64,
    pub name:  Option<String>,
    pub state: Option<String>,
    pub path:  Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWorkflowRuns {
    pub workflow_runs: Option<Vec<RawWorkflowRun>>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWorkflowRun {
    pub conclusion: Option<String>
}
