// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cross-repository aggregation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{metrics::round2, model::RepositoryRecord};

/// Number of entries kept in each ranking.
pub const RANKING_LIMIT: usize = 10;

/// Share of one language across all repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language:   String,
    pub bytes:      u64,
    /// Percentage of all language bytes, rounded to two decimals.
    pub percentage: f64
}

/// Repository and star count in [`Summary::most_starred`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StarRanking {
    pub name:  String,
    pub stars: u64
}

/// Repository and fork count in [`Summary::most_forked`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForkRanking {
    pub name:  String,
    pub forks: u64
}

/// Totals over every collected repository.
///
/// Each counter is the sum of the matching per-repository field over the
/// exact slice passed to [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_repositories:    u64,
    pub total_stars:           u64,
    pub total_forks:           u64,
    pub total_watchers:        u64,
    pub total_open_issues:     u64,
    pub total_contributors:    u64,
    pub total_releases:        u64,
    pub total_commits:         u64,
    pub total_code_additions:  u64,
    pub total_code_deletions:  u64,
    pub active_repositories:   u64,
    pub archived_repositories: u64,
    pub private_repositories:  u64,
    pub public_repositories:   u64,
    pub forked_repositories:   u64,
    pub total_open_prs:        u64,
    pub total_merged_prs:      u64,
    /// Sorted by bytes, largest first.
    pub languages:             Vec<LanguageShare>,
    pub most_starred:          Vec<StarRanking>,
    pub most_forked:           Vec<ForkRanking>
}

/// Folds `records` into a [`Summary`].
///
/// Rankings keep collection order among equal counts. Languages with equal
/// byte counts are ordered by name.
pub fn aggregate(records: &[RepositoryRecord]) -> Summary {
    let mut summary = Summary::default();
    let mut language_bytes: BTreeMap<&str, u64> = BTreeMap::new();

    for record in records {
        let basic = &record.basic;

        summary.total_repositories += 1;
        summary.total_stars += basic.stargazers_count;
        summary.total_forks += basic.forks_count;
        summary.total_watchers += basic.watchers_count;
        summary.total_open_issues += record.issues.open_count;
        summary.total_contributors += record.contributor_count;
        summary.total_releases += record.releases.total_releases;
        summary.total_commits += record.commit_activity.total_commits_last_year;
        summary.total_code_additions += record.code_frequency.total_additions;
        summary.total_code_deletions += record.code_frequency.total_deletions;
        summary.total_open_prs += record.pull_requests.open_count;
        summary.total_merged_prs += record.pull_requests.merged_count;

        if record.custom.is_active == Some(true) {
            summary.active_repositories += 1;
        }
        if basic.archived {
            summary.archived_repositories += 1;
        }
        if basic.private {
            summary.private_repositories += 1;
        } else {
            summary.public_repositories += 1;
        }
        if basic.fork {
            summary.forked_repositories += 1;
        }

        for (language, bytes) in &record.languages {
            *language_bytes.entry(language.as_str()).or_insert(0) += bytes;
        }
    }

    summary.languages = language_shares(&language_bytes);
    summary.most_starred = top_by(records, |record| record.basic.stargazers_count)
        .map(|(name, stars)| StarRanking {
            name,
            stars
        })
        .collect();
    summary.most_forked = top_by(records, |record| record.basic.forks_count)
        .map(|(name, forks)| ForkRanking {
            name,
            forks
        })
        .collect();

    summary
}

fn language_shares(language_bytes: &BTreeMap<&str, u64>) -> Vec<LanguageShare> {
    let total: u64 = language_bytes.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = language_bytes
        .iter()
        .map(|(language, bytes)| LanguageShare {
            language:   (*language).to_owned(),
            bytes:      *bytes,
            percentage: round2(*bytes as f64 / total as f64 * 100.0)
        })
        .collect();
    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    shares
}

/// Top [`RANKING_LIMIT`] records by `key`, largest first.
fn top_by<F>(records: &[RepositoryRecord], key: F) -> impl Iterator<Item = (String, u64)>
where
    F: Fn(&RepositoryRecord) -> u64
{
    let mut ranked: Vec<(String, u64)> = records
        .iter()
        .map(|record| (record.repository.clone(), key(record)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(RANKING_LIMIT)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::{
        metrics::CustomMetrics,
        model::{
            BasicInfo, BranchStats, CodeFrequency, CommitActivity, IssueStats, LanguageByteMap,
            PullRequestStats, ReleaseStats, SecurityAlerts, TagStats, TrafficStats,
            WorkflowSummary
        }
    };

    fn record(name: &str, stars: u64, forks: u64, languages: &[(&str, u64)]) -> RepositoryRecord {
        let basic = BasicInfo {
            full_name: Some(name.to_owned()),
            stargazers_count: stars,
            forks_count: forks,
            watchers_count: stars,
            ..BasicInfo::default()
        };
        let collected_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap();
        let custom = CustomMetrics::derive(&basic, collected_at);

        RepositoryRecord {
            repository: name.to_owned(),
            collected_at,
            basic,
            languages: languages
                .iter()
                .map(|(language, bytes)| ((*language).to_owned(), *bytes))
                .collect::<LanguageByteMap>(),
            contributors: Vec::new(),
            contributor_count: 0,
            commit_activity: CommitActivity::default(),
            code_frequency: CodeFrequency::default(),
            participation: None,
            issues: IssueStats::default(),
            pull_requests: PullRequestStats::default(),
            releases: ReleaseStats::default(),
            branches: BranchStats::default(),
            tags: TagStats::default(),
            traffic: TrafficStats::default(),
            community: None,
            vulnerability_alerts_enabled: false,
            dependabot_alerts: SecurityAlerts::default(),
            code_scanning_alerts: SecurityAlerts::default(),
            workflows: WorkflowSummary::default(),
            custom
        }
    }

    #[test]
    fn empty_input_yields_default_summary() {
        assert_eq!(aggregate(&[]), Summary::default());
    }

    #[test]
    fn two_repositories_are_totalled_and_ranked() {
        let records = vec![
            record("o/small", 5, 1, &[("Rust", 1000)]),
            record("o/big", 1500, 40, &[("Rust", 3000), ("Python", 1000)]),
        ];

        let summary = aggregate(&records);

        assert_eq!(summary.total_repositories, 2);
        assert_eq!(summary.total_stars, 1505);
        assert_eq!(summary.total_forks, 41);
        assert_eq!(summary.public_repositories, 2);
        assert_eq!(summary.most_starred[0], StarRanking {
            name:  "o/big".to_owned(),
            stars: 1500
        });
        assert_eq!(summary.most_starred[1].name, "o/small");
        assert_eq!(summary.most_forked[0].forks, 40);
        assert_eq!(summary.languages[0], LanguageShare {
            language:   "Rust".to_owned(),
            bytes:      4000,
            percentage: 80.0
        });
        assert_eq!(summary.languages[1].percentage, 20.0);
        assert_eq!(records[0].custom.popularity.as_str(), "low");
        assert_eq!(records[1].custom.popularity.as_str(), "highly_popular");
    }

    #[test]
    fn ranking_ties_keep_collection_order() {
        let records: Vec<_> = (0..12)
            .map(|index| record(&format!("o/r{index}"), 7, 0, &[]))
            .collect();

        let summary = aggregate(&records);
        let names: Vec<_> = summary.most_starred.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(summary.most_starred.len(), RANKING_LIMIT);
        assert_eq!(names[0], "o/r0");
        assert_eq!(names[9], "o/r9");
    }

    #[test]
    fn language_ties_are_ordered_by_name() {
        let summary = aggregate(&[record("o/r", 0, 0, &[("Zig", 10), ("C", 10), ("Go", 30)])]);
        let order: Vec<_> = summary
            .languages
            .iter()
            .map(|share| share.language.as_str())
            .collect();
        assert_eq!(order, vec!["Go", "C", "Zig"]);
    }

    #[test]
    fn zero_language_bytes_produce_no_shares() {
        let summary = aggregate(&[record("o/r", 1, 0, &[("Rust", 0)])]);
        assert!(summary.languages.is_empty());
    }

    #[test]
    fn flags_and_nested_counters_are_counted() {
        let mut archived = record("o/old", 0, 0, &[]);
        archived.basic.archived = true;
        archived.basic.private = true;
        archived.basic.fork = true;
        archived.issues.open_count = 3;
        archived.pull_requests = PullRequestStats::from_counts(2, 4, 3);
        archived.custom.is_active = Some(true);

        let summary = aggregate(&[archived, record("o/new", 0, 0, &[])]);

        assert_eq!(summary.archived_repositories, 1);
        assert_eq!(summary.private_repositories, 1);
        assert_eq!(summary.public_repositories, 1);
        assert_eq!(summary.forked_repositories, 1);
        assert_eq!(summary.active_repositories, 1);
        assert_eq!(summary.total_open_issues, 3);
        assert_eq!(summary.total_open_prs, 2);
        assert_eq!(summary.total_merged_prs, 3);
    }

    proptest! {
        #[test]
        fn totals_equal_sums_over_records(
            rows in prop::collection::vec((0u64..100_000, 0u64..10_000, 0u64..50_000), 0..20)
        ) {
            let records: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(index, (stars, forks, bytes))| {
                    record(&format!("o/r{index}"), *stars, *forks, &[("Rust", *bytes), ("C", 1)])
                })
                .collect();

            let summary = aggregate(&records);

            prop_assert_eq!(summary.total_repositories, records.len() as u64);
            prop_assert_eq!(summary.total_stars, rows.iter().map(|row| row.0).sum::<u64>());
            prop_assert_eq!(summary.total_forks, rows.iter().map(|row| row.1).sum::<u64>());
            prop_assert!(summary.most_starred.len() <= RANKING_LIMIT);

            let percentages: f64 = summary.languages.iter().map(|share| share.percentage).sum();
            if !records.is_empty() {
                prop_assert!((percentages - 100.0).abs() <= 0.01 * summary.languages.len() as f64);
            }
        }
    }
}
