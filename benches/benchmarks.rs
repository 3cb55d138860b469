// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ghmetrics::{
    BasicInfo, BranchStats, CodeFrequency, CommitActivity, CustomMetrics, IssueStats,
    LanguageByteMap, MetricsReport, PullRequestStats, ReleaseStats, RepositoryRecord,
    SecurityAlerts, TagStats, TrafficStats, UserInfo, WorkflowSummary, aggregate, export,
    parse_config,
};

const LANGUAGES: [&str; 6] = ["Rust", "Python", "Go", "TypeScript", "Shell", "C",];

fn records(count: usize,) -> Vec<RepositoryRecord,>
{
    let collected_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0,).single().expect("valid date",);

    (0..count)
        .map(|index| {
            let basic = BasicInfo {
                full_name: Some(format!("bench/repo-{index}"),),
                stargazers_count: (index as u64 * 37) % 2_000,
                forks_count: (index as u64 * 11) % 300,
                watchers_count: (index as u64 * 5) % 700,
                created_at: Some("2022-03-01T00:00:00Z".to_owned(),),
                pushed_at: Some("2024-12-01T00:00:00Z".to_owned(),),
                ..BasicInfo::default()
            };
            let languages: LanguageByteMap = LANGUAGES
                .iter()
                .take(1 + index % LANGUAGES.len(),)
                .map(|language| ((*language).to_owned(), 1_000 + index as u64 * 13,),)
                .collect();
            let custom = CustomMetrics::derive(&basic, collected_at,);

            RepositoryRecord {
                repository: format!("bench/repo-{index}"),
                collected_at,
                basic,
                languages,
                contributors: Vec::new(),
                contributor_count: (index % 20) as u64,
                commit_activity: CommitActivity::default(),
                code_frequency: CodeFrequency::default(),
                participation: None,
                issues: IssueStats::default(),
                pull_requests: PullRequestStats::from_counts(2, 5, 3,),
                releases: ReleaseStats::default(),
                branches: BranchStats::default(),
                tags: TagStats::default(),
                traffic: TrafficStats::default(),
                community: None,
                vulnerability_alerts_enabled: false,
                dependabot_alerts: SecurityAlerts::default(),
                code_scanning_alerts: SecurityAlerts::default(),
                workflows: WorkflowSummary::default(),
                custom,
            }
        },)
        .collect()
}

fn benchmark_aggregate(c: &mut Criterion,)
{
    let small = records(10,);
    let large = records(500,);

    c.bench_function("aggregate_10_repositories", |b| b.iter(|| aggregate(black_box(&small,),),),);
    c.bench_function("aggregate_500_repositories", |b| b.iter(|| aggregate(black_box(&large,),),),);
}

fn benchmark_render_html(c: &mut Criterion,)
{
    let repositories = records(200,);
    let report = MetricsReport {
        timestamp: Utc::now(),
        user_info: UserInfo::default(),
        summary: aggregate(&repositories,),
        repositories,
    };

    c.bench_function("render_html_200_repositories", |b| {
        b.iter(|| black_box(export::render_html(black_box(&report,),).len(),),)
    },);
}

fn benchmark_parse_config(c: &mut Criterion,)
{
    let mut yaml = String::from("username: octocat\nformat: all\nrepositories:\n",);
    for index in 0..100 {
        yaml.push_str(&format!("  - octocat/repo-{index}\n"),);
    }

    c.bench_function("parse_config_100_repositories", |b| {
        b.iter(|| parse_config(black_box(&yaml,),).expect("parse failed",),)
    },);
}

criterion_group!(benches, benchmark_aggregate, benchmark_render_html, benchmark_parse_config);
criterion_main!(benches);
