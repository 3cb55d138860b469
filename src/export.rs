// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Report writers.
//!
//! A run produces up to three files sharing one prefix: `{prefix}.json`
//! holding the complete [`MetricsReport`], `{prefix}.csv` with one row per
//! repository, and `{prefix}_report.html`, a self-contained page for people.

use std::{
    borrow::Cow,
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::OutputFormat,
    error::{self, Error},
    model::RepositoryRecord,
    tracker::MetricsReport
};

/// Value written for an absent primary language.
const MISSING_LANGUAGE: &str = "N/A";
/// Number of languages listed in the HTML report.
const HTML_LANGUAGE_LIMIT: usize = 10;

/// Writes every report selected by `format` next to `prefix`.
///
/// Parent directories of the prefix are created when missing. Returns the
/// paths actually written; the CSV report is skipped when there are no
/// repositories.
///
/// # Errors
///
/// Returns the first error of [`write_json`], [`write_csv`] or
/// [`write_html`].
pub fn export_reports(
    report: &MetricsReport,
    prefix: &str,
    format: OutputFormat
) -> Result<Vec<PathBuf>, Error> {
    let json_path = PathBuf::from(format!("{prefix}.json"));
    if let Some(parent) = json_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| error::output_error(parent, source))?;
    }

    let mut written = Vec::new();

    if format.includes(OutputFormat::Json) {
        write_json(report, &json_path)?;
        written.push(json_path);
    }

    if format.includes(OutputFormat::Csv) {
        let csv_path = PathBuf::from(format!("{prefix}.csv"));
        if write_csv(&report.repositories, &csv_path)? {
            written.push(csv_path);
        }
    }

    if format.includes(OutputFormat::Html) {
        let html_path = PathBuf::from(format!("{prefix}_report.html"));
        write_html(report, &html_path)?;
        written.push(html_path);
    }

    Ok(written)
}

/// Writes `report` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::Output`] on I/O failure and [`Error::Serialize`] when
/// the report cannot be encoded.
pub fn write_json(report: &MetricsReport, path: &Path) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| error::output_error(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer
        .write_all(b"\n")
        .map_err(|source| error::output_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::output_error(path, source))?;

    info!("Metrics exported to {}", path.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    repository:        &'a str,
    stars:             u64,
    forks:             u64,
    watchers:          u64,
    open_issues:       u64,
    language:          &'a str,
    size_kb:           u64,
    contributors:      u64,
    commits_last_year: u64,
    open_prs:          u64,
    merged_prs:        u64,
    releases:          u64,
    age_days:          i64,
    is_active:         bool,
    has_wiki:          bool,
    has_pages:         bool,
    archived:          bool,
    private:           bool
}

impl<'a> CsvRow<'a> {
    fn from_record(record: &'a RepositoryRecord) -> Self {
        let basic = &record.basic;

        Self {
            repository:        &record.repository,
            stars:             basic.stargazers_count,
            forks:             basic.forks_count,
            watchers:          basic.watchers_count,
            open_issues:       record.issues.open_count,
            language:          basic.language.as_deref().unwrap_or(MISSING_LANGUAGE),
            size_kb:           basic.size,
            contributors:      record.contributor_count,
            commits_last_year: record.commit_activity.total_commits_last_year,
            open_prs:          record.pull_requests.open_count,
            merged_prs:        record.pull_requests.merged_count,
            releases:          record.releases.total_releases,
            age_days:          record.custom.age_days.unwrap_or(0),
            is_active:         record.custom.is_active.unwrap_or(false),
            has_wiki:          basic.has_wiki,
            has_pages:         basic.has_pages,
            archived:          basic.archived,
            private:           basic.private
        }
    }
}

/// Writes one CSV row per repository under a fixed header.
///
/// Returns `false` without touching the file system when `records` is
/// empty.
///
/// # Errors
///
/// Returns [`Error::Csv`] when the file cannot be created or written.
pub fn write_csv(records: &[RepositoryRecord], path: &Path) -> Result<bool, Error> {
    if records.is_empty() {
        warn!("No repository data to export, skipping {}", path.display());
        return Ok(false);
    }

    let mut writer = csv::Writer::from_path(path).map_err(|source| error::csv_error(path, source))?;
    for record in records {
        writer
            .serialize(CsvRow::from_record(record))
            .map_err(|source| error::csv_error(path, source))?;
    }
    writer
        .flush()
        .map_err(|source| error::output_error(path, source))?;

    info!("Metrics exported to {}", path.display());
    Ok(true)
}

/// Writes the HTML report produced by [`render_html`].
///
/// # Errors
///
/// Returns [`Error::Output`] on I/O failure.
pub fn write_html(report: &MetricsReport, path: &Path) -> Result<(), Error> {
    let contents = render_html(report);
    let file = File::create(path).map_err(|source| error::output_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|source| error::output_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::output_error(path, source))?;

    info!("HTML report generated: {}", path.display());
    Ok(())
}

const STYLESHEET: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Ubuntu, sans-serif; background: #0d1117; color: #c9d1d9; padding: 20px; line-height: 1.6; }
.container { max-width: 1200px; margin: 0 auto; }
h1, h2 { color: #58a6ff; margin: 20px 0 10px; }
h1 { font-size: 2.5em; border-bottom: 2px solid #21262d; padding-bottom: 10px; }
.metric-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; margin: 20px 0; }
.metric-card { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 20px; }
.metric-card:hover { border-color: #58a6ff; }
.metric-value { font-size: 2em; font-weight: bold; color: #58a6ff; }
.metric-label { color: #8b949e; font-size: 0.9em; margin-top: 5px; }
.timestamp { color: #8b949e; font-size: 0.9em; margin: 20px 0; }
.language-bar, .repo-item { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 15px; margin: 10px 0; }
.language-item { display: flex; justify-content: space-between; margin: 8px 0; }
.repo-list { list-style: none; }
.repo-name { color: #58a6ff; font-weight: bold; font-size: 1.1em; }
.repo-stats { display: flex; gap: 20px; margin-top: 10px; color: #8b949e; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #30363d; }
th { background: #161b22; color: #58a6ff; }
tr:hover { background: #161b22; }";

/// Renders the self-contained, dark-themed HTML report.
///
/// Every value taken from the API is HTML-escaped.
pub fn render_html(report: &MetricsReport) -> String {
    let summary = &report.summary;
    let profile = &report.user_info.basic_info;
    let account = &report.user_info.account_metrics;
    let mut buffer = String::with_capacity(16 * 1024);

    let _ = writeln!(
        buffer,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n<title>GitHub Metrics Report</title>\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n<div class=\"container\">"
    );
    buffer.push_str("<h1>GitHub Metrics Report</h1>\n");
    let _ = writeln!(
        buffer,
        "<p class=\"timestamp\">Generated: {}</p>",
        report.timestamp.to_rfc3339()
    );

    buffer.push_str("<h2>User Information</h2>\n<div class=\"metric-grid\">\n");
    metric_card(&mut buffer, &escape_html(profile.login.as_deref().unwrap_or("N/A")), "Username");
    metric_card(&mut buffer, &account.followers.to_string(), "Followers");
    metric_card(&mut buffer, &account.following.to_string(), "Following");
    metric_card(&mut buffer, &account.public_repos.to_string(), "Public Repos");
    buffer.push_str("</div>\n");

    buffer.push_str("<h2>Repository Overview</h2>\n<div class=\"metric-grid\">\n");
    for (value, label) in [
        (summary.total_repositories, "Total Repositories"),
        (summary.total_stars, "Total Stars"),
        (summary.total_forks, "Total Forks"),
        (summary.total_watchers, "Total Watchers"),
        (summary.total_contributors, "Total Contributors"),
        (summary.total_commits, "Commits (Last Year)"),
        (summary.total_releases, "Total Releases"),
        (summary.active_repositories, "Active Repositories")
    ] {
        metric_card(&mut buffer, &value.to_string(), label);
    }
    buffer.push_str("</div>\n");

    buffer.push_str("<h2>Code Statistics</h2>\n<div class=\"metric-grid\">\n");
    metric_card(&mut buffer, &group_thousands(summary.total_code_additions), "Total Lines Added");
    metric_card(&mut buffer, &group_thousands(summary.total_code_deletions), "Total Lines Deleted");
    metric_card(&mut buffer, &summary.total_open_issues.to_string(), "Open Issues");
    metric_card(&mut buffer, &summary.total_open_prs.to_string(), "Open Pull Requests");
    buffer.push_str("</div>\n");

    buffer.push_str("<h2>Language Distribution</h2>\n<div class=\"language-bar\">\n");
    for share in summary.languages.iter().take(HTML_LANGUAGE_LIMIT) {
        let _ = writeln!(
            buffer,
            "<div class=\"language-item\"><span>{}</span><span>{}%</span></div>",
            escape_html(&share.language),
            share.percentage
        );
    }
    buffer.push_str("</div>\n");

    ranking_table(
        &mut buffer,
        "Most Starred Repositories",
        "Stars",
        summary.most_starred.iter().map(|entry| (entry.name.as_str(), entry.stars))
    );
    ranking_table(
        &mut buffer,
        "Most Forked Repositories",
        "Forks",
        summary.most_forked.iter().map(|entry| (entry.name.as_str(), entry.forks))
    );

    buffer.push_str("<h2>All Repositories</h2>\n<ul class=\"repo-list\">\n");
    for record in &report.repositories {
        let basic = &record.basic;
        let _ = writeln!(
            buffer,
            "<li class=\"repo-item\">\n<div class=\"repo-name\">{}</div>\n<div>{}</div>\n<div class=\"repo-stats\"><span>Stars {}</span><span>Forks {}</span><span>Watchers {}</span><span>{} issues</span><span>{}</span></div>\n</li>",
            escape_html(&record.repository),
            escape_html(basic.description.as_deref().unwrap_or("No description")),
            basic.stargazers_count,
            basic.forks_count,
            basic.watchers_count,
            record.issues.open_count,
            escape_html(basic.language.as_deref().unwrap_or(MISSING_LANGUAGE))
        );
    }
    buffer.push_str("</ul>\n</div>\n</body>\n</html>\n");

    buffer
}

fn metric_card(buffer: &mut String, value: &str, label: &str) {
    let _ = writeln!(
        buffer,
        "<div class=\"metric-card\"><div class=\"metric-value\">{value}</div><div class=\"metric-label\">{label}</div></div>"
    );
}

fn ranking_table<'a, I>(buffer: &mut String, title: &str, column: &str, rows: I)
where
    I: Iterator<Item = (&'a str, u64)>
{
    let _ = writeln!(
        buffer,
        "<h2>{title}</h2>\n<table>\n<thead><tr><th>Repository</th><th>{column}</th></tr></thead>\n<tbody>"
    );
    for (name, count) in rows {
        let _ = writeln!(buffer, "<tr><td>{}</td><td>{count}</td></tr>", escape_html(name));
    }
    buffer.push_str("</tbody>\n</table>\n");
}

/// Formats `value` with comma thousands separators.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn escape_html(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
