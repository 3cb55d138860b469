// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Run configuration.
//!
//! A run is described by an optional YAML document and command-line
//! overrides. [`TrackSettings::resolve`] merges both, with command-line
//! values taking precedence over the file.

use std::{fs, path::Path, sync::LazyLock};

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Prefix of the report files when none is configured.
pub const DEFAULT_OUTPUT_PREFIX: &str = "github_metrics";

/// `owner/name` with GitHub's login and repository name characters.
static REPOSITORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid repository pattern")
});

/// Report formats written at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Html,
    /// Every format above.
    #[default]
    All
}

impl OutputFormat {
    /// Returns `true` when reports of `format` should be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghmetrics::OutputFormat;
    ///
    /// assert!(OutputFormat::All.includes(OutputFormat::Csv));
    /// assert!(!OutputFormat::Json.includes(OutputFormat::Html));
    /// ```
    pub fn includes(self, format: OutputFormat) -> bool {
        self == Self::All || self == format
    }
}

/// YAML configuration document.
///
/// ```yaml
/// username: octocat
/// output: reports/octocat
/// format: html
/// repositories:
///   - octocat/hello-world
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Account to track; the authenticated account when absent.
    #[serde(default)]
    pub username:     Option<String>,
    /// Prefix of the report file names.
    #[serde(default)]
    pub output:       Option<String>,
    #[serde(default)]
    pub format:       Option<OutputFormat>,
    /// Explicit `owner/name` list replacing the repository listing.
    #[serde(default)]
    pub repositories: Vec<String>
}

/// Reads and validates a configuration file.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, plus every error of
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<TrackerConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Parses and validates a configuration document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] when
/// a repository entry is not of the form `owner/name`.
pub fn parse_config(contents: &str) -> Result<TrackerConfig, Error> {
    let config: TrackerConfig = serde_yaml::from_str(contents)?;
    validate_repositories(&config.repositories)?;
    Ok(config)
}

fn validate_repositories(repositories: &[String]) -> Result<(), Error> {
    for repository in repositories {
        if !REPOSITORY_PATTERN.is_match(repository.trim()) {
            return Err(Error::validation(format!(
                "repository '{repository}' must be of the form owner/name"
            )));
        }
    }

    Ok(())
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub username: Option<String>,
    pub output:   Option<String>,
    pub format:   Option<OutputFormat>
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSettings {
    /// Account to track; `None` selects the authenticated account.
    pub username:     Option<String>,
    /// Explicit repository list; `None` lists the account's repositories.
    pub repositories: Option<Vec<String>>,
    pub output:       String,
    pub format:       OutputFormat
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            username:     None,
            repositories: None,
            output:       DEFAULT_OUTPUT_PREFIX.to_owned(),
            format:       OutputFormat::default()
        }
    }
}

impl TrackSettings {
    /// Merges the configuration file (if any) with command-line overrides.
    ///
    /// Blank strings count as absent.
    pub fn resolve(config: Option<TrackerConfig>, overrides: Overrides) -> Self {
        let config = config.unwrap_or_default();
        let repositories: Vec<String> = config
            .repositories
            .iter()
            .map(|repository| repository.trim().to_owned())
            .collect();

        Self {
            username:     non_blank(overrides.username).or_else(|| non_blank(config.username)),
            repositories: (!repositories.is_empty()).then_some(repositories),
            output:       non_blank(overrides.output)
                .or_else(|| non_blank(config.output))
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_owned()),
            format:       overrides.format.or(config.format).unwrap_or_default()
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
