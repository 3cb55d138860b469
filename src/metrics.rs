// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Metrics derived from repository metadata rather than read from the API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::model::BasicInfo;

/// Repositories pushed to within this many days count as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 90;
const DAYS_PER_YEAR: f64 = 365.25;

/// Four-way classification of a repository by star count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Popularity {
    /// 1000 stars or more.
    HighlyPopular,
    /// 100 to 999 stars.
    Popular,
    /// 10 to 99 stars.
    Moderate,
    /// Fewer than 10 stars.
    #[default]
    Low
}

impl Popularity {
    /// Classifies a star count. Each bucket includes its lower bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghmetrics::Popularity;
    ///
    /// assert_eq!(Popularity::from_stars(1000), Popularity::HighlyPopular);
    /// assert_eq!(Popularity::from_stars(999), Popularity::Popular);
    /// assert_eq!(Popularity::from_stars(9), Popularity::Low);
    /// ```
    pub fn from_stars(stars: u64) -> Self {
        match stars {
            1000.. => Self::HighlyPopular,
            100.. => Self::Popular,
            10.. => Self::Moderate,
            _ => Self::Low
        }
    }

    /// Snake-case label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlyPopular => "highly_popular",
            Self::Popular => "popular",
            Self::Moderate => "moderate",
            Self::Low => "low"
        }
    }
}

impl fmt::Display for Popularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived quantities for one repository.
///
/// Timestamp-based fields are `None` when `created_at` or `pushed_at` is
/// missing or cannot be parsed; the count-based fields are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_days:             Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_years:            Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_push: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active:            Option<bool>,
    /// `stars + 2 * forks + 0.5 * watchers`.
    pub engagement_score:     f64,
    /// `forks / stars`, 0 when the repository has no stars.
    pub fork_ratio:           f64,
    pub popularity:           Popularity
}

impl CustomMetrics {
    /// Derives the metrics of `basic` as observed at `now`.
    pub fn derive(basic: &BasicInfo, now: DateTime<Utc>) -> Self {
        let age_days = parse_timestamp(basic.created_at.as_deref()).map(|created| (now - created).num_days());
        let days_since_last_push =
            parse_timestamp(basic.pushed_at.as_deref()).map(|pushed| (now - pushed).num_days());

        let stars = basic.stargazers_count;
        let forks = basic.forks_count;
        let watchers = basic.watchers_count;

        Self {
            age_days,
            age_years: age_days.map(|days| round2(days as f64 / DAYS_PER_YEAR)),
            days_since_last_push,
            is_active: days_since_last_push.map(|days| days < ACTIVE_WINDOW_DAYS),
            engagement_score: stars as f64 + forks as f64 * 2.0 + watchers as f64 * 0.5,
            fork_ratio: if stars == 0 {
                0.0
            } else {
                forks as f64 / stars as f64
            },
            popularity: Popularity::from_stars(stars)
        }
    }
}

/// Parses a GitHub ISO 8601 timestamp such as `2024-05-01T12:00:00Z`.
///
/// Absent values yield `None` silently; malformed values are logged.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!("failed to parse datetime '{value}': {e}");
            None
        }
    }
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap()
    }

    fn basic(stars: u64, forks: u64, watchers: u64) -> BasicInfo {
        BasicInfo {
            stargazers_count: stars,
            forks_count: forks,
            watchers_count: watchers,
            ..BasicInfo::default()
        }
    }

    fn iso(instant: DateTime<Utc>) -> Option<String> {
        Some(instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }

    #[test]
    fn popularity_bucket_boundaries() {
        let cases = [
            (1000, Popularity::HighlyPopular),
            (999, Popularity::Popular),
            (100, Popularity::Popular),
            (99, Popularity::Moderate),
            (10, Popularity::Moderate),
            (9, Popularity::Low),
            (0, Popularity::Low)
        ];
        for (stars, expected) in cases {
            assert_eq!(Popularity::from_stars(stars), expected, "stars = {stars}");
        }
    }

    #[test]
    fn popularity_serializes_as_snake_case() {
        let json = serde_json::to_string(&Popularity::HighlyPopular).unwrap();
        assert_eq!(json, "\"highly_popular\"");
        assert_eq!(Popularity::Moderate.to_string(), "moderate");
    }

    #[test]
    fn engagement_score_weights_forks_and_watchers() {
        let metrics = CustomMetrics::derive(&basic(10, 3, 5), now());
        assert_eq!(metrics.engagement_score, 18.5);
        assert_eq!(metrics.fork_ratio, 0.3);
    }

    #[test]
    fn activity_window_is_exclusive_at_ninety_days() {
        let mut info = basic(0, 0, 0);
        info.pushed_at = iso(now() - Duration::days(89));
        assert_eq!(CustomMetrics::derive(&info, now()).is_active, Some(true));

        info.pushed_at = iso(now() - Duration::days(90));
        let metrics = CustomMetrics::derive(&info, now());
        assert_eq!(metrics.days_since_last_push, Some(90));
        assert_eq!(metrics.is_active, Some(false));
    }

    #[test]
    fn age_is_reported_in_days_and_years() {
        let mut info = basic(0, 0, 0);
        info.created_at = iso(now() - Duration::days(730));
        let metrics = CustomMetrics::derive(&info, now());
        assert_eq!(metrics.age_days, Some(730));
        assert_eq!(metrics.age_years, Some(2.0));
    }

    #[test]
    fn unparseable_timestamps_omit_dependent_fields() {
        let mut info = basic(150, 1, 1);
        info.created_at = Some("yesterday".to_owned());
        info.pushed_at = None;

        let metrics = CustomMetrics::derive(&info, now());
        assert_eq!(metrics.age_days, None);
        assert_eq!(metrics.age_years, None);
        assert_eq!(metrics.days_since_last_push, None);
        assert_eq!(metrics.is_active, None);
        assert_eq!(metrics.popularity, Popularity::Popular);

        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("age_days").is_none());
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn parse_timestamp_accepts_zulu_suffix() {
        let parsed = parse_timestamp(Some("2024-05-01T12:00:00Z")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap());
    }

    proptest! {
        #[test]
        fn fork_ratio_is_zero_whenever_stars_are_zero(forks in 0u64..1_000_000, watchers in 0u64..1_000_000) {
            let metrics = CustomMetrics::derive(&basic(0, forks, watchers), now());
            prop_assert_eq!(metrics.fork_ratio, 0.0);
            prop_assert_eq!(metrics.popularity, Popularity::Low);
        }
    }
}
