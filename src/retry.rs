// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Retry policy and clock abstraction for rate-limited API calls.
//!
//! The fetcher never sleeps directly: it asks the policy how long to wait
//! and hands the duration to a [`Clock`], which lets tests observe the wait
//! instead of performing it.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};

/// Source of the current time and of blocking waits.
pub trait Clock
{
    /// Returns the current instant in UTC.
    fn now(&self,) -> DateTime<Utc,>;

    /// Suspends the caller for `duration`.
    fn sleep(&self, duration: Duration,) -> impl Future<Output = (),>;
}

/// Wall clock backed by [`chrono::Utc`] and [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default,)]
pub struct SystemClock;

impl Clock for SystemClock
{
    fn now(&self,) -> DateTime<Utc,>
    {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration,)
    {
        tokio::time::sleep(duration,).await;
    }
}

/// Configuration for rate-limit retries.
#[derive(Debug, Clone,)]
pub struct RetryPolicy
{
    /// Total number of attempts per request, including the first (default:
    /// 2, i.e. a single retry).
    pub max_attempts:  u32,
    /// Extra wait added on top of the advertised reset time (default: 1s).
    pub safety_margin: Duration,
}

impl Default for RetryPolicy
{
    fn default() -> Self
    {
        Self {
            max_attempts: 2, safety_margin: Duration::from_secs(1,),
        }
    }
}

impl RetryPolicy
{
    /// Computes how long to wait before retrying a rate-limited request.
    ///
    /// The wait is the distance between `reset_epoch` and `now_epoch`,
    /// floored at zero, plus the safety margin. A missing reset header counts
    /// as epoch zero, which yields just the margin.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use ghmetrics::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.rate_limit_wait(Some(110,), 100,), Duration::from_secs(11,));
    /// ```
    pub fn rate_limit_wait(&self, reset_epoch: Option<i64,>, now_epoch: i64,) -> Duration
    {
        let remaining = reset_epoch.unwrap_or(0,).saturating_sub(now_epoch,).max(0,);
        Duration::from_secs(remaining.unsigned_abs(),) + self.safety_margin
    }

    /// Returns `true` when another attempt may follow attempt number
    /// `attempt` (1-based).
    pub fn allows_retry(&self, attempt: u32,) -> bool
    {
        attempt < self.max_attempts
    }
}
