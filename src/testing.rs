// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory transport and clock used by unit tests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    time::Duration
};

use chrono::{DateTime, TimeZone, Utc};
use masterror::AppError;
use serde_json::Value;

use crate::{
    fetcher::{RawResponse, Transport},
    retry::Clock
};

/// Transport answering from per-route queues.
///
/// Queued responses are consumed in order and the last one repeats. Routes
/// without a script answer `404 Not Found`.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<RawResponse>>>,
    requests:  RefCell<Vec<String>>
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, route: &str, response: RawResponse) -> &Self {
        self.responses
            .borrow_mut()
            .entry(route.to_owned())
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn json(&self, route: &str, value: Value) -> &Self {
        self.respond(route, RawResponse {
            status:           200,
            rate_limit_reset: None,
            body:             value.to_string()
        })
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, route: &str) -> Result<RawResponse, AppError> {
        self.requests.borrow_mut().push(route.to_owned());

        let mut responses = self.responses.borrow_mut();
        let Some(queue) = responses.get_mut(route) else {
            return Ok(not_found());
        };

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        Ok(response.unwrap_or_else(not_found))
    }
}

/// Clock with a manually controlled instant that records every sleep.
#[derive(Debug)]
pub(crate) struct FakeClock {
    now:    RefCell<DateTime<Utc>>,
    sleeps: RefCell<Vec<Duration>>
}

impl FakeClock {
    pub(crate) fn at_epoch(seconds: i64) -> Self {
        let now = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .expect("valid epoch seconds");
        Self::at(now)
    }

    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now:    RefCell::new(now),
            sleeps: RefCell::new(Vec::new())
        }
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.borrow()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        let advanced = *self.now.borrow()
            + chrono::Duration::from_std(duration).expect("sleep fits chrono range");
        *self.now.borrow_mut() = advanced;
    }
}

/// A GitHub-style primary rate-limit rejection.
pub(crate) fn rate_limited(reset: Option<i64>) -> RawResponse {
    RawResponse {
        status:           403,
        rate_limit_reset: reset,
        body:             "{\"message\":\"API rate limit exceeded for 127.0.0.1.\"}".to_owned()
    }
}

fn not_found() -> RawResponse {
    RawResponse {
        status:           404,
        rate_limit_reset: None,
        body:             "{\"message\":\"Not Found\"}".to_owned()
    }
}
