// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Page-number pagination over list endpoints.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    fetcher::{Fetcher, Transport},
    retry::Clock
};

impl<T, C> Fetcher<T, C>
where
    T: Transport,
    C: Clock
{
    /// Fetches every page of a list endpoint and concatenates the items.
    ///
    /// Requests start at page 1 with `per_page` set to the fetcher's page
    /// size; `query` is appended after the paging parameters. The loop ends
    /// on the first failed or empty page, on a payload that is not an array,
    /// or after a page shorter than the page size. Pages are requested one
    /// at a time in increasing order and nothing is deduplicated.
    pub async fn fetch_all(&self, path: &str, query: &[(&str, String)]) -> Vec<Value> {
        let page_size = self.page_size();
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let mut page_query = vec![("page", page.to_string()), ("per_page", page_size.to_string())];
            page_query.extend(query.iter().cloned());

            let batch = match self.fetch(path, &page_query).await {
                Some(Value::Array(batch)) => batch,
                Some(_) => {
                    warn!(path, page, "expected a JSON array, stopping pagination");
                    break;
                }
                None => break
            };

            if batch.is_empty() {
                break;
            }

            let received = batch.len();
            items.extend(batch);

            if received < page_size {
                break;
            }

            page += 1;
        }

        debug!(path, pages = page, items = items.len(), "pagination finished");
        items
    }
}
