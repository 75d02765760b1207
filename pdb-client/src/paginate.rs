use serde::de::DeserializeOwned;

use crate::errors::PdbError;
use crate::transport::Transport;
use crate::Result;

/// Rows requested per page, bounding the size of a single response
pub const PAGE_SIZE: usize = 3000;

/// Fetches every page of a query and concatenates them in request order.
///
/// A page holding `step` rows or more is treated as "more may follow" and
/// the next window is requested, so a result whose size is an exact multiple
/// of `step` costs one extra request that comes back empty. Rows are never
/// sorted here: the query itself must carry an ordering, otherwise pages
/// may overlap or skip rows.
pub struct Paginator<'a, T: Transport + ?Sized> {
    transport: &'a T,
    step: usize,
}

impl<'a, T: Transport + ?Sized> Paginator<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            step: PAGE_SIZE,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step.max(1);
        self
    }

    /// Fetch all rows of `path`, which may already carry query parameters.
    /// The first failing page aborts the fetch and discards earlier pages.
    pub fn fetch_all<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let page_path = format!("{}{}limit={}&offset={}", path, separator, self.step, offset);
            let body = self.transport.get(&page_path)?;
            let page: Vec<R> = decode(&body, &page_path)?;
            let count = page.len();
            tracing::debug!("Fetched {} rows at offset {} from {}", count, offset, path);

            rows.extend(page);
            if count < self.step {
                break;
            }
            offset += self.step;
        }

        Ok(rows)
    }
}

/// Decode a response body, naming the request it came from on failure
pub(crate) fn decode<R: DeserializeOwned>(body: &str, path: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| {
        PdbError::MalformedResponse(format!("Failed to decode response from {}: {}", path, e))
    })
}
