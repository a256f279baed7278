//! Continuation-token pagination
//!
//! The lister has two states. It starts `Fetching` with no token, requests a
//! page, appends its entries, and either keeps `Fetching` with the page's
//! token or moves to `Done` when the page carried none. Pages are strictly
//! sequential because each request needs the previous page's token.

use std::future::Future;
use tracing::{debug, warn};

use crate::sdb::error::{Result, SdbError};

/// One decoded response page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub entries: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(entries: Vec<T>, next_token: Option<String>) -> Self {
        Self { entries, next_token }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListerState {
    Fetching { token: Option<String> },
    Done,
}

/// Accumulated output of a finished listing
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub entries: Vec<T>,
    /// Token that ended the listing; always `None` once done
    pub next_token: Option<String>,
    pub pages: usize,
}

/// Drives page requests until the continuation token runs out
#[derive(Debug, Clone)]
pub struct PaginatedLister {
    state: ListerState,
    pages: usize,
    /// Optional guard against a service that never stops returning tokens
    max_pages: Option<usize>,
}

impl Default for PaginatedLister {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PaginatedLister {
    pub fn new(max_pages: Option<usize>) -> Self {
        Self {
            state: ListerState::Fetching { token: None },
            pages: 0,
            max_pages,
        }
    }

    pub fn state(&self) -> &ListerState {
        &self.state
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_done(&self) -> bool {
        self.state == ListerState::Done
    }

    /// Token to send with the next request, or `None` when done or on the first page
    pub fn current_token(&self) -> Option<&str> {
        match &self.state {
            ListerState::Fetching { token } => token.as_deref(),
            ListerState::Done => None,
        }
    }

    /// Record a received page's continuation token
    pub fn advance(&mut self, next_token: Option<String>) {
        self.pages += 1;
        self.state = match next_token {
            Some(token) => ListerState::Fetching { token: Some(token) },
            None => ListerState::Done,
        };
    }

    /// Fetch pages with `fetch(token)` until done, concatenating entries in order.
    ///
    /// Any error from `fetch` aborts the listing; nothing accumulated so far is returned.
    pub async fn collect<T, F, Fut>(mut self, mut fetch: F) -> Result<Listing<T>>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let mut entries = Vec::new();

        while let ListerState::Fetching { token } = &self.state {
            if let Some(max) = self.max_pages {
                if self.pages >= max {
                    warn!(pages = self.pages, "pagination_limit_reached");
                    return Err(SdbError::PageLimitExceeded { pages: self.pages });
                }
            }

            let page = fetch(token.clone()).await?;
            debug!(
                page = self.pages + 1,
                entries = page.entries.len(),
                more = page.next_token.is_some(),
                "page_fetched"
            );
            entries.extend(page.entries);
            self.advance(page.next_token);
        }

        Ok(Listing {
            entries,
            next_token: self.current_token().map(str::to_string),
            pages: self.pages,
        })
    }
}
