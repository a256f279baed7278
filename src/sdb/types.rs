//! Query options and result pages

use std::ops::Index;

use crate::sdb::domain::Domain;
use crate::sdb::error::Result;
use crate::sdb::item::Item;

/// Options for [`Domain::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Query expression; all items when unset
    pub expression: Option<String>,
    /// Page size limit sent to the service
    pub max_results: Option<u32>,
    /// Continuation token of the page to fetch
    pub next_token: Option<String>,
    /// Fetch each listed item's attributes with one extra request per item
    pub load_attributes: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    pub fn load_attributes(mut self, load: bool) -> Self {
        self.load_attributes = load;
        self
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryResult {
    domain: Domain,
    options: QueryOptions,
    items: Vec<Item>,
    next_token: Option<String>,
}

impl QueryResult {
    pub(crate) fn new(
        domain: Domain,
        options: QueryOptions,
        items: Vec<Item>,
        next_token: Option<String>,
    ) -> Self {
        Self {
            domain,
            options,
            items,
            next_token,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Item::key)
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    /// Whether another page can be fetched
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }

    /// Fetch the following page with the same expression and options
    pub async fn next_page(&self) -> Result<Option<QueryResult>> {
        let token = match &self.next_token {
            Some(token) => token.clone(),
            None => return Ok(None),
        };
        let options = self.options.clone().next_token(token);
        self.domain.query(&options).await.map(Some)
    }
}

impl Index<usize> for QueryResult {
    type Output = Item;

    fn index(&self, index: usize) -> &Item {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
