//! Domain handle and item operations
//!
//! A [`Domain`] is a name plus the client; it caches nothing. Every method
//! issues exactly one request, except [`Domain::query`] with attribute
//! loading and [`Domain::query_all`], which issue one per item or page.

use tracing::debug;

use crate::sdb::client::Client;
use crate::sdb::dialect::AttributeField;
use crate::sdb::error::{Result, SdbError};
use crate::sdb::item::Item;
use crate::sdb::lister::{Page, PaginatedLister};
use crate::sdb::multimap::{AttributeMultimap, ReplaceMode};
use crate::sdb::query::QueryParams;
use crate::sdb::types::{QueryOptions, QueryResult};

/// What [`Domain::delete_attributes`] removes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeleteTarget {
    /// The whole item
    #[default]
    Item,
    /// Every value of the named attributes
    Names(Vec<String>),
    /// Only the given name/value pairs
    Attributes(AttributeMultimap),
}

impl DeleteTarget {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DeleteTarget::Names(names.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone)]
pub struct Domain {
    client: Client,
    name: String,
}

impl Domain {
    pub fn new(client: Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn params(&self, action: &str) -> QueryParams {
        QueryParams::new()
            .with("Action", action)
            .with(self.client.dialect().domain_param(), self.name.as_str())
    }

    fn item_params(&self, action: &str, key: &str) -> QueryParams {
        self.params(action).with("ItemName", key)
    }

    /// Store `attributes` under `key`. An empty multimap creates an empty item.
    ///
    /// `replace` selects which attributes overwrite their stored values
    /// instead of adding to them.
    pub async fn put_attributes(
        &self,
        key: &str,
        attributes: &AttributeMultimap,
        replace: &ReplaceMode,
    ) -> Result<Item> {
        let mut params = self.item_params("PutAttributes", key);
        params.extend_pairs(attributes.to_wire(
            self.client.codec(),
            self.client.dialect(),
            replace,
        )?);

        self.client.execute(params).await?;
        Ok(Item::with_attributes(self.clone(), key, attributes.clone()))
    }

    /// Fetch the attributes of `key`, optionally limited to `names`.
    ///
    /// An item without attributes is reported as [`SdbError::RecordNotFound`].
    pub async fn get_attributes(&self, key: &str, names: &[&str]) -> Result<Item> {
        let mut params = self.item_params("GetAttributes", key);
        if !names.is_empty() {
            params.insert_multi(
                "AttributeName",
                names.iter().map(|n| n.to_string()).collect(),
            );
        }

        let doc = self.client.execute(params).await?;
        if doc.attributes.is_empty() {
            return Err(SdbError::RecordNotFound {
                domain: self.name.clone(),
                key: key.to_string(),
            });
        }

        let attributes = AttributeMultimap::from_wire(doc.attributes, self.client.codec());
        Ok(Item::with_attributes(self.clone(), key, attributes))
    }

    /// Delete the whole item or some of its attributes
    pub async fn delete_attributes(&self, key: &str, target: &DeleteTarget) -> Result<()> {
        let dialect = self.client.dialect();
        let mut params = self.item_params("DeleteAttributes", key);

        match target {
            DeleteTarget::Item => {}
            DeleteTarget::Names(names) => {
                for (index, name) in names.iter().enumerate() {
                    params.insert(dialect.attribute_param(index, AttributeField::Name), name.as_str());
                }
            }
            DeleteTarget::Attributes(attributes) => {
                params.extend_pairs(attributes.to_wire(
                    self.client.codec(),
                    dialect,
                    &ReplaceMode::None,
                )?);
            }
        }

        self.client.execute(params).await?;
        Ok(())
    }

    pub async fn delete_item(&self, key: &str) -> Result<()> {
        self.delete_attributes(key, &DeleteTarget::Item).await
    }

    /// Fetch a single page of matching item keys
    pub async fn query(&self, options: &QueryOptions) -> Result<QueryResult> {
        let page = self
            .query_page(options, options.next_token.clone())
            .await?;

        let mut base = options.clone();
        base.next_token = None;
        Ok(QueryResult::new(self.clone(), base, page.entries, page.next_token))
    }

    /// Every matching item across all pages
    pub async fn query_all(&self, options: &QueryOptions) -> Result<Vec<Item>> {
        let domain = self;
        let listing = PaginatedLister::new(self.client.max_pages())
            .collect(move |token| domain.query_page(options, token))
            .await?;

        debug!(
            domain = %self.name,
            items = listing.entries.len(),
            pages = listing.pages,
            "query_all_complete"
        );
        Ok(listing.entries)
    }

    async fn query_page(
        &self,
        options: &QueryOptions,
        token: Option<String>,
    ) -> Result<Page<Item>> {
        let dialect = self.client.dialect();
        let mut params = self.params("Query");
        if let Some(expression) = &options.expression {
            params.insert(dialect.expression_param(), expression.as_str());
        }
        if let Some(token) = token {
            params.insert(dialect.token_param(), token);
        }
        if let Some(max) = options.max_results {
            params.insert(dialect.max_results_param(), max.to_string());
        }

        let doc = self.client.execute(params).await?;

        let mut items: Vec<Item> = doc
            .item_names
            .into_iter()
            .map(|key| Item::new(self.clone(), key))
            .collect();

        if options.load_attributes {
            for item in items.iter_mut() {
                item.reload().await?;
            }
        }

        Ok(Page::new(items, doc.next_token))
    }
}
