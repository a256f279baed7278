//! Items: a key within a domain plus its attributes

use crate::sdb::codec::AttributeValue;
use crate::sdb::domain::Domain;
use crate::sdb::error::Result;
use crate::sdb::multimap::{AttributeMultimap, Lookup, ReplaceMode};

/// One item of a domain
///
/// Attributes are absent until loaded: items listed by a query carry only
/// their key. [`Item::get`] loads them on first access.
#[derive(Debug, Clone)]
pub struct Item {
    domain: Domain,
    key: String,
    attributes: Option<AttributeMultimap>,
}

impl Item {
    pub fn new(domain: Domain, key: impl Into<String>) -> Self {
        Self {
            domain,
            key: key.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(
        domain: Domain,
        key: impl Into<String>,
        attributes: AttributeMultimap,
    ) -> Self {
        Self {
            domain,
            key: key.into(),
            attributes: Some(attributes),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn is_loaded(&self) -> bool {
        self.attributes.is_some()
    }

    pub fn attributes(&self) -> Option<&AttributeMultimap> {
        self.attributes.as_ref()
    }

    /// Attributes for in-place edits, starting empty when not loaded
    pub fn attributes_mut(&mut self) -> &mut AttributeMultimap {
        self.attributes.get_or_insert_with(AttributeMultimap::new)
    }

    /// Replace the attributes wholesale
    pub fn set_attributes(&mut self, attributes: AttributeMultimap) {
        self.attributes = Some(attributes);
    }

    /// Append every pair of `attributes` to the current ones
    pub fn merge_attributes(&mut self, attributes: &AttributeMultimap) {
        self.attributes_mut().merge(attributes);
    }

    /// Fetch the attributes from the store, replacing the local copy
    pub async fn reload(&mut self) -> Result<()> {
        let fresh = self.domain.get_attributes(&self.key, &[]).await?;
        self.attributes = fresh.attributes;
        Ok(())
    }

    /// Write the local attributes, replacing every stored value of their keys
    pub async fn save(&self) -> Result<()> {
        let empty = AttributeMultimap::new();
        let attributes = self.attributes.as_ref().unwrap_or(&empty);
        self.domain
            .put_attributes(&self.key, attributes, &ReplaceMode::All)
            .await?;
        Ok(())
    }

    /// Delete the whole item from the store
    pub async fn destroy(&self) -> Result<()> {
        self.domain.delete_item(&self.key).await
    }

    /// Look up `key`, loading the attributes first if needed
    pub async fn get(&mut self, key: &str) -> Result<Lookup<'_>> {
        if self.attributes.is_none() {
            self.reload().await?;
        }
        Ok(self.attribute(key))
    }

    /// Look up `key` in the local attributes without any request
    pub fn attribute(&self, key: &str) -> Lookup<'_> {
        match &self.attributes {
            Some(attributes) => attributes.get(key),
            None => Lookup::Absent,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().flat_map(|a| a.iter())
    }

    pub fn len(&self) -> usize {
        self.attributes.as_ref().map_or(0, AttributeMultimap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
