//! Ordered multi-valued attribute container
//!
//! Keys keep the order in which they were first inserted, values keep
//! insertion order within a key. Each value remembers the raw wire string it
//! was decoded from, when it came off the wire.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::sdb::codec::{escape, AttributeValue, Codec, CodecError};
use crate::sdb::dialect::{AttributeField, Dialect};

/// One stored value plus its before-cast wire string
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeEntry {
    pub value: AttributeValue,
    /// Exact wire string, present for values read from a response
    pub raw: Option<String>,
}

impl AttributeEntry {
    pub fn new(value: AttributeValue) -> Self {
        Self { value, raw: None }
    }

    fn from_wire(raw: String, codec: &Codec) -> Self {
        Self {
            value: codec.decode(&raw),
            raw: Some(raw),
        }
    }
}

/// Result shape of [`AttributeMultimap::get`]
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Absent,
    Single(&'a AttributeValue),
    Multiple(Vec<&'a AttributeValue>),
}

impl<'a> Lookup<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// The single value, if there is exactly one
    pub fn single(&self) -> Option<&'a AttributeValue> {
        match self {
            Lookup::Single(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<&'a AttributeValue> {
        match self {
            Lookup::Absent => Vec::new(),
            Lookup::Single(v) => vec![v],
            Lookup::Multiple(vs) => vs,
        }
    }
}

/// Options for [`AttributeMultimap::put`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Replace the existing values of the key instead of appending
    pub replace: bool,
}

/// Options for [`AttributeMultimap::get_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Always return `Lookup::Multiple`, empty when the key is missing
    pub force_array: bool,
}

/// Which attributes a write marks as replacing existing values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplaceMode {
    #[default]
    None,
    All,
    Keys(Vec<String>),
}

impl ReplaceMode {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReplaceMode::Keys(keys.into_iter().map(Into::into).collect())
    }

    fn applies_to(&self, key: &str) -> bool {
        match self {
            ReplaceMode::None => false,
            ReplaceMode::All => true,
            ReplaceMode::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }
}

/// Ordered mapping from attribute name to one or more values
#[derive(Debug, Clone, Default)]
pub struct AttributeMultimap {
    groups: IndexMap<String, Vec<AttributeEntry>>,
    /// Total value count, recomputed lazily after a mutation
    size: OnceLock<usize>,
}

impl PartialEq for AttributeMultimap {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl AttributeMultimap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw wire pairs, decoding each value and keeping its raw string
    pub fn from_wire<I, K, V>(pairs: I, codec: &Codec) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, raw) in pairs {
            map.push_entry(key.into(), AttributeEntry::from_wire(raw.into(), codec), false);
        }
        map
    }

    fn clear_size(&mut self) {
        self.size.take();
    }

    fn push_entry(&mut self, key: String, entry: AttributeEntry, replace: bool) {
        self.clear_size();
        let group = self.groups.entry(key).or_default();
        if replace {
            group.clear();
        }
        group.push(entry);
    }

    /// Store a value under `key`, appending unless `options.replace` is set
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
        options: PutOptions,
    ) {
        self.push_entry(key.into(), AttributeEntry::new(value.into()), options.replace);
    }

    /// Append a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.put(key, value, PutOptions::default());
    }

    /// Replace all values of `key` with a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.put(key, value, PutOptions { replace: true });
    }

    pub fn get(&self, key: &str) -> Lookup<'_> {
        self.get_with(key, GetOptions::default())
    }

    pub fn get_with(&self, key: &str, options: GetOptions) -> Lookup<'_> {
        let values: Vec<&AttributeValue> = match self.groups.get(key) {
            Some(group) => group.iter().map(|e| &e.value).collect(),
            None => Vec::new(),
        };
        if options.force_array {
            return Lookup::Multiple(values);
        }
        match values.len() {
            0 => Lookup::Absent,
            1 => Lookup::Single(values[0]),
            _ => Lookup::Multiple(values),
        }
    }

    /// All values of `key`, empty when missing
    pub fn get_all(&self, key: &str) -> Vec<&AttributeValue> {
        self.get_with(key, GetOptions { force_array: true }).into_vec()
    }

    /// Before-cast wire strings of `key`, index-aligned with [`get_all`](Self::get_all).
    ///
    /// Values set locally rather than read from a response have `None`.
    pub fn get_raw(&self, key: &str) -> Vec<Option<&str>> {
        self.groups
            .get(key)
            .map(|group| group.iter().map(|e| e.raw.as_deref()).collect())
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Remove every value of `key`, returning them
    pub fn remove(&mut self, key: &str) -> Option<Vec<AttributeEntry>> {
        self.clear_size();
        self.groups.shift_remove(key)
    }

    /// Append every pair of `other` after the existing values
    pub fn merge(&mut self, other: &AttributeMultimap) {
        for (key, entry) in other.entries() {
            self.push_entry(key.to_string(), entry.clone(), false);
        }
    }

    pub fn clear(&mut self) {
        self.clear_size();
        self.groups.clear();
    }

    /// Total number of values (a key with three values counts three)
    pub fn len(&self) -> usize {
        *self.size.get_or_init(|| self.groups.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Every key/value pair in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries().map(|(k, e)| (k, &e.value))
    }

    /// Every key/value pair with its running index
    pub fn iter_with_index(&self) -> impl Iterator<Item = (usize, &str, &AttributeValue)> {
        self.iter().enumerate().map(|(i, (k, v))| (i, k, v))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &AttributeEntry)> {
        self.groups
            .iter()
            .flat_map(|(k, group)| group.iter().map(move |e| (k.as_str(), e)))
    }

    /// Indexed name/value parameters for a write request.
    ///
    /// Values read from the wire are sent back with their raw string untouched.
    pub fn to_wire(
        &self,
        codec: &Codec,
        dialect: Dialect,
        replace: &ReplaceMode,
    ) -> Result<Vec<(String, String)>, CodecError> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (index, (key, entry)) in self.entries().enumerate() {
            let value = match &entry.raw {
                Some(raw) => raw.clone(),
                None => codec.encode(&entry.value)?,
            };
            out.push((dialect.attribute_param(index, AttributeField::Name), escape(key)));
            out.push((dialect.attribute_param(index, AttributeField::Value), value));
            if replace.applies_to(key) {
                out.push((
                    dialect.attribute_param(index, AttributeField::Replace),
                    "true".to_string(),
                ));
            }
        }
        Ok(out)
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMultimap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K, V> From<Vec<(K, V)>> for AttributeMultimap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> From<BTreeMap<K, V>> for AttributeMultimap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> From<IndexMap<K, V>> for AttributeMultimap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from(map: IndexMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}
