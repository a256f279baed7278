//! Ordered query parameters and their form encoding
//!
//! Parameters keep insertion order. The signer sorts its own copy for the
//! canonical string; the encoded query string is emitted in mapping order.

use std::borrow::Cow;

/// Hex lookup table for zero-allocation percent encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// A parameter value: one scalar or an ordered list of scalars
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    /// Values in emission order (a scalar yields itself once)
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ParamValue::Single(v) => std::slice::from_ref(v),
            ParamValue::Multi(vs) => vs.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v),
            ParamValue::Multi(_) => None,
        }
    }
}

/// Ordered key -> value(s) mapping sent as the request query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar parameter. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key.into(), ParamValue::Single(value.into()));
    }

    /// Set an array parameter, emitted as one pair per element
    pub fn insert_multi(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.set(key.into(), ParamValue::Multi(values));
    }

    fn set(&mut self, key: String, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append scalar pairs in order
    pub fn extend_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattened `(key, value)` pairs, one per array element
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, v)| v.values().map(move |value| (k.as_str(), value)))
    }

    /// Encode as `k=v&k=v`, preserving mapping and array order
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 32);
        for (key, value) in self.pairs() {
            if !out.is_empty() {
                out.push('&');
            }
            form_encode_into(&mut out, key);
            out.push('=');
            form_encode_into(&mut out, value);
        }
        out
    }
}

/// Form-encode a string into the target buffer.
/// Unreserved characters pass through, space becomes `+`, everything else is `%XX`.
pub fn form_encode_into(buf: &mut String, s: &str) {
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                buf.push(byte as char);
            }
            b' ' => buf.push('+'),
            _ => {
                buf.push('%');
                buf.push(HEX_UPPER[(byte >> 4) as usize] as char);
                buf.push(HEX_UPPER[(byte & 0xf) as usize] as char);
            }
        }
    }
}

pub fn form_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    form_encode_into(&mut out, s);
    out
}

/// Split the query part of a URL back into decoded pairs, in order
pub fn decode_query(url: &str) -> Vec<(String, String)> {
    let query = match url.find('?') {
        Some(pos) => &url[pos + 1..],
        None => url,
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = match pair.find('=') {
                Some(pos) => (&pair[..pos], &pair[pos + 1..]),
                None => (pair, ""),
            };
            (form_decode(k).into_owned(), form_decode(v).into_owned())
        })
        .collect()
}

fn form_decode(s: &str) -> Cow<'_, str> {
    let plus_free: Cow<'_, str> = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };
    match urlencoding::decode(&plus_free) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => plus_free,
    }
}
