//! Wire names for the two API dialects
//!
//! Both dialects share the signing scheme and the overall request shape; they
//! differ only in action names, parameter names and a few response elements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signature scheme version sent with every request
pub const SIGNATURE_VERSION: &str = "1";

const SDB_DOMAIN_PATH: &[&[u8]] = &[b"DomainName"];
const SDS_DOMAIN_PATH: &[&[u8]] = &[b"Domain", b"Name"];

/// API dialect spoken by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SimpleDB query API (2007-11-07)
    #[default]
    Sdb,
    /// Earlier SDS query API (2006-08-11)
    Sds,
}

/// Field of an indexed attribute parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    Name,
    Value,
    Replace,
}

impl AttributeField {
    fn as_str(self) -> &'static str {
        match self {
            AttributeField::Name => "Name",
            AttributeField::Value => "Value",
            AttributeField::Replace => "Replace",
        }
    }
}

impl Dialect {
    pub fn api_version(self) -> &'static str {
        match self {
            Dialect::Sdb => "2007-11-07",
            Dialect::Sds => "2006-08-11",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Dialect::Sdb => "http://sdb.amazonaws.com/",
            Dialect::Sds => "http://sds.amazonaws.com/",
        }
    }

    pub fn list_domains_action(self) -> &'static str {
        match self {
            Dialect::Sdb => "ListDomains",
            Dialect::Sds => "List",
        }
    }

    pub fn create_domain_action(self) -> &'static str {
        match self {
            Dialect::Sdb => "CreateDomain",
            Dialect::Sds => "Create",
        }
    }

    pub fn delete_domain_action(self) -> &'static str {
        match self {
            Dialect::Sdb => "DeleteDomain",
            Dialect::Sds => "Delete",
        }
    }

    /// Request parameter carrying the domain name
    pub fn domain_param(self) -> &'static str {
        match self {
            Dialect::Sdb => "DomainName",
            Dialect::Sds => "Name",
        }
    }

    /// Continuation token name, used both as request parameter and response element
    pub fn token_param(self) -> &'static str {
        match self {
            Dialect::Sdb => "NextToken",
            Dialect::Sds => "MoreToken",
        }
    }

    pub fn max_results_param(self) -> &'static str {
        match self {
            Dialect::Sdb => "MaxNumberOfItems",
            Dialect::Sds => "MaxResults",
        }
    }

    pub fn expression_param(self) -> &'static str {
        match self {
            Dialect::Sdb => "QueryExpression",
            Dialect::Sds => "Filter",
        }
    }

    /// Indexed attribute parameter, e.g. `Attribute.3.Value` or `Value3`
    pub fn attribute_param(self, index: usize, field: AttributeField) -> String {
        match self {
            Dialect::Sdb => format!("Attribute.{}.{}", index, field.as_str()),
            Dialect::Sds => format!("{}{}", field.as_str(), index),
        }
    }

    /// Element path (innermost last) holding one domain name in a listing
    pub fn domain_entry_path(self) -> &'static [&'static [u8]] {
        match self {
            Dialect::Sdb => SDB_DOMAIN_PATH,
            Dialect::Sds => SDS_DOMAIN_PATH,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Sdb => "sdb",
            Dialect::Sds => "sds",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sdb" | "simpledb" => Ok(Dialect::Sdb),
            "sds" => Ok(Dialect::Sds),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}
