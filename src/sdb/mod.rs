//! Client for SimpleDB-style attribute stores
//!
//! Signed query requests over HTTP GET, XML responses, and a typed attribute
//! model whose values round-trip through lexically sortable strings.

pub mod client;
pub mod codec;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod item;
pub mod lister;
pub mod multimap;
pub mod query;
pub mod response;
pub mod signer;
pub mod transport;
pub mod types;
pub mod usage;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use codec::{AttributeValue, Codec, CodecConfig, CodecError};
pub use dialect::Dialect;
pub use domain::{DeleteTarget, Domain};
pub use error::{ErrorCategory, Result, SdbError, ServiceError};
pub use item::Item;
pub use lister::{Listing, Page, PaginatedLister};
pub use multimap::{AttributeMultimap, GetOptions, Lookup, PutOptions, ReplaceMode};
pub use query::QueryParams;
pub use signer::RequestSigner;
pub use transport::{HttpTransport, ScriptedTransport, Transport, TransportResponse};
pub use types::{QueryOptions, QueryResult};
pub use usage::Usage;
