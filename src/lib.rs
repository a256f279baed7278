//! sdbclient - Signed query client for SimpleDB-style attribute stores

pub mod cli;
pub mod config;
pub mod sdb;

pub use config::Config;
pub use sdb::{Client, Domain, Item, SdbError};
