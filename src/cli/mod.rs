//! Command implementations for the `sdbclient` binary
//!
//! # Usage
//!
//! ```bash
//! # List domains
//! sdbclient domains
//!
//! # Store attributes (replacing existing values of the named keys)
//! sdbclient put books isbn-123 title=Dune year=1965 --replace
//!
//! # Read an item
//! sdbclient get books isbn-123
//!
//! # Query every page; numeric literals must carry the stored padding width
//! sdbclient query books "['year' > '00000000000000000000000000001960']" --all --load
//! ```

pub mod commands;
