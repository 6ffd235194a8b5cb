//! Immunization codebase catalog model.
//!
//! Plain data types for a pre-parsed codebase release: categories of coded
//! entries (vaccines, manufacturers, NDC packaging, products) and the typed
//! links between them. Loading and indexing live elsewhere; this crate does
//! no I/O.

pub mod catalog;
pub mod category;
pub mod date;
pub mod entry;
pub mod error;

pub use catalog::{Catalog, Category};
pub use category::CategoryType;
pub use date::{format_code_date, parse_code_date, try_parse_code_date};
pub use entry::{CodeStatus, Entry, Link, UseDate};
pub use error::{ModelError, Result};
