//! Smokeshop Core - Shared types library.
//!
//! This crate provides the types shared by all Smokeshop components:
//! - `storefront` - The catalog/cart HTTP service
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Query parameters are turned into a [`QuerySpec`] here, and the
//! spec is lowered into the store vocabulary ([`Filter`], [`SortSpec`],
//! [`FindOptions`]) that every store backend understands.
//!
//! # Modules
//!
//! - [`types`] - Catalog items, prices and client keys
//! - [`query`] - Query parameter parsing and the document-store query vocabulary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod query;
pub mod types;

pub use query::{Filter, FindOptions, QuerySpec, SortDirection, SortSpec, Update};
pub use types::*;
