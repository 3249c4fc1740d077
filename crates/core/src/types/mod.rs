//! Core types for Smokeshop.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod client_key;
pub mod item;
pub mod price;

pub use client_key::ClientKey;
pub use item::{CartLine, CatalogItem};
pub use price::{Price, PriceError};
