//! Pantry Core - Shared catalog types.
//!
//! This crate provides the value types shared by the Pantry components:
//! - `storefront` - Public storefront API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate performs no I/O. Database decoding for the ID types is
//! available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
