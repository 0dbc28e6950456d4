//! Pantry Storefront library.
//!
//! This crate provides the storefront API as a library, allowing it to be
//! tested and reused by the CLI and integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod serializer;
pub mod state;
