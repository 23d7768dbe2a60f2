//! Core types and registry logic for the tapcard business-card store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod alloc;
pub mod backend;
pub mod card;
pub mod error;
pub mod integrity;
pub mod registry;
pub mod scan;
pub mod seed;

pub use error::{Error, Result};
