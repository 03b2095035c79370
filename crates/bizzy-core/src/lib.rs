//! Core types and trait definitions for the BizzyCard workflow.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod contact;
pub mod error;
pub mod file;
pub mod link;
pub mod sharing;
pub mod store;
pub mod token;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
