//! Core types, the `Platform` trait and the census pipeline for Roster.
//!
//! This crate is deliberately free of HTTP dependencies. The GitLab client
//! (`roster-gitlab`) implements [`platform::Platform`]; the report writer
//! (`roster-report`) consumes the finalized [`record::ContributorRecord`]s.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod census;
pub mod error;
pub mod matcher;
pub mod membership;
pub mod model;
pub mod platform;
pub mod record;
pub mod resolve;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
