//! GitLab REST v4 backend for Roster.
//!
//! [`GitlabClient`] implements [`roster_core::platform::Platform`] over
//! [`reqwest`], following page-number pagination for every listing.

mod client;

pub mod error;

pub use client::{GitlabClient, GitlabConfig};
pub use error::{Error, Result};
