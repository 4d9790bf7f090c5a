//! Error type for `roster-gitlab`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid API base URL {0:?}")]
  InvalidBaseUrl(String),

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("GET {path} failed: {source}")]
  Http {
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("GET {path} → {status}: {body}")]
  Status {
    path:   String,
    status: StatusCode,
    body:   String,
  },

  #[error("decoding response of GET {path}: {source}")]
  Decode {
    path:   String,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
