//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("group not found: {0:?}")]
  GroupNotFound(String),

  #[error("no project in group {group:?} matches any of {requested:?}")]
  NoMatchingRepositories {
    group:     String,
    requested: Vec<String>,
  },

  #[error("repository list is empty")]
  EmptyRepositoryList,

  /// A mandatory platform call failed (transport, status or decoding).
  #[error("platform error: {0}")]
  Platform(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn platform<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Platform(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
