//! Platform entities as returned by the source-control REST API.
//!
//! Only the fields the census reads are modelled; everything else in the
//! payloads is ignored on deserialisation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Groups & projects ───────────────────────────────────────────────────────

/// An organizational container holding projects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
  pub id:        u64,
  pub name:      String,
  pub path:      String,
  #[serde(default)]
  pub full_path: String,
}

/// A single repository within a group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
  pub id:                  u64,
  pub name:                String,
  pub path:                String,
  #[serde(default)]
  pub path_with_namespace: String,
}

impl Project {
  /// Whether `wanted` names this project, by path or by display name,
  /// ignoring case.
  pub fn is_named(&self, wanted: &str) -> bool {
    self.path.eq_ignore_ascii_case(wanted) || self.name.eq_ignore_ascii_case(wanted)
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Platform-tracked state of a user account.
///
/// States the platform may add later are kept verbatim in [`Other`].
///
/// [`Other`]: AccountState::Other
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountState {
  Active,
  Blocked,
  Deactivated,
  Banned,
  BlockedPendingApproval,
  LdapBlocked,
  Other(String),
}

impl AccountState {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Active                 => "active",
      Self::Blocked                => "blocked",
      Self::Deactivated            => "deactivated",
      Self::Banned                 => "banned",
      Self::BlockedPendingApproval => "blocked_pending_approval",
      Self::LdapBlocked            => "ldap_blocked",
      Self::Other(s)               => s,
    }
  }
}

impl From<String> for AccountState {
  fn from(s: String) -> Self {
    match s.as_str() {
      "active"                   => Self::Active,
      "blocked"                  => Self::Blocked,
      "deactivated"              => Self::Deactivated,
      "banned"                   => Self::Banned,
      "blocked_pending_approval" => Self::BlockedPendingApproval,
      "ldap_blocked"             => Self::LdapBlocked,
      _                          => Self::Other(s),
    }
  }
}

impl From<AccountState> for String {
  fn from(state: AccountState) -> Self {
    match state {
      AccountState::Other(s) => s,
      other                  => other.as_str().to_owned(),
    }
  }
}

impl fmt::Display for AccountState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// An account formally belonging to the group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
  pub id:           u64,
  #[serde(default)]
  pub username:     String,
  #[serde(default)]
  pub name:         String,
  #[serde(default)]
  pub state:        Option<AccountState>,
  /// Only visible to administrators or for enterprise users.
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default)]
  pub public_email: Option<String>,
}

impl Member {
  /// Every non-empty email address known for this account.
  pub fn emails(&self) -> impl Iterator<Item = &str> {
    [self.email.as_deref(), self.public_email.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|e| !e.is_empty())
  }
}

/// The `/users` payloads share the member shape.
pub type User = Member;

// ─── Repository statistics ───────────────────────────────────────────────────

/// One entry of a project's contributor statistics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contributor {
  #[serde(default)]
  pub name:    Option<String>,
  #[serde(default)]
  pub email:   Option<String>,
  #[serde(default)]
  pub commits: u64,
}

/// A commit, reduced to the author identity and its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
  pub id:           String,
  #[serde(default)]
  pub author_name:  Option<String>,
  #[serde(default)]
  pub author_email: Option<String>,
  #[serde(default)]
  pub created_at:   Option<DateTime<Utc>>,
}
