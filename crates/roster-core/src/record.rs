//! The per-contributor aggregate and its membership status.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  model::{AccountState, Contributor},
  platform::AuthorFilter,
};

/// Normalise an email or display name into a lookup key.
pub fn normalize(s: &str) -> String { s.trim().to_lowercase() }

// ─── Keying ──────────────────────────────────────────────────────────────────

/// Which contributor field identifies a person across repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
  #[default]
  Email,
  Name,
}

impl KeyStrategy {
  /// The raw identifying field of `entry`, or `None` when it is missing or
  /// blank (such entries are skipped).
  pub fn key_field<'c>(&self, entry: &'c Contributor) -> Option<&'c str> {
    let field = match self {
      Self::Email => entry.email.as_deref(),
      Self::Name => entry.name.as_deref(),
    };
    field.map(str::trim).filter(|f| !f.is_empty())
  }

  /// The commit-listing filter for an identity keyed by this strategy.
  pub fn author_filter<'a>(&self, identity: &'a str) -> AuthorFilter<'a> {
    match self {
      Self::Email => AuthorFilter::Email(identity),
      Self::Name => AuthorFilter::Name(identity),
    }
  }
}

// ─── Membership status ───────────────────────────────────────────────────────

/// Outcome of matching a contributor against the group's members.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MembershipStatus {
  /// Not matched yet, or matched but the account state could not be read.
  #[default]
  Unknown,
  /// No member corresponds to this contributor.
  NotFound,
  /// Matched; carries the member's account state.
  Member(AccountState),
}

impl MembershipStatus {
  pub fn label(&self) -> &str {
    match self {
      Self::Unknown => "unknown",
      Self::NotFound => "not_found",
      Self::Member(state) => state.as_str(),
    }
  }
}

impl fmt::Display for MembershipStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One contributor, merged across every processed repository.
///
/// Commit counts and the activity timestamp are only reachable through
/// methods so that `total_commits` always equals the per-repository sum and
/// `last_activity_at` never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorRecord {
  /// The normalised key this record is stored under.
  pub key:               String,
  pub display_name:      String,
  pub email:             Option<String>,
  per_repository:        BTreeMap<String, u64>,
  total_commits:         u64,
  last_activity_at:      Option<DateTime<Utc>>,
  pub membership_id:     Option<u64>,
  pub membership_status: MembershipStatus,
}

impl ContributorRecord {
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key:               key.into(),
      display_name:      String::new(),
      email:             None,
      per_repository:    BTreeMap::new(),
      total_commits:     0,
      last_activity_at:  None,
      membership_id:     None,
      membership_status: MembershipStatus::Unknown,
    }
  }

  /// Fill `display_name` and `email` from `entry` where still empty.
  pub fn absorb_identity(&mut self, entry: &Contributor) {
    if self.display_name.is_empty()
      && let Some(name) = entry.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    {
      self.display_name = name.to_owned();
    }
    if self.email.is_none()
      && let Some(email) = entry.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    {
      self.email = Some(email.to_owned());
    }
  }

  /// Add `commits` to `repository`, accumulating repeated sightings.
  pub fn add_commits(&mut self, repository: &str, commits: u64) {
    *self.per_repository.entry(repository.to_owned()).or_default() += commits;
    self.total_commits += commits;
  }

  /// Record a commit timestamp; returns whether it advanced
  /// `last_activity_at`.
  pub fn observe_activity(&mut self, at: DateTime<Utc>) -> bool {
    match self.last_activity_at {
      Some(current) if current >= at => false,
      _ => {
        self.last_activity_at = Some(at);
        true
      }
    }
  }

  /// Finalise the membership outcome.
  pub fn set_membership(&mut self, id: Option<u64>, status: MembershipStatus) {
    self.membership_id = id;
    self.membership_status = status;
  }

  pub fn total_commits(&self) -> u64 { self.total_commits }

  pub fn last_activity_at(&self) -> Option<DateTime<Utc>> { self.last_activity_at }

  /// Commits in `repository`, zero when the contributor has none there.
  pub fn commits_in(&self, repository: &str) -> u64 {
    self.per_repository.get(repository).copied().unwrap_or(0)
  }

  /// `(repository, commits)` pairs, ordered by repository.
  pub fn per_repository_commits(&self) -> impl Iterator<Item = (&str, u64)> {
    self.per_repository.iter().map(|(r, c)| (r.as_str(), *c))
  }
}
