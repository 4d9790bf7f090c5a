//! The `Platform` trait: the REST calls the census depends on.
//!
//! Implemented by `roster-gitlab`. The pipeline depends on this abstraction,
//! never on an HTTP client, so it can be driven by an in-memory fake in tests.

use std::future::Future;

use crate::model::{Commit, Contributor, Group, Member, Project, User};

/// The identity a commit listing is filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorFilter<'a> {
  Email(&'a str),
  Name(&'a str),
}

impl<'a> AuthorFilter<'a> {
  pub fn value(&self) -> &'a str {
    match self {
      Self::Email(v) | Self::Name(v) => *v,
    }
  }

  /// Whether `commit` was authored by this identity (case-insensitive).
  pub fn matches(&self, commit: &Commit) -> bool {
    let field = match self {
      Self::Email(_) => commit.author_email.as_deref(),
      Self::Name(_) => commit.author_name.as_deref(),
    };
    field.is_some_and(|f| f.trim().eq_ignore_ascii_case(self.value().trim()))
  }
}

/// Abstraction over the source-control platform's REST API.
///
/// Listing calls return every page; the commit and user-search calls return a
/// single bounded page. All methods return `Send` futures.
pub trait Platform: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Groups whose name or path matches `term` (platform-side fuzzy search).
  fn search_groups<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + 'a;

  /// Projects of a group, optionally including every subgroup's projects.
  fn list_group_projects(
    &self,
    group_id: u64,
    include_subgroups: bool,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  /// Members of a group; `inherited` also returns members of ancestor groups.
  fn list_group_members(
    &self,
    group_id: u64,
    inherited: bool,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Contributor statistics of a project's default branch.
  fn list_contributors(
    &self,
    project_id: u64,
  ) -> impl Future<Output = Result<Vec<Contributor>, Self::Error>> + Send + '_;

  /// Up to `limit` commits of a project authored by `author`.
  fn list_commits_by_author<'a>(
    &'a self,
    project_id: u64,
    author: AuthorFilter<'a>,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Commit>, Self::Error>> + Send + 'a;

  /// A single user account by id.
  fn get_user(
    &self,
    user_id: u64,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Users matching `term` (platform-side fuzzy search), first page only.
  fn search_users<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;
}
