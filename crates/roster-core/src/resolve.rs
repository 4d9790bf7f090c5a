//! Group and project resolution.

use tracing::{info, warn};

use crate::{
  Error, Result,
  model::{Group, Project},
  platform::Platform,
};

/// Split a comma-separated repository list.
///
/// Entries are trimmed, blanks dropped, and case-insensitive duplicates
/// removed (first occurrence kept).
pub fn parse_repository_list(raw: &str) -> Result<Vec<String>> {
  let mut repos: Vec<String> = Vec::new();
  for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
    if !repos.iter().any(|r| r.eq_ignore_ascii_case(entry)) {
      repos.push(entry.to_owned());
    }
  }
  if repos.is_empty() {
    return Err(Error::EmptyRepositoryList);
  }
  Ok(repos)
}

/// Find the group whose name or path equals `name`, ignoring case.
pub async fn find_group<P: Platform>(platform: &P, name: &str) -> Result<Group> {
  let candidates = platform.search_groups(name).await.map_err(Error::platform)?;
  candidates
    .into_iter()
    .find(|g| g.name.eq_ignore_ascii_case(name) || g.path.eq_ignore_ascii_case(name))
    .ok_or_else(|| Error::GroupNotFound(name.to_owned()))
}

/// Keep the projects named in `requested`, ordered by the request.
///
/// Requested entries with no matching project are logged and skipped.
pub fn select_projects(all: &[Project], requested: &[String]) -> Vec<Project> {
  let mut selected: Vec<Project> = Vec::new();
  for wanted in requested {
    let before = selected.len();
    for project in all.iter().filter(|p| p.is_named(wanted)) {
      if !selected.iter().any(|s| s.id == project.id) {
        selected.push(project.clone());
      }
    }
    if selected.len() == before {
      warn!(repository = %wanted, "requested repository not found in group");
    }
  }
  selected
}

/// List the group's projects and narrow them to `requested`.
pub async fn resolve_projects<P: Platform>(
  platform:          &P,
  group:             &Group,
  requested:         &[String],
  include_subgroups: bool,
) -> Result<Vec<Project>> {
  let all = platform
    .list_group_projects(group.id, include_subgroups)
    .await
    .map_err(Error::platform)?;
  info!(group = %group.path, projects = all.len(), "fetched group projects");

  let selected = select_projects(&all, requested);
  if selected.is_empty() {
    return Err(Error::NoMatchingRepositories {
      group:     group.name.clone(),
      requested: requested.to_vec(),
    });
  }
  Ok(selected)
}
