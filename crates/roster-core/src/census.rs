//! The pipeline entry point: resolve, index, aggregate, match.

use std::collections::HashSet;

use tracing::info;

use crate::{
  Error, Result,
  aggregate::{AggregateStats, Aggregator},
  matcher::{MatchOptions, MatchStats, match_identities},
  membership::MembershipIndex,
  model::{Group, Project},
  platform::Platform,
  record::{ContributorRecord, KeyStrategy},
  resolve::{find_group, resolve_projects},
};

/// Everything one census run needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CensusConfig {
  /// Group name or path, matched case-insensitively.
  pub group:             String,
  /// Requested project paths or names, already parsed.
  pub repositories:      Vec<String>,
  pub include_subgroups: bool,
  pub inherited_members: bool,
  pub key_strategy:      KeyStrategy,
  pub search_users:      bool,
  /// Page size of each per-contributor commit-history lookup.
  pub commit_page_size:  u32,
}

/// The finalized outcome of a run.
#[derive(Debug)]
pub struct Census {
  pub group:     Group,
  /// Target projects, in report column order.
  pub projects:  Vec<Project>,
  /// One record per contributor, in first-seen order.
  pub records:   Vec<ContributorRecord>,
  pub aggregate: AggregateStats,
  pub matching:  MatchStats,
}

impl Census {
  /// Repository identifiers as used in `per_repository_commits`, each once.
  ///
  /// Subgroup projects sharing a path share one identifier.
  pub fn repository_paths(&self) -> Vec<String> {
    let mut seen = HashSet::new();
    self
      .projects
      .iter()
      .filter(|p| seen.insert(p.path.as_str()))
      .map(|p| p.path.clone())
      .collect()
  }
}

/// Run the whole census against `platform`.
///
/// Any failure of a mandatory call aborts the run; nothing partial is
/// returned.
pub async fn run<P: Platform>(platform: &P, config: &CensusConfig) -> Result<Census> {
  if config.repositories.is_empty() {
    return Err(Error::EmptyRepositoryList);
  }

  info!(group = %config.group, "fetching group");
  let group = find_group(platform, &config.group).await?;

  let projects = resolve_projects(
    platform,
    &group,
    &config.repositories,
    config.include_subgroups,
  )
  .await?;

  info!(group = %group.path, "fetching group members");
  let members = platform
    .list_group_members(group.id, config.inherited_members)
    .await
    .map_err(Error::platform)?;
  let index = MembershipIndex::build(members);
  info!(members = index.len(), "membership index built");

  let mut aggregator = Aggregator::new(platform, config.key_strategy, config.commit_page_size);
  for project in &projects {
    aggregator.add_project(project).await?;
  }
  let (mut records, aggregate) = aggregator.finish();

  info!(contributors = records.len(), "matching contributors to members");
  let matching = match_identities(
    platform,
    &index,
    &mut records,
    MatchOptions { search_users: config.search_users },
  )
  .await;

  Ok(Census {
    group,
    projects,
    records: records.into_values().collect(),
    aggregate,
    matching,
  })
}
