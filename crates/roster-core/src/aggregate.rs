//! Merging per-project contributor statistics into one record per person.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  model::{Contributor, Project},
  platform::Platform,
  record::{ContributorRecord, KeyStrategy, normalize},
};

/// Counters describing what the aggregator saw and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
  pub entries_seen:     u64,
  /// Entries whose key field was empty.
  pub entries_skipped:  u64,
  /// Commits carried by the skipped entries; absent from every total.
  pub commits_skipped:  u64,
  /// Commit-history lookups that failed and were ignored.
  pub history_failures: u64,
}

/// Records keyed by normalised identity, in first-seen order.
pub type Records = IndexMap<String, ContributorRecord>;

/// Walks projects one at a time and accumulates [`ContributorRecord`]s.
pub struct Aggregator<'p, P> {
  platform:         &'p P,
  strategy:         KeyStrategy,
  commit_page_size: u32,
  records:          Records,
  stats:            AggregateStats,
}

impl<'p, P: Platform> Aggregator<'p, P> {
  pub fn new(platform: &'p P, strategy: KeyStrategy, commit_page_size: u32) -> Self {
    Self {
      platform,
      strategy,
      commit_page_size,
      records: Records::new(),
      stats: AggregateStats::default(),
    }
  }

  /// Fold one project's contributors into the records.
  ///
  /// The contributor listing is mandatory; a failing commit-history lookup
  /// only costs that contributor's activity date for this project.
  pub async fn add_project(&mut self, project: &Project) -> Result<()> {
    info!(project = %project.path, id = project.id, "processing project");
    let contributors = self
      .platform
      .list_contributors(project.id)
      .await
      .map_err(Error::platform)?;

    for entry in &contributors {
      self.add_entry(project, entry).await;
    }
    Ok(())
  }

  async fn add_entry(&mut self, project: &Project, entry: &Contributor) {
    self.stats.entries_seen += 1;

    let Some(identity) = self.strategy.key_field(entry) else {
      debug!(
        project = %project.path,
        name = ?entry.name,
        commits = entry.commits,
        "skipping contributor without key field"
      );
      self.stats.entries_skipped += 1;
      self.stats.commits_skipped += entry.commits;
      return;
    };

    let key = normalize(identity);
    let record = self
      .records
      .entry(key.clone())
      .or_insert_with(|| ContributorRecord::new(key));
    record.absorb_identity(entry);
    record.add_commits(&project.path, entry.commits);

    let author = self.strategy.author_filter(identity);
    match self
      .platform
      .list_commits_by_author(project.id, author, self.commit_page_size)
      .await
    {
      Ok(commits) => {
        if let Some(latest) = commits.iter().filter_map(|c| c.created_at).max()
          && record.observe_activity(latest)
        {
          debug!(key = %record.key, %latest, "activity advanced");
        }
      }
      Err(e) => {
        warn!(
          project = %project.path,
          author = %identity,
          error = %e,
          "commit history lookup failed; keeping previous activity date"
        );
        self.stats.history_failures += 1;
      }
    }
  }

  /// Consume the aggregator, yielding the records and final counters.
  pub fn finish(self) -> (Records, AggregateStats) {
    if self.stats.entries_skipped > 0 {
      info!(
        entries = self.stats.entries_skipped,
        commits = self.stats.commits_skipped,
        "contributors without key field were left out of the totals"
      );
    }
    (self.records, self.stats)
  }
}
