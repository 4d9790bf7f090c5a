//! Turning records into rows for each [`Layout`].

use chrono::SecondsFormat;
use roster_core::record::ContributorRecord;

use crate::{Layout, csv::Table};

const IDENTITY_COLUMNS: [&str; 5] = ["user_id", "name", "email", "status", "last_commit_date"];

/// Render `records` as a CSV table.
///
/// `repositories` fixes the per-repository columns of [`Layout::Wide`] and
/// the row order of [`Layout::Long`]; it is ignored by [`Layout::Summary`].
pub fn render(records: &[ContributorRecord], repositories: &[String], layout: Layout) -> String {
  let mut table = Table::default();

  match layout {
    Layout::Summary => {
      table.row(IDENTITY_COLUMNS.into_iter().chain(["commit_count"]));
      for record in records {
        table.row(identity(record).into_iter().chain([record.total_commits().to_string()]));
      }
    }
    Layout::Wide => {
      table.row(
        IDENTITY_COLUMNS
          .into_iter()
          .chain(repositories.iter().map(String::as_str))
          .chain(["commit_count"]),
      );
      for record in records {
        table.row(
          identity(record)
            .into_iter()
            .chain(repositories.iter().map(|r| record.commits_in(r).to_string()))
            .chain([record.total_commits().to_string()]),
        );
      }
    }
    Layout::Long => {
      table.row(IDENTITY_COLUMNS.into_iter().chain(["repository", "commit_count"]));
      for record in records {
        for repository in repositories {
          let commits = record.commits_in(repository);
          if commits == 0 {
            continue;
          }
          table.row(
            identity(record)
              .into_iter()
              .chain([repository.clone(), commits.to_string()]),
          );
        }
      }
    }
  }

  table.finish()
}

fn identity(record: &ContributorRecord) -> [String; 5] {
  [
    record.membership_id.map(|id| id.to_string()).unwrap_or_default(),
    record.display_name.clone(),
    record.email.clone().unwrap_or_default(),
    record.membership_status.label().to_owned(),
    record
      .last_activity_at()
      .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
      .unwrap_or_default(),
  ]
}
