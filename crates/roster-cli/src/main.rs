//! `roster`: contributor census for a GitLab group.
//!
//! # Usage
//!
//! ```
//! roster --group acme --repositories core,tools --token glpat-…
//! roster --config roster.toml --layout wide --output report.csv
//! ```
//!
//! Settings are layered: built-in defaults, then the TOML file, then
//! `ROSTER_*` environment variables, then command-line flags.

mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use roster_core::{
  census::{self, Census, CensusConfig},
  platform::Platform,
};
use roster_gitlab::GitlabClient;
use roster_report::Layout;
use settings::Settings;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Contributor census for a GitLab group")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  pub config: PathBuf,

  /// API base URL (default: https://gitlab.com/api/v4).
  #[arg(long)]
  pub api_url: Option<String>,

  /// Personal access token, sent as `PRIVATE-TOKEN`.
  #[arg(long)]
  pub token: Option<String>,

  /// Group name or path.
  #[arg(short, long)]
  pub group: Option<String>,

  /// Comma-separated project paths or names.
  #[arg(short, long, value_name = "LIST")]
  pub repositories: Option<String>,

  /// Also search the group's subgroups for projects.
  #[arg(long)]
  pub include_subgroups: bool,

  /// Match against inherited members as well as direct ones.
  #[arg(long)]
  pub inherited_members: bool,

  /// Contributor identity: `email` or `name`.
  #[arg(long, value_name = "STRATEGY")]
  pub key_strategy: Option<String>,

  /// Search all users by email for contributors who are not members.
  #[arg(long)]
  pub search_users: bool,

  /// Report layout: `summary`, `wide` or `long`.
  #[arg(long)]
  pub layout: Option<String>,

  /// Where to write the CSV report.
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Per-request timeout in seconds.
  #[arg(long, value_name = "SECS")]
  pub timeout_secs: Option<u32>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli).context("failed to load configuration")?;
  if settings.token.is_empty() {
    warn!("no API token configured; only public data is visible");
  }

  let census_config = settings.census_config().context("invalid configuration")?;
  let client =
    GitlabClient::new(settings.gitlab_config()).context("failed to build GitLab client")?;

  write_census(&client, &census_config, settings.layout, &settings.output).await?;
  info!(path = %settings.output.display(), "report written");
  Ok(())
}

/// Run the census and write the report; a failed run leaves `output` alone.
async fn write_census<P: Platform>(
  platform: &P,
  config:   &CensusConfig,
  layout:   Layout,
  output:   &Path,
) -> anyhow::Result<Census> {
  let census = census::run(platform, config).await.context("census failed")?;
  info!(
    contributors = census.records.len(),
    skipped = census.aggregate.entries_skipped,
    history_failures = census.aggregate.history_failures,
    matched_by_email = census.matching.by_email,
    matched_by_name = census.matching.by_name,
    unmatched = census.matching.unmatched,
    "census complete"
  );

  let table = roster_report::render(&census.records, &census.repository_paths(), layout);
  roster_report::write_atomic(output, &table)?;
  Ok(census)
}
