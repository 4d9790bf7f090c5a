//! Layered runtime settings.

use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use roster_core::{census::CensusConfig, record::KeyStrategy, resolve::parse_repository_list};
use roster_gitlab::GitlabConfig;
use roster_report::Layout;
use serde::Deserialize;

use crate::Cli;

/// Everything the binary reads from its configuration layers.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub api_url:           String,
  pub token:             String,
  pub group:             String,
  /// Comma-separated project paths or names.
  pub repositories:      String,
  pub include_subgroups: bool,
  pub inherited_members: bool,
  pub key_strategy:      KeyStrategy,
  pub search_users:      bool,
  pub layout:            Layout,
  pub output:            PathBuf,
  pub per_page:          u32,
  pub commit_page_size:  u32,
  pub timeout_secs:      u64,
}

impl Settings {
  /// Defaults, then the config file, then `ROSTER_*` variables, then flags.
  pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
    let settings: Self = Config::builder()
      .set_default("api_url", "https://gitlab.com/api/v4")?
      .set_default("token", "")?
      .set_default("include_subgroups", false)?
      .set_default("inherited_members", false)?
      .set_default("key_strategy", "email")?
      .set_default("search_users", false)?
      .set_default("layout", "summary")?
      .set_default("output", "contributors.csv")?
      .set_default("per_page", 100_i64)?
      .set_default("commit_page_size", 100_i64)?
      .set_default("timeout_secs", 30_i64)?
      .add_source(File::from(cli.config.clone()).required(false))
      .add_source(Environment::with_prefix("ROSTER").try_parsing(true))
      .set_override_option("api_url", cli.api_url.clone())?
      .set_override_option("token", cli.token.clone())?
      .set_override_option("group", cli.group.clone())?
      .set_override_option("repositories", cli.repositories.clone())?
      .set_override_option("include_subgroups", cli.include_subgroups.then_some(true))?
      .set_override_option("inherited_members", cli.inherited_members.then_some(true))?
      .set_override_option("key_strategy", cli.key_strategy.clone())?
      .set_override_option("search_users", cli.search_users.then_some(true))?
      .set_override_option("layout", cli.layout.clone())?
      .set_override_option(
        "output",
        cli.output.as_ref().map(|p| p.to_string_lossy().into_owned()),
      )?
      .set_override_option("timeout_secs", cli.timeout_secs.map(i64::from))?
      .build()?
      .try_deserialize()?;

    if settings.timeout_secs == 0 {
      return Err(ConfigError::Message("timeout_secs must be at least 1".into()));
    }
    Ok(settings)
  }

  pub fn census_config(&self) -> roster_core::Result<CensusConfig> {
    Ok(CensusConfig {
      group:             self.group.trim().to_owned(),
      repositories:      parse_repository_list(&self.repositories)?,
      include_subgroups: self.include_subgroups,
      inherited_members: self.inherited_members,
      key_strategy:      self.key_strategy,
      search_users:      self.search_users,
      commit_page_size:  self.commit_page_size,
    })
  }

  pub fn gitlab_config(&self) -> GitlabConfig {
    GitlabConfig {
      api_url:  self.api_url.clone(),
      token:    self.token.clone(),
      per_page: self.per_page,
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }
}
