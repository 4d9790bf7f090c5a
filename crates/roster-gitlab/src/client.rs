//! Async HTTP client for the GitLab REST v4 API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use roster_core::{
  model::{Commit, Contributor, Group, Member, Project, User},
  platform::{AuthorFilter, Platform},
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Hard ceiling on pages fetched for a single listing.
const MAX_PAGES: u32 = 1000;

/// Pages scanned for an exact author match before giving up.
const MAX_AUTHOR_PAGES: u32 = 10;

/// Error bodies are cut to this many bytes in [`Error::Status`].
const BODY_SNIPPET: usize = 200;

/// Connection settings for the GitLab API.
#[derive(Debug, Clone)]
pub struct GitlabConfig {
  /// Base URL including the API prefix, e.g. `https://gitlab.com/api/v4`.
  pub api_url:  String,
  /// Sent as `PRIVATE-TOKEN`; omitted when empty.
  pub token:    String,
  pub per_page: u32,
  pub timeout:  Duration,
}

impl Default for GitlabConfig {
  fn default() -> Self {
    Self {
      api_url:  "https://gitlab.com/api/v4".to_owned(),
      token:    String::new(),
      per_page: 100,
      timeout:  Duration::from_secs(30),
    }
  }
}

/// GitLab implementation of [`Platform`].
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GitlabClient {
  client: Client,
  config: GitlabConfig,
}

impl GitlabClient {
  pub fn new(config: GitlabConfig) -> Result<Self> {
    let url = config.api_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
      return Err(Error::InvalidBaseUrl(config.api_url));
    }
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_url.trim().trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.token.is_empty() {
      req
    } else {
      req.header("PRIVATE-TOKEN", self.config.token.as_str())
    }
  }

  fn per_page(&self) -> u32 { self.config.per_page.clamp(1, 100) }

  // ── Transport ─────────────────────────────────────────────────────────────

  /// `GET <path>?<query>` decoded as `T`.
  async fn get_json<T: DeserializeOwned>(
    &self,
    path:  &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    debug!(path, ?query, "GET");
    let http_err = |source| Error::Http { path: path.to_owned(), source };

    let resp = self
      .auth(self.client.get(self.url(path)))
      .query(query)
      .send()
      .await
      .map_err(http_err)?;

    let status = resp.status();
    let body = resp.text().await.map_err(http_err)?;

    if !status.is_success() {
      return Err(Error::Status {
        path: path.to_owned(),
        status,
        body: snippet(&body),
      });
    }
    serde_json::from_str(&body).map_err(|source| Error::Decode {
      path: path.to_owned(),
      source,
    })
  }

  /// Every page of a listing; stops at the first short page.
  async fn get_all<T: DeserializeOwned>(
    &self,
    path:  &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>> {
    let per_page = self.per_page();
    let mut items = Vec::new();

    for page in 1..=MAX_PAGES {
      let mut paged = query.to_vec();
      paged.push(("page", page.to_string()));
      paged.push(("per_page", per_page.to_string()));

      let batch: Vec<T> = self.get_json(path, &paged).await?;
      let short = batch.len() < per_page as usize;
      items.extend(batch);
      if short {
        return Ok(items);
      }
    }

    warn!(path, pages = MAX_PAGES, "page limit reached; listing truncated");
    Ok(items)
  }
}

fn snippet(body: &str) -> String {
  let body = body.trim();
  if body.len() <= BODY_SNIPPET {
    return body.to_owned();
  }
  let mut end = BODY_SNIPPET;
  while !body.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}…", &body[..end])
}

// ─── Platform ────────────────────────────────────────────────────────────────

impl Platform for GitlabClient {
  type Error = Error;

  /// `GET /groups?search=<term>`
  async fn search_groups<'a>(&'a self, term: &'a str) -> Result<Vec<Group>> {
    self.get_all("/groups", &[("search", term.to_owned())]).await
  }

  /// `GET /groups/:id/projects?include_subgroups=<bool>`
  async fn list_group_projects(
    &self,
    group_id: u64,
    include_subgroups: bool,
  ) -> Result<Vec<Project>> {
    self
      .get_all(
        &format!("/groups/{group_id}/projects"),
        &[("include_subgroups", include_subgroups.to_string())],
      )
      .await
  }

  /// `GET /groups/:id/members` or `/groups/:id/members/all`
  async fn list_group_members(&self, group_id: u64, inherited: bool) -> Result<Vec<Member>> {
    let path = if inherited {
      format!("/groups/{group_id}/members/all")
    } else {
      format!("/groups/{group_id}/members")
    };
    self.get_all(&path, &[]).await
  }

  /// `GET /projects/:id/repository/contributors`
  async fn list_contributors(&self, project_id: u64) -> Result<Vec<Contributor>> {
    self
      .get_all(&format!("/projects/{project_id}/repository/contributors"), &[])
      .await
  }

  /// `GET /projects/:id/repository/commits?author=<identity>`
  ///
  /// GitLab's `author` filter is a fuzzy search over name and email, so each
  /// page is narrowed to commits whose author field equals the identity. A
  /// short identity can fill whole pages with other authors; pages of `limit`
  /// commits are read until one holds an exact match, the listing ends, or
  /// [`MAX_AUTHOR_PAGES`] is reached. Commits come newest first, so the first
  /// page with a match holds the latest one.
  async fn list_commits_by_author<'a>(
    &'a self,
    project_id: u64,
    author: AuthorFilter<'a>,
    limit: u32,
  ) -> Result<Vec<Commit>> {
    let path = format!("/projects/{project_id}/repository/commits");
    let per_page = limit.clamp(1, 100);

    for page in 1..=MAX_AUTHOR_PAGES {
      let commits: Vec<Commit> = self
        .get_json(
          &path,
          &[
            ("author", author.value().to_owned()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
          ],
        )
        .await?;
      let short = commits.len() < per_page as usize;
      let matched: Vec<Commit> = commits.into_iter().filter(|c| author.matches(c)).collect();
      if !matched.is_empty() || short {
        return Ok(matched);
      }
    }

    debug!(
      project_id,
      author = author.value(),
      pages = MAX_AUTHOR_PAGES,
      "no exact author match in fuzzy commit search"
    );
    Ok(Vec::new())
  }

  /// `GET /users/:id`
  async fn get_user(&self, user_id: u64) -> Result<User> {
    self.get_json(&format!("/users/{user_id}"), &[]).await
  }

  /// `GET /users?search=<term>`, first page only.
  async fn search_users<'a>(&'a self, term: &'a str) -> Result<Vec<User>> {
    self
      .get_json(
        "/users",
        &[
          ("search", term.to_owned()),
          ("per_page", self.per_page().to_string()),
        ],
      )
      .await
  }
}
