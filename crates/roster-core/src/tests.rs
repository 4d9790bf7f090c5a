//! Census scenarios against an in-memory platform.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use chrono::{DateTime, TimeZone, Utc};

use crate::{
  Error,
  census::{CensusConfig, run},
  model::{AccountState, Commit, Contributor, Group, Member, Project, User},
  platform::{AuthorFilter, Platform},
  record::{KeyStrategy, MembershipStatus},
};

// ─── Fake platform ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake platform: {0}")]
struct FakeError(String);

#[derive(Default)]
struct FakePlatform {
  groups:            Vec<Group>,
  projects:          Vec<Project>,
  members:           Vec<Member>,
  users:             HashMap<u64, User>,
  contributors:      HashMap<u64, Vec<Contributor>>,
  commits:           HashMap<u64, Vec<Commit>>,
  failing_history:   HashSet<(u64, String)>,
  failing_projects:  HashSet<u64>,
  searchable_users:  Vec<User>,
  history_calls:     Mutex<Vec<(u64, String)>>,
}

impl Platform for FakePlatform {
  type Error = FakeError;

  async fn search_groups<'a>(&'a self, _term: &'a str) -> Result<Vec<Group>, FakeError> {
    Ok(self.groups.clone())
  }

  async fn list_group_projects(
    &self,
    _group_id: u64,
    _include_subgroups: bool,
  ) -> Result<Vec<Project>, FakeError> {
    Ok(self.projects.clone())
  }

  async fn list_group_members(
    &self,
    _group_id: u64,
    _inherited: bool,
  ) -> Result<Vec<Member>, FakeError> {
    Ok(self.members.clone())
  }

  async fn list_contributors(&self, project_id: u64) -> Result<Vec<Contributor>, FakeError> {
    if self.failing_projects.contains(&project_id) {
      return Err(FakeError(format!("contributors of {project_id}")));
    }
    Ok(self.contributors.get(&project_id).cloned().unwrap_or_default())
  }

  async fn list_commits_by_author<'a>(
    &'a self,
    project_id: u64,
    author: AuthorFilter<'a>,
    limit: u32,
  ) -> Result<Vec<Commit>, FakeError> {
    let identity = author.value().to_owned();
    self
      .history_calls
      .lock()
      .unwrap()
      .push((project_id, identity.clone()));
    if self.failing_history.contains(&(project_id, identity.clone())) {
      return Err(FakeError(format!("commits of {identity}")));
    }
    Ok(
      self
        .commits
        .get(&project_id)
        .map(|all| {
          all
            .iter()
            .filter(|c| author.matches(c))
            .take(limit as usize)
            .cloned()
            .collect()
        })
        .unwrap_or_default(),
    )
  }

  async fn get_user(&self, user_id: u64) -> Result<User, FakeError> {
    self
      .users
      .get(&user_id)
      .cloned()
      .ok_or_else(|| FakeError(format!("user {user_id}")))
  }

  async fn search_users<'a>(&'a self, _term: &'a str) -> Result<Vec<User>, FakeError> {
    Ok(self.searchable_users.clone())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn acme() -> FakePlatform {
  FakePlatform {
    groups: vec![
      group(9, "Acme Labs", "acme-labs"),
      group(10, "Acme", "acme"),
    ],
    projects: vec![
      project(1, "core"),
      project(2, "tools"),
      project(3, "web"),
    ],
    ..FakePlatform::default()
  }
}

fn group(id: u64, name: &str, path: &str) -> Group {
  Group {
    id,
    name: name.into(),
    path: path.into(),
    full_path: path.into(),
  }
}

fn project(id: u64, path: &str) -> Project {
  Project {
    id,
    name: path.to_uppercase(),
    path: path.into(),
    path_with_namespace: format!("acme/{path}"),
  }
}

fn contributor(name: &str, email: Option<&str>, commits: u64) -> Contributor {
  Contributor {
    name: Some(name.into()),
    email: email.map(Into::into),
    commits,
  }
}

fn commit(email: &str, name: &str, at: DateTime<Utc>) -> Commit {
  Commit {
    id:           format!("{email}-{}", at.timestamp()),
    author_name:  Some(name.into()),
    author_email: Some(email.into()),
    created_at:   Some(at),
  }
}

fn member(id: u64, name: &str, email: Option<&str>, state: Option<AccountState>) -> Member {
  Member {
    id,
    username: name.to_lowercase().replace(' ', "."),
    name: name.into(),
    state,
    email: email.map(Into::into),
    public_email: None,
  }
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn config(repos: &[&str]) -> CensusConfig {
  CensusConfig {
    group:             "acme".into(),
    repositories:      repos.iter().map(|r| r.to_string()).collect(),
    include_subgroups: false,
    inherited_members: false,
    key_strategy:      KeyStrategy::Email,
    search_users:      false,
    commit_page_size:  100,
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_requested_projects_are_processed() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 5)]);
  p.contributors.insert(2, vec![contributor("Bob", Some("b@x.com"), 2)]);
  p.contributors.insert(3, vec![contributor("Web Dev", Some("w@x.com"), 9)]);

  let census = run(&p, &config(&["core", "tools"])).await.unwrap();

  assert_eq!(census.group.id, 10);
  assert_eq!(census.repository_paths(), vec!["core", "tools"]);
  let keys: Vec<&str> = census.records.iter().map(|r| r.key.as_str()).collect();
  assert_eq!(keys, vec!["a@x.com", "b@x.com"]);
  assert!(census.records.iter().all(|r| r.commits_in("web") == 0));
}

#[tokio::test]
async fn unknown_group_aborts_the_run() {
  let p = acme();
  let mut cfg = config(&["core"]);
  cfg.group = "acme-org".into();

  let err = run(&p, &cfg).await.unwrap_err();
  assert!(matches!(err, Error::GroupNotFound(ref name) if name == "acme-org"));
}

#[tokio::test]
async fn group_match_ignores_case_on_name_or_path() {
  let p = acme();
  let mut cfg = config(&["core"]);
  cfg.group = "ACME LABS".into();
  assert_eq!(run(&p, &cfg).await.unwrap().group.id, 9);
}

#[tokio::test]
async fn no_matching_repositories_aborts_the_run() {
  let p = acme();
  let err = run(&p, &config(&["mobile", "infra"])).await.unwrap_err();
  match err {
    Error::NoMatchingRepositories { group, requested } => {
      assert_eq!(group, "Acme");
      assert_eq!(requested, vec!["mobile", "infra"]);
    }
    other => panic!("unexpected error: {other}"),
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn contributions_merge_across_repositories() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 5)]);
  p.contributors.insert(2, vec![contributor("alice", Some("A@X.com"), 3)]);

  let census = run(&p, &config(&["core", "tools"])).await.unwrap();

  assert_eq!(census.records.len(), 1);
  let alice = &census.records[0];
  assert_eq!(alice.total_commits(), 8);
  assert_eq!(
    alice.per_repository_commits().collect::<Vec<_>>(),
    vec![("core", 5), ("tools", 3)]
  );
  assert_eq!(alice.display_name, "Alice");
  assert_eq!(alice.email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn subgroup_projects_with_one_path_share_a_column() {
  let mut p = acme();
  p.projects.push(Project {
    id:                  7,
    name:                "Core".into(),
    path:                "core".into(),
    path_with_namespace: "acme/legacy/core".into(),
  });
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 5)]);
  p.contributors.insert(7, vec![contributor("Alice", Some("a@x.com"), 3)]);
  let mut cfg = config(&["core"]);
  cfg.include_subgroups = true;

  let census = run(&p, &cfg).await.unwrap();

  assert_eq!(census.projects.len(), 2);
  let paths = census.repository_paths();
  assert_eq!(paths, vec!["core"]);
  let alice = &census.records[0];
  assert_eq!(alice.total_commits(), 8);
  let per_column: u64 = paths.iter().map(|r| alice.commits_in(r)).sum();
  assert_eq!(per_column, alice.total_commits());
}

#[tokio::test]
async fn repeated_entries_in_one_project_accumulate() {
  let mut p = acme();
  p.contributors.insert(
    1,
    vec![
      contributor("Alice", Some("a@x.com"), 5),
      contributor("Alice (laptop)", Some("a@x.com"), 2),
    ],
  );

  let census = run(&p, &config(&["core"])).await.unwrap();
  assert_eq!(census.records[0].commits_in("core"), 7);
  assert_eq!(census.records[0].total_commits(), 7);
}

#[tokio::test]
async fn entries_without_email_are_skipped_under_email_keying() {
  let mut p = acme();
  p.contributors.insert(
    1,
    vec![
      contributor("Ghost", None, 4),
      contributor("Blank", Some(""), 1),
      contributor("Alice", Some("a@x.com"), 5),
    ],
  );

  let census = run(&p, &config(&["core"])).await.unwrap();

  assert_eq!(census.records.len(), 1);
  assert_eq!(census.aggregate.entries_seen, 3);
  assert_eq!(census.aggregate.entries_skipped, 2);
  assert_eq!(census.aggregate.commits_skipped, 5);
  // No history lookup is made for a skipped entry.
  assert_eq!(p.history_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn name_keying_merges_by_display_name() {
  let mut p = acme();
  p.contributors.insert(
    1,
    vec![
      contributor("Alice", Some("a@home.com"), 2),
      contributor("Ghost", None, 4),
    ],
  );
  p.contributors.insert(2, vec![contributor("ALICE", Some("a@work.com"), 1)]);
  let mut cfg = config(&["core", "tools"]);
  cfg.key_strategy = KeyStrategy::Name;

  let census = run(&p, &cfg).await.unwrap();

  let keys: Vec<&str> = census.records.iter().map(|r| r.key.as_str()).collect();
  assert_eq!(keys, vec!["alice", "ghost"]);
  assert_eq!(census.records[0].total_commits(), 3);
  assert_eq!(census.records[0].email.as_deref(), Some("a@home.com"));
  let calls = p.history_calls.lock().unwrap();
  assert!(calls.contains(&(2, "ALICE".to_owned())));
}

#[tokio::test]
async fn last_activity_is_the_latest_commit_across_repositories() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 2)]);
  p.contributors.insert(2, vec![contributor("Alice", Some("a@x.com"), 1)]);
  p.contributors.insert(3, vec![contributor("Alice", Some("a@x.com"), 1)]);
  p.commits.insert(
    1,
    vec![
      commit("a@x.com", "Alice", day(2024, 3, 1)),
      commit("a@x.com", "Alice", day(2024, 5, 9)),
      commit("b@x.com", "Bob", day(2025, 1, 1)),
    ],
  );
  p.commits.insert(2, vec![commit("a@x.com", "Alice", day(2023, 12, 31))]);
  p.commits.insert(3, vec![commit("a@x.com", "Alice", day(2024, 2, 2))]);

  let census = run(&p, &config(&["core", "tools", "web"])).await.unwrap();
  assert_eq!(census.records[0].last_activity_at(), Some(day(2024, 5, 9)));
}

#[tokio::test]
async fn last_activity_is_absent_without_commit_history() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 2)]);

  let census = run(&p, &config(&["core"])).await.unwrap();
  assert_eq!(census.records[0].last_activity_at(), None);
}

#[tokio::test]
async fn failed_history_lookup_keeps_earlier_activity() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 2)]);
  p.contributors.insert(2, vec![contributor("Alice", Some("a@x.com"), 1)]);
  p.commits.insert(1, vec![commit("a@x.com", "Alice", day(2024, 1, 1))]);
  p.commits.insert(2, vec![commit("a@x.com", "Alice", day(2025, 1, 1))]);
  p.failing_history.insert((2, "a@x.com".into()));

  let census = run(&p, &config(&["core", "tools"])).await.unwrap();

  let alice = &census.records[0];
  assert_eq!(alice.last_activity_at(), Some(day(2024, 1, 1)));
  assert_eq!(alice.total_commits(), 3);
  assert_eq!(census.aggregate.history_failures, 1);
}

#[tokio::test]
async fn failed_contributor_listing_aborts_the_run() {
  let mut p = acme();
  p.failing_projects.insert(2);
  let err = run(&p, &config(&["core", "tools"])).await.unwrap_err();
  assert!(matches!(err, Error::Platform(_)));
}

// ─── Matching ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn name_fallback_supplies_status_when_email_is_unknown() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice Liddell", Some("alice@personal.com"), 5)]);
  p.members = vec![member(
    42,
    "alice liddell",
    Some("alice@acme.com"),
    Some(AccountState::Blocked),
  )];

  let census = run(&p, &config(&["core"])).await.unwrap();

  let alice = &census.records[0];
  assert_eq!(alice.membership_id, Some(42));
  assert_eq!(alice.membership_status, MembershipStatus::Member(AccountState::Blocked));
  assert_eq!(census.matching.by_name, 1);
}

#[tokio::test]
async fn email_match_wins_over_name_match() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Alice", Some("a@x.com"), 5)]);
  p.members = vec![
    member(1, "Someone Else", Some("A@X.COM"), Some(AccountState::Active)),
    member(2, "Alice", None, Some(AccountState::Blocked)),
  ];

  let census = run(&p, &config(&["core"])).await.unwrap();

  assert_eq!(census.records[0].membership_id, Some(1));
  assert_eq!(census.matching.by_email, 1);
  assert_eq!(census.matching.by_name, 0);
}

#[tokio::test]
async fn unmatched_contributors_are_not_found() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Stranger", Some("s@else.com"), 1)]);
  p.members = vec![member(1, "Alice", Some("a@x.com"), Some(AccountState::Active))];

  let census = run(&p, &config(&["core"])).await.unwrap();

  let stranger = &census.records[0];
  assert_eq!(stranger.membership_id, None);
  assert_eq!(stranger.membership_status, MembershipStatus::NotFound);
  assert_eq!(census.matching.unmatched, 1);
}

#[tokio::test]
async fn missing_member_state_is_read_from_the_user_record() {
  let mut p = acme();
  p.contributors.insert(
    1,
    vec![
      contributor("Alice", Some("a@x.com"), 1),
      contributor("Bob", Some("b@x.com"), 1),
    ],
  );
  p.members = vec![
    member(1, "Alice", Some("a@x.com"), None),
    member(2, "Bob", Some("b@x.com"), None),
  ];
  p.users.insert(1, member(1, "Alice", None, Some(AccountState::Deactivated)));

  let census = run(&p, &config(&["core"])).await.unwrap();

  assert_eq!(
    census.records[0].membership_status,
    MembershipStatus::Member(AccountState::Deactivated)
  );
  // The lookup for Bob fails: still matched, but the state is unknown.
  assert_eq!(census.records[1].membership_id, Some(2));
  assert_eq!(census.records[1].membership_status, MembershipStatus::Unknown);
  assert_eq!(census.matching.lookup_failures, 1);
}

#[tokio::test]
async fn user_search_prefers_exact_email() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Dana", Some("dana@x.com"), 1)]);
  p.searchable_users = vec![
    member(5, "Danae", Some("danae@x.com"), Some(AccountState::Active)),
    member(6, "Dana", Some("Dana@x.com"), Some(AccountState::Banned)),
  ];
  let mut cfg = config(&["core"]);
  cfg.search_users = true;

  let census = run(&p, &cfg).await.unwrap();

  assert_eq!(census.records[0].membership_id, Some(6));
  assert_eq!(census.records[0].membership_status, MembershipStatus::Member(AccountState::Banned));
  assert_eq!(census.matching.by_user_search, 1);
}

#[tokio::test]
async fn user_search_is_off_by_default() {
  let mut p = acme();
  p.contributors.insert(1, vec![contributor("Dana", Some("dana@x.com"), 1)]);
  p.searchable_users = vec![member(6, "Dana", Some("dana@x.com"), Some(AccountState::Active))];

  let census = run(&p, &config(&["core"])).await.unwrap();
  assert_eq!(census.records[0].membership_status, MembershipStatus::NotFound);
}
