//! Resolving aggregated contributors to group members.
//!
//! Email is always tried before the display name. An unmatched contributor is
//! labelled `not_found` whatever the keying strategy; `unknown` is reserved
//! for a matched member whose account state could not be read.

use tracing::{debug, warn};

use crate::{
  aggregate::Records,
  membership::MembershipIndex,
  model::{Member, User},
  platform::Platform,
  record::{ContributorRecord, MembershipStatus},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
  /// Fall back to a platform-wide user search by email for contributors the
  /// membership index does not know.
  pub search_users: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
  pub by_email:        u64,
  pub by_name:         u64,
  pub by_user_search:  u64,
  pub unmatched:       u64,
  /// State or user-search lookups that failed and were ignored.
  pub lookup_failures: u64,
}

/// Assign `membership_id` and `membership_status` to every record.
pub async fn match_identities<P: Platform>(
  platform: &P,
  index:    &MembershipIndex,
  records:  &mut Records,
  options:  MatchOptions,
) -> MatchStats {
  let mut stats = MatchStats::default();
  for record in records.values_mut() {
    match_one(platform, index, record, options, &mut stats).await;
  }
  stats
}

async fn match_one<P: Platform>(
  platform: &P,
  index:    &MembershipIndex,
  record:   &mut ContributorRecord,
  options:  MatchOptions,
  stats:    &mut MatchStats,
) {
  let by_email = record.email.as_deref().and_then(|e| index.by_email(e));
  let member = match by_email {
    Some(m) => {
      stats.by_email += 1;
      Some(m)
    }
    None => {
      let by_name = index.by_name(&record.display_name);
      if by_name.is_some() {
        stats.by_name += 1;
      }
      by_name
    }
  };

  if let Some(member) = member {
    let status = member_status(platform, member, stats).await;
    debug!(key = %record.key, member = member.id, %status, "matched member");
    record.set_membership(Some(member.id), status);
    return;
  }

  if options.search_users
    && let Some(email) = record.email.as_deref()
    && let Some(user) = search_user(platform, email, stats).await
  {
    stats.by_user_search += 1;
    let status = user.state.map_or(MembershipStatus::Unknown, MembershipStatus::Member);
    record.set_membership(Some(user.id), status);
    return;
  }

  stats.unmatched += 1;
  record.set_membership(None, MembershipStatus::NotFound);
}

/// The member's account state, fetching the user record when the member
/// listing did not carry one.
async fn member_status<P: Platform>(
  platform: &P,
  member:   &Member,
  stats:    &mut MatchStats,
) -> MembershipStatus {
  if let Some(state) = &member.state {
    return MembershipStatus::Member(state.clone());
  }
  match platform.get_user(member.id).await {
    Ok(user) => user.state.map_or(MembershipStatus::Unknown, MembershipStatus::Member),
    Err(e) => {
      warn!(user = member.id, error = %e, "user lookup failed; status unknown");
      stats.lookup_failures += 1;
      MembershipStatus::Unknown
    }
  }
}

/// Search users by `email`, preferring an exact address match over the
/// first fuzzy hit.
async fn search_user<P: Platform>(
  platform: &P,
  email:    &str,
  stats:    &mut MatchStats,
) -> Option<User> {
  let users = match platform.search_users(email).await {
    Ok(users) => users,
    Err(e) => {
      warn!(%email, error = %e, "user search failed");
      stats.lookup_failures += 1;
      return None;
    }
  };
  let exact = users
    .iter()
    .position(|u| u.emails().any(|e| e.eq_ignore_ascii_case(email)));
  users.into_iter().nth(exact.unwrap_or(0))
}
