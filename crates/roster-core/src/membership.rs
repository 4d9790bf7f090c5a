//! Lookup tables over the group's members.

use std::collections::HashMap;

use crate::{model::Member, record::normalize};

/// Members indexed by normalised email and by normalised display name.
///
/// Duplicate keys are last-write-wins: when two members share an email or a
/// name, the one listed later by the platform is returned.
#[derive(Debug, Default)]
pub struct MembershipIndex {
  members:  Vec<Member>,
  by_email: HashMap<String, usize>,
  by_name:  HashMap<String, usize>,
}

impl MembershipIndex {
  pub fn build(members: impl IntoIterator<Item = Member>) -> Self {
    let mut index = Self::default();
    for member in members {
      let slot = index.members.len();
      for email in member.emails() {
        index.by_email.insert(normalize(email), slot);
      }
      let name = normalize(&member.name);
      if !name.is_empty() {
        index.by_name.insert(name, slot);
      }
      index.members.push(member);
    }
    index
  }

  pub fn by_email(&self, email: &str) -> Option<&Member> {
    self.by_email.get(&normalize(email)).map(|&i| &self.members[i])
  }

  pub fn by_name(&self, name: &str) -> Option<&Member> {
    self.by_name.get(&normalize(name)).map(|&i| &self.members[i])
  }

  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }
}
