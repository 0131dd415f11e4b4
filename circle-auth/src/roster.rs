// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster of a single circle or circle session.
use std::collections::BTreeMap;
#[cfg(feature = "serde")]
use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::membership::Membership;
use crate::ownership::OwnershipError;
use crate::role::{Circle, CircleSession, Role};

/// All members of one collection with the role each of them holds.
///
/// Members are unique by their identifier. A valid roster holds exactly one Owner, this is not
/// enforced by the type itself but checked at the boundary of every mutation, see
/// [`ownership`](crate::ownership).
///
/// The serialized form is a list of `(member, role)` pairs. Deserializing goes through
/// [`Roster::from_members`] and rejects duplicate members.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(
        try_from = "Vec<(ID, Role<K>)>",
        into = "Vec<(ID, Role<K>)>",
        bound(
            serialize = "ID: Serialize + Clone, K: Clone",
            deserialize = "ID: Deserialize<'de> + Clone + Ord + Display"
        )
    )
)]
pub struct Roster<ID, K> {
    members: BTreeMap<ID, Role<K>>,
}

/// Roster of a circle.
pub type CircleRoster<ID> = Roster<ID, Circle>;

/// Roster of a circle session.
pub type CircleSessionRoster<ID> = Roster<ID, CircleSession>;

impl<ID, K> Roster<ID, K>
where
    ID: Clone + Ord,
{
    /// Empty roster.
    pub fn new() -> Self {
        Self {
            members: BTreeMap::new(),
        }
    }

    /// Build a roster from `(member, role)` entries.
    ///
    /// Fails if a member appears more than once.
    pub fn from_members(
        members: impl IntoIterator<Item = (ID, Role<K>)>,
    ) -> Result<Self, OwnershipError<ID>> {
        let mut roster = Self::new();
        for (member, role) in members {
            if roster.members.contains_key(&member) {
                return Err(OwnershipError::DuplicateMember(member));
            }
            roster.members.insert(member, role);
        }
        Ok(roster)
    }

    /// Role held by the given member.
    pub fn role(&self, member: &ID) -> Option<Role<K>> {
        self.members.get(member).copied()
    }

    /// Membership of the given actor.
    pub fn membership(&self, actor: &ID) -> Membership<K> {
        self.role(actor).into()
    }

    pub fn contains(&self, member: &ID) -> bool {
        self.members.contains_key(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over all members and their roles, ordered by member.
    pub fn iter(&self) -> impl Iterator<Item = (&ID, &Role<K>)> {
        self.members.iter()
    }

    /// All members, ordered by identifier.
    pub fn members(&self) -> Vec<ID> {
        self.members.keys().cloned().collect()
    }

    /// All members holding the Owner role.
    pub fn owners(&self) -> Vec<ID> {
        self.members
            .iter()
            .filter_map(|(id, role)| {
                if role.is_owner() {
                    Some(id.to_owned())
                } else {
                    None
                }
            })
            .collect()
    }

    /// The Owner of this roster, `None` unless there is exactly one.
    pub fn owner(&self) -> Option<&ID> {
        let mut owners = self
            .members
            .iter()
            .filter(|(_, role)| role.is_owner())
            .map(|(id, _)| id);

        match (owners.next(), owners.next()) {
            (Some(owner), None) => Some(owner),
            _ => None,
        }
    }

    pub(crate) fn owner_count(&self) -> usize {
        self.members.values().filter(|role| role.is_owner()).count()
    }

    pub(crate) fn insert(&mut self, member: ID, role: Role<K>) {
        self.members.insert(member, role);
    }

    pub(crate) fn remove(&mut self, member: &ID) -> Option<Role<K>> {
        self.members.remove(member)
    }

    /// Changes required to turn this roster into `next`, ordered by member.
    pub fn diff(&self, next: &Self) -> Vec<RosterChange<ID, K>> {
        let mut changes = Vec::new();

        for (member, role) in &self.members {
            match next.members.get(member) {
                None => changes.push(RosterChange::Removed {
                    member: member.clone(),
                    role: *role,
                }),
                Some(next_role) if next_role != role => changes.push(RosterChange::RoleChanged {
                    member: member.clone(),
                    from: *role,
                    to: *next_role,
                }),
                Some(_) => (),
            }
        }

        for (member, role) in &next.members {
            if !self.members.contains_key(member) {
                changes.push(RosterChange::Added {
                    member: member.clone(),
                    role: *role,
                });
            }
        }

        changes.sort_by(|a, b| a.member().cmp(b.member()));
        changes
    }
}

impl<ID, K> Default for Roster<ID, K>
where
    ID: Clone + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A single change between two roster states, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RosterChange<ID, K> {
    Added { member: ID, role: Role<K> },
    Removed { member: ID, role: Role<K> },
    RoleChanged { member: ID, from: Role<K>, to: Role<K> },
}

impl<ID, K> RosterChange<ID, K> {
    /// The member this change applies to.
    pub fn member(&self) -> &ID {
        match self {
            RosterChange::Added { member, .. } => member,
            RosterChange::Removed { member, .. } => member,
            RosterChange::RoleChanged { member, .. } => member,
        }
    }
}

impl<ID, K> TryFrom<Vec<(ID, Role<K>)>> for Roster<ID, K>
where
    ID: Clone + Ord,
{
    type Error = OwnershipError<ID>;

    fn try_from(members: Vec<(ID, Role<K>)>) -> Result<Self, Self::Error> {
        Self::from_members(members)
    }
}

impl<ID, K> From<Roster<ID, K>> for Vec<(ID, Role<K>)> {
    fn from(roster: Roster<ID, K>) -> Self {
        roster.members.into_iter().collect()
    }
}
