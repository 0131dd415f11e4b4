// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::role::{Circle, CircleSession, Role};

/// An actor's relationship to a single circle or circle session.
///
/// Memberships are looked up fresh for every decision and discarded afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Membership<K> {
    /// Actor is on the roster, holding the given role.
    Member { role: Role<K> },

    /// Actor is not on the roster.
    NotAMember,
}

/// Membership of an actor in a circle.
pub type CircleMembership = Membership<Circle>;

/// Participation of an actor in a circle session.
pub type CircleSessionMembership = Membership<CircleSession>;

impl<K> Membership<K> {
    pub const fn member(role: Role<K>) -> Self {
        Membership::Member { role }
    }

    /// The held role, `None` for non-members.
    pub const fn role(&self) -> Option<Role<K>> {
        match self {
            Membership::Member { role } => Some(*role),
            Membership::NotAMember => None,
        }
    }

    /// Actor is on the roster, regardless of role.
    pub const fn is_member(&self) -> bool {
        matches!(self, Membership::Member { .. })
    }

    /// Actor is on the roster and holds the Owner role.
    pub const fn is_owner(&self) -> bool {
        match self {
            Membership::Member { role } => role.is_owner(),
            Membership::NotAMember => false,
        }
    }

    /// Actor is on the roster and holds the Owner or Manager role.
    pub const fn is_owner_or_manager(&self) -> bool {
        match self {
            Membership::Member { role } => role.is_owner_or_manager(),
            Membership::NotAMember => false,
        }
    }
}

impl<K> Default for Membership<K> {
    fn default() -> Self {
        Membership::NotAMember
    }
}

impl<K> From<Option<Role<K>>> for Membership<K> {
    fn from(role: Option<Role<K>>) -> Self {
        match role {
            Some(role) => Membership::Member { role },
            None => Membership::NotAMember,
        }
    }
}

impl<K> From<Role<K>> for Membership<K> {
    fn from(role: Role<K>) -> Self {
        Membership::Member { role }
    }
}
