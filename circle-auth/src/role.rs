// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role hierarchy for circle and circle session rosters.
//!
//! Both collections use the same three-level ladder:
//!
//! ```text
//! Member < Manager < Owner
//! ```
//!
//! A role is always tagged with the kind of collection it was granted in, see [`RosterKind`]. A
//! [`CircleRole`] and a [`CircleSessionRole`] are distinct types, comparing one to the other does
//! not compile.
use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod sealed {
    pub trait Sealed {}
}

/// Kind of collection a roster (and every role granted in it) belongs to.
///
/// This trait is sealed, the only kinds are [`Circle`] and [`CircleSession`].
pub trait RosterKind:
    sealed::Sealed + Copy + Debug + Default + Eq + Hash + Send + Sync + 'static
{
    /// Name of the collection kind, used in logs.
    const NAME: &'static str;
}

/// Marker for roles and rosters of a circle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Circle;

impl sealed::Sealed for Circle {}

impl RosterKind for Circle {
    const NAME: &'static str = "circle";
}

/// Marker for roles and rosters of a circle session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CircleSession;

impl sealed::Sealed for CircleSession {}

impl RosterKind for CircleSession {
    const NAME: &'static str = "circle session";
}

/// The three role levels, independent of the collection kind.
///
/// Greater levels are assumed to contain all lower ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RoleLevel {
    /// Regular member or participant.
    Member,

    /// Permission to edit the collection and manage its roster.
    Manager,

    /// Sole holder of full authority over the collection.
    Owner,
}

impl RoleLevel {
    /// All levels, highest first.
    pub const ALL: [RoleLevel; 3] = [RoleLevel::Owner, RoleLevel::Manager, RoleLevel::Member];

    /// Numeric rank of this level. Only the order of the values is meaningful.
    pub const fn rank(&self) -> u8 {
        match self {
            RoleLevel::Owner => 3,
            RoleLevel::Manager => 2,
            RoleLevel::Member => 1,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RoleLevel::Owner => "owner",
            RoleLevel::Manager => "manager",
            RoleLevel::Member => "member",
        }
    }
}

impl Display for RoleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role held in a collection of kind `K`.
pub struct Role<K> {
    level: RoleLevel,
    _kind: PhantomData<K>,
}

/// Role held in a circle roster.
pub type CircleRole = Role<Circle>;

/// Role held in a circle session roster.
pub type CircleSessionRole = Role<CircleSession>;

impl<K> Role<K> {
    pub const fn new(level: RoleLevel) -> Self {
        Self {
            level,
            _kind: PhantomData,
        }
    }

    /// Owner role.
    pub const fn owner() -> Self {
        Self::new(RoleLevel::Owner)
    }

    /// Manager role.
    pub const fn manager() -> Self {
        Self::new(RoleLevel::Manager)
    }

    /// Member role.
    pub const fn member() -> Self {
        Self::new(RoleLevel::Member)
    }

    pub const fn level(&self) -> RoleLevel {
        self.level
    }

    pub const fn rank(&self) -> u8 {
        self.level.rank()
    }

    /// Role is Owner.
    pub const fn is_owner(&self) -> bool {
        matches!(self.level, RoleLevel::Owner)
    }

    /// Role is Manager.
    pub const fn is_manager(&self) -> bool {
        matches!(self.level, RoleLevel::Manager)
    }

    /// Role is Owner or Manager.
    pub const fn is_owner_or_manager(&self) -> bool {
        self.is_owner() || self.is_manager()
    }

    /// Returns true if this role ranks equal to or above `other`.
    pub const fn is_same_or_higher(&self, other: &Self) -> bool {
        self.rank() >= other.rank()
    }

    /// All roles of this kind, highest first.
    pub fn all() -> [Self; 3] {
        RoleLevel::ALL.map(Self::new)
    }
}

// No bounds on `K`, derives would add them.

impl<K> Clone for Role<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Role<K> {}

impl<K> PartialEq for Role<K> {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level
    }
}

impl<K> Eq for Role<K> {}

impl<K> Hash for Role<K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.level.hash(state);
    }
}

impl<K> PartialOrd for Role<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Role<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl<K> Debug for Role<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Role").field(&self.level).finish()
    }
}

impl<K> Display for Role<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level)
    }
}

impl<K> From<RoleLevel> for Role<K> {
    fn from(level: RoleLevel) -> Self {
        Self::new(level)
    }
}

impl<K> From<Role<K>> for RoleLevel {
    fn from(role: Role<K>) -> Self {
        role.level
    }
}

#[cfg(feature = "serde")]
impl<K> Serialize for Role<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.level.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, K> Deserialize<'de> for Role<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RoleLevel::deserialize(deserializer).map(Role::new)
    }
}
