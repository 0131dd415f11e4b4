// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorization for study circles and their sessions.
//!
//! Users form circles, circles hold sessions and sessions record matches. Both circles and
//! circle sessions keep their own roster in which every member holds one role out of `Owner`,
//! `Manager` and `Member`. Roles of the two rosters are separate types and never mix.
//!
//! The crate is split into pure and effectful parts:
//!
//! - [`policy`] decides from memberships alone whether an action is allowed
//! - [`ownership`] keeps every roster at exactly one Owner and implements ownership transfer
//! - [`AccessService`] looks up the memberships a decision needs and applies the policy
//! - [`RosterManager`] gates roster mutations and runs them atomically against a [`RosterStore`]
//!
//! Storage is left to the caller through the [`MembershipLookup`] and [`RosterStore`] traits, an
//! in-memory implementation is available as [`MemoryStore`].
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use circle_auth::{CircleRole, Config, MemoryStore, RosterManager};
//!
//! let store = MemoryStore::<char, u32, u32>::new();
//! store.register_user('A').await;
//! store.register_user('B').await;
//!
//! let manager = RosterManager::new(store, Config::default());
//! manager.create_circle(&'A', &1).await.unwrap();
//! manager
//!     .add_circle_member(&'A', &1, &'B', CircleRole::member())
//!     .await
//!     .unwrap();
//!
//! assert!(manager.access().can_view_circle(&'B', &1).await.unwrap());
//! assert!(!manager.access().can_edit_circle(&'B', &1).await.unwrap());
//! # }
//! ```
mod access;
mod config;
mod error;
mod manager;
mod memory;
mod membership;
pub mod ownership;
pub mod policy;
mod role;
mod roster;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;

pub use access::{AccessService, ensure};
pub use config::Config;
pub use error::{AccessError, ErrorKind};
pub use manager::{CircleChanges, CircleSessionChanges, ManagerError, RosterManager};
pub use memory::{MemoryStore, MemoryStoreInner};
pub use membership::{CircleMembership, CircleSessionMembership, Membership};
pub use ownership::OwnershipError;
pub use policy::Action;
pub use role::{
    Circle, CircleRole, CircleSession, CircleSessionRole, Role, RoleLevel, RosterKind,
};
pub use roster::{CircleRoster, CircleSessionRoster, Roster, RosterChange};
pub use traits::{IdentityHandle, MembershipLookup, RosterStore, SessionStore};
