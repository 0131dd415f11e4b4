// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces to the collaborators of the access engine.
mod identity;
mod lookup;
mod store;

pub use identity::IdentityHandle;
pub use lookup::MembershipLookup;
pub use store::{RosterStore, SessionStore};
