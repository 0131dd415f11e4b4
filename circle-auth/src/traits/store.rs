// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::AccessError;
use crate::role::{CircleSession, RosterKind};
use crate::roster::{Roster, RosterChange};
use crate::traits::{IdentityHandle, MembershipLookup};

/// Interface for reading and atomically updating the roster of a circle (`K = Circle`) or a
/// circle session (`K = CircleSession`).
pub trait RosterStore<K: RosterKind>: MembershipLookup {
    type CollectionId: IdentityHandle;

    /// Current roster of the collection. Unknown collections have an empty roster.
    fn roster(
        &self,
        collection: &Self::CollectionId,
    ) -> impl Future<Output = Result<Roster<Self::UserId, K>, Self::Error>> + Send;

    /// Compute a new roster from the current one and persist it.
    ///
    /// Reading the current roster, running `f` and writing its result must happen as one
    /// indivisible step: no other update of the same collection may interleave. When `f` fails
    /// the stored roster stays exactly as it was and the error is returned. `f` may reject the
    /// update for any reason, not only broken ownership rules.
    ///
    /// Returns the changes which were persisted.
    fn update<F>(
        &self,
        collection: &Self::CollectionId,
        f: F,
    ) -> impl Future<
        Output = Result<
            Vec<RosterChange<Self::UserId, K>>,
            AccessError<Self::UserId, Self::Error>,
        >,
    > + Send
    where
        F: FnOnce(
                &Roster<Self::UserId, K>,
            ) -> Result<Roster<Self::UserId, K>, AccessError<Self::UserId, Self::Error>>
            + Send;
}

/// Interface for creating circle sessions and linking them to their circle.
pub trait SessionStore: RosterStore<CircleSession> {
    /// Link the session to its circle and compute its roster from the current one, as one atomic
    /// step like [`RosterStore::update`].
    ///
    /// Fails with [`AccessError::ForeignSession`] without touching anything if the session is
    /// already linked to a different circle.
    fn create_session<F>(
        &self,
        session: &Self::CollectionId,
        circle: &Self::CircleId,
        f: F,
    ) -> impl Future<
        Output = Result<
            Vec<RosterChange<Self::UserId, CircleSession>>,
            AccessError<Self::UserId, Self::Error>,
        >,
    > + Send
    where
        F: FnOnce(
                &Roster<Self::UserId, CircleSession>,
            ) -> Result<Roster<Self::UserId, CircleSession>, AccessError<Self::UserId, Self::Error>>
            + Send;
}
