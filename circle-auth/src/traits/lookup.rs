// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use crate::membership::{CircleMembership, CircleSessionMembership};
use crate::traits::IdentityHandle;

/// Interface for looking up users and their memberships.
///
/// Every call must reflect the current state of the roster, implementations should not cache
/// memberships across requests.
pub trait MembershipLookup {
    type UserId: IdentityHandle;
    type CircleId: IdentityHandle;
    type SessionId: IdentityHandle;
    type Error: Error + Send + Sync + 'static;

    /// Return `true` if the given user is registered.
    fn is_registered_user(
        &self,
        user: &Self::UserId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Membership of the given user in a circle.
    fn circle_membership(
        &self,
        user: &Self::UserId,
        circle: &Self::CircleId,
    ) -> impl Future<Output = Result<CircleMembership, Self::Error>> + Send;

    /// Circle the given session belongs to, `None` for unknown sessions.
    fn session_circle(
        &self,
        session: &Self::SessionId,
    ) -> impl Future<Output = Result<Option<Self::CircleId>, Self::Error>> + Send;

    /// Participation of the given user in a circle session.
    fn circle_session_membership(
        &self,
        user: &Self::UserId,
        session: &Self::SessionId,
    ) -> impl Future<Output = Result<CircleSessionMembership, Self::Error>> + Send;
}
