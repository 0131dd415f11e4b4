// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous facade over the access policies.
use futures_util::future::{try_join, try_join3};
use tracing::{debug, trace};

use crate::error::AccessError;
use crate::membership::{CircleMembership, CircleSessionMembership};
use crate::policy::{self, Action};
use crate::traits::MembershipLookup;

/// Answer "may this actor perform this action" for every guarded action.
///
/// Each check looks up the memberships it needs (concurrently when it needs several), applies the
/// matching pure policy from [`policy`] and returns the decision. The service never mutates
/// anything and holds no state besides the lookup, it can be shared freely between concurrent
/// requests.
///
/// Every use case must pass a check here before changing state, [`ensure`] turns a negative
/// decision into [`AccessError::Forbidden`].
#[derive(Clone, Debug)]
pub struct AccessService<L> {
    lookup: L,
}

impl<L> AccessService<L>
where
    L: MembershipLookup,
{
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    fn decide(&self, actor: &L::UserId, action: Action, allowed: bool) -> bool {
        if allowed {
            trace!(%actor, %action, "access granted");
        } else {
            debug!(%actor, %action, "access denied");
        }
        allowed
    }

    /// Membership of the actor in the session's own circle and in the session itself.
    ///
    /// `circle` only counts when the session belongs to it, any other circle reads as
    /// [`NotAMember`](crate::Membership::NotAMember).
    async fn circle_or_session(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<(CircleMembership, CircleSessionMembership), L::Error> {
        let (parent, circle_membership, session_membership) = try_join3(
            self.lookup.session_circle(session),
            self.lookup.circle_membership(actor, circle),
            self.lookup.circle_session_membership(actor, session),
        )
        .await?;

        match parent {
            Some(parent) if &parent == circle => Ok((circle_membership, session_membership)),
            _ => {
                debug!(%circle, %session, "circle is not the parent of session");
                Ok((CircleMembership::NotAMember, session_membership))
            }
        }
    }

    // Users

    pub async fn can_create_circle(&self, actor: &L::UserId) -> Result<bool, L::Error> {
        let registered = self.lookup.is_registered_user(actor).await?;
        Ok(self.decide(
            actor,
            Action::CreateCircle,
            policy::can_create_circle(registered),
        ))
    }

    pub async fn can_list_own_circles(&self, actor: &L::UserId) -> Result<bool, L::Error> {
        let registered = self.lookup.is_registered_user(actor).await?;
        Ok(self.decide(
            actor,
            Action::ListOwnCircles,
            policy::can_list_own_circles(registered),
        ))
    }

    pub async fn can_view_user(&self, actor: &L::UserId) -> Result<bool, L::Error> {
        let registered = self.lookup.is_registered_user(actor).await?;
        Ok(self.decide(actor, Action::ViewUser, policy::can_view_user(registered)))
    }

    // Circles

    pub async fn can_view_circle(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::ViewCircle,
            policy::can_view_circle(&membership),
        ))
    }

    pub async fn can_edit_circle(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::EditCircle,
            policy::can_edit_circle(&membership),
        ))
    }

    pub async fn can_delete_circle(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::DeleteCircle,
            policy::can_delete_circle(&membership),
        ))
    }

    pub async fn can_withdraw_from_circle(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::WithdrawFromCircle,
            policy::can_withdraw_from_circle(&membership),
        ))
    }

    pub async fn can_add_circle_member(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::AddCircleMember,
            policy::can_add_circle_member(&membership),
        ))
    }

    pub async fn can_remove_circle_member(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::RemoveCircleMember,
            policy::can_remove_circle_member(&membership),
        ))
    }

    pub async fn can_change_circle_member_role(
        &self,
        actor: &L::UserId,
        target: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let (actor_membership, target_membership) = try_join(
            self.lookup.circle_membership(actor, circle),
            self.lookup.circle_membership(target, circle),
        )
        .await?;
        Ok(self.decide(
            actor,
            Action::ChangeCircleMemberRole,
            policy::can_change_circle_member_role(&actor_membership, &target_membership),
        ))
    }

    pub async fn can_transfer_circle_ownership(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::TransferCircleOwnership,
            policy::can_transfer_circle_ownership(&membership),
        ))
    }

    pub async fn can_create_circle_session(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_membership(actor, circle).await?;
        Ok(self.decide(
            actor,
            Action::CreateCircleSession,
            policy::can_create_circle_session(&membership),
        ))
    }

    // Circle sessions

    pub async fn can_view_circle_session(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::ViewCircleSession,
            policy::can_view_circle_session(&circle_membership, &session_membership),
        ))
    }

    pub async fn can_edit_circle_session(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::EditCircleSession,
            policy::can_edit_circle_session(&membership),
        ))
    }

    pub async fn can_delete_circle_session(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::DeleteCircleSession,
            policy::can_delete_circle_session(&membership),
        ))
    }

    pub async fn can_withdraw_from_circle_session(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::WithdrawFromCircleSession,
            policy::can_withdraw_from_circle_session(&membership),
        ))
    }

    pub async fn can_add_circle_session_member(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::AddCircleSessionMember,
            policy::can_add_circle_session_member(&membership),
        ))
    }

    pub async fn can_remove_circle_session_member(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::RemoveCircleSessionMember,
            policy::can_remove_circle_session_member(&membership),
        ))
    }

    pub async fn can_change_circle_session_member_role(
        &self,
        actor: &L::UserId,
        target: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (actor_membership, target_membership) = try_join(
            self.lookup.circle_session_membership(actor, session),
            self.lookup.circle_session_membership(target, session),
        )
        .await?;
        Ok(self.decide(
            actor,
            Action::ChangeCircleSessionMemberRole,
            policy::can_change_circle_session_member_role(&actor_membership, &target_membership),
        ))
    }

    pub async fn can_transfer_circle_session_ownership(
        &self,
        actor: &L::UserId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let membership = self.lookup.circle_session_membership(actor, session).await?;
        Ok(self.decide(
            actor,
            Action::TransferCircleSessionOwnership,
            policy::can_transfer_circle_session_ownership(&membership),
        ))
    }

    // Matches

    pub async fn can_record_match(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::RecordMatch,
            policy::can_record_match(&circle_membership, &session_membership),
        ))
    }

    pub async fn can_view_match(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::ViewMatch,
            policy::can_view_match(&circle_membership, &session_membership),
        ))
    }

    pub async fn can_edit_match(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::EditMatch,
            policy::can_edit_match(&circle_membership, &session_membership),
        ))
    }

    pub async fn can_delete_match(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::DeleteMatch,
            policy::can_delete_match(&circle_membership, &session_membership),
        ))
    }

    pub async fn can_view_match_history(
        &self,
        actor: &L::UserId,
        circle: &L::CircleId,
        session: &L::SessionId,
    ) -> Result<bool, L::Error> {
        let (circle_membership, session_membership) =
            self.circle_or_session(actor, circle, session).await?;
        Ok(self.decide(
            actor,
            Action::ViewMatchHistory,
            policy::can_view_match_history(&circle_membership, &session_membership),
        ))
    }
}

/// Turn a negative decision into [`AccessError::Forbidden`].
pub fn ensure<ID, E>(allowed: bool, action: Action) -> Result<(), AccessError<ID, E>> {
    if allowed {
        Ok(())
    } else {
        Err(AccessError::Forbidden(action))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use assert_matches::assert_matches;

    use crate::error::AccessError;
    use crate::memory::MemoryStore;
    use crate::policy::Action;
    use crate::role::{CircleRole, CircleSessionRole};
    use crate::roster::{CircleRoster, CircleSessionRoster};
    use crate::test_utils::setup_logging;

    use super::{AccessService, ensure};

    const CIRCLE: u64 = 100;
    const SESSION: u64 = 200;

    /// Alice owns the circle, Bob manages it and Carol is a plain member. Dave participates in
    /// the session without being a circle member. Eve is registered but belongs nowhere, Mallory
    /// is not even registered.
    async fn fixture() -> AccessService<MemoryStore<char, u64, u64>> {
        setup_logging();

        let store = MemoryStore::new();
        for user in ['A', 'B', 'C', 'D', 'E'] {
            store.register_user(user).await;
        }

        store
            .insert_circle_roster(
                CIRCLE,
                CircleRoster::from_members([
                    ('A', CircleRole::owner()),
                    ('B', CircleRole::manager()),
                    ('C', CircleRole::member()),
                ])
                .unwrap(),
            )
            .await;

        store
            .insert_session_roster(
                SESSION,
                CIRCLE,
                CircleSessionRoster::from_members([
                    ('B', CircleSessionRole::owner()),
                    ('D', CircleSessionRole::member()),
                ])
                .unwrap(),
            )
            .await;

        AccessService::new(store)
    }

    #[tokio::test]
    async fn registered_users() {
        let access = fixture().await;

        assert!(access.can_create_circle(&'E').await.unwrap());
        assert!(access.can_list_own_circles(&'E').await.unwrap());
        assert!(access.can_view_user(&'E').await.unwrap());

        assert!(!access.can_create_circle(&'M').await.unwrap());
        assert!(!access.can_list_own_circles(&'M').await.unwrap());
        assert!(!access.can_view_user(&'M').await.unwrap());
    }

    #[tokio::test]
    async fn circle_checks() {
        let access = fixture().await;

        assert!(access.can_view_circle(&'C', &CIRCLE).await.unwrap());
        assert!(!access.can_view_circle(&'D', &CIRCLE).await.unwrap());

        assert!(access.can_edit_circle(&'B', &CIRCLE).await.unwrap());
        assert!(!access.can_edit_circle(&'C', &CIRCLE).await.unwrap());

        assert!(access.can_delete_circle(&'A', &CIRCLE).await.unwrap());
        assert!(!access.can_delete_circle(&'B', &CIRCLE).await.unwrap());

        assert!(access.can_transfer_circle_ownership(&'A', &CIRCLE).await.unwrap());
        assert!(!access.can_transfer_circle_ownership(&'B', &CIRCLE).await.unwrap());

        assert!(access.can_add_circle_member(&'C', &CIRCLE).await.unwrap());
        assert!(!access.can_add_circle_member(&'E', &CIRCLE).await.unwrap());

        assert!(access.can_remove_circle_member(&'B', &CIRCLE).await.unwrap());
        assert!(!access.can_remove_circle_member(&'C', &CIRCLE).await.unwrap());

        assert!(access.can_withdraw_from_circle(&'C', &CIRCLE).await.unwrap());
        assert!(!access.can_withdraw_from_circle(&'E', &CIRCLE).await.unwrap());

        assert!(access.can_create_circle_session(&'B', &CIRCLE).await.unwrap());
        assert!(!access.can_create_circle_session(&'C', &CIRCLE).await.unwrap());

        // Unknown circles have no members.
        assert!(!access.can_view_circle(&'A', &999).await.unwrap());
    }

    #[tokio::test]
    async fn change_circle_member_role() {
        let access = fixture().await;

        assert!(
            access
                .can_change_circle_member_role(&'A', &'B', &CIRCLE)
                .await
                .unwrap()
        );
        assert!(
            access
                .can_change_circle_member_role(&'B', &'C', &CIRCLE)
                .await
                .unwrap()
        );
        assert!(
            !access
                .can_change_circle_member_role(&'B', &'A', &CIRCLE)
                .await
                .unwrap()
        );
        assert!(
            !access
                .can_change_circle_member_role(&'C', &'C', &CIRCLE)
                .await
                .unwrap()
        );
        // Target outside the roster.
        assert!(
            !access
                .can_change_circle_member_role(&'A', &'E', &CIRCLE)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn session_checks() {
        let access = fixture().await;

        // Circle members and session participants may both view the session.
        assert!(access.can_view_circle_session(&'C', &CIRCLE, &SESSION).await.unwrap());
        assert!(access.can_view_circle_session(&'D', &CIRCLE, &SESSION).await.unwrap());
        assert!(!access.can_view_circle_session(&'E', &CIRCLE, &SESSION).await.unwrap());

        // Circle roles do not carry over into the session.
        assert!(!access.can_edit_circle_session(&'A', &SESSION).await.unwrap());
        assert!(access.can_edit_circle_session(&'B', &SESSION).await.unwrap());
        assert!(!access.can_edit_circle_session(&'D', &SESSION).await.unwrap());

        assert!(access.can_delete_circle_session(&'B', &SESSION).await.unwrap());
        assert!(!access.can_delete_circle_session(&'D', &SESSION).await.unwrap());
        assert!(access.can_transfer_circle_session_ownership(&'B', &SESSION).await.unwrap());
        assert!(!access.can_transfer_circle_session_ownership(&'A', &SESSION).await.unwrap());

        assert!(access.can_add_circle_session_member(&'D', &SESSION).await.unwrap());
        assert!(!access.can_add_circle_session_member(&'C', &SESSION).await.unwrap());
        assert!(access.can_withdraw_from_circle_session(&'D', &SESSION).await.unwrap());
        assert!(access.can_remove_circle_session_member(&'B', &SESSION).await.unwrap());
        assert!(!access.can_remove_circle_session_member(&'D', &SESSION).await.unwrap());

        assert!(
            access
                .can_change_circle_session_member_role(&'B', &'D', &SESSION)
                .await
                .unwrap()
        );
        assert!(
            !access
                .can_change_circle_session_member_role(&'D', &'B', &SESSION)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn other_circles_grant_nothing_in_session() {
        let access = fixture().await;

        // Eve owns another circle and passes it along with the session.
        let other_circle = 300;
        access
            .lookup()
            .insert_circle_roster(
                other_circle,
                CircleRoster::from_members([('E', CircleRole::owner())]).unwrap(),
            )
            .await;

        assert!(
            !access
                .can_view_circle_session(&'E', &other_circle, &SESSION)
                .await
                .unwrap()
        );
        assert!(!access.can_record_match(&'E', &other_circle, &SESSION).await.unwrap());
        assert!(!access.can_view_match(&'E', &other_circle, &SESSION).await.unwrap());
        assert!(!access.can_edit_match(&'E', &other_circle, &SESSION).await.unwrap());
        assert!(!access.can_delete_match(&'E', &other_circle, &SESSION).await.unwrap());
        assert!(
            !access
                .can_view_match_history(&'E', &other_circle, &SESSION)
                .await
                .unwrap()
        );

        // Session participants keep access whatever circle is passed.
        assert!(
            access
                .can_view_circle_session(&'D', &other_circle, &SESSION)
                .await
                .unwrap()
        );

        // Sessions without a known circle only admit their participants.
        assert!(!access.can_view_circle_session(&'A', &CIRCLE, &999).await.unwrap());
    }

    #[tokio::test]
    async fn match_checks_agree() {
        let access = fixture().await;

        for actor in ['A', 'B', 'C', 'D', 'E', 'M'] {
            let outcomes = [
                access.can_record_match(&actor, &CIRCLE, &SESSION).await.unwrap(),
                access.can_view_match(&actor, &CIRCLE, &SESSION).await.unwrap(),
                access.can_edit_match(&actor, &CIRCLE, &SESSION).await.unwrap(),
                access.can_delete_match(&actor, &CIRCLE, &SESSION).await.unwrap(),
                access
                    .can_view_match_history(&actor, &CIRCLE, &SESSION)
                    .await
                    .unwrap(),
            ];

            let expected = matches!(actor, 'A' | 'B' | 'C' | 'D');
            assert_eq!(outcomes, [expected; 5], "actor {actor}");
        }
    }

    #[test]
    fn ensure_maps_denial_to_forbidden() {
        assert!(ensure::<char, Infallible>(true, Action::EditCircle).is_ok());
        assert_matches!(
            ensure::<char, Infallible>(false, Action::EditCircle),
            Err(AccessError::Forbidden(Action::EditCircle))
        );
    }
}
