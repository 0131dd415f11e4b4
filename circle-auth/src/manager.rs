// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gated roster mutations for circles and circle sessions.
use std::fmt::Display;

use tracing::{debug, warn};

use crate::access::{AccessService, ensure};
use crate::config::Config;
use crate::error::AccessError;
use crate::ownership;
use crate::policy::{self, Action};
use crate::role::{Circle, CircleRole, CircleSession, CircleSessionRole, RosterKind};
use crate::roster::{Roster, RosterChange};
use crate::traits::{MembershipLookup, RosterStore, SessionStore};

pub type ManagerError<S> =
    AccessError<<S as MembershipLookup>::UserId, <S as MembershipLookup>::Error>;

pub type CircleChanges<S> = Vec<RosterChange<<S as MembershipLookup>::UserId, Circle>>;

pub type CircleSessionChanges<S> =
    Vec<RosterChange<<S as MembershipLookup>::UserId, CircleSession>>;

/// Applies roster mutations on behalf of an actor.
///
/// Every operation first asks the [`AccessService`] whether the actor may perform it and fails
/// with [`AccessError::Forbidden`] otherwise. The mutation itself runs as one atomic
/// [`RosterStore::update`]. Inside it the policy is checked again against the roster about to be
/// changed, followed by the ownership rules, so an actor removed or demoted after the first check
/// changes nothing.
///
/// Returns the changes which were persisted.
#[derive(Clone, Debug)]
pub struct RosterManager<S> {
    access: AccessService<S>,
    store: S,
    config: Config,
}

impl<S> RosterManager<S>
where
    S: RosterStore<Circle, CollectionId = <S as MembershipLookup>::CircleId>
        + RosterStore<CircleSession, CollectionId = <S as MembershipLookup>::SessionId>
        + SessionStore
        + Clone,
{
    pub fn new(store: S, config: Config) -> Self {
        Self {
            access: AccessService::new(store.clone()),
            store,
            config,
        }
    }

    pub fn access(&self) -> &AccessService<S> {
        &self.access
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn gate(decision: Result<bool, S::Error>, action: Action) -> Result<(), ManagerError<S>> {
        decision
            .map_err(AccessError::Store)
            .and_then(|allowed| Self::permit(allowed, action))
    }

    fn permit(allowed: bool, action: Action) -> Result<(), ManagerError<S>> {
        ensure(allowed, action)
    }

    async fn apply<K, F>(
        &self,
        collection: &<S as RosterStore<K>>::CollectionId,
        action: Action,
        f: F,
    ) -> Result<Vec<RosterChange<S::UserId, K>>, ManagerError<S>>
    where
        K: RosterKind,
        S: RosterStore<K>,
        F: FnOnce(&Roster<S::UserId, K>) -> Result<Roster<S::UserId, K>, ManagerError<S>> + Send,
    {
        let result = <S as RosterStore<K>>::update(&self.store, collection, f).await;
        Self::log_update::<K, _>(collection, action, &result);
        result
    }

    fn log_update<K, C>(
        collection: &C,
        action: Action,
        result: &Result<Vec<RosterChange<S::UserId, K>>, ManagerError<S>>,
    ) where
        K: RosterKind,
        C: Display,
    {
        match result {
            Ok(changes) => {
                debug!(
                    kind = K::NAME,
                    %collection,
                    %action,
                    changes = changes.len(),
                    "applied roster update"
                );
            }
            Err(AccessError::Forbidden(_)) => {
                debug!(
                    kind = K::NAME,
                    %collection,
                    %action,
                    "access lost before roster update"
                );
            }
            Err(err @ (AccessError::Ownership(_) | AccessError::ForeignSession)) => {
                warn!(
                    kind = K::NAME,
                    %collection,
                    %action,
                    %err,
                    "rejected roster update"
                );
            }
            Err(AccessError::Store(_)) => (),
        }
    }

    // Circles

    /// Create a circle with the actor as its Owner.
    ///
    /// Fails if the circle already has an Owner.
    pub async fn create_circle(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(self.access.can_create_circle(actor).await, Action::CreateCircle)?;

        let owner = actor.clone();
        let limit = self.config.max_circle_members;
        self.apply::<Circle, _>(circle, Action::CreateCircle, move |roster| {
            ownership::assert_has_capacity(roster, limit)?;
            Ok(ownership::add(roster, owner, CircleRole::owner())?)
        })
        .await
    }

    /// Add a user to a circle. Only the first member of an owner-less circle may join as Owner.
    pub async fn add_circle_member(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
        user: &S::UserId,
        role: CircleRole,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_add_circle_member(actor, circle).await,
            Action::AddCircleMember,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        let limit = self.config.max_circle_members;
        self.apply::<Circle, _>(circle, Action::AddCircleMember, move |roster| {
            Self::permit(
                policy::can_add_circle_member(&roster.membership(&actor)),
                Action::AddCircleMember,
            )?;
            ownership::assert_has_capacity(roster, limit)?;
            Ok(ownership::add(roster, user, role)?)
        })
        .await
    }

    pub async fn remove_circle_member(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
        user: &S::UserId,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_remove_circle_member(actor, circle).await,
            Action::RemoveCircleMember,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        self.apply::<Circle, _>(circle, Action::RemoveCircleMember, move |roster| {
            Self::permit(
                policy::can_remove_circle_member(&roster.membership(&actor)),
                Action::RemoveCircleMember,
            )?;
            Ok(ownership::remove(roster, &user)?)
        })
        .await
    }

    /// The actor leaves the circle. The Owner has to transfer ownership first.
    pub async fn withdraw_from_circle(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_withdraw_from_circle(actor, circle).await,
            Action::WithdrawFromCircle,
        )?;

        let member = actor.clone();
        self.apply::<Circle, _>(circle, Action::WithdrawFromCircle, move |roster| {
            Self::permit(
                policy::can_withdraw_from_circle(&roster.membership(&member)),
                Action::WithdrawFromCircle,
            )?;
            Ok(ownership::withdraw(roster, &member)?)
        })
        .await
    }

    /// Move a user between Manager and Member.
    pub async fn change_circle_member_role(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
        user: &S::UserId,
        role: CircleRole,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_change_circle_member_role(actor, user, circle).await,
            Action::ChangeCircleMemberRole,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        self.apply::<Circle, _>(circle, Action::ChangeCircleMemberRole, move |roster| {
            Self::permit(
                policy::can_change_circle_member_role(
                    &roster.membership(&actor),
                    &roster.membership(&user),
                ),
                Action::ChangeCircleMemberRole,
            )?;
            Ok(ownership::change_role(roster, &user, role)?)
        })
        .await
    }

    /// Hand ownership of the circle from the actor to another member. The actor becomes Manager.
    pub async fn transfer_circle_ownership(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
        user: &S::UserId,
    ) -> Result<CircleChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_transfer_circle_ownership(actor, circle).await,
            Action::TransferCircleOwnership,
        )?;

        let (from, to) = (actor.clone(), user.clone());
        self.apply::<Circle, _>(circle, Action::TransferCircleOwnership, move |roster| {
            Self::permit(
                policy::can_transfer_circle_ownership(&roster.membership(&from)),
                Action::TransferCircleOwnership,
            )?;
            Ok(ownership::transfer_ownership(roster, &from, &to)?)
        })
        .await
    }

    // Circle sessions

    /// Create a session of the given circle with the actor as its Owner.
    ///
    /// The session stays linked to `circle`, creating it again under another circle fails with
    /// [`AccessError::ForeignSession`].
    pub async fn create_circle_session(
        &self,
        actor: &S::UserId,
        circle: &S::CircleId,
        session: &S::SessionId,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_create_circle_session(actor, circle).await,
            Action::CreateCircleSession,
        )?;

        let owner = actor.clone();
        let limit = self.config.max_session_participants;
        let result = self
            .store
            .create_session(session, circle, move |roster| {
                ownership::assert_has_capacity(roster, limit)?;
                Ok(ownership::add(roster, owner, CircleSessionRole::owner())?)
            })
            .await;
        Self::log_update::<CircleSession, _>(session, Action::CreateCircleSession, &result);
        result
    }

    pub async fn add_circle_session_member(
        &self,
        actor: &S::UserId,
        session: &S::SessionId,
        user: &S::UserId,
        role: CircleSessionRole,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_add_circle_session_member(actor, session).await,
            Action::AddCircleSessionMember,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        let limit = self.config.max_session_participants;
        self.apply::<CircleSession, _>(session, Action::AddCircleSessionMember, move |roster| {
            Self::permit(
                policy::can_add_circle_session_member(&roster.membership(&actor)),
                Action::AddCircleSessionMember,
            )?;
            ownership::assert_has_capacity(roster, limit)?;
            Ok(ownership::add(roster, user, role)?)
        })
        .await
    }

    pub async fn remove_circle_session_member(
        &self,
        actor: &S::UserId,
        session: &S::SessionId,
        user: &S::UserId,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_remove_circle_session_member(actor, session).await,
            Action::RemoveCircleSessionMember,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        self.apply::<CircleSession, _>(session, Action::RemoveCircleSessionMember, move |roster| {
            Self::permit(
                policy::can_remove_circle_session_member(&roster.membership(&actor)),
                Action::RemoveCircleSessionMember,
            )?;
            Ok(ownership::remove(roster, &user)?)
        })
        .await
    }

    pub async fn withdraw_from_circle_session(
        &self,
        actor: &S::UserId,
        session: &S::SessionId,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_withdraw_from_circle_session(actor, session).await,
            Action::WithdrawFromCircleSession,
        )?;

        let member = actor.clone();
        self.apply::<CircleSession, _>(session, Action::WithdrawFromCircleSession, move |roster| {
            Self::permit(
                policy::can_withdraw_from_circle_session(&roster.membership(&member)),
                Action::WithdrawFromCircleSession,
            )?;
            Ok(ownership::withdraw(roster, &member)?)
        })
        .await
    }

    pub async fn change_circle_session_member_role(
        &self,
        actor: &S::UserId,
        session: &S::SessionId,
        user: &S::UserId,
        role: CircleSessionRole,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_change_circle_session_member_role(actor, user, session).await,
            Action::ChangeCircleSessionMemberRole,
        )?;

        let (actor, user) = (actor.clone(), user.clone());
        self.apply::<CircleSession, _>(
            session,
            Action::ChangeCircleSessionMemberRole,
            move |roster| {
                Self::permit(
                    policy::can_change_circle_session_member_role(
                        &roster.membership(&actor),
                        &roster.membership(&user),
                    ),
                    Action::ChangeCircleSessionMemberRole,
                )?;
                Ok(ownership::change_role(roster, &user, role)?)
            },
        )
        .await
    }

    pub async fn transfer_circle_session_ownership(
        &self,
        actor: &S::UserId,
        session: &S::SessionId,
        user: &S::UserId,
    ) -> Result<CircleSessionChanges<S>, ManagerError<S>> {
        Self::gate(
            self.access.can_transfer_circle_session_ownership(actor, session).await,
            Action::TransferCircleSessionOwnership,
        )?;

        let (from, to) = (actor.clone(), user.clone());
        self.apply::<CircleSession, _>(
            session,
            Action::TransferCircleSessionOwnership,
            move |roster| {
                Self::permit(
                    policy::can_transfer_circle_session_ownership(&roster.membership(&from)),
                    Action::TransferCircleSessionOwnership,
                )?;
                Ok(ownership::transfer_ownership(roster, &from, &to)?)
            },
        )
        .await
    }
}
