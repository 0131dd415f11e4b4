// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure access policies.
//!
//! Every action an actor can perform against a circle, a circle session or a match has exactly
//! one policy function here. Policies never perform I/O and never fail, they map the actor's
//! membership(s) to a boolean decision. Looking the memberships up is left to
//! [`AccessService`](crate::AccessService).
//!
//! Non-members fail every membership-based check: the membership kind is always inspected before
//! any role is compared.
use std::fmt::Display;

use crate::membership::{CircleMembership, CircleSessionMembership, Membership};
use crate::role::RoleLevel;

/// Actions which are guarded by a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    CreateCircle,
    ListOwnCircles,
    ViewUser,
    ViewCircle,
    EditCircle,
    DeleteCircle,
    WithdrawFromCircle,
    AddCircleMember,
    RemoveCircleMember,
    ChangeCircleMemberRole,
    TransferCircleOwnership,
    CreateCircleSession,
    ViewCircleSession,
    EditCircleSession,
    DeleteCircleSession,
    WithdrawFromCircleSession,
    AddCircleSessionMember,
    RemoveCircleSessionMember,
    ChangeCircleSessionMemberRole,
    TransferCircleSessionOwnership,
    RecordMatch,
    ViewMatch,
    EditMatch,
    DeleteMatch,
    ViewMatchHistory,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::CreateCircle => "create circle",
            Action::ListOwnCircles => "list own circles",
            Action::ViewUser => "view user",
            Action::ViewCircle => "view circle",
            Action::EditCircle => "edit circle",
            Action::DeleteCircle => "delete circle",
            Action::WithdrawFromCircle => "withdraw from circle",
            Action::AddCircleMember => "add circle member",
            Action::RemoveCircleMember => "remove circle member",
            Action::ChangeCircleMemberRole => "change circle member role",
            Action::TransferCircleOwnership => "transfer circle ownership",
            Action::CreateCircleSession => "create circle session",
            Action::ViewCircleSession => "view circle session",
            Action::EditCircleSession => "edit circle session",
            Action::DeleteCircleSession => "delete circle session",
            Action::WithdrawFromCircleSession => "withdraw from circle session",
            Action::AddCircleSessionMember => "add circle session member",
            Action::RemoveCircleSessionMember => "remove circle session member",
            Action::ChangeCircleSessionMemberRole => "change circle session member role",
            Action::TransferCircleSessionOwnership => "transfer circle session ownership",
            Action::RecordMatch => "record match",
            Action::ViewMatch => "view match",
            Action::EditMatch => "edit match",
            Action::DeleteMatch => "delete match",
            Action::ViewMatchHistory => "view match history",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Rules shared by both hierarchies. Each is instantiated once for circles and once for circle
// sessions below.

fn is_participant<K>(membership: &Membership<K>) -> bool {
    membership.is_member()
}

fn is_owner_or_manager<K>(membership: &Membership<K>) -> bool {
    membership.is_owner_or_manager()
}

fn is_owner<K>(membership: &Membership<K>) -> bool {
    membership.is_owner()
}

fn can_change_member_role<K>(actor: &Membership<K>, target: &Membership<K>) -> bool {
    let (Membership::Member { role: actor_role }, Membership::Member { role: target_role }) =
        (actor, target)
    else {
        return false;
    };

    // Plain members never change roles, even those of other plain members.
    if actor_role.level() == RoleLevel::Member {
        return false;
    }

    actor_role.is_same_or_higher(target_role)
}

// Users

pub fn can_create_circle(is_registered_user: bool) -> bool {
    is_registered_user
}

pub fn can_list_own_circles(is_registered_user: bool) -> bool {
    is_registered_user
}

pub fn can_view_user(is_registered_user: bool) -> bool {
    is_registered_user
}

// Circles

pub fn can_view_circle(membership: &CircleMembership) -> bool {
    is_participant(membership)
}

pub fn can_withdraw_from_circle(membership: &CircleMembership) -> bool {
    is_participant(membership)
}

pub fn can_add_circle_member(membership: &CircleMembership) -> bool {
    is_participant(membership)
}

pub fn can_edit_circle(membership: &CircleMembership) -> bool {
    is_owner_or_manager(membership)
}

pub fn can_create_circle_session(membership: &CircleMembership) -> bool {
    is_owner_or_manager(membership)
}

pub fn can_delete_circle(membership: &CircleMembership) -> bool {
    is_owner(membership)
}

pub fn can_transfer_circle_ownership(membership: &CircleMembership) -> bool {
    is_owner(membership)
}

pub fn can_remove_circle_member(membership: &CircleMembership) -> bool {
    is_owner_or_manager(membership)
}

/// Both actor and target must be circle members, the actor must not be a plain member and must
/// rank at least as high as the target.
pub fn can_change_circle_member_role(actor: &CircleMembership, target: &CircleMembership) -> bool {
    can_change_member_role(actor, target)
}

// Circle sessions

/// Circle members may view every session of their circle, session participants may view the
/// session even without circle membership.
pub fn can_view_circle_session(
    circle: &CircleMembership,
    session: &CircleSessionMembership,
) -> bool {
    circle.is_member() || session.is_member()
}

pub fn can_edit_circle_session(membership: &CircleSessionMembership) -> bool {
    is_owner_or_manager(membership)
}

pub fn can_delete_circle_session(membership: &CircleSessionMembership) -> bool {
    is_owner(membership)
}

pub fn can_transfer_circle_session_ownership(membership: &CircleSessionMembership) -> bool {
    is_owner(membership)
}

pub fn can_withdraw_from_circle_session(membership: &CircleSessionMembership) -> bool {
    is_participant(membership)
}

pub fn can_add_circle_session_member(membership: &CircleSessionMembership) -> bool {
    is_participant(membership)
}

pub fn can_remove_circle_session_member(membership: &CircleSessionMembership) -> bool {
    is_owner_or_manager(membership)
}

/// Both actor and target must be session participants, the actor must not be a plain member and
/// must rank at least as high as the target.
pub fn can_change_circle_session_member_role(
    actor: &CircleSessionMembership,
    target: &CircleSessionMembership,
) -> bool {
    can_change_member_role(actor, target)
}

// Matches
//
// All five match policies grant access to circle members and session participants alike. They
// are kept as separate functions with their own bodies so that one can be changed without
// touching the others.

pub fn can_record_match(circle: &CircleMembership, session: &CircleSessionMembership) -> bool {
    circle.is_member() || session.is_member()
}

pub fn can_view_match(circle: &CircleMembership, session: &CircleSessionMembership) -> bool {
    circle.is_member() || session.is_member()
}

pub fn can_edit_match(circle: &CircleMembership, session: &CircleSessionMembership) -> bool {
    circle.is_member() || session.is_member()
}

pub fn can_delete_match(circle: &CircleMembership, session: &CircleSessionMembership) -> bool {
    circle.is_member() || session.is_member()
}

pub fn can_view_match_history(
    circle: &CircleMembership,
    session: &CircleSessionMembership,
) -> bool {
    circle.is_member() || session.is_member()
}
