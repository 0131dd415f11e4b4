// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-owner invariant and ownership transfer.
//!
//! Every roster must hold exactly one Owner whenever it is read or written outside of this module.
//! The functions here never mutate the given roster: they either return a complete new roster
//! which satisfies the invariant or fail before producing anything.
//!
//! The only way to stop being Owner is [`transfer_ownership`]; generic role changes, removals and
//! withdrawals reject any attempt to touch the Owner.
//!
//! Callers are expected to run "read roster, compute, write roster" as one atomic step, see
//! [`RosterStore::update`](crate::traits::RosterStore::update).

use thiserror::Error;

use crate::error::ErrorKind;
use crate::role::Role;
use crate::roster::Roster;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OwnershipError<ID> {
    #[error("must have exactly one owner")]
    NotExactlyOneOwner { owners: usize },

    #[error("cannot transfer ownership to the current owner: {0}")]
    SelfTransfer(ID),

    #[error("current owner must be Owner: {0}")]
    NotOwner(ID),

    #[error("target member not found: {0}")]
    TargetNotFound(ID),

    #[error("member not found: {0}")]
    MemberNotFound(ID),

    #[error("member already on roster: {0}")]
    AlreadyMember(ID),

    #[error("member appears more than once on roster: {0}")]
    DuplicateMember(ID),

    #[error("owner role can only change through ownership transfer")]
    OwnerRoleChange,

    #[error("owner cannot withdraw before transferring ownership")]
    OwnerWithdrawal,

    #[error("owner cannot be removed before transferring ownership")]
    OwnerRemoval,

    #[error("roster is full, limit is {limit} members")]
    RosterFull { limit: usize },
}

impl<ID> OwnershipError<ID> {
    /// Error kind this failure should be reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OwnershipError::NotExactlyOneOwner { .. } | OwnershipError::DuplicateMember(_) => {
                ErrorKind::InvariantViolation
            }
            OwnershipError::TargetNotFound(_) | OwnershipError::MemberNotFound(_) => {
                ErrorKind::NotFound
            }
            OwnershipError::SelfTransfer(_)
            | OwnershipError::NotOwner(_)
            | OwnershipError::AlreadyMember(_)
            | OwnershipError::OwnerRoleChange
            | OwnershipError::OwnerWithdrawal
            | OwnershipError::OwnerRemoval
            | OwnershipError::RosterFull { .. } => ErrorKind::InvalidOperation,
        }
    }
}

/// Fails unless exactly one member of the roster holds the Owner role.
pub fn assert_single_owner<ID, K>(roster: &Roster<ID, K>) -> Result<(), OwnershipError<ID>>
where
    ID: Clone + Ord,
{
    let owners = roster.owner_count();
    if owners != 1 {
        return Err(OwnershipError::NotExactlyOneOwner { owners });
    }
    Ok(())
}

/// Check that a new member may join the roster with the given role.
///
/// `roster` is the state before insertion. Only the first member of an owner-less roster may (and
/// must) join as Owner, once an Owner exists nobody else may join as one.
pub fn assert_can_add_with_role<ID, K>(
    roster: &Roster<ID, K>,
    role: Role<K>,
) -> Result<(), OwnershipError<ID>>
where
    ID: Clone + Ord,
{
    let owners = roster.owner_count();
    match (owners > 0, role.is_owner()) {
        (false, false) => Err(OwnershipError::NotExactlyOneOwner { owners: 0 }),
        (true, true) => Err(OwnershipError::NotExactlyOneOwner { owners: owners + 1 }),
        _ => Ok(()),
    }
}

/// The Owner may not leave the roster on their own.
pub fn assert_can_withdraw<ID, K>(role: Role<K>) -> Result<(), OwnershipError<ID>> {
    if role.is_owner() {
        return Err(OwnershipError::OwnerWithdrawal);
    }
    Ok(())
}

/// The Owner may not be removed by anyone.
pub fn assert_can_remove_member<ID, K>(role: Role<K>) -> Result<(), OwnershipError<ID>> {
    if role.is_owner() {
        return Err(OwnershipError::OwnerRemoval);
    }
    Ok(())
}

/// Owner can neither be granted nor revoked through a generic role change.
pub fn assert_can_change_member_role<ID, K>(
    current: Role<K>,
    next: Role<K>,
) -> Result<(), OwnershipError<ID>> {
    if current.is_owner() || next.is_owner() {
        return Err(OwnershipError::OwnerRoleChange);
    }
    Ok(())
}

/// Fails if the roster already reached the given member limit.
pub fn assert_has_capacity<ID, K>(
    roster: &Roster<ID, K>,
    limit: Option<usize>,
) -> Result<(), OwnershipError<ID>>
where
    ID: Clone + Ord,
{
    match limit {
        Some(limit) if roster.len() >= limit => Err(OwnershipError::RosterFull { limit }),
        _ => Ok(()),
    }
}

/// Hand ownership from `from` to `to`.
///
/// The current Owner becomes Manager and the target becomes Owner, every other entry stays as it
/// is. Fails without producing a roster if:
///
/// - `from` and `to` are the same member
/// - the roster does not hold exactly one Owner
/// - `from` is not on the roster or is not the Owner
/// - `to` is not on the roster
pub fn transfer_ownership<ID, K>(
    roster: &Roster<ID, K>,
    from: &ID,
    to: &ID,
) -> Result<Roster<ID, K>, OwnershipError<ID>>
where
    ID: Clone + Ord,
    K: Clone,
{
    if from == to {
        return Err(OwnershipError::SelfTransfer(from.clone()));
    }

    assert_single_owner(roster)?;

    match roster.role(from) {
        Some(role) if role.is_owner() => (),
        Some(_) => return Err(OwnershipError::NotOwner(from.clone())),
        None => return Err(OwnershipError::MemberNotFound(from.clone())),
    }

    if !roster.contains(to) {
        return Err(OwnershipError::TargetNotFound(to.clone()));
    }

    let mut next = roster.clone();
    next.insert(from.clone(), Role::manager());
    next.insert(to.clone(), Role::owner());

    assert_single_owner(&next)?;

    Ok(next)
}

/// Add a new member with the given role.
pub fn add<ID, K>(
    roster: &Roster<ID, K>,
    member: ID,
    role: Role<K>,
) -> Result<Roster<ID, K>, OwnershipError<ID>>
where
    ID: Clone + Ord,
    K: Clone,
{
    if roster.contains(&member) {
        return Err(OwnershipError::AlreadyMember(member));
    }

    assert_can_add_with_role(roster, role)?;

    let mut next = roster.clone();
    next.insert(member, role);

    assert_single_owner(&next)?;

    Ok(next)
}

/// Remove a member other than the Owner.
pub fn remove<ID, K>(
    roster: &Roster<ID, K>,
    member: &ID,
) -> Result<Roster<ID, K>, OwnershipError<ID>>
where
    ID: Clone + Ord,
    K: Clone,
{
    let Some(role) = roster.role(member) else {
        return Err(OwnershipError::MemberNotFound(member.clone()));
    };

    assert_can_remove_member(role)?;

    let mut next = roster.clone();
    next.remove(member);

    assert_single_owner(&next)?;

    Ok(next)
}

/// A member other than the Owner leaves the roster.
pub fn withdraw<ID, K>(
    roster: &Roster<ID, K>,
    member: &ID,
) -> Result<Roster<ID, K>, OwnershipError<ID>>
where
    ID: Clone + Ord,
    K: Clone,
{
    let Some(role) = roster.role(member) else {
        return Err(OwnershipError::MemberNotFound(member.clone()));
    };

    assert_can_withdraw(role)?;

    let mut next = roster.clone();
    next.remove(member);

    assert_single_owner(&next)?;

    Ok(next)
}

/// Change the role of a member between Manager and Member.
pub fn change_role<ID, K>(
    roster: &Roster<ID, K>,
    member: &ID,
    role: Role<K>,
) -> Result<Roster<ID, K>, OwnershipError<ID>>
where
    ID: Clone + Ord,
    K: Clone,
{
    let Some(current) = roster.role(member) else {
        return Err(OwnershipError::MemberNotFound(member.clone()));
    };

    assert_can_change_member_role(current, role)?;

    let mut next = roster.clone();
    next.insert(member.clone(), role);

    assert_single_owner(&next)?;

    Ok(next)
}

#[cfg(test)]
mod tests {
    use crate::role::{CircleRole, CircleSessionRole, RoleLevel};
    use crate::roster::{CircleRoster, CircleSessionRoster, RosterChange};

    use super::*;

    fn roster(members: &[(char, RoleLevel)]) -> CircleRoster<char> {
        CircleRoster::from_members(members.iter().map(|(id, level)| (*id, Role::new(*level))))
            .unwrap()
    }

    #[test]
    fn single_owner() {
        use RoleLevel::*;

        assert!(assert_single_owner(&roster(&[('A', Owner)])).is_ok());
        assert!(
            assert_single_owner(&roster(&[('A', Owner), ('B', Manager), ('C', Member)])).is_ok()
        );

        assert_eq!(
            assert_single_owner(&roster(&[])),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
        assert_eq!(
            assert_single_owner(&roster(&[('A', Manager), ('B', Member)])),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
        assert_eq!(
            assert_single_owner(&roster(&[('A', Owner), ('B', Owner)])),
            Err(OwnershipError::NotExactlyOneOwner { owners: 2 })
        );
    }

    #[test]
    fn single_owner_error_is_invariant_violation() {
        let err = assert_single_owner(&CircleRoster::<char>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(err.to_string(), "must have exactly one owner");
    }

    #[test]
    fn first_member_must_be_owner() {
        let empty = CircleRoster::<char>::new();

        assert_eq!(
            assert_can_add_with_role(&empty, CircleRole::member()),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
        assert_eq!(
            assert_can_add_with_role(&empty, CircleRole::manager()),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
        assert!(assert_can_add_with_role(&empty, CircleRole::owner()).is_ok());
    }

    #[test]
    fn no_second_owner() {
        let roster = roster(&[('A', RoleLevel::Owner)]);

        assert!(assert_can_add_with_role(&roster, CircleRole::member()).is_ok());
        assert!(assert_can_add_with_role(&roster, CircleRole::manager()).is_ok());
        assert_eq!(
            assert_can_add_with_role(&roster, CircleRole::owner()),
            Err(OwnershipError::NotExactlyOneOwner { owners: 2 })
        );
    }

    #[test]
    fn transfer() {
        let before = roster(&[
            ('A', RoleLevel::Owner),
            ('B', RoleLevel::Member),
            ('C', RoleLevel::Manager),
            ('D', RoleLevel::Member),
        ]);

        let after = transfer_ownership(&before, &'A', &'B').unwrap();

        assert_eq!(after.role(&'A'), Some(CircleRole::manager()));
        assert_eq!(after.role(&'B'), Some(CircleRole::owner()));
        assert_eq!(after.role(&'C'), Some(CircleRole::manager()));
        assert_eq!(after.role(&'D'), Some(CircleRole::member()));
        assert_eq!(after.owner(), Some(&'B'));
        assert!(assert_single_owner(&after).is_ok());

        // Exactly the two parties changed.
        assert_eq!(
            before.diff(&after),
            vec![
                RosterChange::RoleChanged {
                    member: 'A',
                    from: CircleRole::owner(),
                    to: CircleRole::manager(),
                },
                RosterChange::RoleChanged {
                    member: 'B',
                    from: CircleRole::member(),
                    to: CircleRole::owner(),
                },
            ]
        );
    }

    #[test]
    fn transfer_to_every_other_member() {
        let before = roster(&[
            ('A', RoleLevel::Owner),
            ('B', RoleLevel::Manager),
            ('C', RoleLevel::Member),
        ]);

        for target in ['B', 'C'] {
            let after = transfer_ownership(&before, &'A', &target).unwrap();
            assert_eq!(after.owners(), vec![target]);
            assert_eq!(after.role(&'A'), Some(CircleRole::manager()));
            assert_eq!(after.len(), before.len());
        }
    }

    #[test]
    fn transfer_rejects_self() {
        let rosters = [
            roster(&[]),
            roster(&[('A', RoleLevel::Owner)]),
            roster(&[('A', RoleLevel::Member), ('B', RoleLevel::Owner)]),
            roster(&[('A', RoleLevel::Owner), ('B', RoleLevel::Owner)]),
        ];

        for roster in rosters {
            assert_eq!(
                transfer_ownership(&roster, &'A', &'A'),
                Err(OwnershipError::SelfTransfer('A'))
            );
        }
    }

    #[test]
    fn transfer_rejects_non_owner_source() {
        let before = roster(&[
            ('A', RoleLevel::Owner),
            ('B', RoleLevel::Manager),
            ('C', RoleLevel::Member),
        ]);
        let snapshot = before.clone();

        let result = transfer_ownership(&before, &'B', &'C');
        assert_eq!(result, Err(OwnershipError::NotOwner('B')));
        assert_eq!(
            result.unwrap_err().to_string(),
            "current owner must be Owner: B"
        );

        // Input is left untouched.
        assert_eq!(before, snapshot);
    }

    #[test]
    fn transfer_rejects_unknown_parties() {
        let before = roster(&[('A', RoleLevel::Owner), ('B', RoleLevel::Member)]);

        assert_eq!(
            transfer_ownership(&before, &'A', &'Z'),
            Err(OwnershipError::TargetNotFound('Z'))
        );
        assert_eq!(
            transfer_ownership(&before, &'Z', &'B'),
            Err(OwnershipError::MemberNotFound('Z'))
        );
        assert_eq!(
            transfer_ownership(&before, &'A', &'Z').unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn transfer_requires_valid_roster() {
        let two_owners = roster(&[
            ('A', RoleLevel::Owner),
            ('B', RoleLevel::Owner),
            ('C', RoleLevel::Member),
        ]);

        assert_eq!(
            transfer_ownership(&two_owners, &'A', &'C'),
            Err(OwnershipError::NotExactlyOneOwner { owners: 2 })
        );
    }

    #[test]
    fn guards_protect_owner() {
        assert_eq!(
            assert_can_withdraw::<char, _>(CircleRole::owner()),
            Err(OwnershipError::OwnerWithdrawal)
        );
        assert!(assert_can_withdraw::<char, _>(CircleRole::manager()).is_ok());

        assert_eq!(
            assert_can_remove_member::<char, _>(CircleSessionRole::owner()),
            Err(OwnershipError::OwnerRemoval)
        );
        assert!(assert_can_remove_member::<char, _>(CircleSessionRole::member()).is_ok());

        for (current, next) in [
            (CircleRole::owner(), CircleRole::manager()),
            (CircleRole::manager(), CircleRole::owner()),
            (CircleRole::member(), CircleRole::owner()),
            (CircleRole::owner(), CircleRole::owner()),
        ] {
            let result = assert_can_change_member_role::<char, _>(current, next);
            assert_eq!(result, Err(OwnershipError::OwnerRoleChange));
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidOperation);
        }

        assert!(
            assert_can_change_member_role::<char, _>(CircleRole::member(), CircleRole::manager())
                .is_ok()
        );
        assert!(
            assert_can_change_member_role::<char, _>(CircleRole::manager(), CircleRole::member())
                .is_ok()
        );
    }

    #[test]
    fn add_remove_withdraw() {
        let roster = add(&CircleSessionRoster::new(), 'A', CircleSessionRole::owner()).unwrap();
        let roster = add(&roster, 'B', CircleSessionRole::member()).unwrap();
        let roster = add(&roster, 'C', CircleSessionRole::manager()).unwrap();

        assert_eq!(
            add(&roster, 'B', CircleSessionRole::manager()),
            Err(OwnershipError::AlreadyMember('B'))
        );

        let roster = remove(&roster, &'B').unwrap();
        assert!(!roster.contains(&'B'));
        assert_eq!(remove(&roster, &'A'), Err(OwnershipError::OwnerRemoval));
        assert_eq!(remove(&roster, &'B'), Err(OwnershipError::MemberNotFound('B')));

        let roster = withdraw(&roster, &'C').unwrap();
        assert_eq!(roster.members(), vec!['A']);
        assert_eq!(withdraw(&roster, &'A'), Err(OwnershipError::OwnerWithdrawal));
    }

    #[test]
    fn change_role_between_manager_and_member() {
        let before = roster(&[('A', RoleLevel::Owner), ('B', RoleLevel::Member)]);

        let promoted = change_role(&before, &'B', CircleRole::manager()).unwrap();
        assert_eq!(promoted.role(&'B'), Some(CircleRole::manager()));

        let demoted = change_role(&promoted, &'B', CircleRole::member()).unwrap();
        assert_eq!(demoted, before);

        assert_eq!(
            change_role(&before, &'B', CircleRole::owner()),
            Err(OwnershipError::OwnerRoleChange)
        );
        assert_eq!(
            change_role(&before, &'A', CircleRole::manager()),
            Err(OwnershipError::OwnerRoleChange)
        );
        assert_eq!(
            change_role(&before, &'Z', CircleRole::manager()),
            Err(OwnershipError::MemberNotFound('Z'))
        );
    }

    #[test]
    fn mutations_require_valid_result() {
        // Owner-less roster left behind by some earlier defect: nothing may build on it.
        let broken = roster(&[('A', RoleLevel::Manager), ('B', RoleLevel::Member)]);

        assert_eq!(
            remove(&broken, &'B'),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
        assert_eq!(
            change_role(&broken, &'B', CircleRole::manager()),
            Err(OwnershipError::NotExactlyOneOwner { owners: 0 })
        );
    }

    #[test]
    fn capacity() {
        let roster = roster(&[('A', RoleLevel::Owner), ('B', RoleLevel::Member)]);

        assert!(assert_has_capacity(&roster, None).is_ok());
        assert!(assert_has_capacity(&roster, Some(3)).is_ok());
        assert_eq!(
            assert_has_capacity(&roster, Some(2)),
            Err(OwnershipError::RosterFull { limit: 2 })
        );
    }
}
