// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use thiserror::Error;

use crate::ownership::OwnershipError;
use crate::policy::Action;

/// Kinds of failures the calling layer maps to client-facing errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A policy denied the action.
    Forbidden,

    /// A mutation would leave a roster with zero or several owners.
    InvariantViolation,

    /// A member involved in a mutation is not on the roster.
    NotFound,

    /// The mutation makes no sense, for example a self-transfer or a generic change of the Owner
    /// role. Also covers creating a session which belongs to another circle.
    InvalidOperation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvariantViolation => "invariant violation",
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidOperation => "invalid operation",
        };

        write!(f, "{}", s)
    }
}

/// Error returned when gating or applying a roster mutation.
///
/// `E` is the error type of the membership store.
#[derive(Debug, Error)]
pub enum AccessError<ID, E> {
    /// Policy denied the action. The message never names the failed rule.
    #[error("actor is not allowed to {0}")]
    Forbidden(Action),

    #[error(transparent)]
    Ownership(#[from] OwnershipError<ID>),

    /// Circle session is already linked to a different circle.
    #[error("circle session belongs to another circle")]
    ForeignSession,

    #[error("membership store error: {0}")]
    Store(E),
}

impl<ID, E> AccessError<ID, E> {
    /// Error kind of this failure, `None` for store failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AccessError::Forbidden(_) => Some(ErrorKind::Forbidden),
            AccessError::Ownership(err) => Some(err.kind()),
            AccessError::ForeignSession => Some(ErrorKind::InvalidOperation),
            AccessError::Store(_) => None,
        }
    }
}
