// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Identifier of a user, circle or circle session.
///
/// Identifiers are opaque, they are only ever compared for equality and used as keys.
pub trait IdentityHandle:
    Clone + Debug + Display + Eq + Ord + Hash + Send + Sync + 'static
{
}

impl<T> IdentityHandle for T where
    T: Clone + Debug + Display + Eq + Ord + Hash + Send + Sync + 'static
{
}
