// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`RosterManager`](crate::RosterManager).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of members a circle roster may hold, unlimited when `None`.
    pub(crate) max_circle_members: Option<usize>,

    /// Maximum number of participants a circle session roster may hold, unlimited when `None`.
    pub(crate) max_session_participants: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_circle_members(mut self, limit: usize) -> Self {
        self.max_circle_members = Some(limit);
        self
    }

    pub fn with_max_session_participants(mut self, limit: usize) -> Self {
        self.max_session_participants = Some(limit);
        self
    }

    pub fn max_circle_members(&self) -> Option<usize> {
        self.max_circle_members
    }

    pub fn max_session_participants(&self) -> Option<usize> {
        self.max_session_participants
    }
}
