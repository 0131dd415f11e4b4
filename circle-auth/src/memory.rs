// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory membership store.
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AccessError;
use crate::membership::{CircleMembership, CircleSessionMembership};
use crate::role::{Circle, CircleSession};
use crate::roster::{CircleRoster, CircleSessionRoster, Roster, RosterChange};
use crate::traits::{IdentityHandle, MembershipLookup, RosterStore, SessionStore};

#[derive(Debug)]
pub struct MemoryStoreInner<ID, CID, SID> {
    users: HashSet<ID>,
    circles: HashMap<CID, CircleRoster<ID>>,
    sessions: HashMap<SID, CircleSessionRoster<ID>>,
    session_circles: HashMap<SID, CID>,
}

/// Users, circle rosters and circle session rosters kept in memory.
///
/// Clones share the same state. Every roster update holds the write lock from reading the current
/// roster until the new one is stored, so concurrent updates of a collection are serialised.
#[derive(Clone, Debug)]
pub struct MemoryStore<ID, CID, SID> {
    pub(crate) inner: Arc<RwLock<MemoryStoreInner<ID, CID, SID>>>,
}

impl<ID, CID, SID> MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    pub fn new() -> Self {
        let inner = MemoryStoreInner {
            users: HashSet::new(),
            circles: HashMap::new(),
            sessions: HashMap::new(),
            session_circles: HashMap::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub async fn register_user(&self, user: ID) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user);
    }

    /// Overwrite the roster of a circle without any checks.
    pub async fn insert_circle_roster(&self, circle: CID, roster: CircleRoster<ID>) {
        let mut inner = self.inner.write().await;
        inner.circles.insert(circle, roster);
    }

    /// Overwrite the roster of a circle session and its link to the circle without any checks.
    pub async fn insert_session_roster(
        &self,
        session: SID,
        circle: CID,
        roster: CircleSessionRoster<ID>,
    ) {
        let mut inner = self.inner.write().await;
        inner.session_circles.insert(session.clone(), circle);
        inner.sessions.insert(session, roster);
    }
}

impl<ID, CID, SID> Default for MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<ID, CID, SID> MembershipLookup for MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    type UserId = ID;
    type CircleId = CID;
    type SessionId = SID;
    type Error = Infallible;

    async fn is_registered_user(&self, user: &ID) -> Result<bool, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner.users.contains(user))
    }

    async fn circle_membership(
        &self,
        user: &ID,
        circle: &CID,
    ) -> Result<CircleMembership, Self::Error> {
        let inner = self.inner.read().await;
        let membership = inner
            .circles
            .get(circle)
            .map(|roster| roster.membership(user))
            .unwrap_or_default();
        Ok(membership)
    }

    async fn session_circle(&self, session: &SID) -> Result<Option<CID>, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner.session_circles.get(session).cloned())
    }

    async fn circle_session_membership(
        &self,
        user: &ID,
        session: &SID,
    ) -> Result<CircleSessionMembership, Self::Error> {
        let inner = self.inner.read().await;
        let membership = inner
            .sessions
            .get(session)
            .map(|roster| roster.membership(user))
            .unwrap_or_default();
        Ok(membership)
    }
}

impl<ID, CID, SID> RosterStore<Circle> for MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    type CollectionId = CID;

    async fn roster(&self, circle: &CID) -> Result<CircleRoster<ID>, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner.circles.get(circle).cloned().unwrap_or_default())
    }

    async fn update<F>(
        &self,
        circle: &CID,
        f: F,
    ) -> Result<Vec<RosterChange<ID, Circle>>, AccessError<ID, Self::Error>>
    where
        F: FnOnce(&Roster<ID, Circle>) -> Result<Roster<ID, Circle>, AccessError<ID, Infallible>>
            + Send,
    {
        let mut inner = self.inner.write().await;
        let current = inner.circles.get(circle).cloned().unwrap_or_default();
        let next = f(&current)?;
        let changes = current.diff(&next);
        inner.circles.insert(circle.clone(), next);
        Ok(changes)
    }
}

impl<ID, CID, SID> RosterStore<CircleSession> for MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    type CollectionId = SID;

    async fn roster(&self, session: &SID) -> Result<CircleSessionRoster<ID>, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(session).cloned().unwrap_or_default())
    }

    async fn update<F>(
        &self,
        session: &SID,
        f: F,
    ) -> Result<Vec<RosterChange<ID, CircleSession>>, AccessError<ID, Self::Error>>
    where
        F: FnOnce(
                &Roster<ID, CircleSession>,
            ) -> Result<Roster<ID, CircleSession>, AccessError<ID, Infallible>>
            + Send,
    {
        let mut inner = self.inner.write().await;
        let current = inner.sessions.get(session).cloned().unwrap_or_default();
        let next = f(&current)?;
        let changes = current.diff(&next);
        inner.sessions.insert(session.clone(), next);
        Ok(changes)
    }
}

impl<ID, CID, SID> SessionStore for MemoryStore<ID, CID, SID>
where
    ID: IdentityHandle,
    CID: IdentityHandle,
    SID: IdentityHandle,
{
    async fn create_session<F>(
        &self,
        session: &SID,
        circle: &CID,
        f: F,
    ) -> Result<Vec<RosterChange<ID, CircleSession>>, AccessError<ID, Self::Error>>
    where
        F: FnOnce(
                &Roster<ID, CircleSession>,
            ) -> Result<Roster<ID, CircleSession>, AccessError<ID, Infallible>>
            + Send,
    {
        let mut inner = self.inner.write().await;
        match inner.session_circles.get(session) {
            Some(parent) if parent != circle => return Err(AccessError::ForeignSession),
            _ => (),
        }

        let current = inner.sessions.get(session).cloned().unwrap_or_default();
        let next = f(&current)?;
        let changes = current.diff(&next);
        inner.sessions.insert(session.clone(), next);
        inner.session_circles.insert(session.clone(), circle.clone());
        Ok(changes)
    }
}
