//! Session Registry
//!
//! The single source of truth for call state, shared by every protocol
//! front-end and the admin API. Records live in a sharded concurrent map:
//! every operation on one id runs under that shard's lock, so a mutation is
//! applied entirely or not at all and readers never see a half-written
//! record. Operations on ids in different shards do not contend.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::types::{Session, SessionDetails, SessionState, SessionType};

/// In-memory session store
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a new `Pending` session
    ///
    /// Fails with [`RegistryError::DuplicateSession`] if `id` is present, in
    /// which case the stored record is left as it was.
    pub fn create(
        &self,
        id: impl Into<String>,
        session_type: SessionType,
        details: SessionDetails,
    ) -> Result<Session> {
        let id = id.into();
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::duplicate(id)),
            Entry::Vacant(slot) => {
                let session = Session::new(id, session_type, details);
                slot.insert(session.clone());
                debug!(session_id = %session.id, session_type = %session_type, "Session created");
                Ok(session)
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::not_found(id))
    }

    /// Overwrite the state; transitions are not validated
    pub fn update_state(&self, id: &str, state: SessionState) -> Result<Session> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::not_found(id))?;

        entry.state = state;
        entry.touch();
        debug!(session_id = %id, state = %state, "Session state updated");
        Ok(entry.value().clone())
    }

    /// Overlay `partial` onto the stored details, keeping untouched keys
    pub fn update_details(&self, id: &str, partial: SessionDetails) -> Result<Session> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::not_found(id))?;

        let keys = partial.len();
        entry.details.extend(partial);
        entry.touch();
        debug!(session_id = %id, keys, "Session details merged");
        Ok(entry.value().clone())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        match self.sessions.remove(id) {
            Some(_) => {
                debug!(session_id = %id, "Session deleted");
                Ok(())
            }
            None => Err(RegistryError::not_found(id)),
        }
    }

    /// Snapshot of stored sessions, optionally of one type, oldest first
    pub fn list(&self, type_filter: Option<SessionType>) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|entry| type_filter.map_or(true, |t| entry.session_type == t))
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }
}
