//! Current actor and persisted sessions
//!
//! `Session` is the in-process answer to "who is acting". `SessionFile` keeps
//! a login alive between CLI invocations.

use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, RegisterResult};
use crate::models::{Actor, SessionId};
use crate::storage::{read_json, write_json_atomic};

/// Source of the identity mutations are attributed to
pub trait ActorProvider: Send + Sync {
    /// The signed-in actor, if any
    fn current_actor(&self) -> Option<Actor>;
}

/// In-process session holding at most one actor
#[derive(Debug, Default)]
pub struct Session {
    actor: RwLock<Option<Actor>>,
}

impl Session {
    /// A session nobody is signed in to
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session already signed in as `actor`
    pub fn signed_in(actor: Actor) -> Self {
        Self {
            actor: RwLock::new(Some(actor)),
        }
    }

    /// Sign in, replacing any current actor
    pub fn sign_in(&self, actor: Actor) {
        let mut current = self.actor.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(actor);
    }

    /// Sign out, returning the actor that was signed in
    pub fn sign_out(&self) -> Option<Actor> {
        let mut current = self.actor.write().unwrap_or_else(|e| e.into_inner());
        current.take()
    }
}

impl ActorProvider for Session {
    fn current_actor(&self) -> Option<Actor> {
        self.actor.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// A login persisted to `session.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub session_id: SessionId,
    pub actor: Actor,
    pub started_at: DateTime<Utc>,
}

impl SessionFile {
    /// Start a new session for `actor`
    pub fn start(actor: Actor) -> Self {
        Self {
            session_id: SessionId::new(),
            actor,
            started_at: Utc::now(),
        }
    }

    /// Load the persisted session, if there is one
    pub fn load(path: &Path) -> RegisterResult<Option<Self>> {
        read_json::<Option<Self>, _>(path).map_err(|e| RegisterError::Auth(format!("Unreadable session file: {}", e)))
    }

    pub fn save(&self, path: &Path) -> RegisterResult<()> {
        write_json_atomic(path, self)
    }

    /// Remove the persisted session; a missing file is not an error
    pub fn clear(path: &Path) -> RegisterResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegisterError::Io(format!(
                "Failed to remove session file: {}",
                e
            ))),
        }
    }
}
