//! Wiring shared by every command
//!
//! Opens the file-backed store, restores the persisted session and builds
//! the lifecycle dispatcher the commands write through.

use std::sync::Arc;

use crate::auth::{ActorProvider, AuthService, Session, SessionFile};
use crate::config::{paths::RegisterPaths, settings::Settings};
use crate::error::{RegisterError, RegisterResult};
use crate::hooks::{default_registry, StampQueue};
use crate::lifecycle::LifecycleStore;
use crate::models::Actor;
use crate::storage::{JsonStore, Store};

/// Everything a command handler needs
pub struct RegisterApp {
    pub paths: RegisterPaths,
    pub settings: Settings,
    raw: Arc<JsonStore>,
    store: Arc<LifecycleStore>,
    session: Arc<Session>,
}

impl RegisterApp {
    pub fn open(paths: RegisterPaths, settings: Settings) -> RegisterResult<Self> {
        paths.ensure_directories()?;

        let raw = Arc::new(JsonStore::open(paths.data_dir())?);

        let session = Arc::new(Session::anonymous());
        if let Some(saved) = SessionFile::load(&paths.session_file())? {
            session.sign_in(saved.actor);
        }

        let stamps = Arc::new(StampQueue::open(paths.pending_stamps_file())?);
        let store = LifecycleStore::builder(raw.clone())
            .registry(default_registry(&settings))
            .actors(session.clone())
            .audit_enabled(settings.audit_enabled)
            .stamp_queue(stamps)
            .stamp_timeout(settings.stamp_timeout())
            .build();

        Ok(Self {
            paths,
            settings,
            raw,
            store: Arc::new(store),
            session,
        })
    }

    /// The lifecycle dispatcher
    pub fn store(&self) -> &Arc<LifecycleStore> {
        &self.store
    }

    /// The dispatcher as a plain `Store`
    pub fn dyn_store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// The backend underneath, bypassing hooks and audit
    pub fn raw(&self) -> Arc<dyn Store> {
        self.raw.clone()
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.raw(), self.store.audit().clone(), self.session.clone())
    }

    pub fn current_actor(&self) -> Option<Actor> {
        self.session.current_actor()
    }

    pub fn require_actor(&self) -> RegisterResult<Actor> {
        self.current_actor().ok_or_else(|| {
            RegisterError::Auth("Not logged in. Run 'register login <name>' first.".into())
        })
    }

    /// Default page size for list commands
    pub fn page_size(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.settings.default_page_size).max(1)
    }
}
