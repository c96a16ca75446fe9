//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{
    EmotionSession, HistoryService, SessionFinalizer, TaxonomyService,
};
use crate::config::Settings;
use crate::domain::Taxonomy;
use crate::infrastructure::store::JsonlSessionStore;
use crate::infrastructure::traits::{Clock, FileSystem, RealFileSystem, SessionStore, SystemClock};
use crate::infrastructure::InfraResult;

/// Container holding shared dependencies and handing out services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Timestamp source for finalized sessions
    pub clock: Arc<dyn Clock>,

    /// Persistence sink and query surface
    pub store: Arc<dyn SessionStore>,

    /// Validated taxonomy, loaded once
    pub taxonomy: Arc<Taxonomy>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// Fails if the configured taxonomy is missing or malformed.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonlSessionStore::new(
            Arc::clone(&fs),
            settings.sessions_path(),
        ));
        Self::with_deps(settings, fs, Arc::new(SystemClock), store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
    ) -> InfraResult<Self> {
        let taxonomy = TaxonomyService::new(Arc::clone(&fs)).load(settings.taxonomy.as_deref())?;
        debug!(
            "container ready: user={}, {} taxonomy nodes",
            settings.user_id,
            taxonomy.node_count()
        );

        Ok(Self {
            settings: Arc::new(settings),
            fs,
            clock,
            store,
            taxonomy: Arc::new(taxonomy),
        })
    }

    /// A fresh navigation session for the configured user.
    pub fn emotion_session(&self) -> EmotionSession {
        let finalizer = SessionFinalizer::new(
            self.settings.user_id.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.store),
        );
        EmotionSession::new(Arc::clone(&self.taxonomy), finalizer)
    }

    pub fn history_service(&self) -> HistoryService {
        HistoryService::new(Arc::clone(&self.store), self.settings.history.offset())
    }

    pub fn taxonomy_service(&self) -> TaxonomyService {
        TaxonomyService::new(Arc::clone(&self.fs))
    }
}
