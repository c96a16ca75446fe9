//! Emotion logging session
//!
//! Couples one `Navigator` with a `SessionFinalizer`. After a successful
//! submit the navigator is always back at the roots, whether or not the
//! store accepted the record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainResult, NavEvent, NavInput, Navigator, PendingSelection, SessionId, SessionRecord,
    Taxonomy,
};
use crate::application::services::SessionFinalizer;

/// Result of a submit that passed validation.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: SessionRecord,
    /// Store result; a failure here is reported, never rolled back.
    pub persisted: ApplicationResult<SessionId>,
}

impl SubmitOutcome {
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }
}

pub struct EmotionSession {
    navigator: Navigator,
    finalizer: SessionFinalizer,
}

impl EmotionSession {
    pub fn new(taxonomy: Arc<Taxonomy>, finalizer: SessionFinalizer) -> Self {
        Self {
            navigator: Navigator::new(taxonomy),
            finalizer,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.navigator.pending()
    }

    /// Forward a gesture to the navigator.
    pub fn apply(&mut self, input: NavInput) -> DomainResult<NavEvent> {
        self.navigator.apply(input)
    }

    /// Finalize the pending selection, reset navigation, then persist.
    ///
    /// A validation error keeps the selection pending so the caller can
    /// re-prompt with the same leaf.
    pub fn submit(&mut self, intensity: i64, trigger: &str) -> ApplicationResult<SubmitOutcome> {
        let pending = self
            .navigator
            .pending()
            .ok_or(ApplicationError::NothingPending)?;
        let record = self.finalizer.finalize(pending, intensity, trigger)?;

        self.navigator.reset();

        let persisted = self.finalizer.persist(&record);
        match &persisted {
            Ok(id) => info!("logged {} as {}", record.leaf_emotion, id),
            Err(e) => warn!("session not saved: {}", e),
        }
        Ok(SubmitOutcome { record, persisted })
    }
}
