//! Session finalizer
//!
//! Turns a pending leaf selection plus user context into a `SessionRecord`
//! and hands records to the session store.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{PendingSelection, SessionId, SessionRecord};
use crate::infrastructure::traits::{Clock, SessionStore};

/// Assembles and persists session records for one user.
pub struct SessionFinalizer {
    user_id: String,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn SessionStore>,
}

impl SessionFinalizer {
    /// `user_id` is an opaque token from the identity provider; it is not validated.
    pub fn new(user_id: impl Into<String>, clock: Arc<dyn Clock>, sink: Arc<dyn SessionStore>) -> Self {
        Self {
            user_id: user_id.into(),
            clock,
            sink,
        }
    }

    /// Build the record. Rejects intensity outside 1..=10 and truncates
    /// the trigger to 200 characters. Does not persist.
    ///
    /// On error the pending selection is untouched and can be retried.
    pub fn finalize(
        &self,
        pending: &PendingSelection,
        intensity: i64,
        trigger: &str,
    ) -> ApplicationResult<SessionRecord> {
        let record =
            SessionRecord::assemble(&self.user_id, pending, intensity, trigger, self.clock.now())?;
        debug!(
            "finalized {} for {} at {} (intensity {})",
            record.leaf_emotion, self.user_id, record.timestamp, record.intensity
        );
        Ok(record)
    }

    /// Append a finalized record to the store.
    #[instrument(level = "debug", skip(self, record), fields(leaf = %record.leaf_emotion))]
    pub fn persist(&self, record: &SessionRecord) -> ApplicationResult<SessionId> {
        self.sink
            .log_session(record)
            .with_context(format!("log session {}", record.leaf_emotion))
    }
}
