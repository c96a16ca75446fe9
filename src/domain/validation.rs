//! Session record assembly and the input rules it enforces.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::entities::{
    PendingSelection, SessionRecord, INTENSITY_MAX, INTENSITY_MIN, TRIGGER_MAX_CHARS,
};
use crate::domain::error::{DomainError, DomainResult};

/// Accept 1..=10, reject everything else.
pub fn validate_intensity(value: i64) -> DomainResult<u8> {
    if (INTENSITY_MIN as i64..=INTENSITY_MAX as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(DomainError::IntensityOutOfRange {
            value,
            min: INTENSITY_MIN,
            max: INTENSITY_MAX,
        })
    }
}

/// Keep at most `TRIGGER_MAX_CHARS` characters (not bytes). Never fails.
pub fn truncate_trigger(trigger: &str) -> String {
    match trigger.char_indices().nth(TRIGGER_MAX_CHARS) {
        Some((byte_idx, _)) => trigger[..byte_idx].to_string(),
        None => trigger.to_string(),
    }
}

/// Timestamp format used in records: `2024-03-05T10:00:00.000Z`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl SessionRecord {
    /// Build the canonical record for a committed leaf.
    ///
    /// Pure apart from `now`; identical inputs give identical records.
    pub fn assemble(
        user_id: &str,
        pending: &PendingSelection,
        intensity: i64,
        trigger: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let intensity = validate_intensity(intensity)?;
        Ok(Self {
            user_id: user_id.to_string(),
            emotion_path: pending.path_names(),
            leaf_emotion: pending.leaf().name.clone(),
            intensity,
            trigger: truncate_trigger(trigger),
            timestamp: format_timestamp(now),
        })
    }
}
