//! Domain entities: core data structures

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Lowest accepted intensity rating.
pub const INTENSITY_MIN: u8 = 1;
/// Highest accepted intensity rating.
pub const INTENSITY_MAX: u8 = 10;
/// Value the context prompt starts from.
pub const DEFAULT_INTENSITY: u8 = 5;
/// Triggers longer than this many characters are truncated.
pub const TRIGGER_MAX_CHARS: usize = 200;

/// One category in the emotion taxonomy.
///
/// Nodes are immutable once the taxonomy is loaded. A node whose `children`
/// is empty is a leaf: a terminal, selectable classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionNode {
    /// Unique across the whole taxonomy
    pub id: String,
    /// Display name, also what gets persisted in a session path
    pub name: String,
    /// Color token, e.g. "#FFE066"
    pub color: String,
    pub definition: String,
    pub children: Vec<Arc<EmotionNode>>,
}

impl EmotionNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels in this subtree, counting the node itself.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

impl fmt::Display for EmotionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A committed leaf waiting for intensity and trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    path: Vec<Arc<EmotionNode>>,
    leaf: Arc<EmotionNode>,
}

impl PendingSelection {
    /// `ancestors` is the browsing path above the leaf (may be empty).
    pub fn new(ancestors: &[Arc<EmotionNode>], leaf: Arc<EmotionNode>) -> Self {
        let mut path = ancestors.to_vec();
        path.push(Arc::clone(&leaf));
        Self { path, leaf }
    }

    /// Full ancestry, root first, leaf last. Never empty.
    pub fn path(&self) -> &[Arc<EmotionNode>] {
        &self.path
    }

    pub fn leaf(&self) -> &EmotionNode {
        &self.leaf
    }

    /// Display names in ancestry order.
    pub fn path_names(&self) -> Vec<String> {
        self.path.iter().map(|n| n.name.clone()).collect()
    }
}

/// The finalized record handed to the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: String,
    pub emotion_path: Vec<String>,
    pub leaf_emotion: String,
    pub intensity: u8,
    pub trigger: String,
    /// ISO-8601, UTC, millisecond precision
    pub timestamp: String,
}

/// Identifier assigned by the store when a record is appended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "_id")]
    pub id: SessionId,
    #[serde(flatten)]
    pub record: SessionRecord,
}

/// Coarse wording for an intensity value, as offered while rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityLabel {
    Low,
    Medium,
    High,
    Intense,
}

impl IntensityLabel {
    pub fn for_intensity(intensity: u8) -> Self {
        match intensity {
            0..=3 => Self::Low,
            4..=5 => Self::Medium,
            6..=7 => Self::High,
            _ => Self::Intense,
        }
    }
}

impl fmt::Display for IntensityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Intense => "Intense",
        };
        write!(f, "{s}")
    }
}

/// Three-step band used when colouring history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityBand {
    Low,
    Moderate,
    High,
}

impl IntensityBand {
    pub fn for_intensity(intensity: u8) -> Self {
        match intensity {
            0..=3 => Self::Low,
            4..=6 => Self::Moderate,
            _ => Self::High,
        }
    }
}
