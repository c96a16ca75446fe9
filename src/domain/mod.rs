//! Domain layer: taxonomy, navigation state machine, session entities
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod navigator;
pub mod taxonomy;
pub mod validation;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use navigator::{NavEvent, NavInput, NavState, Navigator, TraversalState};
pub use taxonomy::{RawEmotionNode, Taxonomy};
pub use validation::{format_timestamp, truncate_trigger, validate_intensity};
