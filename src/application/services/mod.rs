//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Clock, SessionStore)
//! but are themselves concrete structs, not traits.

pub mod finalizer;
pub mod history;
pub mod session;
pub mod taxonomy;

pub use finalizer::SessionFinalizer;
pub use history::{calendar_days, group_by_day, HistoryService, MonthHistory, YearMonth};
pub use session::{EmotionSession, SubmitOutcome};
pub use taxonomy::TaxonomyService;
