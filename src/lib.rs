// Library interface for flagplan modules
// This allows integration tests to access the core functionality

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod plans;
pub mod store;

// Re-export commonly used types for convenience
pub use builder::{AddOutcome, CompositionList, Totals};
pub use catalog::{Catalog, DrillFilter};
pub use error::{FlagPlanError, Result};
pub use export::{ExportFormat, ExportSink, FileSink, PlanDocument};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{
    BuilderEntry, Drill, DrillCategory, DrillLevel, Locale, LocalizedText, PlanEntry, TrainingPlan,
};
pub use plans::{PlanStore, SaveRequest};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
