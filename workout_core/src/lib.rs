#![forbid(unsafe_code)]

//! Core domain model and business logic for the Treino workout engine.
//!
//! This crate provides:
//! - Domain types (exercises, plans, history entries)
//! - Muscle group taxonomy and the exercise catalog
//! - Time-cost model and recommended workout generator
//! - Active session state machine with rest timers
//! - Performance analytics over the history log
//! - Persistence (JSON documents, CSV export)

pub mod types;
pub mod error;
pub mod taxonomy;
pub mod catalog;
pub mod cost;
pub mod config;
pub mod logging;
pub mod generator;
pub mod plans;
pub mod history;
pub mod session;
pub mod analytics;
pub mod store;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use taxonomy::MuscleGroup;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use generator::{
    generate, generate_recommended, GeneratedWorkout, GeneratorSettings, KeepOrder,
    PoolOrdering, RandomOrdering, SeededOrdering,
};
pub use plans::{PlanBook, PlanDraft};
pub use history::HistoryLog;
pub use session::{
    ActiveSession, ManualClock, RestClock, Session, SessionEvent, SessionPhase, SessionProgress,
    SystemClock,
};
pub use analytics::{AnalyticsReport, CalendarDay, Granularity, NavContext};
pub use store::DataStore;
pub use csv_export::export_history;
