// src/extractors/mod.rs
pub mod incidents;
pub mod models;
pub mod numbers;
pub mod stats;

// Re-export key extraction types for convenience
pub use models::Record;
pub use stats::{StatsExtractor, DEBUG_MARKER_PATTERNS};
