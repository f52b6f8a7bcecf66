//! Pose recognition: landmark geometry, the pose catalog, orientation,
//! joint-angle matching and corrective feedback.

pub mod builtin;
pub mod catalog;
pub mod config;
pub mod geometry;
pub mod landmarks;
pub mod matcher;
pub mod orientation;
pub mod quality;
pub mod sample;
pub mod types;

pub use catalog::{PoseCatalog, PoseDefinition};
pub use config::AnalysisConfig;
pub use landmarks::{Landmark, Landmarks};
pub use matcher::{MatchOutcome, PoseMatcher};
pub use quality::QualityAnalyzer;
