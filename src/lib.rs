//! Running gait analysis: cycle segmentation and joint-angle scoring of
//! per-frame pose landmarks.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::AnalysisConfig;
pub use errors::AnalysisError;
