// Library exports for the Gait Coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
