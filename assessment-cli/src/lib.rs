// Library exports for the fitness assessment CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
