//! Domain layer: wire types, errors, configuration.

pub mod config;
pub mod error;
pub mod types;
