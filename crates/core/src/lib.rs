//! `plume-core`: shared building blocks for the plume logging backend.
//!
//! This crate holds the pieces both the encoder and the logger tree agree on:
//! hierarchical logger names and the common error model.

pub mod error;
pub mod path;

pub use error::{CoreError, CoreResult};
pub use path::LoggerPath;
