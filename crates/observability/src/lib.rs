//! Diagnostics for the plume crates themselves.
//!
//! The encoder and the logger tree report growth, creation and propagation
//! through `tracing`. This crate wires those events to a subscriber.

/// Initialize process-wide diagnostics with the default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber setup (filters, output format).
pub mod tracing;
