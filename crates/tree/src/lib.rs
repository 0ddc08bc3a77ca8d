//! `plume-tree`: hierarchical logger cache.
//!
//! Loggers live in a tree keyed by [`LoggerPath`] segments. Missing loggers
//! are created on demand from their immediate parent, and a configuration
//! change applied to a node is pushed down to its whole subtree.

pub mod cache;
pub mod logger;

pub use cache::TreeCache;
pub use logger::{Logger, TreeLogger};
pub use plume_core::LoggerPath;
