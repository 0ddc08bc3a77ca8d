//! Encoder error model.

use plume_core::CoreError;
use thiserror::Error;

/// Errors surfaced by [`crate::JsonEncoder`].
///
/// Writing values never fails; handing a record to the channel, flushing a
/// record whose containers do not balance, and construction from an invalid
/// configuration do.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The channel rejected the record.
    #[error("channel write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The pending record left containers open; nothing was written.
    #[error("unbalanced record: {open} container(s) still open")]
    Unclosed { open: usize },

    /// A container was closed that was never opened; nothing was written.
    #[error("unbalanced record: close without a matching open")]
    StrayClose,

    /// The encoder was already closed.
    #[error("encoder is closed")]
    Closed,

    /// The supplied configuration is out of range.
    #[error(transparent)]
    Config(#[from] CoreError),
}
