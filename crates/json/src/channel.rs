//! Output channel abstraction.
//!
//! The encoder only ever needs two things from its destination: take a whole
//! record in one call, and release. Any [`std::io::Write`] qualifies.
//!
//! Ownership decides what "release" means. An encoder built over an owned
//! writer (for example [`std::io::Stdout`] via [`crate::JsonEncoder::stdout`], or
//! a `File`) drops it on close. An encoder built over `&mut W` only flushes it;
//! the stream stays with whoever lent it.

use std::io::{self, Write};

/// Destination for finished records.
pub trait Channel {
    /// Write all of `bytes`, blocking as long as needed.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Release the channel. Called at most once by the encoder.
    fn close(&mut self) -> io::Result<()>;
}

impl<W> Channel for W
where
    W: Write + ?Sized,
{
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(self, bytes)
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}
