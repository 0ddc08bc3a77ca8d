//! `plume-json`: streaming JSON-lines encoder.
//!
//! A [`JsonEncoder`] writes one log record at a time straight into a growable
//! byte buffer, then hands the finished, newline-terminated line to a
//! [`Channel`] in a single write. No intermediate strings or value trees are
//! built.
//!
//! One encoder is meant to be driven by one thread. Pipelines that log from
//! several threads give each of them its own encoder.

pub mod buffer;
pub mod channel;
pub mod config;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod number;

pub use buffer::ByteBuffer;
pub use channel::Channel;
pub use config::{ControlCharPolicy, EncoderConfig, FloatFormat, LineBreak};
pub use encoder::JsonEncoder;
pub use error::EncodeError;
