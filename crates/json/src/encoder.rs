//! Streaming JSON encoder.
//!
//! Every value write leaves exactly one trailing `,` behind it. Structural
//! closes rely on that: they replace the separator left by the last member
//! with the closing byte, or append the closing byte when the container is
//! empty. Closed containers then get their own trailing `,` so they can sit
//! inside a parent like any other value, and `flush` drops the one left after
//! the outermost container.
//!
//! ```
//! use plume_json::JsonEncoder;
//!
//! let mut out = Vec::new();
//! let mut json = JsonEncoder::new(&mut out);
//! json.open_object();
//! json.write_string_value("msg", "hello");
//! json.write_i64_value("n", 42);
//! json.close_object();
//! json.flush().unwrap();
//! drop(json);
//!
//! assert!(out.starts_with(br#"{"msg":"hello","n":42}"#));
//! ```

use std::io;

use crate::buffer::ByteBuffer;
use crate::channel::Channel;
use crate::config::{ControlCharPolicy, EncoderConfig, FloatFormat};
use crate::error::EncodeError;
use crate::{escape, number};

const QUOTE: u8 = b'"';
const ENTRY_SEP: u8 = b':';
const KV_SEP: u8 = b',';
const OPEN_OBJ: u8 = b'{';
const CLOSE_OBJ: u8 = b'}';
const OPEN_ARR: u8 = b'[';
const CLOSE_ARR: u8 = b']';

const TRUE: &[u8] = b"true";
const FALSE: &[u8] = b"false";
const NULL: &[u8] = b"null";

/// Writes JSON records into a growable buffer and flushes them as lines.
///
/// Not meant to be shared between threads; give each thread its own encoder.
pub struct JsonEncoder<C: Channel> {
    buffer: ByteBuffer,
    channel: Option<C>,
    line_break: &'static [u8],
    control_chars: ControlCharPolicy,
    float_format: FloatFormat,
    /// Containers opened and not yet closed in the pending record.
    depth: usize,
    stray_close: bool,
}

impl JsonEncoder<io::Stdout> {
    /// Encoder over its own handle to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<C: Channel> JsonEncoder<C> {
    pub fn new(channel: C) -> Self {
        Self::build(channel, EncoderConfig::default())
    }

    pub fn with_config(channel: C, config: EncoderConfig) -> Result<Self, EncodeError> {
        config.validate()?;
        Ok(Self::build(channel, config))
    }

    fn build(channel: C, config: EncoderConfig) -> Self {
        Self {
            buffer: ByteBuffer::with_capacity(config.initial_capacity),
            channel: Some(channel),
            line_break: config.line_break.as_bytes(),
            control_chars: config.control_chars,
            float_format: config.float_format,
            depth: 0,
            stray_close: false,
        }
    }

    // --- structure -------------------------------------------------------

    pub fn open_object(&mut self) {
        self.open_with(OPEN_OBJ);
    }

    pub fn open_array(&mut self) {
        self.open_with(OPEN_ARR);
    }

    /// Open an object as the value of `key` in the enclosing object.
    pub fn open_object_key(&mut self, key: &str) {
        self.write_key(key);
        self.open_with(OPEN_OBJ);
    }

    /// Open an array as the value of `key` in the enclosing object.
    pub fn open_array_key(&mut self, key: &str) {
        self.write_key(key);
        self.open_with(OPEN_ARR);
    }

    pub fn close_object(&mut self) {
        self.close_with(CLOSE_OBJ);
    }

    pub fn close_array(&mut self) {
        self.close_with(CLOSE_ARR);
    }

    fn open_with(&mut self, open: u8) {
        self.buffer.put(open);
        self.depth += 1;
    }

    /// A close with nothing open writes nothing and fails the next flush.
    fn close_with(&mut self, close: u8) {
        let Some(depth) = self.depth.checked_sub(1) else {
            self.stray_close = true;
            return;
        };
        self.depth = depth;

        if self.buffer.last() == Some(KV_SEP) {
            self.buffer.set_last(close);
        } else {
            self.buffer.put(close);
        }
        self.buffer.put(KV_SEP);
    }

    // --- values ----------------------------------------------------------

    pub fn write_string(&mut self, value: &str) {
        self.buffer.reserve(value.len() + 3);
        self.buffer.put(QUOTE);
        escape::write_escaped(&mut self.buffer, value, self.control_chars);
        self.buffer.put(QUOTE);
        self.buffer.put(KV_SEP);
    }

    pub fn write_i64(&mut self, value: i64) {
        number::write_i64(&mut self.buffer, value);
        self.buffer.put(KV_SEP);
    }

    pub fn write_u64(&mut self, value: u64) {
        number::write_u64(&mut self.buffer, value);
        self.buffer.put(KV_SEP);
    }

    /// NaN and infinities are written as `null`.
    pub fn write_f64(&mut self, value: f64) {
        number::write_f64(&mut self.buffer, value, self.float_format);
        self.buffer.put(KV_SEP);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.put_slice(if value { TRUE } else { FALSE });
        self.buffer.put(KV_SEP);
    }

    pub fn write_null(&mut self) {
        self.buffer.put_slice(NULL);
        self.buffer.put(KV_SEP);
    }

    // --- keyed values ----------------------------------------------------

    pub fn write_string_value(&mut self, key: &str, value: &str) {
        self.write_key(key);
        self.write_string(value);
    }

    pub fn write_i64_value(&mut self, key: &str, value: i64) {
        self.write_key(key);
        self.write_i64(value);
    }

    pub fn write_u64_value(&mut self, key: &str, value: u64) {
        self.write_key(key);
        self.write_u64(value);
    }

    pub fn write_f64_value(&mut self, key: &str, value: f64) {
        self.write_key(key);
        self.write_f64(value);
    }

    pub fn write_bool_value(&mut self, key: &str, value: bool) {
        self.write_key(key);
        self.write_bool(value);
    }

    pub fn write_null_value(&mut self, key: &str) {
        self.write_key(key);
        self.write_null();
    }

    fn write_key(&mut self, key: &str) {
        self.write_string(key);
        self.write_entry_sep();
    }

    // --- raw access ------------------------------------------------------

    /// Turn the separator left by a just-written key into `:`.
    pub fn write_entry_sep(&mut self) {
        if self.buffer.last() == Some(KV_SEP) {
            self.buffer.set_last(ENTRY_SEP);
        } else {
            self.buffer.put(ENTRY_SEP);
        }
    }

    pub fn write_sep(&mut self) {
        self.buffer.put(KV_SEP);
    }

    /// Escaped string content with no quotes and no separator.
    pub fn write_raw_str(&mut self, value: &str) {
        escape::write_escaped(&mut self.buffer, value, self.control_chars);
    }

    /// Bytes copied verbatim. The caller is responsible for their validity.
    pub fn write_raw_bytes(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_none()
    }

    /// Containers opened and not yet closed in the pending record.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.depth = 0;
        self.stray_close = false;
    }

    // --- output ----------------------------------------------------------

    /// Terminate the pending record and hand it to the channel in one write.
    ///
    /// The buffer is reset whether or not the write succeeds, so a failed
    /// record is never resent as the prefix of the next one. An empty buffer
    /// writes nothing.
    ///
    /// A record whose opens and closes do not balance is discarded instead of
    /// written, and reported as [`EncodeError::Unclosed`] or
    /// [`EncodeError::StrayClose`].
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        if self.channel.is_none() {
            return Err(EncodeError::Closed);
        }

        let unbalanced = if self.stray_close {
            Some(EncodeError::StrayClose)
        } else if self.depth > 0 {
            Some(EncodeError::Unclosed { open: self.depth })
        } else {
            None
        };
        if let Some(error) = unbalanced {
            tracing::debug!(%error, "discarding unbalanced json record");
            self.reset();
            return Err(error);
        }

        let channel = self.channel.as_mut().ok_or(EncodeError::Closed)?;
        if self.buffer.is_empty() {
            return Ok(());
        }

        if self.buffer.last() == Some(KV_SEP) {
            self.buffer.pop();
        }
        self.buffer.put_slice(self.line_break);

        let written = channel.write_all(self.buffer.as_bytes());
        self.reset();
        written?;
        Ok(())
    }

    /// Release the channel. Unflushed bytes are discarded.
    ///
    /// Calling this again is a no-op.
    pub fn close(&mut self) -> Result<(), EncodeError> {
        let Some(mut channel) = self.channel.take() else {
            return Ok(());
        };

        if !self.buffer.is_empty() {
            tracing::debug!(
                pending = self.buffer.position(),
                "discarding unflushed json record on close"
            );
        }
        self.reset();

        channel.close()?;
        Ok(())
    }

    /// Take the channel back without closing it.
    pub fn into_channel(mut self) -> Option<C> {
        self.channel.take()
    }
}

impl<C: Channel> Drop for JsonEncoder<C> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(%error, "failed to close json encoder channel");
        }
    }
}

impl<C: Channel> core::fmt::Debug for JsonEncoder<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonEncoder")
            .field("buffer", &self.buffer)
            .field("closed", &self.is_closed())
            .field("control_chars", &self.control_chars)
            .field("float_format", &self.float_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineBreak;

    fn lf_config() -> EncoderConfig {
        EncoderConfig {
            line_break: LineBreak::Lf,
            ..EncoderConfig::default()
        }
    }

    fn encoder(out: &mut Vec<u8>) -> JsonEncoder<&mut Vec<u8>> {
        JsonEncoder::with_config(out, lf_config()).unwrap()
    }

    fn pending<'a>(json: &'a JsonEncoder<&mut Vec<u8>>) -> &'a str {
        core::str::from_utf8(json.as_bytes()).unwrap()
    }

    #[test]
    fn empty_containers() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.close_object();
        assert_eq!(pending(&json), "{},");

        json.flush().unwrap();
        json.open_array();
        json.close_array();
        json.flush().unwrap();
        drop(json);

        assert_eq!(out, b"{}\n[]\n");
    }

    #[test]
    fn single_and_many_members_have_no_trailing_separator() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_array();
        json.write_i64(1);
        json.close_array();
        json.flush().unwrap();

        json.open_array();
        json.write_i64(1);
        json.write_string("two");
        json.write_bool(false);
        json.close_array();
        json.flush().unwrap();
        drop(json);

        assert_eq!(String::from_utf8(out).unwrap(), "[1]\n[1,\"two\",false]\n");
    }

    #[test]
    fn keyed_values() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.write_string_value("s", "v");
        json.write_i64_value("i", -3);
        json.write_u64_value("u", 0);
        json.write_f64_value("f", 0.0);
        json.write_bool_value("b", true);
        json.write_null_value("n");
        json.close_object();

        assert_eq!(
            pending(&json),
            r#"{"s":"v","i":-3,"u":0,"f":0.0,"b":true,"n":null},"#
        );
    }

    #[test]
    fn nested_containers() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.open_object_key("a");
        json.write_i64_value("b", 1);
        json.close_object();
        json.open_array_key("c");
        json.open_object();
        json.close_object();
        json.open_array();
        json.close_array();
        json.close_array();
        json.open_object_key("d");
        json.close_object();
        json.close_object();
        json.flush().unwrap();
        drop(json);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"a\":{\"b\":1},\"c\":[{},[]],\"d\":{}}\n"
        );
    }

    #[test]
    fn raw_writes() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.write_raw_bytes(b"\"pre");
        json.write_raw_str("fix\n\"");
        json.write_raw_bytes(b"\"");
        json.write_sep();
        json.write_entry_sep();
        json.write_i64(1);
        json.close_object();

        assert_eq!(pending(&json), r#"{"prefix\n\"":1},"#);
    }

    #[test]
    fn flushing_nothing_writes_nothing() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);
        json.flush().unwrap();
        drop(json);
        assert!(out.is_empty());
    }

    #[test]
    fn crlf_line_break() {
        let mut out = Vec::new();
        let config = EncoderConfig {
            line_break: LineBreak::CrLf,
            ..EncoderConfig::default()
        };
        let mut json = JsonEncoder::with_config(&mut out, config).unwrap();
        json.open_object();
        json.close_object();
        json.flush().unwrap();
        drop(json);
        assert_eq!(out, b"{}\r\n");
    }

    #[test]
    fn close_is_idempotent_and_blocks_flush() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.close_object();
        json.close().unwrap();
        json.close().unwrap();

        assert!(json.is_closed());
        assert!(json.as_bytes().is_empty());
        assert!(matches!(json.flush(), Err(EncodeError::Closed)));
        drop(json);

        assert!(out.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EncoderConfig {
            initial_capacity: 1,
            ..EncoderConfig::default()
        };
        let result = JsonEncoder::with_config(Vec::new(), config);
        assert!(matches!(result, Err(EncodeError::Config(_))));
    }

    #[test]
    fn into_channel_returns_the_writer() {
        let mut json = JsonEncoder::with_config(Vec::new(), lf_config()).unwrap();
        json.open_array();
        json.close_array();
        json.flush().unwrap();

        let out = json.into_channel().unwrap();
        assert_eq!(out, b"[]\n");
    }

    #[test]
    fn unclosed_record_is_discarded_not_flushed() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_object();
        json.write_i64_value("a", 1);
        json.open_object_key("b");
        assert_eq!(json.depth(), 2);

        let err = json.flush().unwrap_err();
        assert!(matches!(err, EncodeError::Unclosed { open: 2 }));
        assert_eq!(json.depth(), 0);
        assert!(json.as_bytes().is_empty());

        json.open_object();
        json.write_i64_value("next", 2);
        json.close_object();
        json.flush().unwrap();
        drop(json);

        assert_eq!(String::from_utf8(out).unwrap(), "{\"next\":2}\n");
    }

    #[test]
    fn close_without_open_is_discarded_not_flushed() {
        let mut out = Vec::new();
        let mut json = encoder(&mut out);

        json.open_array();
        json.write_i64(1);
        json.close_array();
        json.close_object();
        assert_eq!(pending(&json), "[1],");

        assert!(matches!(json.flush(), Err(EncodeError::StrayClose)));
        assert!(json.as_bytes().is_empty());

        json.close_array();
        assert!(matches!(json.flush(), Err(EncodeError::StrayClose)));

        json.open_array();
        json.close_array();
        json.flush().unwrap();
        drop(json);

        assert_eq!(out, b"[]\n");
    }
}
