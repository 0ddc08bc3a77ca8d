//! String content escaping.

use crate::buffer::ByteBuffer;
use crate::config::ControlCharPolicy;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Write `s` as JSON string content (no surrounding quotes).
///
/// Quote and backslash are escaped, `\n`, `\r` and `\t` use their short
/// forms, and multi-byte UTF-8 passes through untouched. Any other byte
/// below 0x20 is handled according to `policy`.
pub fn write_escaped(buf: &mut ByteBuffer, s: &str, policy: ControlCharPolicy) {
    let bytes = s.as_bytes();
    buf.reserve(bytes.len());

    let mut start = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        let short: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1f => b"",
            _ => continue,
        };

        if start < index {
            buf.put_slice(&bytes[start..index]);
        }
        start = index + 1;

        if !short.is_empty() {
            buf.put_slice(short);
        } else if policy == ControlCharPolicy::Escape {
            buf.put_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[(byte >> 4) as usize],
                HEX[(byte & 0xf) as usize],
            ]);
        }
    }

    if start < bytes.len() {
        buf.put_slice(&bytes[start..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonEncoder;
    use crate::config::{EncoderConfig, LineBreak};
    use proptest::prelude::*;

    fn escaped(s: &str, policy: ControlCharPolicy) -> String {
        let mut buf = ByteBuffer::default();
        write_escaped(&mut buf, s, policy);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn plain_text_is_copied() {
        assert_eq!(escaped("hello world", ControlCharPolicy::Escape), "hello world");
        assert_eq!(escaped("", ControlCharPolicy::Escape), "");
    }

    #[test]
    fn short_escapes() {
        assert_eq!(
            escaped("a\\b\nc\rd\te\"f", ControlCharPolicy::Escape),
            r#"a\\b\nc\rd\te\"f"#
        );
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(escaped("pena 🪶 ção", ControlCharPolicy::Escape), "pena 🪶 ção");
    }

    #[test]
    fn control_chars_are_unicode_escaped_by_default() {
        assert_eq!(
            escaped("a\u{0}b\u{1f}c\u{7}", ControlCharPolicy::Escape),
            r"a\u0000b\u001fc\u0007"
        );
    }

    #[test]
    fn control_chars_can_be_dropped() {
        assert_eq!(escaped("a\u{0}b\u{1b}c\n", ControlCharPolicy::Drop), r"abc\n");
    }

    proptest! {
        /// Property: any string survives encoding and a standard JSON parse.
        #[test]
        fn escaped_strings_parse_back(value in any::<String>()) {
            let config = EncoderConfig {
                line_break: LineBreak::Lf,
                control_chars: ControlCharPolicy::Escape,
                ..EncoderConfig::default()
            };
            let mut out = Vec::new();
            let mut json = JsonEncoder::with_config(&mut out, config).unwrap();
            json.write_string(&value);
            json.flush().unwrap();
            drop(json);

            let line = std::str::from_utf8(&out).unwrap();
            let line = line.strip_suffix('\n').unwrap();
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            prop_assert_eq!(parsed, serde_json::Value::String(value));
        }
    }
}
