//! Number formatting straight into the buffer.

use core::fmt::Write as _;

use crate::buffer::ByteBuffer;
use crate::config::FloatFormat;

/// Number of decimal digits in `value`; zero has one.
pub fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Write `value` in base 10.
///
/// The width is known up front, so digits are produced least significant
/// first and stored directly at their final offsets.
pub fn write_u64(buf: &mut ByteBuffer, value: u64) {
    let digits = buf.claim(digit_count(value));
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
}

/// Write `value` in base 10 with a leading `-` for negatives.
pub fn write_i64(buf: &mut ByteBuffer, value: i64) {
    if value < 0 {
        buf.put(b'-');
    }
    write_u64(buf, value.unsigned_abs());
}

/// Write `value` as a JSON number that always carries a fractional part.
///
/// Non-finite values have no JSON spelling and are written as `null`.
pub fn write_f64(buf: &mut ByteBuffer, value: f64, format: FloatFormat) {
    if !value.is_finite() {
        buf.put_slice(b"null");
        return;
    }

    // Writing into the buffer only grows it, so formatting cannot fail here.
    match format {
        FloatFormat::Shortest => {
            let start = buf.position();
            let _ = write!(buf, "{value}");
            if !buf.as_bytes()[start..].contains(&b'.') {
                buf.put_slice(b".0");
            }
        }
        FloatFormat::Fixed(precision) => {
            let precision =
                precision.clamp(FloatFormat::MIN_PRECISION, FloatFormat::MAX_PRECISION);
            let _ = write!(buf, "{value:.*}", precision as usize);
        }
    }
}
