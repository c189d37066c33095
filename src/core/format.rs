//! Value formatting for text and JSON output

use super::attr::Value;
use super::pool::Buffer;
use super::quoting::quote;
use super::timestamp::rfc3339_nanos;
use std::fmt::Write;

/// Fractional digits used for floats in text output
pub const FLOAT_PRECISION: usize = 10;

/// Append the text form of a resolved, non-group value
pub fn append_text_value(buf: &mut Buffer, value: &Value) {
    // Writing into a `Buffer` cannot fail.
    let _ = match value {
        Value::Null => {
            buf.write_str("null");
            Ok(())
        }
        Value::String(s) => {
            buf.write_str(&quote(s));
            Ok(())
        }
        Value::Int(i) => write!(buf, "{}", i),
        Value::Uint(u) => write!(buf, "{}", u),
        Value::Float(f) => write!(buf, "{:.*}", FLOAT_PRECISION, f),
        Value::Bool(b) => {
            buf.write_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Time(t) => {
            buf.write_str(&rfc3339_nanos(t));
            Ok(())
        }
        Value::Duration(d) => write!(buf, "{:?}", d),
        Value::Any(_) | Value::Group(_) | Value::Lazy(_) => {
            let s = value.to_string();
            buf.write_str(&quote(&s));
            Ok(())
        }
    };
}

/// Append the JSON form of a resolved, non-group value
pub fn append_json_value(buf: &mut Buffer, value: &Value) -> serde_json::Result<()> {
    match value {
        Value::Null => {
            buf.write_str("null");
            Ok(())
        }
        Value::String(s) => append_json_string(buf, s),
        Value::Int(i) => serde_json::to_writer(buf, i),
        Value::Uint(u) => serde_json::to_writer(buf, u),
        Value::Float(f) => serde_json::to_writer(buf, f),
        Value::Bool(b) => serde_json::to_writer(buf, b),
        Value::Time(t) => append_json_string(buf, &rfc3339_nanos(t)),
        Value::Duration(d) => serde_json::to_writer(buf, &d.as_nanos()),
        Value::Any(_) | Value::Group(_) | Value::Lazy(_) => {
            append_json_string(buf, &value.to_string())
        }
    }
}

/// Append `s` as an escaped JSON string
pub fn append_json_string(buf: &mut Buffer, s: &str) -> serde_json::Result<()> {
    serde_json::to_writer(buf, s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn text(value: Value) -> String {
        let mut buf = Buffer::default();
        append_text_value(&mut buf, &value);
        String::from_utf8(buf.into_vec()).unwrap()
    }

    fn json(value: Value) -> String {
        let mut buf = Buffer::default();
        append_json_value(&mut buf, &value).unwrap();
        String::from_utf8(buf.into_vec()).unwrap()
    }

    #[test]
    fn test_text_scalars() {
        assert_eq!(text(Value::Int(-42)), "-42");
        assert_eq!(text(Value::Uint(7)), "7");
        assert_eq!(text(Value::Bool(true)), "true");
        assert_eq!(text(Value::Float(1.5)), "1.5000000000");
        assert_eq!(text(Value::Null), "null");
    }

    #[test]
    fn test_text_strings_follow_quoting_rule() {
        assert_eq!(text("value1".into()), "value1");
        assert_eq!(text("inner value".into()), "\"inner value\"");
        assert_eq!(text("".into()), "\"\"");
        assert_eq!(text("a\tb".into()), "a\tb");
    }

    #[test]
    fn test_text_time_and_duration() {
        let t = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        assert_eq!(text(Value::Time(t)), "2025-01-08T10:30:45.000000000Z");
        assert_eq!(text(Value::Duration(Duration::from_millis(1500))), "1.5s");
        assert_eq!(text(Value::Duration(Duration::from_millis(250))), "250ms");
    }

    #[test]
    fn test_text_opaque_value_is_quoted_when_needed() {
        assert_eq!(text(Value::any("plain")), "plain");
        assert_eq!(text(Value::any("has space")), "\"has space\"");
    }

    #[test]
    fn test_json_values() {
        assert_eq!(json("say \"hi\"".into()), r#""say \"hi\"""#);
        assert_eq!(json(Value::Int(3)), "3");
        assert_eq!(json(Value::Float(2.5)), "2.5");
        assert_eq!(json(Value::Float(f64::NAN)), "null");
        assert_eq!(json(Value::Bool(false)), "false");
        assert_eq!(json(Value::Duration(Duration::from_micros(2))), "2000");
        assert_eq!(json(Value::Null), "null");
        assert_eq!(json(Value::any(42)), "\"42\"");
    }
}
