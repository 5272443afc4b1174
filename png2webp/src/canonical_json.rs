//! Canonical JSON text for embedded metadata.
//!
//! Metadata values are re-serialized in the form image-generation tools emit
//! and read back: `", "` / `": "` separators on one line, object members in
//! source order, ASCII-only output with `\uXXXX` escapes, and floats in
//! shortest repr form (`8.0`, `1e-05`, `1.5e+16`). Integers keep every digit,
//! and the bare `NaN`, `Infinity` and `-Infinity` tokens are accepted and
//! written back unchanged.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::io::{self, Write};

#[derive(Debug, Default, Clone, Copy)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(f64::from(value)).as_bytes())
    }

    // number text as written in the source (arbitrary_precision)
    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if value.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            let parsed = value
                .parse::<f64>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writer.write_all(format_float(parsed).as_bytes())
        } else if value.trim_start_matches('-').bytes().all(|b| b == b'0') {
            writer.write_all(b"0")
        } else {
            writer.write_all(value.as_bytes())
        }
    }

    // serde_json already escapes quotes, backslashes and C0 controls; whatever
    // reaches here is passed through unless it falls outside printable ASCII.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if fragment.bytes().all(|b| b < 0x7f) {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if (c as u32) < 0x7f {
                let mut buf = [0u8; 1];
                writer.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize a parsed JSON value in canonical form.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, CanonicalFormatter);
    // writing into a Vec cannot fail, and a Value has no non-string map keys
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// String literal standing in for a non-finite token while serde_json parses.
fn placeholder(token: &str) -> String {
    format!("\"\\u0000\\u0001{}\\u0001\\u0000\"", token)
}

/// Swap bare non-finite tokens in value position for placeholder strings.
/// `None` when the text has none.
fn quote_non_finite(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut found = false;
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE.iter().find(|t| rest.starts_with(**t)) {
            // a bare token as an object key stays invalid
            if !rest[token.len()..].trim_start().starts_with(':') {
                out.push_str(&placeholder(token));
                rest = &rest[token.len()..];
                found = true;
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    found.then_some(out)
}

/// Parse `raw` as JSON and re-serialize it canonically.
pub fn canonicalize(raw: &str) -> Result<String, serde_json::Error> {
    let Some(quoted) = quote_non_finite(raw) else {
        let value: Value = serde_json::from_str(raw)?;
        return Ok(to_canonical_string(&value));
    };

    let value: Value = serde_json::from_str(&quoted)?;
    let mut text = to_canonical_string(&value);
    for token in NON_FINITE {
        text = text.replace(&placeholder(token), token);
    }
    Ok(text)
}

/// Shortest round-trip float text: positional for decimal exponents in
/// `-4..16`, scientific otherwise.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.25e-7"
    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        let body = if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        };
        format!("{}{}", sign, body)
    } else {
        let lead = &digits[..1];
        let rest = &digits[1..];
        let exp_sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{}{}e{}{:02}", sign, lead, exp_sign, exp.abs())
        } else {
            format!("{}{}.{}e{}{:02}", sign, lead, rest, exp_sign, exp.abs())
        }
    }
}
