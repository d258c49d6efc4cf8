//! Parser for the scraped pseudo-JSON cells (a textual encoding of a map or
//! list using single quotes and Python-style bare words, e.g.
//! `{'locality_name': 'dlf phase 2', 'society_name': none}`).
//!
//! The text is rewritten into strict JSON and handed to `serde_json`.
//! Anything that still fails to parse is treated as absent, matching the
//! pipeline's filtering (never erroring) semantics for row-level noise.

use serde_json::Value;

pub fn parse(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(&to_json(raw)).ok()
}

/// Rewrites single-quoted strings to double-quoted ones (escaping interior
/// double quotes) and maps bare words to JSON literals outside of strings.
fn to_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some('"') => out.push_str("\\\""),
                            Some('\\') => out.push_str("\\\\"),
                            Some(other) => {
                                out.push('\\');
                                out.push(other);
                            }
                            None => break,
                        },
                        '\'' => break,
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '"' => {
                // Already double-quoted string: copy verbatim.
                out.push('"');
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    match inner {
                        '\\' => {
                            if let Some(esc) = chars.next() {
                                out.push(esc);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                word.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphabetic() {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // The cells are lower-cased before parsing, but be lenient.
                match word.to_ascii_lowercase().as_str() {
                    "none" | "nan" | "null" => out.push_str("null"),
                    "true" => out.push_str("true"),
                    "false" => out.push_str("false"),
                    _ => out.push_str(&word),
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Convenience for the map-shaped cells: pull one string value out of the
/// parsed map, treating `null` and empty text as missing.
pub fn get_str(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Like `get_str`, but also accepts numeric values and numeric strings
/// (latitude/longitude arrive both ways).
pub fn get_f64(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
