//! Best-effort JSON salvage for vendor metadata files.
//!
//! Launchers occasionally leave manifests with a byte-order mark, stray
//! control characters, trailing commas or junk after the closing brace.
//! [`parse_lenient`] tries a strict parse first and then one repair pass.
//! The repair is a salvage attempt, not a grammar: anything it cannot fix
//! is returned as an error so the caller can skip the file.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parses `text`, repairing common corruption if the strict parse fails.
pub fn parse_lenient(text: &str) -> Result<Value, serde_json::Error> {
    from_str_lenient(text)
}

/// Deserializes `text` into `T`, repairing common corruption if needed.
pub fn from_str_lenient<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(strict) => {
            let repaired = repair(text);
            serde_json::from_str(&repaired).map_err(|e| {
                tracing::trace!(strict = %strict, repaired = %e, "JSON repair failed");
                e
            })
        }
    }
}

/// Applies every repair step.
fn repair(text: &str) -> String {
    let cleaned: String = text
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    let framed = outer_braces(&cleaned);
    strip_trailing_commas(framed)
}

/// Truncates to the outermost `{ ... }` (or `[ ... ]`) span.
fn outer_braces(text: &str) -> &str {
    let (open, close) = match text.find(['{', '[']) {
        Some(i) if text[i..].starts_with('[') => ('[', ']'),
        Some(_) => ('{', '}'),
        None => return text,
    };
    match (text.find(open), text.rfind(close)) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Removes commas that directly precede `}` or `]`, outside of strings.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
