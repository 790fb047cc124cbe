//! CSS escaping
//!
//! `css_escape` follows the CSSOM `CSS.escape()` algorithm so any string can
//! be embedded as an identifier or inside a quoted attribute value and read
//! back unchanged by the parser.

use std::fmt::Write;

/// Escape a string for use as a CSS identifier
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => push_code_point(&mut out, c),
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => push_code_point(&mut out, c),
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            c if c >= '\u{80}' || c == '-' || c == '_' || c.is_ascii_alphanumeric() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }

    out
}

/// Quote a value as a CSS string
pub fn css_string(value: &str) -> String {
    format!("\"{}\"", css_escape(value))
}

fn push_code_point(out: &mut String, c: char) {
    let _ = write!(out, "\\{:x} ", c as u32);
}
