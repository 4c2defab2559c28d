//! HTML utility functions.
//!
//! Provides common HTML processing functions:
//! - `escape_attr()` - HTML entity escaping for attribute values
//! - `unescape()` - entity decoding for attribute values read from source
//! - `parse_start_tag()` - span-aware start tag lexer

use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML attribute values.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_attr("a\"b"), "a&quot;b");
/// assert_eq!(escape_attr("anonymous"), "anonymous"); // No allocation
/// ```
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '&' {
            result.push(c);
            continue;
        }

        // Collect entity
        let mut entity = String::new();
        let mut terminated = false;
        for c in chars.by_ref() {
            if c == ';' {
                terminated = true;
                break;
            }
            entity.push(c);
            if entity.len() > 10 {
                break;
            }
        }

        if !terminated {
            result.push('&');
            result.push_str(&entity);
            continue;
        }

        // Decode entity
        match entity.as_str() {
            "lt" => result.push('<'),
            "gt" => result.push('>'),
            "amp" => result.push('&'),
            "quot" => result.push('"'),
            "apos" => result.push('\''),
            "nbsp" => result.push('\u{00A0}'),
            s if s.starts_with('#') => {
                let code = if s.starts_with("#x") || s.starts_with("#X") {
                    u32::from_str_radix(&s[2..], 16).ok()
                } else {
                    s[1..].parse().ok()
                };
                if let Some(c) = code.and_then(char::from_u32) {
                    result.push(c);
                } else {
                    result.push('&');
                    result.push_str(&entity);
                    result.push(';');
                }
            }
            _ => {
                result.push('&');
                result.push_str(&entity);
                result.push(';');
            }
        }
    }

    Cow::Owned(result)
}

// =============================================================================
// Start Tag Lexing
// =============================================================================

/// An attribute inside a start tag, with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpan {
    /// Lowercased attribute name.
    pub name: String,
    /// Raw value as written (entities not decoded). `None` for boolean attributes.
    pub value: Option<String>,
    /// Byte range of the whole attribute (`name="value"`).
    pub span: Range<usize>,
}

/// A start tag lexed from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<AttrSpan>,
    /// Byte offset where the closing `>` or `/>` begins.
    pub close: usize,
}

impl StartTag {
    /// Find an attribute by (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&AttrSpan> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// Lex the start tag beginning at `offset` (which must point at `<`).
///
/// Input: `<script src="/app.js" defer>`
/// Output: name `script`, attributes `[src="/app.js", defer]`
///
/// Returns `None` for anything that is not a well-formed start tag.
pub fn parse_start_tag(source: &str, offset: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    if bytes.get(offset) != Some(&b'<') {
        return None;
    }

    let is_close = |i: usize| match bytes.get(i) {
        Some(b'>') => true,
        Some(b'/') => bytes.get(i + 1) == Some(&b'>'),
        _ => false,
    };

    // Tag name
    let mut i = offset + 1;
    let name_start = i;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !is_close(i) {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = source[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        match *bytes.get(i)? {
            b'>' => return Some(StartTag { name, attrs, close: i }),
            b'/' if is_close(i) => return Some(StartTag { name, attrs, close: i }),
            _ => {}
        }

        // Attribute name
        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && !is_close(i)
        {
            i += 1;
        }
        if i == attr_start {
            // Stray `=`
            i += 1;
            continue;
        }
        let attr_name = source[attr_start..i].to_ascii_lowercase();

        // Look past whitespace for `=`
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match *bytes.get(j)? {
                quote @ (b'"' | b'\'') => {
                    let value_start = j + 1;
                    let value_end = value_start + source[value_start..].find(quote as char)?;
                    i = value_end + 1;
                    Some(source[value_start..value_end].to_string())
                }
                _ => {
                    // Unquoted value (read until whitespace or `>`)
                    let value_start = j;
                    while j < bytes.len()
                        && !bytes[j].is_ascii_whitespace()
                        && bytes[j] != b'>'
                    {
                        j += 1;
                    }
                    i = j;
                    Some(source[value_start..j].to_string())
                }
            }
        } else {
            // Boolean attribute (no value)
            None
        };

        attrs.push(AttrSpan {
            name: attr_name,
            value,
            span: attr_start..i,
        });
    }
}

/// Render a `name="value"` attribute with the value escaped.
#[inline]
pub fn render_attr(name: &str, value: &str) -> String {
    format!("{}=\"{}\"", name, escape_attr(value))
}
