//! Start tag rewriting.
//!
//! Updated tags are spliced back into the source text, so every byte outside
//! an edited start tag is written out unchanged.

use std::ops::Range;

use super::scan::ResourceTag;
use crate::utils::html::render_attr;

/// Value written when a tag has no `crossorigin` attribute.
pub const DEFAULT_CROSSORIGIN: &str = "anonymous";

/// A byte range of the source replaced by new text. Empty ranges insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

/// Edits that set `integrity` on a tag and add `crossorigin` if absent.
///
/// An existing `integrity` attribute is replaced where it stands and any
/// repeated `integrity` attributes after it are removed. New attributes are
/// appended after the last remaining one.
pub fn stamp_edits(tag: &ResourceTag, integrity: &str) -> Vec<Edit> {
    let attrs = &tag.start.attrs;
    let mut edits = Vec::with_capacity(2);
    let mut appended = String::new();
    let mut anchor = None;
    let mut seen_integrity = false;

    for (i, attr) in attrs.iter().enumerate() {
        if attr.name != "integrity" {
            anchor = Some(attr.span.end);
            continue;
        }
        if seen_integrity {
            // Drop the duplicate together with the whitespace before it
            let from = attrs[i - 1].span.end;
            edits.push(Edit {
                range: from..attr.span.end,
                text: String::new(),
            });
            continue;
        }
        seen_integrity = true;
        anchor = Some(attr.span.end);
        edits.push(Edit {
            range: attr.span.clone(),
            text: render_attr("integrity", integrity),
        });
    }

    if !seen_integrity {
        appended.push(' ');
        appended.push_str(&render_attr("integrity", integrity));
    }

    if !tag.has_crossorigin() {
        appended.push(' ');
        appended.push_str(&render_attr("crossorigin", DEFAULT_CROSSORIGIN));
    }

    if !appended.is_empty() {
        // The reference attribute selected the tag, so an anchor exists
        let at = anchor.unwrap_or(tag.start.close);
        edits.push(Edit {
            range: at..at,
            text: appended,
        });
    }

    edits
}

/// Apply non-overlapping edits to `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let extra: usize = edits.iter().map(|e| e.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for edit in edits {
        debug_assert!(edit.range.start >= cursor, "overlapping edits");
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);

    out
}
