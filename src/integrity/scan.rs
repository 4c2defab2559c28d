//! Head scanning for `<link href>` and `<script src>` resource tags.

use std::fmt;

use super::{IntegrityError, Result};
use crate::debug;
use crate::utils::html::{StartTag, parse_start_tag, unescape};

/// Resource tag kinds that can carry an integrity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Link,
    Script,
}

impl TagKind {
    /// Classify a tag name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("link") {
            Some(Self::Link)
        } else if name.eq_ignore_ascii_case("script") {
            Some(Self::Script)
        } else {
            None
        }
    }

    /// Attribute holding the reference path.
    pub const fn reference_attr(self) -> &'static str {
        match self {
            Self::Link => "href",
            Self::Script => "src",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Link => "link",
            Self::Script => "script",
        })
    }
}

/// A `<link href>` or `<script src>` found inside `<head>`.
#[derive(Debug, Clone)]
pub struct ResourceTag {
    pub kind: TagKind,
    /// Reference path with entities decoded.
    pub reference: String,
    /// Lexed start tag, positioned in the source document.
    pub start: StartTag,
}

impl ResourceTag {
    /// Current `integrity` attribute value, if any.
    pub fn integrity(&self) -> Option<&str> {
        self.start.attr("integrity").and_then(|a| a.value.as_deref())
    }

    pub fn has_crossorigin(&self) -> bool {
        self.start.attr("crossorigin").is_some()
    }
}

/// Elements whose content is raw text, never markup.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Collect the resource tags inside the document's `<head>`, in source order.
///
/// `tl` only locates the head. Its contents are then walked start tag by
/// start tag, stepping over comments and `<script>`/`<style>` content, so
/// markup quoted inside inline scripts is never selected.
///
/// Fails with [`IntegrityError::MissingHead`] if the document has no head.
pub fn scan_head(source: &str) -> Result<Vec<ResourceTag>> {
    let dom = tl::parse(source, tl::ParserOptions::default())
        .map_err(|err| IntegrityError::Parse(format!("{err:?}")))?;
    let parser = dom.parser();

    let head = dom
        .nodes()
        .iter()
        .filter_map(|node| node.as_tag())
        .find(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case("head"))
        .ok_or(IntegrityError::MissingHead)?;

    let (offset, _) = head.boundaries(parser);
    let head_tag = parse_start_tag(source, offset)
        .ok_or_else(|| IntegrityError::Parse(format!("unreadable <head> tag at byte {offset}")))?;

    let mut tags = Vec::new();
    let mut pos = head_tag.close + 1;

    while let Some(found) = source[pos..].find('<') {
        let at = pos + found;
        let rest = &source[at..];

        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => pos = at + end + 3,
                None => break,
            }
            continue;
        }
        if starts_with_ignore_case(rest, "</head") {
            break;
        }
        // End tags, doctypes and stray `<`
        if !rest.as_bytes().get(1).is_some_and(u8::is_ascii_alphabetic) {
            pos = at + 1;
            continue;
        }

        let Some(start) = parse_start_tag(source, at) else {
            debug!("scan"; "unreadable start tag at byte {}", at);
            pos = at + 1;
            continue;
        };
        pos = start.close + 1;

        // An unclosed head ends where the body begins
        if start.name == "body" {
            break;
        }

        let kind = TagKind::from_name(&start.name);
        if RAW_TEXT_ELEMENTS.contains(&start.name.as_str()) {
            let end_tag = format!("</{}", start.name);
            match find_ignore_case(&source[pos..], &end_tag) {
                Some(end) => pos += end,
                None => pos = source.len(),
            }
        }

        let Some(kind) = kind else { continue };

        // Only tags that carry their reference attribute are selected
        let Some(attr) = start.attr(kind.reference_attr()) else {
            continue;
        };
        let reference = unescape(attr.value.as_deref().unwrap_or_default()).into_owned();

        tags.push(ResourceTag {
            kind,
            reference,
            start,
        });
    }

    Ok(tags)
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
