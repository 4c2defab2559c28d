//! Reference eligibility and local path resolution.
//!
//! A reference such as `/static/app.js?v=1a2b` is mapped onto a file under
//! the base directory:
//!
//! 1. It must start with the configured URL prefix (`/` when none is set).
//! 2. An explicit prefix is stripped; the implicit `/` is not.
//! 3. Query string and fragment are dropped.
//! 4. Leading `/` is trimmed and the rest is joined onto the base directory.
//!
//! Anything that still looks external after stripping (`https://...`,
//! `//cdn.example.com/...`) is not eligible.

use std::path::{Path, PathBuf};

/// Prefix matched when no URL prefix is configured.
const DEFAULT_PREFIX: &str = "/";

/// Normalize a user-supplied URL prefix by dropping one trailing `/`.
///
/// `/static/` becomes `/static`, and `/` becomes the empty prefix which
/// matches every reference.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.strip_suffix('/').unwrap_or(prefix).to_string()
}

/// Resolve a tag's reference to a local path under `base_dir`.
///
/// Returns `None` if the reference is not eligible. Existence of the
/// resolved file is not checked here.
pub fn resolve_reference(reference: &str, prefix: Option<&str>, base_dir: &Path) -> Option<PathBuf> {
    let rest = match prefix {
        Some(prefix) => reference.strip_prefix(prefix)?,
        None if reference.starts_with(DEFAULT_PREFIX) => reference,
        None => return None,
    };

    let (path, _) = split_path_query(rest);
    if is_external_link(path) || path.starts_with("//") {
        return None;
    }

    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    Some(base_dir.join(relative))
}

/// Split a URL path from its `?query` / `#fragment` suffix.
#[inline]
fn split_path_query(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

/// Check if a link carries a URL scheme (`https:`, `data:`, `mailto:`, ...).
#[inline]
fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
