//! Subresource integrity stamping.
//!
//! Reads an HTML file, finds `<link href>` and `<script src>` tags inside
//! `<head>`, hashes the local files they reference and writes
//! `integrity` / `crossorigin` attributes back onto them.
//!
//! # Flow
//!
//! ```text
//! read html ─► scan_head ─► resolve_reference ─► compute_integrity ─► stamp_edits ─► write
//!                  │               │                     │
//!            MissingHead     skip (ineligible)    warn (file missing)
//! ```

mod digest;
mod error;
mod resolve;
mod rewrite;
mod scan;

pub use digest::{Algorithm, compute_integrity};
pub use error::IntegrityError;
pub use resolve::{normalize_prefix, resolve_reference};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::IntegrityConfig;
use crate::utils::plural_count;
use crate::{debug, log};
use scan::ResourceTag;

pub type Result<T> = std::result::Result<T, IntegrityError>;

/// Per-run tag counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Tags whose integrity was written.
    pub updated: usize,
    /// Tags whose reference did not match the URL prefix.
    pub skipped: usize,
    /// Eligible tags whose local file does not exist.
    pub missing: usize,
    /// Tags whose integrity already matched (check mode).
    pub verified: usize,
    /// Tags with a stale or absent integrity (check mode).
    pub mismatched: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verified + self.mismatched > 0 {
            write!(
                f,
                "{} verified, {} mismatched, ",
                plural_count(self.verified, "tag"),
                self.mismatched
            )?;
        } else {
            write!(f, "{} updated, ", plural_count(self.updated, "tag"))?;
        }
        write!(f, "{} skipped, {} missing", self.skipped, self.missing)
    }
}

/// Stamp integrity attributes and write the updated document.
///
/// Nothing is written if the document has no `<head>`.
pub fn update_integrity(config: &IntegrityConfig) -> Result<Report> {
    let source = read_html(&config.html_path)?;
    let tags = scan::scan_head(&source)?;

    let mut report = Report::default();
    let mut edits = Vec::new();

    for tag in &tags {
        let Some(path) = locate(tag, config, &mut report) else {
            continue;
        };
        let value = compute_integrity(&path, config.algorithm)
            .map_err(|err| IntegrityError::io(&path, err))?;

        edits.extend(rewrite::stamp_edits(tag, &value));
        report.updated += 1;
        let local = path.strip_prefix(&config.base_dir).unwrap_or(&path);
        log!("integrity"; "updated {}={} -> integrity={}", tag.kind.reference_attr(), local.display(), value);
    }

    let html = rewrite::apply_edits(&source, edits);
    let target = config.output_path();
    fs::write(&target, html).map_err(|err| IntegrityError::io(&target, err))?;

    if config.inplace {
        log!("write"; "file overwritten: {}", target.display());
    } else {
        log!("write"; "updated HTML written to {}", target.display());
    }

    Ok(report)
}

/// Compare existing integrity attributes against the files on disk.
///
/// Writes nothing. A tag passes if any of its integrity tokens equals the
/// freshly computed value; tags without an integrity attribute fail.
pub fn check_integrity(config: &IntegrityConfig) -> Result<Report> {
    let source = read_html(&config.html_path)?;
    let tags = scan::scan_head(&source)?;

    let mut report = Report::default();

    for tag in &tags {
        let Some(path) = locate(tag, config, &mut report) else {
            continue;
        };
        let expected = compute_integrity(&path, config.algorithm)
            .map_err(|err| IntegrityError::io(&path, err))?;

        match tag.integrity() {
            Some(current) if current.split_ascii_whitespace().any(|t| t == expected) => {
                report.verified += 1;
                debug!("check"; "ok {}={}", tag.kind.reference_attr(), tag.reference);
            }
            Some(current) => {
                report.mismatched += 1;
                log!("mismatch"; "{}={} has integrity={}, expected {}",
                    tag.kind.reference_attr(), tag.reference, current, expected);
            }
            None => {
                report.mismatched += 1;
                log!("mismatch"; "{}={} has no integrity, expected {}",
                    tag.kind.reference_attr(), tag.reference, expected);
            }
        }
    }

    if report.mismatched > 0 {
        return Err(IntegrityError::Mismatch {
            count: report.mismatched,
        });
    }
    Ok(report)
}

/// Resolve a tag to an existing local file, recording why it was passed over.
fn locate(tag: &ResourceTag, config: &IntegrityConfig, report: &mut Report) -> Option<PathBuf> {
    let Some(path) = resolve_reference(&tag.reference, config.url_prefix.as_deref(), &config.base_dir)
    else {
        report.skipped += 1;
        debug!("scan"; "skipping <{} {}={}>", tag.kind, tag.kind.reference_attr(), tag.reference);
        return None;
    };

    if !path.is_file() {
        report.missing += 1;
        log!("warning"; "file not found {}, skipping", path.display());
        return None;
    }

    Some(path)
}

fn read_html(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| IntegrityError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use sha2::{Digest, Sha384};
    use tempfile::TempDir;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <link rel="stylesheet" href="/css/main.css">
  <script src="/js/app.js" crossorigin="use-credentials"></script>
  <script src="/js/missing.js"></script>
  <script src="https://cdn.example.com/lib.js"></script>
  <link rel="icon" href="favicon.ico">
</head>
<body><p>hello</p></body>
</html>
"#;

    fn sri(content: &[u8]) -> String {
        format!("sha384-{}", STANDARD.encode(Sha384::digest(content)))
    }

    /// Site with `index.html`, `css/main.css` and `js/app.js`.
    fn site(html: &str) -> (TempDir, IntegrityConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("css/main.css"), "body { color: red; }").unwrap();
        fs::write(dir.path().join("js/app.js"), "console.log(1);").unwrap();
        fs::write(dir.path().join("favicon.ico"), "ico").unwrap();

        let html_path = dir.path().join("index.html");
        fs::write(&html_path, html).unwrap();
        let config = IntegrityConfig::for_html(&html_path).unwrap();
        (dir, config)
    }

    #[test]
    fn test_update_writes_integrity_values() {
        let (dir, config) = site(PAGE);
        let report = update_integrity(&config).unwrap();

        let written = dir.path().join("index.html.updated.html");
        assert_eq!(config.output_path(), written);
        assert_eq!(
            report,
            Report {
                updated: 2,
                skipped: 2,
                missing: 1,
                ..Report::default()
            }
        );

        let out = fs::read_to_string(&written).unwrap();
        let css = sri(b"body { color: red; }");
        let js = sri(b"console.log(1);");
        assert!(out.contains(&format!(
            r#"<link rel="stylesheet" href="/css/main.css" integrity="{css}" crossorigin="anonymous">"#
        )));
        assert!(out.contains(&format!(
            r#"<script src="/js/app.js" crossorigin="use-credentials" integrity="{js}"></script>"#
        )));
        // Untouched tags
        assert!(out.contains(r#"<script src="/js/missing.js"></script>"#));
        assert!(out.contains(r#"<script src="https://cdn.example.com/lib.js"></script>"#));
        assert!(out.contains(r#"<link rel="icon" href="favicon.ico">"#));
        // Input is left alone
        assert_eq!(fs::read_to_string(&config.html_path).unwrap(), PAGE);
    }

    #[test]
    fn test_update_preserves_unedited_bytes() {
        let (_dir, config) = site(PAGE);
        update_integrity(&config).unwrap();
        let out = fs::read_to_string(config.output_path()).unwrap();

        let stripped = out
            .replace(&format!(r#" integrity="{}""#, sri(b"body { color: red; }")), "")
            .replace(&format!(r#" integrity="{}""#, sri(b"console.log(1);")), "")
            .replace(r#" crossorigin="anonymous""#, "");
        assert_eq!(stripped, PAGE);
    }

    #[test]
    fn test_update_inplace_is_idempotent() {
        let (_dir, mut config) = site(PAGE);
        config.inplace = true;

        let first = update_integrity(&config).unwrap();
        assert_eq!(first.updated, 2);
        let once = fs::read_to_string(&config.html_path).unwrap();

        update_integrity(&config).unwrap();
        let twice = fs::read_to_string(&config.html_path).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_explicit_output() {
        let (dir, mut config) = site(PAGE);
        let out_path = dir.path().join("out.html");
        config.output = Some(out_path.clone());

        update_integrity(&config).unwrap();
        assert!(out_path.exists());
        assert!(!dir.path().join("index.html.updated.html").exists());
    }

    #[test]
    fn test_update_with_url_prefix() {
        let html = r#"<html><head>
<script src="/static/js/app.js"></script>
<link rel="stylesheet" href="/css/main.css">
</head></html>"#;
        let (dir, mut config) = site(html);
        config.url_prefix = Some(normalize_prefix("/static/"));

        let report = update_integrity(&config).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);

        let out = fs::read_to_string(dir.path().join("index.html.updated.html")).unwrap();
        assert!(out.contains(&sri(b"console.log(1);")));
        assert!(out.contains(r#"<link rel="stylesheet" href="/css/main.css">"#));
    }

    #[test]
    fn test_update_with_base_dir() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("app.js"), "let x = 1;").unwrap();
        let html_path = dir.path().join("index.html");
        fs::write(&html_path, r#"<html><head><script src="/app.js"></script></head></html>"#).unwrap();

        let mut config = IntegrityConfig::for_html(&html_path).unwrap();
        config.base_dir = public;
        config.algorithm = Algorithm::Sha512;

        let report = update_integrity(&config).unwrap();
        assert_eq!(report.updated, 1);
        let out = fs::read_to_string(config.output_path()).unwrap();
        assert!(out.contains(r#"integrity="sha512-"#));
    }

    #[test]
    fn test_update_missing_head_writes_nothing() {
        let (dir, config) = site("<html><body><script src=\"/js/app.js\"></script></body></html>");
        let result = update_integrity(&config);

        assert!(matches!(result, Err(IntegrityError::MissingHead)));
        assert!(!dir.path().join("index.html.updated.html").exists());
    }

    #[test]
    fn test_update_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let config = IntegrityConfig::for_html(dir.path().join("nope.html")).unwrap();
        assert!(matches!(update_integrity(&config), Err(IntegrityError::Io(..))));
    }

    #[test]
    fn test_check_passes_after_update() {
        let (_dir, mut config) = site(r#"<html><head><script src="/js/app.js"></script></head></html>"#);
        config.inplace = true;
        update_integrity(&config).unwrap();

        let report = check_integrity(&config).unwrap();
        assert_eq!(report.verified, 1);
        assert_eq!(report.mismatched, 0);
    }

    #[test]
    fn test_check_detects_stale_and_absent_values() {
        let html = r#"<html><head>
<script src="/js/app.js" integrity="sha384-stale"></script>
<link rel="stylesheet" href="/css/main.css">
</head></html>"#;
        let (dir, config) = site(html);

        let result = check_integrity(&config);
        assert!(matches!(result, Err(IntegrityError::Mismatch { count: 2 })));
        // Check mode never writes
        assert!(!dir.path().join("index.html.updated.html").exists());
        assert_eq!(fs::read_to_string(&config.html_path).unwrap(), html);
    }

    #[test]
    fn test_check_accepts_multiple_tokens() {
        let js = sri(b"console.log(1);");
        let html = format!(
            r#"<html><head><script src="/js/app.js" integrity="sha256-other {js}"></script></head></html>"#
        );
        let (_dir, config) = site(&html);
        assert_eq!(check_integrity(&config).unwrap().verified, 1);
    }

    #[test]
    fn test_update_leaves_inline_script_intact() {
        let inline = r#"<script>var l = "<link href='/js/app.js'>"; var s = '<script src="/js/app.js">';</script>"#;
        let html = format!("<html><head>{inline}<script src=\"/js/app.js\"></script></head></html>");
        let (dir, config) = site(&html);

        let report = update_integrity(&config).unwrap();
        assert_eq!(report.updated, 1);

        let out = fs::read_to_string(dir.path().join("index.html.updated.html")).unwrap();
        assert!(out.contains(inline));
        assert_eq!(out.matches("integrity=").count(), 1);
    }

    #[test]
    fn test_update_unquoted_attributes() {
        let (dir, config) = site("<html><head><link rel=stylesheet href=/css/main.css></head></html>");

        let report = update_integrity(&config).unwrap();
        assert_eq!(report.updated, 1);

        let out = fs::read_to_string(dir.path().join("index.html.updated.html")).unwrap();
        let css = sri(b"body { color: red; }");
        assert!(out.contains(&format!(
            r#"<link rel=stylesheet href=/css/main.css integrity="{css}" crossorigin="anonymous">"#
        )));
    }

    #[test]
    fn test_report_display() {
        let report = Report {
            updated: 1,
            skipped: 2,
            missing: 0,
            ..Report::default()
        };
        assert_eq!(report.to_string(), "1 tag updated, 2 skipped, 0 missing");

        let report = Report {
            verified: 3,
            mismatched: 1,
            ..Report::default()
        };
        assert_eq!(report.to_string(), "3 tags verified, 1 mismatched, 0 skipped, 0 missing");
    }
}
