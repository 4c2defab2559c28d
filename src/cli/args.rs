//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::integrity::Algorithm;

/// Stamp subresource integrity hashes onto local assets in an HTML head
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Path to the HTML file
    #[arg(value_name = "HTML", value_hint = clap::ValueHint::FilePath)]
    pub html: PathBuf,

    /// Base directory for local files (defaults to the HTML file's directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub base_dir: Option<PathBuf>,

    /// Overwrite the original HTML file
    #[arg(short, long, conflicts_with = "output")]
    pub inplace: bool,

    /// URL prefix that local references must start with.
    ///
    /// The prefix is stripped before the reference is joined onto the base
    /// directory. A trailing `/` is ignored.
    ///
    /// Example: with `--url /static`, `/static/app.js` resolves to `<base-dir>/app.js`.
    #[arg(short, long = "url", value_name = "PREFIX")]
    pub url: Option<String>,

    /// Path for output HTML (if not using --inplace)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Digest algorithm used for the integrity value
    #[arg(short, long, value_enum)]
    pub algorithm: Option<Algorithm>,

    /// Verify existing integrity values instead of writing new ones
    #[arg(long, conflicts_with_all = ["inplace", "output"])]
    pub check: bool,

    /// Config file path (TOML with an `[integrity]` table)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "sri-stamp", "index.html", "-b", "dist", "-i", "-u", "/static/",
        ])
        .unwrap();
        assert_eq!(cli.html, PathBuf::from("index.html"));
        assert_eq!(cli.base_dir, Some(PathBuf::from("dist")));
        assert!(cli.inplace);
        assert_eq!(cli.url.as_deref(), Some("/static/"));
        assert!(cli.output.is_none());
        assert!(cli.algorithm.is_none());
    }

    #[test]
    fn test_parse_algorithm() {
        let cli = Cli::try_parse_from(["sri-stamp", "index.html", "-a", "sha512"]).unwrap();
        assert_eq!(cli.algorithm, Some(Algorithm::Sha512));
    }

    #[test]
    fn test_inplace_conflicts_with_output() {
        let result = Cli::try_parse_from(["sri-stamp", "index.html", "-i", "-o", "out.html"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_conflicts_with_inplace() {
        let result = Cli::try_parse_from(["sri-stamp", "index.html", "--check", "-i"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_html_is_required() {
        assert!(Cli::try_parse_from(["sri-stamp", "-i"]).is_err());
    }
}
