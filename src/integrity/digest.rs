//! Streaming file digests encoded as SRI integrity values.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Read buffer size for streaming a file through the hasher.
const CHUNK_SIZE: usize = 8 * 1024;

/// Hash function named in the integrity value prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Sha256,
    #[default]
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Prefix used in the integrity attribute (`sha384`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the integrity value (`<algorithm>-<base64 digest>`) of a file.
pub fn compute_integrity(path: &Path, algorithm: Algorithm) -> io::Result<String> {
    let file = File::open(path)?;
    let digest = match algorithm {
        Algorithm::Sha256 => stream_digest::<Sha256>(file)?,
        Algorithm::Sha384 => stream_digest::<Sha384>(file)?,
        Algorithm::Sha512 => stream_digest::<Sha512>(file)?,
    };
    Ok(format_integrity(algorithm, &digest))
}

/// Format a raw digest as an integrity value.
pub fn format_integrity(algorithm: Algorithm, digest: &[u8]) -> String {
    format!("{}-{}", algorithm.name(), STANDARD.encode(digest))
}

/// Feed a reader through `D` in fixed-size chunks.
fn stream_digest<D: Digest>(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hasher.finalize().to_vec())
}
