use crate::error::{DepError, Result};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};

/// A dependency file as last read from disk, addressed by its git blob hash.
///
/// `sha` always describes `content`: both are replaced together by
/// [`DependencyFile::resync`], never one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyFile {
    path: PathBuf,
    sha: String,
    #[serde(serialize_with = "base64_content::serialize")]
    content: Vec<u8>,
}

impl DependencyFile {
    /// Read a file and fingerprint it.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|e| DepError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            sha: fingerprint_bytes(&content),
            content,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    #[cfg(test)]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Recompute the on-disk fingerprint and compare it to the stored one.
    pub fn verify_integrity(&self) -> Result<()> {
        verify_fingerprint(&self.path, &self.sha)
    }

    /// Re-read the file after an external mutation.
    ///
    /// On error the stored content and fingerprint are left untouched.
    pub fn resync(&mut self) -> Result<()> {
        let content = fs::read(&self.path).map_err(|e| DepError::io(&self.path, e))?;
        self.sha = fingerprint_bytes(&content);
        self.content = content;
        Ok(())
    }

    /// Write the stored content back to disk and check the result.
    pub fn restore(&self) -> Result<()> {
        fs::write(&self.path, &self.content).map_err(|e| DepError::io(&self.path, e))?;
        self.verify_integrity()
    }

    pub fn differs_from(&self, other: &DependencyFile) -> bool {
        self.sha != other.sha
    }

    /// Copy with the path made relative to `root`, for reporting.
    pub fn relative_to(&self, root: &Path) -> DependencyFile {
        let path = self
            .path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.path.clone());
        DependencyFile {
            path,
            sha: self.sha.clone(),
            content: self.content.clone(),
        }
    }
}

/// Git-compatible blob hash: `sha1("blob <len>\0" + content)`.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

pub fn fingerprint<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|e| DepError::io(path, e))?;
    Ok(fingerprint_bytes(&content))
}

pub fn verify_fingerprint<P: AsRef<Path>>(path: P, expected: &str) -> Result<()> {
    let path = path.as_ref();
    let actual = fingerprint(path)?;
    if actual != expected {
        return Err(DepError::Integrity {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

mod base64_content {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(content))
    }
}
