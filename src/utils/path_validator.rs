use crate::error::{DepError, Result};
use std::path::{Path, PathBuf};

/// Path checks applied before any file in a project is read or rewritten.
pub struct PathValidator;

impl PathValidator {
    /// Canonicalises the project directory and refuses system locations.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            DepError::InvalidInput(format!("Invalid project path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(DepError::InvalidInput(format!(
                "Project path '{}' is not a directory",
                canonical.display()
            )));
        }

        const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

        for forbidden in FORBIDDEN {
            let forbidden_path = Path::new(forbidden);
            let canonical_forbidden = forbidden_path
                .canonicalize()
                .unwrap_or_else(|_| forbidden_path.to_path_buf());

            if canonical.starts_with(forbidden_path) || canonical.starts_with(&canonical_forbidden)
            {
                return Err(DepError::InvalidInput(format!(
                    "Refusing to manage dependency files under system directory '{}'",
                    forbidden
                )));
            }
        }

        Ok(canonical)
    }

    /// Resolves `file_path` against the project root and ensures it stays
    /// inside it. Relative paths are taken relative to the project.
    pub fn resolve_project_file(
        file_path: impl AsRef<Path>,
        project_root: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        let project_root = project_root.as_ref();

        let joined = if file_path.is_absolute() {
            file_path.to_path_buf()
        } else {
            project_root.join(file_path)
        };

        let canonical_file = joined.canonicalize().map_err(|e| DepError::io(&joined, e))?;
        let canonical_root = project_root
            .canonicalize()
            .map_err(|e| DepError::io(project_root, e))?;

        if !canonical_file.starts_with(&canonical_root) {
            return Err(DepError::InvalidInput(format!(
                "'{}' is outside the project directory",
                file_path.display()
            )));
        }

        Ok(canonical_file)
    }
}
