use crate::error::{DepError, Result};
use crate::models::DependencyFile;
use crate::utils::{GlobMatcher, PathValidator};
use colored::Colorize;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File names recognised as dependency manifests or lockfiles.
pub const SUPPORTED_DEPENDENCY_FILES: &str = r"^(Gemfile|Gemfile\.lock|.*\.gemspec|package\.json|package-lock\.json|npm-shrinkwrap\.json|setup\.py|requirements\.txt|requires\.txt|composer\.json|composer\.lock|bower\.json|yarn\.lock)$";

/// ProjectScannerAgent finds the dependency files of a project
pub struct ProjectScannerAgent {
    project_path: PathBuf,
    ignored: Vec<GlobMatcher>,
    supported: Regex,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P, ignored_paths: &[String]) -> Result<Self> {
        let ignored = ignored_paths
            .iter()
            .map(|p| GlobMatcher::new(p))
            .collect::<Result<Vec<_>>>()?;
        let supported = Regex::new(SUPPORTED_DEPENDENCY_FILES)
            .map_err(|e| DepError::InvalidInput(format!("Invalid file pattern: {}", e)))?;

        Ok(Self {
            project_path: project_path.as_ref().to_path_buf(),
            ignored,
            supported,
        })
    }

    /// Load the given files, or scan the project when none are given.
    pub fn lookup(&self, files: &[String]) -> Result<Vec<DependencyFile>> {
        if files.is_empty() {
            eprintln!(
                "{}",
                "[warning] No files given, scanning project directory instead.".yellow()
            );
            return self.discover();
        }
        self.load(files)
    }

    pub fn load(&self, files: &[String]) -> Result<Vec<DependencyFile>> {
        files
            .iter()
            .map(|file| {
                let path = PathValidator::resolve_project_file(file, &self.project_path)?;
                DependencyFile::read(path)
            })
            .collect()
    }

    /// Walk the project tree and read every supported file, in name order.
    pub fn discover(&self) -> Result<Vec<DependencyFile>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.project_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in walker {
            let entry = entry.map_err(|err| self.walk_error(err))?;
            if !entry.file_type().is_file() || !self.is_supported(&entry) {
                continue;
            }
            log::debug!("Found: {}", entry.path().display());
            files.push(DependencyFile::read(entry.path())?);
        }

        Ok(files)
    }

    fn is_supported(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.supported.is_match(name))
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let Some(name) = entry.file_name().to_str() else {
            return false;
        };

        if entry.file_type().is_dir() && name == ".git" {
            return true;
        }

        match self.ignored.iter().find(|m| m.matches(name)) {
            Some(matcher) => {
                log::debug!(
                    "Skipping {} (ignored by '{}')",
                    entry.path().display(),
                    matcher.pattern()
                );
                true
            }
            None => false,
        }
    }

    fn walk_error(&self, err: walkdir::Error) -> DepError {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project_path.clone());
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
        DepError::io(path, source)
    }
}
