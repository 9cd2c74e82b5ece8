// One strategy per package-manager family.
//
// Both built-in strategies mutate a single lockfile, so the shared
// snapshot -> execute -> classify -> resync sequence lives in LockfileUpdater.

pub mod npm;
pub mod rubygems;

pub use npm::NpmStrategy;
pub use rubygems::RubygemsStrategy;

use crate::agents::update::UpdateRun;
use crate::agents::update::command::{FailureClassifier, UpdateCommand};
use crate::error::Result;
use crate::models::{DependencyFile, UpdateSet};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Runs an update command that rewrites one lockfile in the project root.
#[derive(Debug, Clone)]
pub(crate) struct LockfileUpdater {
    project_path: PathBuf,
    lockfile: &'static str,
    base_command: String,
    classifier: FailureClassifier,
    show_progress: bool,
}

impl LockfileUpdater {
    pub(crate) fn new(
        ecosystem: &str,
        project_path: &Path,
        lockfile: &'static str,
        base_command: &str,
        unsatisfiable_pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            project_path: project_path.to_path_buf(),
            lockfile,
            base_command: base_command.to_string(),
            classifier: FailureClassifier::new(ecosystem, unsatisfiable_pattern)?,
            show_progress: true,
        })
    }

    pub(crate) fn set_show_progress(&mut self, show_progress: bool) {
        self.show_progress = show_progress;
    }

    pub(crate) fn lockfile_path(&self) -> PathBuf {
        self.project_path.join(self.lockfile)
    }

    pub(crate) fn run(&self, updates: &UpdateSet) -> UpdateRun {
        // The lockfile is about to be rewritten; keep it for restoration.
        let snapshot = match DependencyFile::read(self.lockfile_path()) {
            Ok(file) => file,
            Err(err) => return UpdateRun::failed(Vec::new(), err),
        };
        let original = vec![snapshot.clone()];

        match self.execute(updates) {
            Ok(()) => {
                let mut updated = snapshot;
                match updated.resync() {
                    Ok(()) => {
                        log::debug!(
                            "{} fingerprint {} -> {}",
                            self.lockfile,
                            original[0].sha(),
                            updated.sha()
                        );
                        UpdateRun::succeeded(original, vec![updated])
                    }
                    Err(err) => UpdateRun::failed(original, err),
                }
            }
            Err(err) => UpdateRun::failed(original, err),
        }
    }

    fn execute(&self, updates: &UpdateSet) -> Result<()> {
        let command = UpdateCommand::build(&self.base_command, updates)?;
        for update in updates {
            eprintln!("Updating dependency {}", update.to_string().bright_cyan());
        }
        eprintln!(
            "Executing update command: {}",
            command.command_line().bold()
        );

        let output = command.run(&self.project_path, self.show_progress)?;
        if output.status.success() {
            return Ok(());
        }

        let error = self.classifier.classify(&command, output);
        if let Some(raw) = error.output().filter(|_| !error.is_unsatisfiable()) {
            eprintln!("{}", raw);
        }
        Err(error)
    }
}

#[cfg(all(test, unix))]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    /// Writes `script` into `dir` and returns a base command running it.
    pub(crate) fn fake_tool(dir: &Path, name: &str, script: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        format!("sh {}", path.display())
    }
}
