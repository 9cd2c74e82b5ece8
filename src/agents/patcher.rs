use crate::config::Config;
use crate::error::{DepError, Result};
use crate::models::DependencyFile;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// PatchAgent applies unified diffs to dependency files with the external
/// `patch` tool.
pub struct PatchAgent {
    program: String,
    args: Vec<String>,
}

impl PatchAgent {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.patch_program.clone(), config.patch_args.clone())
    }

    fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| DepError::PatchToolMissing {
            program: self.program.clone(),
            reason: e.to_string(),
        })
    }

    /// Apply `patch` to `file` on disk, then resync `file`.
    ///
    /// When the tool fails, `file` is written back from its stored content,
    /// so hunks that did apply are rolled back.
    ///
    /// The patch is written to the tool's stdin from a separate thread while
    /// stdout and stderr are drained, so large patches cannot deadlock on a
    /// full pipe.
    pub fn apply(&self, file: &mut DependencyFile, patch: &str) -> Result<()> {
        let program = self.locate()?;
        log::debug!(
            "Applying {} byte patch to {} with {}",
            patch.len(),
            file.path().display(),
            program.display()
        );

        let mut child = Command::new(&program)
            .args(&self.args)
            .arg(file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DepError::Patch {
                path: file.path().to_path_buf(),
                output: format!("failed to spawn {}: {}", program.display(), e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DepError::io(file.path(), io::Error::other("patch stdin unavailable")))?;
        let input = patch.as_bytes().to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| DepError::io(file.path(), e))?;
        let write_result = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("patch writer thread panicked")));

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            // A broken pipe only means the tool gave up early; its own
            // output is the useful diagnostic.
            eprintln!("{}", captured);
            if let Err(e) = file.restore() {
                log::warn!(
                    "Failed to roll back partially patched {}: {}",
                    file.path().display(),
                    e
                );
            }
            return Err(DepError::Patch {
                path: file.path().to_path_buf(),
                output: captured,
            });
        }
        if let Err(e) = write_result {
            log::warn!(
                "patch exited successfully but did not read all input for {}: {}",
                file.path().display(),
                e
            );
        }

        file.resync()
    }
}
