use crate::error::{DepError, Result};
use crate::models::UpdateSet;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Duration;

/// A package-manager command line: configured base command plus one
/// argument per package in the update set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommand {
    program: String,
    args: Vec<String>,
}

impl UpdateCommand {
    pub fn build(base_command: &str, updates: &UpdateSet) -> Result<Self> {
        let mut parts = base_command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| DepError::Execution {
            command: base_command.to_string(),
            reason: "update command is empty".to_string(),
            output: String::new(),
        })?;

        let mut args: Vec<String> = parts.collect();
        args.extend(updates.package_names().map(str::to_string));
        Ok(Self { program, args })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion in `working_dir`, capturing stdout and stderr.
    ///
    /// Only a spawn/wait failure is an `Err`; a non-zero exit is reported
    /// through [`CommandOutput::status`].
    pub fn run(&self, working_dir: &Path, show_progress: bool) -> Result<CommandOutput> {
        let spinner = if show_progress {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("Running {}", self.program));
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        } else {
            ProgressBar::hidden()
        };

        let result = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .output();
        spinner.finish_and_clear();

        let output = result.map_err(|e| DepError::Execution {
            command: self.command_line(),
            reason: format!("failed to execute {}: {}", self.program, e),
            output: String::new(),
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        if !combined.is_empty() && !combined.ends_with('\n') && !output.stderr.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        log::debug!(
            "'{}' exited with {} ({} bytes of output)",
            self.command_line(),
            output.status,
            combined.len()
        );

        Ok(CommandOutput {
            status: output.status,
            combined,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// stdout followed by stderr.
    pub combined: String,
}

/// Recognises a package manager's "no compatible version set" failure.
#[derive(Debug, Clone)]
pub struct FailureClassifier {
    ecosystem: String,
    unsatisfiable: Regex,
}

impl FailureClassifier {
    pub fn new(ecosystem: &str, unsatisfiable_pattern: &str) -> Result<Self> {
        let unsatisfiable = Regex::new(unsatisfiable_pattern).map_err(|e| {
            DepError::Config(format!(
                "Invalid failure pattern for {}: {}",
                ecosystem, e
            ))
        })?;
        Ok(Self {
            ecosystem: ecosystem.to_string(),
            unsatisfiable,
        })
    }

    pub fn is_unsatisfiable(&self, output: &str) -> bool {
        self.unsatisfiable.is_match(output)
    }

    /// Turn a failed run into the matching error.
    pub fn classify(&self, command: &UpdateCommand, output: CommandOutput) -> DepError {
        if self.is_unsatisfiable(&output.combined) {
            return DepError::UnsatisfiableUpdate {
                ecosystem: self.ecosystem.clone(),
                output: output.combined,
            };
        }

        DepError::Execution {
            command: command.command_line(),
            reason: output.status.to_string(),
            output: output.combined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::version_update::VersionUpdate;
    use tempfile::tempdir;

    fn rails_update() -> UpdateSet {
        UpdateSet::new(vec![VersionUpdate::new("rails", "6.0.0", "6.1.0")]).unwrap()
    }

    #[test]
    fn appends_packages_to_base_command() {
        let updates = UpdateSet::parse(&["rails:6.0.0:6.1.0", "puma:5.0.0:5.6.0"]).unwrap();
        let command = UpdateCommand::build("bundle   update --conservative", &updates).unwrap();
        assert_eq!(
            command.command_line(),
            "bundle update --conservative rails puma"
        );
    }

    #[test]
    fn blank_base_command_is_execution_error() {
        let err = UpdateCommand::build("   ", &rails_update()).unwrap_err();
        assert!(matches!(err, DepError::Execution { .. }));
    }

    #[test]
    fn missing_binary_is_execution_error() {
        let dir = tempdir().unwrap();
        let command =
            UpdateCommand::build("depkeeper-test-no-such-binary update", &rails_update()).unwrap();
        let err = command.run(dir.path(), false).unwrap_err();
        match err {
            DepError::Execution { command, .. } => {
                assert_eq!(command, "depkeeper-test-no-such-binary update rails")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_stderr() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("noisy.sh"),
            "printf 'to stdout'\necho 'to stderr' >&2\nexit 3\n",
        )
        .unwrap();
        let base = format!("sh {}", dir.path().join("noisy.sh").display());
        let command = UpdateCommand::build(&base, &rails_update()).unwrap();

        let output = command.run(dir.path(), false).unwrap();
        assert!(!output.status.success());
        assert_eq!(output.combined, "to stdout\nto stderr\n");
    }

    #[test]
    fn classifier_only_matches_at_line_start() {
        let classifier = FailureClassifier::new(
            "Rubygem",
            r"(?m)^Bundler could not find compatible versions for gem",
        )
        .unwrap();
        assert!(classifier.is_unsatisfiable(
            "Fetching gem metadata...\nBundler could not find compatible versions for gem \"rails\":\n"
        ));
        assert!(!classifier.is_unsatisfiable(
            "note: Bundler could not find compatible versions for gem"
        ));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = FailureClassifier::new("Broken", "(").unwrap_err();
        assert!(matches!(err, DepError::Config(_)));
    }
}
