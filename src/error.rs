use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: File signature doesn't match (expected: {expected}, got: {actual})", .path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The package manager reported that no compatible version set exists.
    /// This is an answer about the update set, not a tooling failure.
    #[error("Can't update versions: {ecosystem} could not find a compatible version set")]
    UnsatisfiableUpdate { ecosystem: String, output: String },

    #[error("Update command '{command}' failed: {reason}")]
    Execution {
        command: String,
        reason: String,
        output: String,
    },

    #[error("Can't find updater for package type: {0}")]
    StrategyNotFound(String),

    #[error("{}: patch could not be applied", .path.display())]
    Patch { path: PathBuf, output: String },

    #[error("Patch tool '{program}' not found: {reason}")]
    PatchToolMissing { program: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DepError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DepError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the failure should be relayed upstream as a rejected update set.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, DepError::UnsatisfiableUpdate { .. })
    }

    /// Raw tool output attached to the error, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            DepError::UnsatisfiableUpdate { output, .. }
            | DepError::Execution { output, .. }
            | DepError::Patch { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_message_names_both_fingerprints() {
        let err = DepError::Integrity {
            path: PathBuf::from("Gemfile.lock"),
            expected: "aaa".into(),
            actual: "bbb".into(),
        };
        assert_eq!(
            err.to_string(),
            "Gemfile.lock: File signature doesn't match (expected: aaa, got: bbb)"
        );
    }

    #[test]
    fn only_unsatisfiable_is_a_business_outcome() {
        let unsat = DepError::UnsatisfiableUpdate {
            ecosystem: "Rubygem".into(),
            output: "Bundler could not find compatible versions for gem \"rails\"".into(),
        };
        let exec = DepError::Execution {
            command: "bundle update rails".into(),
            reason: "exit status 1".into(),
            output: String::new(),
        };
        assert!(unsat.is_unsatisfiable());
        assert!(!exec.is_unsatisfiable());
        assert!(!DepError::StrategyNotFound("Pip".into()).is_unsatisfiable());
        assert!(unsat.output().unwrap().starts_with("Bundler"));
    }
}
