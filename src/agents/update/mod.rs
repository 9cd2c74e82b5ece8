// Update orchestration
//
// - UpdateStrategy: per-ecosystem procedure applying an UpdateSet through an
//   external package manager
// - UpdateRun: the backup (original) and result (updated) file sets of one run
// - StrategyRegistry: ecosystem id -> strategy, built once at startup
pub mod command;
pub mod strategies;

pub use strategies::{NpmStrategy, RubygemsStrategy};

use crate::config::Config;
use crate::error::{DepError, Result};
use crate::models::{DependencyFile, UpdateSet};
use std::collections::BTreeMap;
use std::path::Path;

pub trait UpdateStrategy {
    /// Identifier this strategy is registered under, e.g. `Rubygem`.
    fn ecosystem(&self) -> &str;

    /// Apply `updates`. Every file the strategy mutates is snapshotted into
    /// [`UpdateRun::original`] before the mutating command runs.
    fn apply(&self, updates: &UpdateSet) -> UpdateRun;
}

/// Outcome of one strategy run.
///
/// `original` is populated even when the run fails, so the caller can always
/// restore the working tree. The updated files only exist on success.
#[derive(Debug)]
pub struct UpdateRun {
    pub original: Vec<DependencyFile>,
    pub outcome: Result<Vec<DependencyFile>>,
}

impl UpdateRun {
    pub fn succeeded(original: Vec<DependencyFile>, updated: Vec<DependencyFile>) -> Self {
        Self {
            original,
            outcome: Ok(updated),
        }
    }

    pub fn failed(original: Vec<DependencyFile>, error: DepError) -> Self {
        Self {
            original,
            outcome: Err(error),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Updated files, empty when the run failed.
    pub fn updated(&self) -> &[DependencyFile] {
        match &self.outcome {
            Ok(files) => files,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&DepError> {
        self.outcome.as_ref().err()
    }

    /// Write every original snapshot back to disk.
    ///
    /// All files are attempted; the first failure is returned.
    pub fn restore_original(&self) -> Result<()> {
        let mut first_error = None;
        for file in &self.original {
            if let Err(err) = file.restore() {
                log::warn!("Failed to restore {}: {}", file.path().display(), err);
                first_error.get_or_insert(err);
            } else {
                log::debug!("Restored {}", file.path().display());
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Ecosystem id -> update strategy.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Box<dyn UpdateStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in strategy, configured for `project_path`.
    pub fn with_defaults<P: AsRef<Path>>(
        config: &Config,
        project_path: P,
        show_progress: bool,
    ) -> Result<Self> {
        let project_path = project_path.as_ref();
        let mut registry = Self::new();
        registry.register(Box::new(
            RubygemsStrategy::new(project_path, &config.bundle_update_cmd)?
                .with_progress(show_progress),
        ));
        registry.register(Box::new(
            NpmStrategy::new(project_path, &config.npm_update_cmd)?.with_progress(show_progress),
        ));
        Ok(registry)
    }

    pub fn register(&mut self, strategy: Box<dyn UpdateStrategy>) {
        self.strategies
            .insert(strategy.ecosystem().to_string(), strategy);
    }

    pub fn get(&self, ecosystem: &str) -> Result<&dyn UpdateStrategy> {
        self.strategies
            .get(ecosystem)
            .map(|s| &**s)
            .ok_or_else(|| DepError::StrategyNotFound(ecosystem.to_string()))
    }

    pub fn ecosystems(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}
