use super::LockfileUpdater;
use crate::agents::update::{UpdateRun, UpdateStrategy};
use crate::error::Result;
use crate::models::UpdateSet;
use std::path::Path;

pub const ECOSYSTEM: &str = "Npm";
pub const LOCKFILE: &str = "package-lock.json";
/// npm 6 prints `npm ERR! code ERESOLVE`, npm 7+ prints `npm error code ERESOLVE`.
pub const UNSATISFIABLE_PATTERN: &str = r"(?m)^npm (ERR!|error) code ERESOLVE";

/// Updates packages with `npm update <pkg>...`, rewriting `package-lock.json`.
#[derive(Debug, Clone)]
pub struct NpmStrategy {
    updater: LockfileUpdater,
}

impl NpmStrategy {
    pub fn new<P: AsRef<Path>>(project_path: P, npm_update_cmd: &str) -> Result<Self> {
        Ok(Self {
            updater: LockfileUpdater::new(
                ECOSYSTEM,
                project_path.as_ref(),
                LOCKFILE,
                npm_update_cmd,
                UNSATISFIABLE_PATTERN,
            )?,
        })
    }

    /// Hide the spinner shown while the package manager runs.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.updater.set_show_progress(show_progress);
        self
    }
}

impl UpdateStrategy for NpmStrategy {
    fn ecosystem(&self) -> &str {
        ECOSYSTEM
    }

    fn apply(&self, updates: &UpdateSet) -> UpdateRun {
        self.updater.run(updates)
    }
}
