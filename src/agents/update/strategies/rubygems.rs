use super::LockfileUpdater;
use crate::agents::update::{UpdateRun, UpdateStrategy};
use crate::error::Result;
use crate::models::UpdateSet;
use std::path::Path;

pub const ECOSYSTEM: &str = "Rubygem";
pub const LOCKFILE: &str = "Gemfile.lock";
pub const UNSATISFIABLE_PATTERN: &str = r"(?m)^Bundler could not find compatible versions for gem";

/// Updates gems with `bundle update <gem>...`, rewriting `Gemfile.lock`.
#[derive(Debug, Clone)]
pub struct RubygemsStrategy {
    updater: LockfileUpdater,
}

impl RubygemsStrategy {
    pub fn new<P: AsRef<Path>>(project_path: P, bundle_update_cmd: &str) -> Result<Self> {
        Ok(Self {
            updater: LockfileUpdater::new(
                ECOSYSTEM,
                project_path.as_ref(),
                LOCKFILE,
                bundle_update_cmd,
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

impl UpdateStrategy for RubygemsStrategy {
    fn ecosystem(&self) -> &str {
        ECOSYSTEM
    }

    fn apply(&self, updates: &UpdateSet) -> UpdateRun {
        self.updater.run(updates)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::agents::update::strategies::test_support::fake_tool;
    use crate::error::DepError;
    use crate::models::dependency_file::fingerprint;
    use crate::models::version_update::VersionUpdate;
    use std::fs;
    use tempfile::tempdir;

    const LOCK_BEFORE: &str = "GEM\n  specs:\n    rails (6.0.0)\n";
    const LOCK_AFTER: &str = "GEM\n  specs:\n    rails (6.1.0)\n";

    fn rails_update() -> UpdateSet {
        UpdateSet::new(vec![VersionUpdate::new("rails", "6.0.0", "6.1.0")]).unwrap()
    }

    #[test]
    fn successful_update_reports_original_and_updated_lockfile() {
        let project = tempdir().unwrap();
        let tools = tempdir().unwrap();
        let lock = project.path().join(LOCKFILE);
        fs::write(&lock, LOCK_BEFORE).unwrap();
        let before_sha = fingerprint(&lock).unwrap();

        let bundle = fake_tool(
            tools.path(),
            "bundle.sh",
            &format!(
                "echo \"$@\" > {args}\nprintf '{after}' > Gemfile.lock\n",
                args = tools.path().join("args.txt").display(),
                after = LOCK_AFTER.replace('\n', "\\n"),
            ),
        );
        let strategy = RubygemsStrategy::new(project.path(), &format!("{bundle} update"))
            .unwrap()
            .with_progress(false);
        let run = strategy.apply(&rails_update());

        assert!(run.is_success(), "{:?}", run.error());
        assert_eq!(run.original.len(), 1);
        assert_eq!(run.original[0].sha(), before_sha);
        assert_eq!(run.original[0].content(), LOCK_BEFORE.as_bytes());

        let updated = run.updated();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].path(), lock.as_path());
        assert_eq!(updated[0].content(), LOCK_AFTER.as_bytes());
        assert!(updated[0].differs_from(&run.original[0]));
        assert!(updated[0].verify_integrity().is_ok());

        let args = fs::read_to_string(tools.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "update rails");
    }

    #[test]
    fn incompatible_versions_are_unsatisfiable() {
        let project = tempdir().unwrap();
        let tools = tempdir().unwrap();
        let lock = project.path().join(LOCKFILE);
        fs::write(&lock, LOCK_BEFORE).unwrap();

        let bundle = fake_tool(
            tools.path(),
            "bundle.sh",
            "printf 'half written' > Gemfile.lock\n\
             echo 'Fetching gem metadata from https://rubygems.org/'\n\
             echo 'Bundler could not find compatible versions for gem \"actionpack\":' >&2\n\
             exit 6\n",
        );
        let strategy = RubygemsStrategy::new(project.path(), &bundle).unwrap();
        let run = strategy.apply(&rails_update());

        let err = run.error().expect("update should fail");
        assert!(err.is_unsatisfiable());
        match err {
            DepError::UnsatisfiableUpdate { ecosystem, .. } => assert_eq!(ecosystem, "Rubygem"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(run.updated().is_empty());
        assert_eq!(run.original.len(), 1);
        assert_eq!(run.original[0].content(), LOCK_BEFORE.as_bytes());

        run.restore_original().unwrap();
        assert_eq!(fs::read_to_string(&lock).unwrap(), LOCK_BEFORE);
    }

    #[test]
    fn other_failures_are_execution_errors_with_output() {
        let project = tempdir().unwrap();
        let tools = tempdir().unwrap();
        fs::write(project.path().join(LOCKFILE), LOCK_BEFORE).unwrap();

        let bundle = fake_tool(
            tools.path(),
            "bundle.sh",
            "echo 'Could not locate Gemfile' >&2\nexit 10\n",
        );
        let strategy = RubygemsStrategy::new(project.path(), &bundle).unwrap();
        let run = strategy.apply(&rails_update());

        match run.error() {
            Some(DepError::Execution { output, .. }) => {
                assert!(output.contains("Could not locate Gemfile"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(run.updated().is_empty());
        assert_eq!(run.original.len(), 1);
    }

    #[test]
    fn missing_lockfile_fails_before_running_anything() {
        let project = tempdir().unwrap();
        let tools = tempdir().unwrap();
        let marker = tools.path().join("ran");
        let bundle = fake_tool(
            tools.path(),
            "bundle.sh",
            &format!("touch {}\n", marker.display()),
        );

        let strategy = RubygemsStrategy::new(project.path(), &bundle).unwrap();
        let run = strategy.apply(&rails_update());

        assert!(matches!(run.error(), Some(DepError::Io { .. })));
        assert!(run.original.is_empty());
        assert!(!marker.exists());
    }
}
