pub mod dependency_file;
pub mod version_update;

pub use dependency_file::{DependencyFile, verify_fingerprint};
pub use version_update::UpdateSet;
