use crate::error::{DepError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A single requested package version change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionUpdate {
    package: String,
    old_version: String,
    target_version: String,
}

impl VersionUpdate {
    pub fn new(
        package: impl Into<String>,
        old_version: impl Into<String>,
        target_version: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            old_version: old_version.into(),
            target_version: target_version.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn old_version(&self) -> &str {
        &self.old_version
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }
}

impl FromStr for VersionUpdate {
    type Err = DepError;

    /// Parses `package:old:target`.
    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() != 3 {
            return Err(DepError::InvalidInput(format!(
                "Invalid update '{}'. Expected format package:old_version:target_version",
                input
            )));
        }

        let package = parts[0].trim();
        let old_version = parts[1].trim();
        let target_version = parts[2].trim();

        if package.is_empty() || old_version.is_empty() || target_version.is_empty() {
            return Err(DepError::InvalidInput(format!(
                "Invalid update '{}'. None of package, old version, target version may be empty",
                input
            )));
        }

        Ok(Self::new(package, old_version, target_version))
    }
}

impl fmt::Display for VersionUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} => {})",
            self.package(),
            self.old_version(),
            self.target_version()
        )
    }
}

/// Version changes applied together in one package-manager invocation.
///
/// Never empty. Order only affects the generated command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UpdateSet(Vec<VersionUpdate>);

impl UpdateSet {
    pub fn new(updates: Vec<VersionUpdate>) -> Result<Self> {
        if updates.is_empty() {
            return Err(DepError::InvalidInput(
                "Update set must contain at least one package".to_string(),
            ));
        }
        Ok(Self(updates))
    }

    pub fn parse<S: AsRef<str>>(coordinates: &[S]) -> Result<Self> {
        let updates = coordinates
            .iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<Vec<VersionUpdate>>>()?;
        Self::new(updates)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionUpdate> {
        self.0.iter()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(VersionUpdate::package)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'a> IntoIterator for &'a UpdateSet {
    type Item = &'a VersionUpdate;
    type IntoIter = std::slice::Iter<'a, VersionUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
