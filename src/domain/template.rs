use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};

/// Prefix carried by upstream tags but not by the recipe's version field.
pub const VERSION_PREFIX: &str = "swift-";

/// Suffix marking a final release.
pub const RELEASE_SUFFIX: &str = "-RELEASE";

const BRANCH_DECLARATION: &str = r"(?m)^ENV\s*SWIFT_BRANCH=(\S*)";
const VERSION_DECLARATION: &str = r"(?m)^\s*SWIFT_VERSION=(\S*)";

/// The build recipe whose branch and version declarations track upstream releases.
///
/// Ranges are located fresh on every access, since a replacement may change
/// the length of the text before them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTemplate {
    path: PathBuf,
    contents: String,
}

impl ReleaseTemplate {
    /// Read the recipe at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?;
        Ok(ReleaseTemplate { path, contents })
    }

    /// Build a template from text already in memory, to be written to `path`
    pub fn from_contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        ReleaseTemplate {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Value of the `ENV SWIFT_BRANCH=` declaration
    pub fn branch(&self) -> Result<String> {
        let range = self.branch_range()?;
        Ok(self.contents[range].to_string())
    }

    /// Current version in upstream tag form, e.g. `swift-4.1-RELEASE`
    pub fn swift_version(&self) -> Result<String> {
        let range = self.version_range()?;
        Ok(format!("{}{}", VERSION_PREFIX, &self.contents[range]))
    }

    /// Produce a copy declaring `version`, and `branch` when `version` is a final release.
    ///
    /// An empty `branch` for a final release is replaced by the lower-cased version.
    pub fn derive_for(&self, branch: &str, version: &str) -> Result<Self> {
        let mut derived = self.clone();

        let branch_range = derived.branch_range()?;
        if version.ends_with(RELEASE_SUFFIX) {
            let branch = if branch.is_empty() {
                version.to_lowercase()
            } else {
                branch.to_string()
            };
            derived.contents.replace_range(branch_range, &branch);
        }

        let version_range = derived.version_range()?;
        let bare = version.strip_prefix(VERSION_PREFIX).unwrap_or(version);
        derived.contents.replace_range(version_range, bare);

        Ok(derived)
    }

    /// Replace the file at [ReleaseTemplate::path] with the current contents
    pub fn write(&self) -> Result<()> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| UpdaterError::config(format!("{} is not a file", self.path.display())))?;
        let mut staging_name = file_name.to_os_string();
        staging_name.push(".updating");
        let staging = self.path.with_file_name(staging_name);

        let written =
            fs::write(&staging, &self.contents).and_then(|_| fs::rename(&staging, &self.path));
        if let Err(e) = written {
            // Keep the working tree free of half-written recipes.
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    fn branch_range(&self) -> Result<Range<usize>> {
        first_capture(BRANCH_DECLARATION, &self.contents)?.ok_or(UpdaterError::BranchNotFound)
    }

    fn version_range(&self) -> Result<Range<usize>> {
        first_capture(VERSION_DECLARATION, &self.contents)?.ok_or(UpdaterError::VersionNotFound)
    }
}

fn first_capture(pattern: &str, text: &str) -> Result<Option<Range<usize>>> {
    let re = Regex::new(pattern)?;
    Ok(re
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.range()))
}
