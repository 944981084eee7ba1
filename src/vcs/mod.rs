//! Working copy operations
//!
//! The [WorkingCopy] trait is everything the release pipeline needs from
//! version control:
//!
//! - [git::GitWorkingCopy]: drives the `git` command line, one invocation per operation
//! - [mock::MockWorkingCopy]: records calls in memory for tests
//!
//! Pipeline code depends on the trait so scenarios can run without a repository.

pub mod git;
pub mod mock;

pub use git::GitWorkingCopy;
pub use mock::MockWorkingCopy;

use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, UpdaterError};

/// Version control operations consumed by the release pipeline
///
/// Implementations map command failures to [UpdaterError::CommandFailed].
pub trait WorkingCopy {
    /// Root directory of the working copy
    fn root(&self) -> &Path;

    /// Identifier of the commit at HEAD
    fn current_revision(&self) -> Result<String>;

    /// Switch the working tree to `reference`
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Stage `path` for the next commit
    fn stage_file(&self, path: &Path) -> Result<()>;

    /// Record staged changes with `message`, without checking the outcome
    fn record_commit(&self, message: &str) -> Result<()>;

    /// Create an annotated tag at HEAD with an empty annotation
    fn annotate_tag(&self, name: &str) -> Result<()>;

    /// Push every local tag to the default remote
    fn push_all_tags(&self) -> Result<()>;

    /// Tags sorted by tagging date, oldest first, optionally only those merged
    /// into `origin/<branch>`
    fn list_merged_tags(&self, branch: Option<&str>) -> Result<Vec<String>>;

    /// Commit staged changes and, when `tag` is non-empty, tag the new commit.
    ///
    /// Fails with [UpdaterError::NoOpCommit] if HEAD did not move.
    fn commit(&self, message: &str, tag: Option<&str>) -> Result<String> {
        let before = self.current_revision()?;
        self.record_commit(message)?;
        let after = self.current_revision()?;

        if after == before {
            return Err(UpdaterError::NoOpCommit {
                message: message.to_string(),
                revision: after,
            });
        }
        info!(revision = %after, message, "committed");

        match tag {
            Some(name) if !name.is_empty() => self.annotate_tag(name)?,
            Some(_) => warn!(message, "empty tag name, skipping tag"),
            None => {}
        }

        Ok(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_then_tag() {
        let repo = MockWorkingCopy::new("/repo");
        let revision = repo.commit("swift-4.2-RELEASE", Some("42")).unwrap();
        assert_eq!(revision, "rev-1");
        assert_eq!(repo.tags(), vec!["42"]);
    }

    #[test]
    fn test_no_op_commit_is_rejected_before_tagging() {
        let repo = MockWorkingCopy::new("/repo");
        repo.fail_to_advance();

        let err = repo.commit("swift-4.2-RELEASE", Some("42")).unwrap_err();

        assert!(matches!(err, UpdaterError::NoOpCommit { ref revision, .. } if revision == "rev-0"));
        assert!(repo.tags().is_empty());
    }

    #[test]
    fn test_empty_tag_is_skipped() {
        let repo = MockWorkingCopy::new("/repo");
        repo.commit("nightly-", Some("")).unwrap();
        assert!(repo.tags().is_empty());
        assert_eq!(repo.commits(), vec!["nightly-"]);
    }

    #[test]
    fn test_commit_without_tag() {
        let repo = MockWorkingCopy::new("/repo");
        repo.commit("message", None).unwrap();
        assert!(repo.tags().is_empty());
    }
}
