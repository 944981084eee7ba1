use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};
use crate::vcs::WorkingCopy;

/// Mock working copy for testing without actual git operations
///
/// Revisions are `rev-<n>`, advancing by one per recorded commit. Every call
/// is appended to an operation log.
pub struct MockWorkingCopy {
    root: PathBuf,
    revision: Cell<usize>,
    advance: Cell<bool>,
    fail_push: Cell<bool>,
    operations: RefCell<Vec<String>>,
    commits: RefCell<Vec<String>>,
    tags: RefCell<Vec<String>>,
}

impl MockWorkingCopy {
    /// Create a mock rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockWorkingCopy {
            root: root.into(),
            revision: Cell::new(0),
            advance: Cell::new(true),
            fail_push: Cell::new(false),
            operations: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
        }
    }

    /// Make later commits leave HEAD where it is
    pub fn fail_to_advance(&self) {
        self.advance.set(false);
    }

    /// Make `push_all_tags` fail
    pub fn fail_push(&self) {
        self.fail_push.set(true);
    }

    /// Add a pre-existing tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.tags.borrow_mut().push(name.into());
    }

    /// Every operation performed, in order
    pub fn operations(&self) -> Vec<String> {
        self.operations.borrow().clone()
    }

    /// Messages of recorded commits
    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }

    /// Tags created, in creation order
    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    fn log(&self, operation: String) {
        self.operations.borrow_mut().push(operation);
    }
}

impl WorkingCopy for MockWorkingCopy {
    fn root(&self) -> &Path {
        &self.root
    }

    fn current_revision(&self) -> Result<String> {
        Ok(format!("rev-{}", self.revision.get()))
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.log(format!("checkout {}", reference));
        Ok(())
    }

    fn stage_file(&self, path: &Path) -> Result<()> {
        self.log(format!("add {}", path.display()));
        Ok(())
    }

    fn record_commit(&self, message: &str) -> Result<()> {
        self.log(format!("commit {}", message));
        if self.advance.get() {
            self.revision.set(self.revision.get() + 1);
            self.commits.borrow_mut().push(message.to_string());
        }
        Ok(())
    }

    fn annotate_tag(&self, name: &str) -> Result<()> {
        self.log(format!("tag {}", name));
        self.tags.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn push_all_tags(&self) -> Result<()> {
        self.log("push --tags".to_string());
        if self.fail_push.get() {
            return Err(UpdaterError::CommandFailed {
                command: "git push --tags".to_string(),
                message: "remote rejected".to_string(),
                status: 1,
            });
        }
        Ok(())
    }

    fn list_merged_tags(&self, _branch: Option<&str>) -> Result<Vec<String>> {
        Ok(self.tags())
    }
}
