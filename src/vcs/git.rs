use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};
use crate::process::Executor;
use crate::vcs::WorkingCopy;

/// Working copy driven through the `git` command line
pub struct GitWorkingCopy {
    root: PathBuf,
    executor: Executor,
}

impl GitWorkingCopy {
    /// Use the working copy rooted at `root`
    pub fn open(root: impl Into<PathBuf>, executor: Executor) -> Self {
        GitWorkingCopy {
            root: root.into(),
            executor,
        }
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push("git");
        command.extend_from_slice(args);
        self.executor.run(&command, &self.root)
    }
}

impl WorkingCopy for GitWorkingCopy {
    fn root(&self) -> &Path {
        &self.root
    }

    fn current_revision(&self) -> Result<String> {
        Ok(self.git(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.git(&["checkout", reference])?;
        Ok(())
    }

    fn stage_file(&self, path: &Path) -> Result<()> {
        let path = path
            .to_str()
            .ok_or_else(|| UpdaterError::config(format!("non UTF-8 path: {}", path.display())))?;
        self.git(&["add", path])?;
        Ok(())
    }

    fn record_commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "--message", message])?;
        Ok(())
    }

    fn annotate_tag(&self, name: &str) -> Result<()> {
        self.git(&["tag", "--annotate", "--message", "", name])?;
        Ok(())
    }

    fn push_all_tags(&self) -> Result<()> {
        self.git(&["push", "--tags"])?;
        Ok(())
    }

    fn list_merged_tags(&self, branch: Option<&str>) -> Result<Vec<String>> {
        self.git(&["fetch", "--tags"])?;
        let output = match branch {
            Some(branch) if !branch.is_empty() => {
                let merged = format!("origin/{}", branch);
                self.git(&["tag", "--sort", "taggerdate", "--merged", &merged])?
            }
            _ => self.git(&["tag", "--sort", "taggerdate"])?,
        };

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
