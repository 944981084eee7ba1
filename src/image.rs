use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::{Result, UpdaterError};
use crate::process::Executor;

/// Builds a container image from recipe text
pub trait ImageBuilder {
    /// Build `recipe`; any failure aborts the release
    fn build(&self, recipe: &[u8]) -> Result<()>;
}

/// Runs `docker build` with the recipe on standard input
pub struct DockerBuilder {
    executor: Executor,
    context: PathBuf,
    image_tag: String,
}

impl DockerBuilder {
    pub fn new(executor: Executor, context: impl Into<PathBuf>, image_tag: impl Into<String>) -> Self {
        DockerBuilder {
            executor,
            context: context.into(),
            image_tag: image_tag.into(),
        }
    }

    fn command(&self) -> Vec<&str> {
        vec!["docker", "build", "-", "--tag", self.image_tag.as_str(), "--force-rm"]
    }
}

impl ImageBuilder for DockerBuilder {
    fn build(&self, recipe: &[u8]) -> Result<()> {
        self.executor
            .run_with_input(&self.command(), &self.context, recipe)?;
        Ok(())
    }
}

/// Image builder that keeps every recipe it is asked to build
///
/// Fails on the build numbered `fail_on` (zero based), if set.
#[derive(Default)]
pub struct RecordingBuilder {
    recipes: RefCell<Vec<String>>,
    fail_on: Option<usize>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder whose `index`-th build fails
    pub fn failing_at(index: usize) -> Self {
        RecordingBuilder {
            recipes: RefCell::new(Vec::new()),
            fail_on: Some(index),
        }
    }

    /// Recipes received so far, including a failed one
    pub fn recipes(&self) -> Vec<String> {
        self.recipes.borrow().clone()
    }
}

impl ImageBuilder for RecordingBuilder {
    fn build(&self, recipe: &[u8]) -> Result<()> {
        let mut recipes = self.recipes.borrow_mut();
        recipes.push(String::from_utf8_lossy(recipe).into_owned());
        if self.fail_on == Some(recipes.len() - 1) {
            return Err(UpdaterError::CommandFailed {
                command: "docker build - --tag updater --force-rm".to_string(),
                message: "build failed".to_string(),
                status: 1,
            });
        }
        Ok(())
    }
}
