//! Release pipeline orchestration
//!
//! Drives one run end to end:
//! 1. Load the recipe from the working copy and read the current version
//! 2. Resolve newer upstream tags
//! 3. Order them ascending by tag
//! 4. For each tag: derive the recipe, build, write, commit, tag, push
//!
//! The first failure ends the run. Nothing is rolled back; the working copy
//! keeps every release that completed before the failure.

use std::path::PathBuf;

use tracing::info;

use crate::domain::{Candidate, PatternResolver, ReleaseTemplate, Scheme};
use crate::error::Result;
use crate::github::TagSource;
use crate::image::ImageBuilder;
use crate::ui;
use crate::vcs::WorkingCopy;

/// What a run intends to release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Version recorded in the recipe when the run started
    pub current_version: String,
    /// Branch captured from the recipe when the snapshot scheme matched
    pub branch: Option<String>,
    /// Candidates ascending by tag
    pub candidates: Vec<Candidate>,
}

impl ReleasePlan {
    /// Branch declaration to write for `candidate`
    pub fn branch_for(&self, candidate: &Candidate) -> String {
        self.branch
            .clone()
            .unwrap_or_else(|| candidate.tag.to_lowercase())
    }
}

/// One completed release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub identifier: String,
    pub revision: String,
}

/// Sequential, fail-fast release driver
pub struct ReleasePipeline<'a, W, B, S> {
    working_copy: &'a W,
    builder: &'a B,
    tags: &'a S,
    resolver: &'a PatternResolver,
    recipe: PathBuf,
}

impl<'a, W, B, S> ReleasePipeline<'a, W, B, S>
where
    W: WorkingCopy,
    B: ImageBuilder,
    S: TagSource,
{
    /// `recipe` is relative to the working copy root
    pub fn new(
        working_copy: &'a W,
        builder: &'a B,
        tags: &'a S,
        resolver: &'a PatternResolver,
        recipe: impl Into<PathBuf>,
    ) -> Self {
        ReleasePipeline {
            working_copy,
            builder,
            tags,
            resolver,
            recipe: recipe.into(),
        }
    }

    /// Check out `branch` when given, then read the recipe.
    ///
    /// Fails if either declaration is missing.
    pub fn load(&self, branch: Option<&str>) -> Result<ReleaseTemplate> {
        if let Some(branch) = branch.filter(|b| !b.is_empty()) {
            self.working_copy.checkout(branch)?;
        }

        let template = ReleaseTemplate::open(self.working_copy.root().join(&self.recipe))?;
        template.swift_version()?;
        Ok(template)
    }

    /// Resolve and order the tags newer than the recipe's version
    pub fn plan(&self, template: &ReleaseTemplate) -> Result<ReleasePlan> {
        let current_version = template.swift_version()?;
        ui::display_status(&format!("Current Swift version: {}", current_version));

        let resolution = self.resolver.resolve(&current_version, self.tags)?;
        let branch = match resolution.scheme {
            Scheme::Prefix => Some(template.branch()?),
            Scheme::Suffix => None,
        };
        let candidates = resolution.ordered();
        info!(
            current = %current_version,
            scheme = ?resolution.scheme,
            count = candidates.len(),
            "resolved candidates"
        );

        Ok(ReleasePlan {
            current_version,
            branch,
            candidates,
        })
    }

    /// Build, commit, tag and push every planned candidate in order
    pub fn release(&self, template: &ReleaseTemplate, plan: &ReleasePlan) -> Result<Vec<Release>> {
        let mut releases = Vec::with_capacity(plan.candidates.len());

        for candidate in &plan.candidates {
            releases.push(self.release_one(template, plan, candidate)?);
        }

        Ok(releases)
    }

    /// Load, plan and release in one pass
    pub fn run(&self, branch: Option<&str>) -> Result<Vec<Release>> {
        let template = self.load(branch)?;
        let plan = self.plan(&template)?;
        ui::display_candidates(&plan.current_version, &plan.candidates);
        self.release(&template, &plan)
    }

    fn release_one(
        &self,
        template: &ReleaseTemplate,
        plan: &ReleasePlan,
        candidate: &Candidate,
    ) -> Result<Release> {
        let branch = plan.branch_for(candidate);
        let updated = template.derive_for(&branch, &candidate.tag)?;

        ui::display_status(&format!("Building {}", candidate.tag));
        self.builder.build(updated.contents().as_bytes())?;

        updated.write()?;
        self.working_copy.stage_file(updated.path())?;
        let revision = self
            .working_copy
            .commit(&candidate.tag, Some(&candidate.identifier))?;
        self.working_copy.push_all_tags()?;

        info!(tag = %candidate.tag, identifier = %candidate.identifier, %revision, "released");
        ui::display_success(&format!("Released {} ({})", candidate.tag, revision));

        Ok(Release {
            tag: candidate.tag.clone(),
            identifier: candidate.identifier.clone(),
            revision,
        })
    }
}
