//! Domain logic - version matching and recipe rewriting, independent of git and the network

pub mod pattern;
pub mod template;

pub use pattern::{Candidate, PatternResolver, Resolution, Scheme};
pub use template::{ReleaseTemplate, RELEASE_SUFFIX, VERSION_PREFIX};
