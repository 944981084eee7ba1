pub mod config;
pub mod domain;
pub mod error;
pub mod github;
pub mod image;
pub mod pipeline;
pub mod process;
pub mod ui;
pub mod vcs;

pub use error::{Result, UpdaterError};
