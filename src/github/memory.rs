use std::cell::Cell;

use crate::error::Result;
use crate::github::{TagPage, TagSource};

/// Tag source serving fixed pages from memory
///
/// Cursors are page indices rendered as strings. Counts fetches so callers can
/// observe how many pages a traversal pulled.
pub struct PagedTags {
    pages: Vec<Vec<String>>,
    fetches: Cell<usize>,
}

impl PagedTags {
    /// Create a source from pages of tag names, newest first
    pub fn new<T: Into<String>>(pages: Vec<Vec<T>>) -> Self {
        PagedTags {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(Into::into).collect())
                .collect(),
            fetches: Cell::new(0),
        }
    }

    /// Number of pages fetched so far
    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl TagSource for PagedTags {
    fn fetch_page(&self, cursor: &str) -> Result<TagPage> {
        self.fetches.set(self.fetches.get() + 1);

        let index = cursor.parse::<usize>().unwrap_or(0);
        let tags = self.pages.get(index).cloned().unwrap_or_default();
        let has_next_page = index + 1 < self.pages.len();

        Ok(TagPage {
            tags,
            has_next_page,
            end_cursor: (index + 1).to_string(),
        })
    }
}
