//! Remote tag listing
//!
//! Tags of the upstream repository are exposed as a lazy sequence that pulls
//! one page at a time from a cursor-paginated source, newest first.
//!
//! - [client::GitHubClient]: the GitHub GraphQL implementation
//! - [memory::PagedTags]: fixed pages held in memory, for tests
//!
//! A consumer may stop iterating at any point; no further pages are fetched.

pub mod client;
pub mod memory;

pub use client::{GitHubClient, RemoteRepository};
pub use memory::PagedTags;

use crate::error::Result;

/// Maximum number of tags requested per page.
pub const PAGE_SIZE: usize = 100;

/// One page of tag names plus the cursor state needed to request the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagPage {
    /// Tag names in the order the remote reported them
    pub tags: Vec<String>,
    /// Whether another page follows this one
    pub has_next_page: bool,
    /// Opaque cursor to pass when requesting the next page
    pub end_cursor: String,
}

/// A cursor-paginated list of tag names.
///
/// Implementors only fetch single pages; [TagSource::tags] stitches them into
/// a lazy sequence. Every call to `tags` starts over from the first page.
pub trait TagSource {
    /// Fetch the page following `cursor`; the first page uses an empty cursor.
    fn fetch_page(&self, cursor: &str) -> Result<TagPage>;

    /// Lazily iterate every tag name, fetching pages on demand.
    fn tags(&self) -> Tags<'_, Self>
    where
        Self: Sized,
    {
        Tags::new(self)
    }
}

/// Lazy iterator over the tags of a [TagSource].
///
/// Yields `Err` at most once, when a page fetch fails, and ends afterwards.
pub struct Tags<'a, S> {
    source: &'a S,
    buffer: std::vec::IntoIter<String>,
    next_cursor: Option<String>,
}

impl<'a, S: TagSource> Tags<'a, S> {
    fn new(source: &'a S) -> Self {
        Tags {
            source,
            buffer: Vec::new().into_iter(),
            next_cursor: Some(String::new()),
        }
    }
}

impl<S: TagSource> Iterator for Tags<'_, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tag) = self.buffer.next() {
                return Some(Ok(tag));
            }

            let cursor = self.next_cursor.take()?;
            match self.source.fetch_page(&cursor) {
                Ok(page) => {
                    if page.has_next_page {
                        self.next_cursor = Some(page.end_cursor);
                    }
                    self.buffer = page.tags.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdaterError;

    #[test]
    fn test_tags_concatenate_pages_in_order() {
        let source = PagedTags::new(vec![vec!["c", "b"], vec!["a"], vec!["z"]]);
        let tags: Vec<String> = source.tags().collect::<Result<_>>().unwrap();
        assert_eq!(tags, vec!["c", "b", "a", "z"]);
        assert_eq!(source.fetches(), 3);
    }

    #[test]
    fn test_tags_are_lazy() {
        let source = PagedTags::new(vec![vec!["c", "b"], vec!["a"]]);
        let mut tags = source.tags();
        assert_eq!(source.fetches(), 0);
        assert_eq!(tags.next().unwrap().unwrap(), "c");
        assert_eq!(source.fetches(), 1);
    }

    #[test]
    fn test_early_stop_does_not_fetch_remaining_pages() {
        let source = PagedTags::new(vec![vec!["c", "b"], vec!["a"], vec!["z"]]);
        let found = source
            .tags()
            .map(|tag| tag.unwrap())
            .find(|tag| tag == "b");
        assert_eq!(found.as_deref(), Some("b"));
        assert_eq!(source.fetches(), 1);
    }

    #[test]
    fn test_each_traversal_starts_over() {
        let source = PagedTags::new(vec![vec!["b"], vec!["a"]]);
        assert_eq!(source.tags().count(), 2);
        assert_eq!(source.tags().count(), 2);
        assert_eq!(source.fetches(), 4);
    }

    #[test]
    fn test_empty_intermediate_page_is_skipped() {
        let source = PagedTags::new(vec![vec!["b"], vec![], vec!["a"]]);
        let tags: Vec<String> = source.tags().collect::<Result<_>>().unwrap();
        assert_eq!(tags, vec!["b", "a"]);
    }

    struct FailingSource;

    impl TagSource for FailingSource {
        fn fetch_page(&self, _cursor: &str) -> Result<TagPage> {
            Err(UpdaterError::remote("test://tags", "boom"))
        }
    }

    #[test]
    fn test_fetch_failure_yields_one_error_then_ends() {
        let mut tags = FailingSource.tags();
        assert!(matches!(tags.next(), Some(Err(UpdaterError::Remote { .. }))));
        assert!(tags.next().is_none());
    }
}
