//! Recognizing newer upstream tags relative to the recorded version
//!
//! Two naming schemes are supported:
//!
//! - prefix scheme, for development snapshots such as
//!   `swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a`: candidates share the prefix up
//!   to and including `SNAPSHOT-`
//! - suffix scheme, for releases such as `swift-4.1-RELEASE`: candidates share
//!   the `-RELEASE` suffix
//!
//! The prefix scheme wins whenever it yields at least one candidate.

use regex::Regex;
use tracing::debug;

use crate::config::PatternsConfig;
use crate::error::{Result, UpdaterError};
use crate::github::TagSource;

/// A tag judged newer than the current version, with its tag-safe identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tag: String,
    pub identifier: String,
}

impl Candidate {
    pub fn new(tag: impl Into<String>, identifier: impl Into<String>) -> Self {
        Candidate {
            tag: tag.into(),
            identifier: identifier.into(),
        }
    }
}

/// Which naming scheme produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Prefix,
    Suffix,
}

/// Outcome of resolving the current version against the remote tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub scheme: Scheme,
    /// Candidates in fetch order (newest first within each scan)
    pub candidates: Vec<Candidate>,
}

impl Resolution {
    /// Candidates sorted ascending by tag, the order they are released in
    pub fn ordered(&self) -> Vec<Candidate> {
        let mut candidates = self.candidates.clone();
        candidates.sort_by(|a, b| a.tag.cmp(&b.tag));
        candidates
    }
}

/// Matches candidate tags against the current version under either scheme
#[derive(Debug, Clone)]
pub struct PatternResolver {
    prefix: Vec<Regex>,
    suffix: Vec<Regex>,
}

impl PatternResolver {
    /// Compile the configured patterns
    ///
    /// Prefix patterns need at least one capture group (the prefix), suffix
    /// patterns at least two (version number, then suffix).
    pub fn new(config: &PatternsConfig) -> Result<Self> {
        let prefix = compile(&config.prefix, 1)?;
        let suffix = compile(&config.suffix, 2)?;
        Ok(PatternResolver { prefix, suffix })
    }

    /// Collect every tag from `source` that is newer than `current`.
    ///
    /// Fails with [UpdaterError::UnknownVersion] when neither scheme produces a
    /// candidate.
    pub fn resolve<S: TagSource>(&self, current: &str, source: &S) -> Result<Resolution> {
        let candidates = self.scan_prefix(current, source)?;
        if !candidates.is_empty() {
            return Ok(Resolution {
                scheme: Scheme::Prefix,
                candidates,
            });
        }

        let candidates = self.scan_suffix(current, source)?;
        if !candidates.is_empty() {
            return Ok(Resolution {
                scheme: Scheme::Suffix,
                candidates,
            });
        }

        Err(UpdaterError::UnknownVersion(current.to_string()))
    }

    fn scan_prefix<S: TagSource>(&self, current: &str, source: &S) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for pattern in &self.prefix {
            let Some(prefix) = prefix_of(pattern, current) else {
                continue;
            };
            debug!(pattern = pattern.as_str(), prefix, "scanning snapshot tags");

            for tag in source.tags() {
                let tag = tag?;
                if !tag.starts_with(prefix) {
                    continue;
                }
                if tag == current {
                    break;
                }
                let identifier = match pattern.captures(&tag) {
                    Some(captures) => {
                        alphanumeric(captures.iter().skip(2).flatten().map(|m| m.as_str()))
                    }
                    None => continue,
                };
                candidates.push(Candidate { tag, identifier });
            }
        }

        Ok(candidates)
    }

    fn scan_suffix<S: TagSource>(&self, current: &str, source: &S) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for pattern in &self.suffix {
            let Some(suffix) = suffix_of(pattern, current) else {
                continue;
            };
            debug!(pattern = pattern.as_str(), suffix, "scanning release tags");

            for tag in source.tags() {
                let tag = tag?;
                if !tag.ends_with(suffix) {
                    continue;
                }
                if tag == current {
                    break;
                }
                let identifier = match pattern.captures(&tag).and_then(|c| c.get(1)) {
                    Some(version) => alphanumeric([version.as_str()]),
                    None => continue,
                };
                candidates.push(Candidate { tag, identifier });
            }
        }

        Ok(candidates)
    }
}

fn compile(patterns: &[String], groups: usize) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            let re = Regex::new(pattern)?;
            if re.captures_len() <= groups {
                return Err(UpdaterError::config(format!(
                    "pattern `{}` needs at least {} capture group(s)",
                    pattern, groups
                )));
            }
            Ok(re)
        })
        .collect()
}

/// `current` up to the end of capture group 1
fn prefix_of<'a>(pattern: &Regex, current: &'a str) -> Option<&'a str> {
    let end = pattern.captures(current)?.get(1)?.end();
    Some(&current[..end])
}

/// `current` from the start of capture group 2
fn suffix_of<'a>(pattern: &Regex, current: &'a str) -> Option<&'a str> {
    let start = pattern.captures(current)?.get(2)?.start();
    Some(&current[start..])
}

fn alphanumeric<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .flat_map(str::chars)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::PagedTags;

    fn resolver() -> PatternResolver {
        PatternResolver::new(&PatternsConfig::default()).unwrap()
    }

    #[test]
    fn test_snapshot_scenario() {
        let source = PagedTags::new(vec![vec![
            "swift-DEVELOPMENT-SNAPSHOT-2018-04-25-a",
            "swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a",
            "swift-DEVELOPMENT-SNAPSHOT-2018-04-18-a",
        ]]);

        let resolution = resolver()
            .resolve("swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a", &source)
            .unwrap();

        assert_eq!(resolution.scheme, Scheme::Prefix);
        assert_eq!(
            resolution.candidates,
            vec![Candidate::new(
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-25-a",
                "20180425a"
            )]
        );
    }

    #[test]
    fn test_release_scenario() {
        let source = PagedTags::new(vec![vec!["swift-4.2-RELEASE", "swift-4.1-RELEASE"]]);

        let resolution = resolver().resolve("swift-4.1-RELEASE", &source).unwrap();

        assert_eq!(resolution.scheme, Scheme::Suffix);
        assert_eq!(
            resolution.candidates,
            vec![Candidate::new("swift-4.2-RELEASE", "42")]
        );
    }

    #[test]
    fn test_prefix_only_admits_shared_prefix() {
        let source = PagedTags::new(vec![
            vec![
                "swift-4.2-DEVELOPMENT-SNAPSHOT-2018-05-01-a",
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-30-a",
                "swift-4.1-RELEASE",
            ],
            vec![
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-25-a",
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a",
            ],
        ]);

        let resolution = resolver()
            .resolve("swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a", &source)
            .unwrap();

        let tags: Vec<&str> = resolution.candidates.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(
            tags,
            vec![
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-30-a",
                "swift-DEVELOPMENT-SNAPSHOT-2018-04-25-a",
            ]
        );
    }

    #[test]
    fn test_versioned_snapshot_keeps_version_in_identifier() {
        let source = PagedTags::new(vec![vec![
            "swift-4.2-DEVELOPMENT-SNAPSHOT-2018-05-01-a",
            "swift-DEVELOPMENT-SNAPSHOT-2018-04-30-a",
            "swift-4.2-DEVELOPMENT-SNAPSHOT-2018-04-28-a",
        ]]);

        let resolution = resolver()
            .resolve("swift-4.2-DEVELOPMENT-SNAPSHOT-2018-04-28-a", &source)
            .unwrap();

        assert_eq!(
            resolution.candidates,
            vec![Candidate::new(
                "swift-4.2-DEVELOPMENT-SNAPSHOT-2018-05-01-a",
                "4220180501a"
            )]
        );
    }

    #[test]
    fn test_scan_stops_at_current_version() {
        let source = PagedTags::new(vec![
            vec!["swift-4.2-RELEASE", "swift-4.1-RELEASE"],
            vec!["swift-4.0-RELEASE"],
        ]);

        let resolution = resolver().resolve("swift-4.1-RELEASE", &source).unwrap();

        assert_eq!(resolution.candidates.len(), 1);
        // Prefix scan never ran, the suffix scan stopped on page one.
        assert_eq!(source.fetches(), 1);
    }

    #[test]
    fn test_current_version_never_a_candidate() {
        let source = PagedTags::new(vec![vec![
            "swift-4.1.1-RELEASE",
            "swift-4.1-RELEASE",
            "swift-4.1.1-RELEASE",
        ]]);

        let resolution = resolver().resolve("swift-4.1-RELEASE", &source).unwrap();

        assert!(resolution
            .candidates
            .iter()
            .all(|c| c.tag != "swift-4.1-RELEASE"));
    }

    #[test]
    fn test_suffix_only_admits_shared_suffix() {
        let source = PagedTags::new(vec![vec![
            "swift-DEVELOPMENT-SNAPSHOT-2018-05-01-a",
            "swift-5.0-RELEASE",
            "swift-4.2-RELEASE",
            "swift-4.2-DEVELOPMENT-SNAPSHOT-2018-04-01-a",
        ]]);

        let resolution = resolver().resolve("swift-4.1-RELEASE", &source).unwrap();

        assert!(resolution
            .candidates
            .iter()
            .all(|c| c.tag.ends_with("-RELEASE")));
        assert_eq!(resolution.candidates.len(), 2);
    }

    #[test]
    fn test_unrecognized_version_is_fatal() {
        let source = PagedTags::new(vec![vec!["swift-4.2-RELEASE"]]);

        let err = resolver().resolve("swift-4.2-beta", &source).unwrap_err();

        assert!(matches!(err, UpdaterError::UnknownVersion(ref v) if v == "swift-4.2-beta"));
        assert_eq!(source.fetches(), 0);
    }

    #[test]
    fn test_up_to_date_snapshot_yields_no_candidates() {
        let source = PagedTags::new(vec![vec!["swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a"]]);

        let err = resolver()
            .resolve("swift-DEVELOPMENT-SNAPSHOT-2018-04-20-a", &source)
            .unwrap_err();

        assert!(matches!(err, UpdaterError::UnknownVersion(_)));
    }

    #[test]
    fn test_empty_identifier_is_still_a_candidate() {
        let config = PatternsConfig {
            prefix: vec![r"^(nightly-)(.*)$".to_string()],
            suffix: vec![],
        };
        let source = PagedTags::new(vec![vec!["nightly-", "nightly-1"]]);

        let resolution = PatternResolver::new(&config)
            .unwrap()
            .resolve("nightly-1", &source)
            .unwrap();

        assert_eq!(resolution.candidates, vec![Candidate::new("nightly-", "")]);
    }

    #[test]
    fn test_remote_failure_propagates() {
        struct Broken;
        impl TagSource for Broken {
            fn fetch_page(&self, _cursor: &str) -> Result<crate::github::TagPage> {
                Err(UpdaterError::remote("test://tags", "down"))
            }
        }

        let err = resolver().resolve("swift-4.1-RELEASE", &Broken).unwrap_err();
        assert!(matches!(err, UpdaterError::Remote { .. }));
    }

    #[test]
    fn test_ordered_sorts_by_tag() {
        let resolution = Resolution {
            scheme: Scheme::Suffix,
            candidates: vec![
                Candidate::new("swift-4.2-RELEASE", "42"),
                Candidate::new("swift-4.1.1-RELEASE", "411"),
            ],
        };

        let tags: Vec<String> = resolution.ordered().into_iter().map(|c| c.tag).collect();
        assert_eq!(tags, vec!["swift-4.1.1-RELEASE", "swift-4.2-RELEASE"]);
    }

    #[test]
    fn test_pattern_without_groups_is_rejected() {
        let config = PatternsConfig {
            prefix: vec!["swift-".to_string()],
            suffix: vec![],
        };
        assert!(matches!(
            PatternResolver::new(&config),
            Err(UpdaterError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let config = PatternsConfig {
            prefix: vec!["(".to_string()],
            suffix: vec![],
        };
        assert!(matches!(
            PatternResolver::new(&config),
            Err(UpdaterError::Pattern(_))
        ));
    }
}
