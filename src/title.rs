//! Folder title inference
//!
//! Photo collections are nested inconsistently: sometimes
//! `District/School/Room`, sometimes `District/School/Category/Room`.
//! A [`SegmentMatcher`] decides whether a folder name looks like an
//! institution or leaf descriptor, and a [`TitleResolver`] uses that to
//! decide how far up the path the main title lives.

use std::path::{Path, PathBuf};
use regex::Regex;
use crate::config::{ReportConfig, TitlePolicy};
use crate::error::Result;

/// Main title and subtitle of a folder report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePair {
    pub main_title: String,
    pub sub_title: String,
}

impl TitlePair {
    pub fn new(main_title: impl Into<String>, sub_title: impl Into<String>) -> Self {
        Self {
            main_title: main_title.into(),
            sub_title: sub_title.into(),
        }
    }

    /// `"<main> - <sub>"`, or just the subtitle when there is no main title
    pub fn joined(&self) -> String {
        if self.main_title.is_empty() {
            self.sub_title.clone()
        } else {
            format!("{} - {}", self.main_title, self.sub_title)
        }
    }
}

/// Predicate over a single path segment
pub trait SegmentMatcher {
    fn matches(&self, segment: &str) -> bool;
}

/// Case-sensitive substring keywords plus regular expressions
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I, patterns: &[String]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            patterns,
        })
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        Self::new(config.keywords.iter().cloned(), &config.patterns)
    }

    /// Substring check only, ignoring the regex patterns
    pub fn contains_keyword(&self, segment: &str) -> bool {
        self.keywords.iter().any(|k| segment.contains(k.as_str()))
    }
}

impl SegmentMatcher for KeywordMatcher {
    fn matches(&self, segment: &str) -> bool {
        self.contains_keyword(segment) || self.patterns.iter().any(|p| p.is_match(segment))
    }
}

impl<F> SegmentMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, segment: &str) -> bool {
        self(segment)
    }
}

/// Derives a [`TitlePair`] for a folder
pub trait TitleResolver {
    fn resolve(&self, folder: &Path) -> TitlePair;
}

/// Keyword heuristic.
///
/// 1. If the parent matches, the parent is the main title.
/// 2. Otherwise, if there is a grandparent and the folder itself carries no
///    keyword, the grandparent is the main title.
/// 3. Otherwise the parent is the main title.
///
/// The folder name is always the subtitle.
pub struct KeywordTitleResolver<M, L = M> {
    matcher: M,
    leaf: L,
}

impl<M: SegmentMatcher, L: SegmentMatcher> KeywordTitleResolver<M, L> {
    /// `matcher` tests the parent segment, `leaf` tests the folder itself
    pub fn with_matchers(matcher: M, leaf: L) -> Self {
        Self { matcher, leaf }
    }
}

impl KeywordTitleResolver<KeywordMatcher> {
    pub fn new(matcher: KeywordMatcher) -> Self {
        // The folder check is a plain substring test; patterns only apply to the parent.
        let leaf = KeywordMatcher {
            keywords: matcher.keywords.clone(),
            patterns: Vec::new(),
        };
        Self { matcher, leaf }
    }
}

impl<M: SegmentMatcher, L: SegmentMatcher> TitleResolver for KeywordTitleResolver<M, L> {
    fn resolve(&self, folder: &Path) -> TitlePair {
        let folder_name = segment(Some(folder));
        let parent = folder.parent();
        let parent_name = segment(parent);

        if self.matcher.matches(&parent_name) {
            return TitlePair::new(parent_name, folder_name);
        }

        let grandparent_name = segment(parent.and_then(Path::parent));
        if !grandparent_name.is_empty() && !self.leaf.matches(&folder_name) {
            return TitlePair::new(grandparent_name, folder_name);
        }

        TitlePair::new(parent_name, folder_name)
    }
}

/// Grandparent as main title, clamped to the traversal root
#[derive(Debug, Clone)]
pub struct FixedDepthTitleResolver {
    root: PathBuf,
}

impl FixedDepthTitleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TitleResolver for FixedDepthTitleResolver {
    fn resolve(&self, folder: &Path) -> TitlePair {
        let folder_name = segment(Some(folder));
        let depth = folder
            .strip_prefix(&self.root)
            .map(|rel| rel.components().count())
            .ok();

        let main = match depth {
            Some(0) => String::new(),
            Some(1) => segment(Some(&self.root)),
            _ => segment(folder.ancestors().nth(2)),
        };

        TitlePair::new(main, folder_name)
    }
}

/// Build the resolver selected by `config.title_policy`
pub fn resolver_for(config: &ReportConfig, root: &Path) -> Result<Box<dyn TitleResolver>> {
    Ok(match config.title_policy {
        TitlePolicy::Keywords => {
            Box::new(KeywordTitleResolver::new(KeywordMatcher::from_config(config)?))
        }
        TitlePolicy::FixedDepth => Box::new(FixedDepthTitleResolver::new(root)),
    })
}

/// Final path component as a string, or empty
fn segment(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> KeywordTitleResolver<KeywordMatcher> {
        let config = ReportConfig::default();
        KeywordTitleResolver::new(KeywordMatcher::from_config(&config).unwrap())
    }

    #[test]
    fn test_parent_with_keyword_is_main_title() {
        let titles = resolver().resolve(Path::new("/Photos/Lincoln ISD/Elementary"));
        assert_eq!(titles, TitlePair::new("Lincoln ISD", "Elementary"));
    }

    #[test]
    fn test_keyword_parent_one_level_deeper() {
        let titles = resolver().resolve(Path::new("/Photos/Lincoln ISD/Elementary/RoomA"));
        assert_eq!(titles, TitlePair::new("Elementary", "RoomA"));
    }

    #[test]
    fn test_auditorium_parent_matches_case_insensitively() {
        let titles = resolver().resolve(Path::new("/Photos/Main AUDITORIUM/Stage Left"));
        assert_eq!(titles, TitlePair::new("Main AUDITORIUM", "Stage Left"));
    }

    #[test]
    fn test_plain_parent_climbs_to_grandparent() {
        let titles = resolver().resolve(Path::new("/Photos/Lincoln ISD/Roof/North Wing"));
        assert_eq!(titles, TitlePair::new("Lincoln ISD", "North Wing"));
    }

    #[test]
    fn test_keyword_folder_keeps_parent() {
        let titles = resolver().resolve(Path::new("/Photos/Campus/Roof/3rd Floor"));
        assert_eq!(titles, TitlePair::new("Roof", "3rd Floor"));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let titles = resolver().resolve(Path::new("/Photos/Lincoln isd/Gym"));
        assert_eq!(titles, TitlePair::new("Photos", "Gym"));
    }

    #[test]
    fn test_shallow_paths_degrade() {
        let r = resolver();
        assert_eq!(r.resolve(Path::new("Gym")), TitlePair::new("", "Gym"));
        assert_eq!(r.resolve(Path::new("Roof/Gym")), TitlePair::new("Roof", "Gym"));
        assert_eq!(r.resolve(Path::new("/")), TitlePair::new("", ""));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = resolver();
        let path = Path::new("/Photos/Lincoln ISD/Roof/North Wing");
        assert_eq!(r.resolve(path), r.resolve(path));
    }

    #[test]
    fn test_custom_predicate() {
        let r = KeywordTitleResolver::with_matchers(
            |s: &str| s.starts_with("Campus"),
            |_: &str| false,
        );
        let titles = r.resolve(Path::new("/Photos/Campus North/Lab"));
        assert_eq!(titles, TitlePair::new("Campus North", "Lab"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = KeywordMatcher::new(["ISD"], &["(".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_depth_uses_grandparent() {
        let r = FixedDepthTitleResolver::new("/Photos");
        assert_eq!(
            r.resolve(Path::new("/Photos/Lincoln ISD/Elementary/RoomA")),
            TitlePair::new("Lincoln ISD", "RoomA"),
        );
    }

    #[test]
    fn test_fixed_depth_clamps_to_root() {
        let r = FixedDepthTitleResolver::new("/Photos");
        assert_eq!(r.resolve(Path::new("/Photos/Lincoln ISD")), TitlePair::new("Photos", "Lincoln ISD"));
        assert_eq!(r.resolve(Path::new("/Photos")), TitlePair::new("", "Photos"));
    }
}
