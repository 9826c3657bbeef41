//! Exclusion patterns for volatile fields.
//!
//! A pattern excludes every path it matches a prefix of, so excluding a
//! subtree excludes all of its descendants. Supported forms:
//!
//! | Pattern | Matches |
//! |---|---|
//! | `root['lastModifiedDateTime']` | that key at the top level |
//! | `settings.version` | dotted form of the same thing |
//! | `assignments[*].id` / `assignments.*.id` | `id` in every element |
//! | `**.lastModifiedDateTime` | the key at any depth |
//! | `*DateTime` | glob over a key name |
//!
//! Inside sequences, elements are canonicalized before they have a stable
//! index, so while pruning an element only `*`, `[*]` and `**` match its
//! position. Literal indices apply to the canonical indices reported in the
//! change map.

use crate::diff::path::{tokenize, Segment, Token};
use crate::errors::DriftError;
use std::fmt;
use std::str::FromStr;

/// Exclusions applied when no configuration says otherwise.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["root['lastModifiedDateTime']"];

/// One step of the path currently being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<'a> {
    Key(&'a str),
    Index(usize),
    /// A sequence element whose canonical position is not yet known
    Element,
}

impl<'a> From<&'a Segment> for Step<'a> {
    fn from(segment: &'a Segment) -> Self {
        match segment {
            Segment::Key(k) => Step::Key(k),
            Segment::Index(i) => Step::Index(*i),
        }
    }
}

#[derive(Debug, Clone)]
enum KeyMatcher {
    Exact(String),
    Glob(glob::Pattern),
}

impl KeyMatcher {
    fn matches(&self, key: &str) -> bool {
        match self {
            KeyMatcher::Exact(k) => k == key,
            KeyMatcher::Glob(p) => p.matches(key),
        }
    }
}

#[derive(Debug, Clone)]
enum PatternSegment {
    Key(KeyMatcher),
    Index(usize),
    /// A bare all-digit segment from dotted form: key or index
    KeyOrIndex(String),
    /// `*` or `[*]`: exactly one segment of any kind
    Any,
    /// `**`: zero or more segments
    AnyDepth,
}

impl PatternSegment {
    fn matches(&self, step: &Step<'_>) -> bool {
        match (self, step) {
            (PatternSegment::Any, _) => true,
            (PatternSegment::Key(m), Step::Key(k)) => m.matches(k),
            (PatternSegment::Index(n), Step::Index(i)) => n == i,
            (PatternSegment::KeyOrIndex(s), Step::Key(k)) => s == k,
            (PatternSegment::KeyOrIndex(s), Step::Index(i)) => s.parse::<usize>() == Ok(*i),
            _ => false,
        }
    }
}

/// A parsed exclusion pattern.
///
/// To exclude a field of sequence elements, address the elements with `[*]`
/// (`items[*].x`). A literal index such as `items[0].x` cannot match while
/// elements are pruned, so an element differing only in `x` is still
/// reported whole at `root['items'][0]`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Parse a pattern in bracket or dotted notation.
    ///
    /// # Errors
    ///
    /// `DriftError::InvalidPattern` when the text is malformed, names no
    /// segment at all (which would exclude the whole document), or holds a
    /// bad glob.
    pub fn parse(pattern: &str) -> Result<Self, DriftError> {
        let invalid = |reason: String| DriftError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let tokens = tokenize(pattern).map_err(invalid)?;
        if tokens.is_empty() {
            return Err(invalid(
                "pattern would exclude the whole document".to_string(),
            ));
        }

        let mut segments = Vec::with_capacity(tokens.len());
        for token in tokens {
            let segment = match token {
                Token::Quoted(key) => PatternSegment::Key(KeyMatcher::Exact(key)),
                Token::Index(i) => PatternSegment::Index(i),
                Token::AnyIndex => PatternSegment::Any,
                Token::Bare(bare) => match bare.as_str() {
                    "*" => PatternSegment::Any,
                    "**" => PatternSegment::AnyDepth,
                    b if b.chars().all(|c| c.is_ascii_digit()) => {
                        PatternSegment::KeyOrIndex(bare)
                    }
                    b if b.contains('*') || b.contains('?') => {
                        let glob = glob::Pattern::new(b).map_err(|e| invalid(e.to_string()))?;
                        PatternSegment::Key(KeyMatcher::Glob(glob))
                    }
                    _ => PatternSegment::Key(KeyMatcher::Exact(bare)),
                },
            };
            segments.push(segment);
        }

        if segments
            .iter()
            .all(|s| matches!(s, PatternSegment::AnyDepth))
        {
            return Err(invalid(
                "pattern would exclude the whole document".to_string(),
            ));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern text as supplied.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this pattern excludes `path` (a prefix match).
    pub fn matches(&self, path: &[Segment]) -> bool {
        let steps: Vec<Step<'_>> = path.iter().map(Step::from).collect();
        self.matches_steps(&steps)
    }

    pub(crate) fn matches_steps(&self, steps: &[Step<'_>]) -> bool {
        match_prefix(&self.segments, steps)
    }
}

fn match_prefix(pattern: &[PatternSegment], steps: &[Step<'_>]) -> bool {
    match pattern.split_first() {
        None => true,
        Some((PatternSegment::AnyDepth, rest)) => {
            (0..=steps.len()).any(|skip| match_prefix(rest, &steps[skip..]))
        }
        Some((segment, rest)) => match steps.split_first() {
            None => false,
            Some((step, remaining)) => segment.matches(step) && match_prefix(rest, remaining),
        },
    }
}

impl FromStr for PathPattern {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The set of patterns applied to one diff run.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<PathPattern>,
}

impl ExclusionSet {
    /// No exclusions at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(patterns: Vec<PathPattern>) -> Self {
        Self { patterns }
    }

    /// Parse every pattern, failing on the first malformed one.
    ///
    /// # Errors
    ///
    /// `DriftError::InvalidPattern` for the first pattern that does not parse.
    pub fn parse_all<I, S>(patterns: I) -> Result<Self, DriftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| PathPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The volatile-field defaults (`root['lastModifiedDateTime']`).
    pub fn default_volatile() -> Self {
        Self::parse_all(DEFAULT_EXCLUSIONS.iter().copied()).unwrap_or_default()
    }

    pub fn push(&mut self, pattern: PathPattern) {
        self.patterns.push(pattern);
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern excludes `path`.
    pub fn excludes(&self, path: &[Segment]) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let steps: Vec<Step<'_>> = path.iter().map(Step::from).collect();
        self.excludes_steps(&steps)
    }

    pub(crate) fn excludes_steps(&self, steps: &[Step<'_>]) -> bool {
        self.patterns.iter().any(|p| p.matches_steps(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::path::FieldPath;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn excludes(pattern: &str, target: &str) -> bool {
        PathPattern::parse(pattern)
            .unwrap()
            .matches(path(target).segments())
    }

    #[test]
    fn test_exact_bracket_pattern() {
        assert!(excludes(
            "root['lastModifiedDateTime']",
            "root['lastModifiedDateTime']"
        ));
        assert!(!excludes(
            "root['lastModifiedDateTime']",
            "root['settings']['lastModifiedDateTime']"
        ));
    }

    #[test]
    fn test_pattern_excludes_descendants() {
        assert!(excludes("settings", "root['settings']['a'][3]"));
        assert!(!excludes("settings.a", "root['settings']"));
    }

    #[test]
    fn test_single_segment_wildcards() {
        assert!(excludes("assignments[*].id", "root['assignments'][4]['id']"));
        assert!(excludes("assignments.*.id", "root['assignments'][0]['id']"));
        assert!(!excludes("assignments.*.id", "root['assignments'][0]['target']"));
    }

    #[test]
    fn test_any_depth_wildcard() {
        assert!(excludes(
            "**.lastModifiedDateTime",
            "root['lastModifiedDateTime']"
        ));
        assert!(excludes(
            "**.lastModifiedDateTime",
            "root['assignments'][1]['lastModifiedDateTime']"
        ));
        assert!(!excludes("**.lastModifiedDateTime", "root['createdDateTime']"));
    }

    #[test]
    fn test_glob_key_segment() {
        assert!(excludes("*DateTime", "root['createdDateTime']"));
        assert!(!excludes("*DateTime", "root['displayName']"));
    }

    #[test]
    fn test_numeric_dotted_segment_matches_key_or_index() {
        assert!(excludes("items.0", "root['items'][0]"));
        assert!(excludes("items.0", "root['items']['0']"));
        assert!(!excludes("items.0", "root['items'][1]"));
    }

    #[test]
    fn test_literal_index_does_not_match_unpositioned_element() {
        let pattern = PathPattern::parse("items[0].id").unwrap();
        let steps = [Step::Key("items"), Step::Element, Step::Key("id")];
        assert!(!pattern.matches_steps(&steps));

        let wildcard = PathPattern::parse("items[*].id").unwrap();
        assert!(wildcard.matches_steps(&steps));
    }

    #[test]
    fn test_whole_document_patterns_are_rejected() {
        assert!(matches!(
            PathPattern::parse("root"),
            Err(DriftError::InvalidPattern { .. })
        ));
        assert!(PathPattern::parse("**").is_err());
        assert!(PathPattern::parse("a..b").is_err());
    }

    #[test]
    fn test_default_volatile_set() {
        let set = ExclusionSet::default_volatile();
        assert_eq!(set.patterns().len(), 1);
        assert!(set.excludes(path("root['lastModifiedDateTime']").segments()));
        assert!(!set.excludes(path("root['displayName']").segments()));
    }
}
