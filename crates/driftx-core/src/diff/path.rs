//! Field paths inside a snapshot body.
//!
//! Paths render in bracket notation rooted at `root`, e.g.
//! `root['assignments'][0]['target']`. The same notation (and a looser
//! dotted form) is accepted back by the parser, which exclusion patterns
//! share.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step into a JSON document.
///
/// Ordering is derived: keys sort by name and indices numerically, which
/// gives change maps their stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a snapshot body.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a key, builder style.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Append an index, builder style.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => {
                    f.write_str("['")?;
                    for c in key.chars() {
                        if c == '\'' || c == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{}", c)?;
                    }
                    f.write_str("']")?;
                }
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = tokenize(s)?
            .into_iter()
            .map(|token| match token {
                Token::Quoted(key) | Token::Bare(key) => Ok(Segment::Key(key)),
                Token::Index(i) => Ok(Segment::Index(i)),
                Token::AnyIndex => Err("wildcards are not allowed in a field path".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lexical unit of a path or pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `['name']` or `["name"]`: always a literal key
    Quoted(String),
    /// `name` in dotted form: key, numeric index or wildcard depending on use
    Bare(String),
    /// `[3]`
    Index(usize),
    /// `[*]`
    AnyIndex,
}

/// Split a path in bracket or dotted notation into tokens.
///
/// A leading `root` is optional. `root` alone yields no tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("path is empty".to_string());
    }

    let mut rest = trimmed;
    if let Some(stripped) = trimmed.strip_prefix("root") {
        if stripped.is_empty() || stripped.starts_with('[') || stripped.starts_with('.') {
            rest = stripped;
        }
    }

    let chars: Vec<char> = rest.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => {
                i += 1;
                match chars.get(i) {
                    Some(&quote) if quote == '\'' || quote == '"' => {
                        i += 1;
                        let mut key = String::new();
                        loop {
                            match chars.get(i) {
                                None => return Err("unterminated quoted key".to_string()),
                                Some('\\') => {
                                    let escaped = chars
                                        .get(i + 1)
                                        .ok_or_else(|| "dangling escape".to_string())?;
                                    key.push(*escaped);
                                    i += 2;
                                }
                                Some(&c) if c == quote => {
                                    i += 1;
                                    break;
                                }
                                Some(&c) => {
                                    key.push(c);
                                    i += 1;
                                }
                            }
                        }
                        if chars.get(i) != Some(&']') {
                            return Err(format!("expected `]` at offset {}", i));
                        }
                        i += 1;
                        tokens.push(Token::Quoted(key));
                    }
                    _ => {
                        let start = i;
                        while i < chars.len() && chars[i] != ']' {
                            i += 1;
                        }
                        if i == chars.len() {
                            return Err("unterminated `[`".to_string());
                        }
                        let inner: String = chars[start..i].iter().collect();
                        i += 1;
                        let inner = inner.trim();
                        if inner == "*" {
                            tokens.push(Token::AnyIndex);
                        } else {
                            let index = inner
                                .parse::<usize>()
                                .map_err(|_| format!("`[{}]` is not an index", inner))?;
                            tokens.push(Token::Index(index));
                        }
                    }
                }
            }
            '.' => {
                i += 1;
                let (bare, next) = read_bare(&chars, i);
                if bare.is_empty() {
                    return Err(format!("empty segment at offset {}", i));
                }
                tokens.push(Token::Bare(bare));
                i = next;
            }
            c if i == 0 => {
                let (bare, next) = read_bare(&chars, i);
                if bare.is_empty() {
                    return Err(format!("unexpected character `{}`", c));
                }
                tokens.push(Token::Bare(bare));
                i = next;
            }
            c => return Err(format!("unexpected character `{}` at offset {}", c, i)),
        }
    }

    Ok(tokens)
}

fn read_bare(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}
