//! Search pattern tokenizing and source dispatch keys
//!
//! A search pattern is `source:locator`. Tokens are split on the first
//! delimiter and trimmed. A delimiter sitting at position 0 or 1 is treated
//! as degenerate input and yields two empty tokens, as does a string with no
//! delimiter at all.

use std::fmt;

/// Split `entry` on the first occurrence of `delimiter`
///
/// Returns `("", "")` when the delimiter is missing or appears before the
/// third character. Callers treat an empty token as "skip".
pub fn split_first(entry: &str, delimiter: char) -> (&str, &str) {
    match entry.find(delimiter) {
        Some(i) if i > 1 => (
            entry[..i].trim(),
            entry[i + delimiter.len_utf8()..].trim(),
        ),
        _ => ("", ""),
    }
}

/// Split `entry` on the last occurrence of `delimiter`
///
/// Used for `serviceName:credentialKey` so service names may themselves
/// contain the delimiter. Returns `None` when the delimiter is missing or
/// terminates the string.
pub fn split_last(entry: &str, delimiter: char) -> Option<(&str, &str)> {
    let i = entry.rfind(delimiter)?;
    let tail = &entry[i + delimiter.len_utf8()..];
    if tail.is_empty() {
        return None;
    }
    Some((&entry[..i], tail))
}

/// Where a search pattern looks for its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `user-provided:` / `platform-binding:` - named entry in the bindings blob
    UserProvided,
    /// `cloudfoundry:` - JSONPath straight into the bindings blob
    CloudFoundry,
    /// `env:` - environment variable, optionally queried as JSON
    Env,
    /// `file:` - file content, first line or queried as JSON
    File,
    /// Anything else; skipped with a warning
    Unknown(String),
}

impl Source {
    pub fn from_token(token: &str) -> Self {
        match token {
            "user-provided" | "platform-binding" => Source::UserProvided,
            "cloudfoundry" => Source::CloudFoundry,
            "env" => Source::Env,
            "file" => Source::File,
            other => Source::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::UserProvided => f.write_str("user-provided"),
            Source::CloudFoundry => f.write_str("cloudfoundry"),
            Source::Env => f.write_str("env"),
            Source::File => f.write_str("file"),
            Source::Unknown(s) => f.write_str(s),
        }
    }
}

/// A tokenized `source:locator` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern<'a> {
    pub source: Source,
    pub locator: &'a str,
}

impl<'a> SearchPattern<'a> {
    /// Tokenize a raw pattern string; `None` when either token is empty
    pub fn parse(entry: &'a str) -> Option<Self> {
        let (source, locator) = split_first(entry, ':');
        if source.is_empty() || locator.is_empty() {
            return None;
        }
        Some(Self {
            source: Source::from_token(source),
            locator,
        })
    }
}
