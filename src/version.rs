//! Version tags naming one revision of the remote fixture archive

use crate::error::{FixturesError, FixturesResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commit of the interchange test repository pinned by default
pub const DEFAULT_VERSION_TAG: &str = "359085be9da6e5e19644977aa45947bcec5d99de";

/// Opaque identifier of a single archive revision (commit hash, tag name).
///
/// The tag ends up in both a file name and a URL path segment, so it is
/// validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
    /// Validate and wrap a tag
    pub fn new(tag: impl Into<String>) -> FixturesResult<Self> {
        let tag = tag.into();
        let invalid = |reason: &str| FixturesError::InvalidVersionTag {
            tag: tag.clone(),
            reason: reason.to_string(),
        };

        if tag.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if tag.contains(['/', '\\']) {
            return Err(invalid("must not contain path separators"));
        }
        if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("must not contain whitespace"));
        }
        if tag == "." || tag.contains("..") {
            return Err(invalid("must not be '.' or contain '..'"));
        }
        // Used verbatim as a URL path segment
        if let Some(c) = tag.chars().find(|c| !is_tag_char(*c)) {
            return Err(invalid(&format!(
                "character {:?} is not allowed (use letters, digits, '-', '_', '.', '+')",
                c
            )));
        }

        Ok(Self(tag))
    }

    /// The tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')
}

impl Default for VersionTag {
    fn default() -> Self {
        Self(DEFAULT_VERSION_TAG.to_string())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionTag {
    type Err = FixturesError;

    fn from_str(s: &str) -> FixturesResult<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for VersionTag {
    type Error = FixturesError;

    fn try_from(value: String) -> FixturesResult<Self> {
        Self::new(value)
    }
}

impl From<VersionTag> for String {
    fn from(tag: VersionTag) -> Self {
        tag.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_commit_hash_and_release_tag() {
        assert!(VersionTag::new(DEFAULT_VERSION_TAG).is_ok());
        assert_eq!(VersionTag::new("v5.3.0").unwrap().as_str(), "v5.3.0");
    }

    #[test]
    fn rejects_unsafe_tags() {
        for tag in [
            "", "a/b", "a\\b", "has space", ".", "..", "v1..2", "tab\t", "v1?x=1", "v1#frag",
            "v1%2F..", "caf\u{e9}",
        ] {
            assert!(VersionTag::new(tag).is_err(), "{tag:?} should be rejected");
        }
    }

    #[test]
    fn tag_is_a_single_url_segment() {
        let source = crate::config::SourceConfig::default();
        for tag in ["v5.3.0", "release_1+build-2", DEFAULT_VERSION_TAG] {
            let url = source.archive_url(&VersionTag::new(tag).unwrap());
            assert_eq!(url, format!("{}/{}", source.base_url, tag));
        }
    }

    #[test]
    fn default_is_pinned_commit() {
        assert_eq!(VersionTag::default().to_string(), DEFAULT_VERSION_TAG);
    }

    #[test]
    fn deserialize_validates() {
        #[derive(Deserialize)]
        struct Wrapper {
            tag: VersionTag,
        }

        let ok: Wrapper = toml::from_str(r#"tag = "abc123""#).unwrap();
        assert_eq!(ok.tag.as_str(), "abc123");

        let bad: Result<Wrapper, _> = toml::from_str(r#"tag = "../etc""#);
        assert!(bad.is_err());
    }
}
