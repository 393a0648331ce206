//! Unique identifiers for LodeStar entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for an Engagement.
///
/// Backend-issued identifiers are opaque strings. Drafts created on the
/// client get a ULID until the backend assigns its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EngagementId(String);

// Some backends emit numeric ids.
impl<'de> Deserialize<'de> for EngagementId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

impl EngagementId {
    /// Generate a new draft EngagementId
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EngagementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngagementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for EngagementId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for EngagementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EngagementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_ids_are_unique() {
        assert_ne!(EngagementId::new(), EngagementId::new());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = EngagementId::from("1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1\"");

        let back: EngagementId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back.as_str(), "abc");

        let numeric: EngagementId = serde_json::from_str("1").unwrap();
        assert_eq!(numeric, id);
    }
}
