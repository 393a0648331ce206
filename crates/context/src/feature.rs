//! Advisory feature capabilities.
//!
//! Features gate write affordances in views. They are not a security
//! boundary; the backend enforces access.

use std::collections::HashSet;

/// Well-known feature names.
pub struct AppFeatures;

impl AppFeatures {
    /// May edit engagements
    pub const WRITER: &'static str = "writer";
    /// May view engagements
    pub const READER: &'static str = "reader";
}

/// Answers whether the current user has a feature.
pub trait FeatureSource: Send + Sync {
    /// Whether `name` is enabled.
    fn has_feature(&self, name: &str) -> bool;
}

/// A fixed set of enabled features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: HashSet<String>,
}

impl FeatureSet {
    /// Enable the given features.
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: features.into_iter().map(Into::into).collect(),
        }
    }

    /// Reader and writer.
    pub fn writer() -> Self {
        Self::new([AppFeatures::READER, AppFeatures::WRITER])
    }

    /// Reader only.
    pub fn read_only() -> Self {
        Self::new([AppFeatures::READER])
    }
}

impl FeatureSource for FeatureSet {
    fn has_feature(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_sets() {
        assert!(FeatureSet::writer().has_feature(AppFeatures::WRITER));
        assert!(!FeatureSet::read_only().has_feature(AppFeatures::WRITER));
        assert!(!FeatureSet::default().has_feature(AppFeatures::READER));
    }
}
