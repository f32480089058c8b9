//! Build configuration.

use serde::{Deserialize, Serialize};

/// Options controlling how a snapshot is built.
///
/// All fields default to the permissive behavior. A host typically
/// deserializes this from its own settings file and passes it to
/// [`SchemaGraph::build_with`](crate::SchemaGraph::build_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Resolve classes on the rayon pool. Only honored with the `parallel`
    /// feature; ignored otherwise.
    pub parallel: bool,
    /// Range used when no occurrence or slot definition states one.
    pub default_range: Option<String>,
    /// Record a diagnostic when one class supplies a slot name from more
    /// than one source.
    pub report_source_conflicts: bool,
    /// Refuse to build when the report is not clean.
    pub strict: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            default_range: None,
            report_source_conflicts: true,
            strict: false,
        }
    }
}

impl BuildConfig {
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }

    pub fn with_default_range(mut self, range: impl Into<String>) -> Self {
        self.default_range = Some(range.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: BuildConfig = serde_json::from_str(r#"{ "default_range": "string" }"#).unwrap();
        assert_eq!(cfg.default_range.as_deref(), Some("string"));
        assert!(cfg.report_source_conflicts);
        assert!(!cfg.strict);
    }
}
