//! Host-owned test-suite configuration.
//!
//! The runner creates a [`TestingConfig`] before any probing happens. This
//! crate only ever appends to substitution text and inserts feature names;
//! entries are never removed or reordered.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Substitution that carries per-suite compile flags.
pub const COMPILE_FLAGS: &str = "%{compile_flags}";

/// Substitution that carries per-suite link flags.
pub const LINK_FLAGS: &str = "%{link_flags}";

/// Mutable per-suite settings shared by every probe and feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestingConfig {
    /// Ordered `(token, replacement)` pairs, e.g. `("%{cxx}", "clang++")`.
    pub substitutions: Vec<(String, String)>,
    /// Names of features the suite's tests may rely on.
    pub available_features: BTreeSet<String>,
    /// Root under which build artifacts (and probe scratch files) live.
    pub test_exec_root: PathBuf,
    /// Root of the suite's test sources.
    pub test_source_root: PathBuf,
}

impl TestingConfig {
    pub fn new(exec_root: impl Into<PathBuf>, source_root: impl Into<PathBuf>) -> Self {
        Self {
            substitutions: Vec::new(),
            available_features: BTreeSet::new(),
            test_exec_root: exec_root.into(),
            test_source_root: source_root.into(),
        }
    }

    /// Append a substitution, builder style.
    pub fn with_substitution(mut self, token: impl Into<String>, text: impl Into<String>) -> Self {
        self.substitutions.push((token.into(), text.into()));
        self
    }

    /// Text of the first substitution named `token`.
    pub fn substitution(&self, token: &str) -> Option<&str> {
        self.substitutions
            .iter()
            .find(|(name, _)| name == token)
            .map(|(_, text)| text.as_str())
    }

    /// Append `" " + text` to every substitution named `token`.
    ///
    /// Returns false (and changes nothing) when no such substitution exists.
    pub fn append_to_substitution(&mut self, token: &str, text: &str) -> bool {
        let mut found = false;
        for (name, value) in &mut self.substitutions {
            if name == token {
                value.push(' ');
                value.push_str(text);
                found = true;
            }
        }
        found
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.available_features.contains(name)
    }
}
