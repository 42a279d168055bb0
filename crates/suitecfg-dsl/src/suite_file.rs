//! Suite files: the host configuration and `--param` values in TOML.
//!
//! ```toml
//! exec_root = "build/test"
//! source_root = "test"
//! substitutions = [["%{cxx}", "clang++"], ["%{compile_flags}", ""]]
//! features = ["libcxx"]
//!
//! [params]
//! std = "c++17"
//! enable_exceptions = true
//! ```
//!
//! Substitutions are a list of pairs rather than a table because their order
//! is significant. Parameter values may be strings, booleans or integers; they
//! are handed to the parameters as text, exactly as if given on the command
//! line.

use crate::error::SuiteFileError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use suitecfg_probe::TestingConfig;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SuiteFile {
    pub exec_root: PathBuf,
    pub source_root: PathBuf,
    pub substitutions: Vec<(String, String)>,
    /// Features available before any probing.
    pub features: BTreeSet<String>,
    pub params: BTreeMap<String, toml::Value>,
}

impl SuiteFile {
    pub fn from_toml(text: &str) -> Result<Self, SuiteFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a suite file. Relative roots are taken relative to the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, SuiteFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| SuiteFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut suite = Self::from_toml(&content)?;
        let base = path.parent().unwrap_or(Path::new(""));
        suite.exec_root = base.join(&suite.exec_root);
        suite.source_root = base.join(&suite.source_root);
        Ok(suite)
    }

    /// Parameter values as `--param` text.
    pub fn supplied(&self) -> Result<BTreeMap<String, String>, SuiteFileError> {
        self.params
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Boolean(b) => b.to_string(),
                    toml::Value::Integer(i) => i.to_string(),
                    other => {
                        return Err(SuiteFileError::InvalidParam {
                            name: name.clone(),
                            kind: other.type_str().to_string(),
                        });
                    }
                };
                Ok((name.clone(), text))
            })
            .collect()
    }

    /// Split into the configuration to probe against and the supplied
    /// parameter values.
    pub fn into_parts(self) -> Result<(TestingConfig, BTreeMap<String, String>), SuiteFileError> {
        let supplied = self.supplied()?;
        let mut config = TestingConfig::new(self.exec_root, self.source_root);
        config.substitutions = self.substitutions;
        config.available_features = self.features;
        Ok((config, supplied))
    }
}
