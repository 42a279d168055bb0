//! Disposable test units for running probes.
//!
//! Probe commands use the same substitution language as real tests (`%s`,
//! `%t`, `%{cxx}`, ...), so each probe runs inside a throwaway test of a
//! synthetic `__config__` suite living under the configuration's exec root.

use crate::config::TestingConfig;
use crate::error::{ProbeError, Result};
use crate::expand::ScriptExpander;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the synthetic suite that owns probe scratch files.
pub const CONFIG_SUITE_NAME: &str = "__config__";

/// A test suite: where its sources live and where its artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    pub source_root: PathBuf,
    pub exec_root: PathBuf,
}

impl TestSuite {
    /// The `__config__` suite for a configuration.
    pub fn config_suite(config: &TestingConfig) -> Self {
        Self {
            name: CONFIG_SUITE_NAME.to_string(),
            source_root: config.test_exec_root.join("__config_src__"),
            exec_root: config.test_exec_root.join("__config_exec__"),
        }
    }

    pub fn source_path(&self, path_in_suite: &[String]) -> PathBuf {
        join_all(&self.source_root, path_in_suite)
    }

    pub fn exec_path(&self, path_in_suite: &[String]) -> PathBuf {
        join_all(&self.exec_root, path_in_suite)
    }
}

fn join_all(root: &Path, components: &[String]) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(components);
    path
}

/// A single-use test backed by a fresh, empty source file.
///
/// The source file is deleted when the handle is dropped, whichever way the
/// probe using it exits.
pub struct ScratchTest<'a> {
    config: &'a TestingConfig,
    suite: TestSuite,
    path_in_suite: Vec<String>,
    file: NamedTempFile,
}

impl<'a> ScratchTest<'a> {
    /// Create the scratch source file, creating the suite's source root if
    /// needed.
    pub fn create(config: &'a TestingConfig) -> Result<Self> {
        let suite = TestSuite::config_suite(config);
        std::fs::create_dir_all(&suite.source_root)?;
        let file = tempfile::Builder::new()
            .prefix("probe")
            .tempfile_in(&suite.source_root)?;

        let relative = file
            .path()
            .strip_prefix(&suite.source_root)
            .unwrap_or(file.path());
        let path_in_suite = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Ok(Self {
            config,
            suite,
            path_in_suite,
            file,
        })
    }

    pub fn config(&self) -> &'a TestingConfig {
        self.config
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    pub fn path_in_suite(&self) -> &[String] {
        &self.path_in_suite
    }

    /// Path of the generated source file (what `%s` expands to).
    pub fn source_path(&self) -> &Path {
        self.file.path()
    }

    /// Where this test's artifacts would be placed.
    pub fn exec_path(&self) -> PathBuf {
        self.suite.exec_path(&self.path_in_suite)
    }

    /// Per-test temporary directory (`%T`).
    pub fn tmp_dir(&self) -> PathBuf {
        let exec_path = self.exec_path();
        let exec_dir = exec_path.parent().unwrap_or(self.suite.exec_root.as_path());
        exec_dir.join("Output")
    }

    /// Base name for temporaries; `%t` is this plus `.tmp`.
    pub fn tmp_base(&self) -> PathBuf {
        let exec_path = self.exec_path();
        match exec_path.file_name() {
            Some(name) => self.tmp_dir().join(name),
            None => self.tmp_dir(),
        }
    }

    /// Overwrite the scratch source file.
    pub fn write_source(&self, contents: &str) -> Result<()> {
        std::fs::write(self.source_path(), contents)?;
        Ok(())
    }

    /// Expand substitutions in `preamble` in the context of this test.
    ///
    /// The expander must return exactly one command per preamble entry.
    pub fn expand(
        &self,
        expander: &dyn ScriptExpander,
        preamble: &[&str],
        file_dependencies: &[&str],
    ) -> Result<Vec<String>> {
        let expanded = expander.expand_script(self, preamble, file_dependencies)?;
        if expanded.len() != preamble.len() {
            return Err(ProbeError::Expansion {
                expected: preamble.len(),
                got: expanded.len(),
            });
        }
        Ok(expanded)
    }
}
