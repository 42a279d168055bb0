//! Substitution expansion for probe commands.
//!
//! The runner that hosts a test suite owns the meaning of `%{cxx}`, `%t` and
//! friends. [`ScriptExpander`] is the seam through which probes borrow that
//! logic; [`LitExpander`] is a built-in implementation with lit semantics for
//! hosts that do not bring their own.

use crate::error::Result;
use crate::scratch::ScratchTest;
use std::path::Path;

/// Expands substitution tokens in a list of commands.
pub trait ScriptExpander {
    /// Expand each command of `preamble` in the context of `test`.
    ///
    /// `file_dependencies` are files the commands need (e.g. `%t.exe`); they
    /// are expanded too and made available as `%{file_dependencies}`.
    /// Returns one expanded command per preamble entry.
    fn expand_script(
        &self,
        test: &ScratchTest<'_>,
        preamble: &[&str],
        file_dependencies: &[&str],
    ) -> Result<Vec<String>>;
}

/// Placeholder that protects `%%` while other tokens are replaced.
const PERCENT_MARKER: &str = "#_MARKER_#";

const PATH_SEP: &str = if cfg!(windows) { ";" } else { ":" };

/// lit-style expansion: the configuration's substitutions in order, then the
/// per-test tokens (`%s`, `%S`, `%p`, `%{pathsep}`, `%t`, `%basename_t`, `%T`).
///
/// Each substitution is a literal replacement applied once, in list order, so
/// a configuration substitution may expand to text containing `%t`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LitExpander;

impl LitExpander {
    /// Substitutions for `test`, excluding `%{file_dependencies}`.
    pub fn substitutions(test: &ScratchTest<'_>) -> Vec<(String, String)> {
        let source_path = test.source_path();
        let source_dir = source_path.parent().map(path_text).unwrap_or_default();
        let tmp_base = test.tmp_base();
        let base_name = tmp_base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut substitutions = test.config().substitutions.clone();
        substitutions.extend([
            ("%s".to_string(), path_text(source_path)),
            ("%S".to_string(), source_dir.clone()),
            ("%p".to_string(), source_dir),
            ("%{pathsep}".to_string(), PATH_SEP.to_string()),
            ("%t".to_string(), format!("{}.tmp", path_text(&tmp_base))),
            ("%basename_t".to_string(), base_name),
            ("%T".to_string(), path_text(&test.tmp_dir())),
        ]);
        substitutions
    }
}

impl ScriptExpander for LitExpander {
    fn expand_script(
        &self,
        test: &ScratchTest<'_>,
        preamble: &[&str],
        file_dependencies: &[&str],
    ) -> Result<Vec<String>> {
        let mut substitutions = Self::substitutions(test);
        let dependencies: Vec<String> = file_dependencies
            .iter()
            .map(|dep| apply_substitutions(dep, &substitutions))
            .collect();
        // Right after the host's own substitutions, before per-test tokens.
        let at = test.config().substitutions.len();
        substitutions.insert(
            at,
            ("%{file_dependencies}".to_string(), dependencies.join(" ")),
        );

        Ok(preamble
            .iter()
            .map(|command| apply_substitutions(command, &substitutions))
            .collect())
    }
}

/// Apply `substitutions` to `command` in order, honoring `%%` escapes.
pub fn apply_substitutions(command: &str, substitutions: &[(String, String)]) -> String {
    let mut expanded = command.replace("%%", PERCENT_MARKER);
    for (token, text) in substitutions {
        expanded = expanded.replace(token.as_str(), text);
    }
    expanded.replace(PERCENT_MARKER, "%")
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
