//! Compiler and runtime introspection.
//!
//! Each probe creates a [`ScratchTest`], expands a command written in the
//! suite's substitution language, and runs it through the memoized
//! [`Executor`]. An unsupported flag or locale is reported as `Ok(false)`.

use crate::config::TestingConfig;
use crate::error::{ProbeError, Result};
use crate::executor::{Executor, Shell, SystemShell};
use crate::expand::{LitExpander, ScriptExpander};
use crate::scratch::ScratchTest;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DEV_NULL: &str = if cfg!(windows) { "NUL" } else { "/dev/null" };

/// Program used by [`Prober::has_locale`]: exits 0 iff `argv[1]` can be set.
const LOCALE_PROGRAM: &str = r#"
#include <locale.h>
int main(int, char** argv) {
  if (::setlocale(LC_ALL, argv[1]) != NULL) return 0;
  else                                      return 1;
}
"#;

/// Runs capability probes against a configuration's toolchain.
pub struct Prober<S = SystemShell> {
    executor: Executor<S>,
    expander: Box<dyn ScriptExpander>,
}

impl Prober<SystemShell> {
    /// Host shell with lit-style substitution expansion.
    pub fn system() -> Self {
        Self::new(Executor::system(), LitExpander)
    }
}

impl<S: Shell> Prober<S> {
    pub fn new(executor: Executor<S>, expander: impl ScriptExpander + 'static) -> Self {
        Self {
            executor,
            expander: Box::new(expander),
        }
    }

    pub fn executor(&self) -> &Executor<S> {
        &self.executor
    }

    fn expand_one(&self, test: &ScratchTest<'_>, command: &str, deps: &[&str]) -> Result<String> {
        let expanded = test.expand(self.expander.as_ref(), &[command], deps)?;
        expanded
            .into_iter()
            .next()
            .ok_or(ProbeError::Expansion { expected: 1, got: 0 })
    }

    /// Whether the compiler accepts `flag` without any diagnostic.
    ///
    /// Compiles an empty translation unit with `-Werror -fsyntax-only`, so a
    /// flag that is ignored with a warning counts as unsupported.
    pub fn has_compile_flag(&self, config: &TestingConfig, flag: &str) -> Result<bool> {
        let test = ScratchTest::create(config)?;
        let command = format!(
            "%{{cxx}} -xc++ {DEV_NULL} -Werror -fsyntax-only %{{flags}} %{{compile_flags}} {flag}"
        );
        let command = self.expand_one(&test, &command, &[])?;
        let supported = self.executor.call(&command)? == 0;
        debug!(flag, supported, "compile flag probe");
        Ok(supported)
    }

    /// Whether the execution environment can `setlocale` to `locale`.
    ///
    /// Builds and runs a small program through `%{exec}`, which may run it on
    /// a remote target. The built binary is removed afterwards on a best
    /// effort basis.
    pub fn has_locale(&self, config: &TestingConfig, locale: &str) -> Result<bool> {
        let test = ScratchTest::create(config)?;
        test.write_source(LOCALE_PROGRAM)?;

        let run = format!("%{{exec}} %t.exe {}", shell_quote(locale));
        let commands = test.expand(
            self.expander.as_ref(),
            &[
                "mkdir -p %T",
                "%{cxx} -xc++ %s %{flags} %{compile_flags} %{link_flags} -o %t.exe",
                run.as_str(),
            ],
            &["%t.exe"],
        )?;
        let status = self.executor.call(&commands.join(" && "));

        // Cleanup failure never affects the answer.
        match self
            .expand_one(&test, "rm %t.exe", &[])
            .and_then(|cleanup| self.executor.call(&cleanup))
        {
            Ok(0) => {}
            Ok(code) => debug!(locale, code, "locale probe cleanup exited non-zero"),
            Err(e) => warn!(locale, error = %e, "locale probe cleanup failed"),
        }

        let supported = status? == 0;
        debug!(locale, supported, "locale probe");
        Ok(supported)
    }

    /// All macros the compiler predefines under the configured flags plus
    /// `extra_flags`, as name → unparsed value.
    pub fn compiler_macros(
        &self,
        config: &TestingConfig,
        extra_flags: &str,
    ) -> Result<BTreeMap<String, String>> {
        let test = ScratchTest::create(config)?;
        let command = format!(
            "%{{cxx}} -xc++ {DEV_NULL} -dM -E %{{flags}} %{{compile_flags}} {extra_flags}"
        );
        let command = self.expand_one(&test, &command, &[])?;
        let unparsed = self.executor.check_output(&command)?;
        parse_macro_dump(&unparsed)
    }

    /// The `__cpp_*` feature-test macros, with their values as integers.
    pub fn feature_test_macros(
        &self,
        config: &TestingConfig,
        extra_flags: &str,
    ) -> Result<BTreeMap<String, i64>> {
        feature_test_macros_from(&self.compiler_macros(config, extra_flags)?)
    }

    /// Whether the compiler predefines `name` under the configured flags.
    pub fn has_macro(&self, config: &TestingConfig, name: &str) -> Result<bool> {
        Ok(self.compiler_macros(config, "")?.contains_key(name))
    }
}

/// Parse `-dM -E` output: one `#define NAME VALUE` per non-blank line.
///
/// The value may be empty. A repeated name keeps its last value.
pub fn parse_macro_dump(text: &str) -> Result<BTreeMap<String, String>> {
    let mut macros = BTreeMap::new();
    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        let Some(definition) = line.strip_prefix("#define ") else {
            return Err(ProbeError::MalformedMacroLine {
                line: line.to_string(),
            });
        };
        let (name, value) = definition.split_once(' ').unwrap_or((definition, ""));
        macros.insert(name.to_string(), value.to_string());
    }
    Ok(macros)
}

/// Keep the `__cpp_` macros and parse their values, ignoring integer-literal
/// suffixes such as `201703L`.
pub fn feature_test_macros_from(
    macros: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, i64>> {
    macros
        .iter()
        .filter(|(name, _)| name.starts_with("__cpp_"))
        .map(|(name, value)| {
            let digits = value.trim_end_matches(['L', 'l', 'U', 'u']).trim();
            digits
                .parse::<i64>()
                .map(|n| (name.clone(), n))
                .map_err(|_| ProbeError::InvalidMacroValue {
                    name: name.clone(),
                    value: value.clone(),
                })
        })
        .collect()
}

/// Quote `raw` for a POSIX shell, leaving simple words untouched.
pub fn shell_quote(raw: &str) -> String {
    if raw.is_empty() {
        return "''".to_string();
    }
    if raw
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || b"@%+=:,./_-".contains(&byte))
    {
        return raw.to_owned();
    }
    let escaped = raw.replace('\'', "'\"'\"'");
    format!("'{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_macro_dump() {
        let macros = parse_macro_dump("#define __cplusplus 201703L\n#define FOO\n").unwrap();
        let expected: BTreeMap<String, String> = [("__cplusplus", "201703L"), ("FOO", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(macros, expected);
    }

    #[test]
    fn test_parse_macro_dump_value_keeps_inner_spaces() {
        let macros = parse_macro_dump("  #define __VERSION__ \"Clang 17.0.1 (x)\"  \n\n").unwrap();
        assert_eq!(macros["__VERSION__"], "\"Clang 17.0.1 (x)\"");
    }

    #[test]
    fn test_parse_macro_dump_last_duplicate_wins() {
        let macros = parse_macro_dump("#define A 1\n#define A 2\n").unwrap();
        assert_eq!(macros["A"], "2");
        assert_eq!(macros.len(), 1);
    }

    #[test]
    fn test_parse_macro_dump_rejects_other_lines() {
        let err = parse_macro_dump("#define A 1\nwarning: unused flag\n").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"expected a `#define` line in compiler macro dump, got `warning: unused flag`");
    }

    #[test]
    fn test_feature_test_macros_filter_and_suffixes() {
        let macros = parse_macro_dump(
            "#define __cplusplus 201703L\n\
             #define __cpp_concepts 201907L\n\
             #define __cpp_rtti 199711\n\
             #define __cpp_size_t_suffix 202011uL\n\
             #define FOO\n",
        )
        .unwrap();
        let ftm = feature_test_macros_from(&macros).unwrap();
        assert_eq!(ftm.len(), 3);
        assert_eq!(ftm["__cpp_concepts"], 201907);
        assert_eq!(ftm["__cpp_rtti"], 199711);
        assert_eq!(ftm["__cpp_size_t_suffix"], 202011);
        assert!(!ftm.contains_key("__cplusplus"));
    }

    #[test]
    fn test_feature_test_macros_non_integer_value() {
        let macros = parse_macro_dump("#define __cpp_weird abc\n").unwrap();
        let err = feature_test_macros_from(&macros).unwrap_err();
        assert!(
            matches!(err, ProbeError::InvalidMacroValue { ref name, .. } if name == "__cpp_weird")
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("en_US.UTF-8"), "en_US.UTF-8");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
    }
}
