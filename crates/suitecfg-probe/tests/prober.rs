//! Probe behavior against a scripted toolchain, plus a smoke test against the
//! host compiler when one is installed.

use std::cell::RefCell;
use std::path::Path;
use suitecfg_probe::{
    Executor, LitExpander, ProbeError, Prober, ScratchTest, ScriptExpander, Shell, ShellOutput,
    TestingConfig,
};
use tempfile::TempDir;

/// Pretends to be a C++ toolchain and records every command it is given.
#[derive(Default)]
struct FakeToolchain {
    commands: RefCell<Vec<String>>,
}

impl Shell for FakeToolchain {
    fn call(&self, command: &str) -> std::io::Result<i32> {
        self.commands.borrow_mut().push(command.to_string());
        if command.starts_with("rm ") {
            return Err(std::io::Error::other("rm is not available"));
        }
        if command.contains("-fbogus") || command.contains("xx_XX") {
            return Ok(1);
        }
        Ok(0)
    }

    fn output(&self, command: &str) -> std::io::Result<ShellOutput> {
        self.commands.borrow_mut().push(command.to_string());
        if command.contains("-fbogus") {
            return Ok(ShellOutput {
                status: 1,
                stdout: String::new(),
            });
        }
        let stdout = if command.contains("-std=c++20") {
            "#define __cplusplus 202002L\n#define __cpp_concepts 201907L\n#define __GNUC__ 4\n"
        } else {
            "#define __cplusplus 201703L\n#define __cpp_if_constexpr 201606L\n#define __GNUC__ 4\n"
        };
        Ok(ShellOutput {
            status: 0,
            stdout: stdout.to_string(),
        })
    }
}

fn fake_config(root: &Path) -> TestingConfig {
    TestingConfig::new(root, root)
        .with_substitution("%{cxx}", "fake-c++")
        .with_substitution("%{flags}", "")
        .with_substitution("%{compile_flags}", "-std=c++17")
        .with_substitution("%{link_flags}", "-lc++")
        .with_substitution("%{exec}", "")
}

fn fake_prober() -> Prober<FakeToolchain> {
    Prober::new(Executor::new(FakeToolchain::default()), LitExpander)
}

fn commands(prober: &Prober<FakeToolchain>) -> Vec<String> {
    prober.executor().shell().commands.borrow().clone()
}

fn scratch_files_left(root: &Path) -> usize {
    std::fs::read_dir(root.join("__config_src__"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[cfg(unix)]
#[test]
fn test_compile_flag_command_shape() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    assert!(prober.has_compile_flag(&config, "-fmodules").unwrap());
    assert_eq!(
        commands(&prober),
        vec!["fake-c++ -xc++ /dev/null -Werror -fsyntax-only  -std=c++17 -fmodules"]
    );
}

#[test]
fn test_compile_flag_probe_is_memoized() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    assert!(prober.has_compile_flag(&config, "-fmodules").unwrap());
    assert!(prober.has_compile_flag(&config, "-fmodules").unwrap());
    assert!(!prober.has_compile_flag(&config, "-fbogus").unwrap());
    assert!(!prober.has_compile_flag(&config, "-fbogus").unwrap());

    assert_eq!(commands(&prober).len(), 2);
    assert_eq!(scratch_files_left(dir.path()), 0);
}

#[test]
fn test_locale_probe_runs_chain_then_cleanup() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    assert!(prober.has_locale(&config, "en_US.UTF-8").unwrap());

    let seen = commands(&prober);
    assert_eq!(seen.len(), 2);
    let steps: Vec<&str> = seen[0].split(" && ").collect();
    assert_eq!(steps.len(), 3);
    assert!(steps[0].starts_with("mkdir -p "));
    assert!(steps[0].ends_with("Output"));
    assert!(steps[1].starts_with("fake-c++ -xc++ "));
    assert!(steps[1].contains("-std=c++17 -lc++ -o "));
    assert!(steps[1].ends_with(".tmp.exe"));
    assert!(steps[2].ends_with(".tmp.exe en_US.UTF-8"));
    // Cleanup targets the same binary, and its failure is swallowed.
    assert!(seen[1].starts_with("rm "));
    assert!(seen[1].ends_with(".tmp.exe"));
    assert_eq!(scratch_files_left(dir.path()), 0);
}

#[test]
fn test_locale_probe_unsupported_and_quoted() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    assert!(!prober.has_locale(&config, "xx_XX weird").unwrap());
    assert!(commands(&prober)[0].ends_with("'xx_XX weird'"));
}

#[test]
fn test_compiler_macros_with_extra_flags() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    let macros = prober.compiler_macros(&config, "-std=c++20").unwrap();
    assert_eq!(macros["__cplusplus"], "202002L");
    assert_eq!(macros["__GNUC__"], "4");

    let ftm = prober.feature_test_macros(&config, "-std=c++20").unwrap();
    assert_eq!(ftm.len(), 1);
    assert_eq!(ftm["__cpp_concepts"], 201907);

    // Same expanded command both times: one invocation.
    assert_eq!(commands(&prober).len(), 1);
}

#[test]
fn test_has_macro() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    assert!(prober.has_macro(&config, "__cpp_if_constexpr").unwrap());
    assert!(!prober.has_macro(&config, "__cpp_concepts").unwrap());
}

#[test]
fn test_compiler_macros_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = fake_prober();

    let err = prober.compiler_macros(&config, "-fbogus").unwrap_err();
    assert!(matches!(err, ProbeError::CommandFailed { status: 1, .. }));
    assert_eq!(scratch_files_left(dir.path()), 0);
}

/// A host expander that loses commands.
struct DroppingExpander;

impl ScriptExpander for DroppingExpander {
    fn expand_script(
        &self,
        _test: &ScratchTest<'_>,
        _preamble: &[&str],
        _file_dependencies: &[&str],
    ) -> suitecfg_probe::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_lost_expansion_is_an_error_not_an_empty_command() {
    let dir = TempDir::new().unwrap();
    let config = fake_config(dir.path());
    let prober = Prober::new(Executor::new(FakeToolchain::default()), DroppingExpander);

    let err = prober.has_compile_flag(&config, "-fbogus").unwrap_err();
    assert!(matches!(err, ProbeError::Expansion { expected: 1, got: 0 }));
    let err = prober.compiler_macros(&config, "").unwrap_err();
    assert!(matches!(err, ProbeError::Expansion { .. }));
    let err = prober.has_locale(&config, "en_US.UTF-8").unwrap_err();
    assert!(matches!(err, ProbeError::Expansion { expected: 3, got: 0 }));

    assert!(commands(&prober).is_empty());
    assert_eq!(scratch_files_left(dir.path()), 0);
}

/// Probes against whatever C++ compiler the host has.
mod host_compiler {
    use super::*;
    use suitecfg_probe::SystemShell;

    fn host_config(root: &Path) -> Option<TestingConfig> {
        let cxx = ["c++", "clang++", "g++"]
            .into_iter()
            .find_map(|name| which::which(name).ok())?;
        Some(
            TestingConfig::new(root, root)
                .with_substitution("%{cxx}", cxx.to_string_lossy())
                .with_substitution("%{flags}", "")
                .with_substitution("%{compile_flags}", "")
                .with_substitution("%{link_flags}", "")
                .with_substitution("%{exec}", ""),
        )
    }

    #[cfg(unix)]
    #[test]
    fn test_host_compiler_probes() {
        let dir = TempDir::new().unwrap();
        let Some(config) = host_config(dir.path()) else {
            eprintln!("Skipping: no C++ compiler on PATH");
            return;
        };
        let prober: Prober<SystemShell> = Prober::system();

        assert!(prober.has_compile_flag(&config, "-Wall").unwrap());
        assert!(
            !prober
                .has_compile_flag(&config, "-fthis-flag-does-not-exist")
                .unwrap()
        );

        let macros = prober.compiler_macros(&config, "").unwrap();
        assert!(macros.contains_key("__cplusplus"));
        assert!(prober.feature_test_macros(&config, "").is_ok());

        assert!(
            !prober
                .has_locale(&config, "no_SUCH_locale.bogus")
                .unwrap()
        );
        assert_eq!(scratch_files_left(dir.path()), 0);
    }
}
