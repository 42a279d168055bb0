//! Capability probing for C++ test-suite configuration.
//!
//! `suitecfg-probe` answers questions like "does the compiler accept this
//! flag?" or "which feature-test macros does it define?" by running small,
//! disposable compiler invocations against the suite's real toolchain.
//!
//! # Architecture
//!
//! ```text
//! TestingConfig ──> ScratchTest ──> ScriptExpander ──> Executor ──> Shell
//!   (host state)    (temp file)     (%{cxx}, %t, ...)  (memoized)   (sh -c)
//! ```
//!
//! Probes never interpret substitution tokens themselves: commands are written
//! in the same `%{...}` language as test files and expanded by a
//! [`ScriptExpander`] in the context of a throwaway [`ScratchTest`]. Only the
//! expanded command reaches the [`Executor`], which caches results per exact
//! command string for its own lifetime.
//!
//! # Example
//!
//! ```no_run
//! use suitecfg_probe::{Prober, TestingConfig};
//!
//! let config = TestingConfig::new("build/test", "test")
//!     .with_substitution("%{cxx}", "clang++")
//!     .with_substitution("%{flags}", "")
//!     .with_substitution("%{compile_flags}", "-std=c++17")
//!     .with_substitution("%{link_flags}", "")
//!     .with_substitution("%{exec}", "");
//!
//! let prober = Prober::system();
//! if prober.has_compile_flag(&config, "-fno-rtti")? {
//!     println!("RTTI can be disabled");
//! }
//! let macros = prober.feature_test_macros(&config, "")?;
//! println!("__cpp_concepts = {:?}", macros.get("__cpp_concepts"));
//! # Ok::<(), suitecfg_probe::ProbeError>(())
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod expand;
pub mod introspect;
pub mod scratch;

pub use config::{COMPILE_FLAGS, LINK_FLAGS, TestingConfig};
pub use error::{ProbeError, Result};
pub use executor::{Executor, Shell, ShellOutput, SystemShell};
pub use expand::{LitExpander, ScriptExpander};
pub use introspect::{
    Prober, feature_test_macros_from, parse_macro_dump, shell_quote,
};
pub use scratch::{ScratchTest, TestSuite};
