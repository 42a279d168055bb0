//! Declarative configuration for C++ test suites.
//!
//! A suite describes what it can test in two ways:
//!
//! - [`Feature`]s are capabilities detected from the toolchain. A feature is
//!   enabled whenever it is supported, adding its name to the available
//!   features and its flags to `%{compile_flags}` / `%{link_flags}`.
//! - [`Parameter`]s are knobs the user turns with `--param name=value`. Each
//!   has a finite set of choices and may select a feature.
//!
//! Support checks are ordinary closures, usually built from a shared
//! [`suitecfg_probe::Prober`]. [`configure`] applies a whole suite in order,
//! and [`SuiteFile`] loads the host side of it from TOML.

pub mod error;
pub mod feature;
pub mod parameter;
pub mod pass;
pub mod suite_file;
pub mod value;

pub use error::{ConfigError, SuiteFileError};
pub use feature::{Feature, FeatureName};
pub use parameter::{ParamDefault, Parameter, ResolvedParameter, SuiteParameter};
pub use pass::{ConfigureReport, SkippedFeature, configure};
pub use suite_file::SuiteFile;
pub use value::{ParamValue, strtobool};
