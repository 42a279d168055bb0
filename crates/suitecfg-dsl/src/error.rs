//! Errors raised while declaring or resolving features and parameters.

use std::path::PathBuf;
use suitecfg_probe::ProbeError;

/// A configuration pass cannot continue.
///
/// Declaration errors mean the suite script or its invocation must be fixed;
/// [`ConfigError::UnsupportedFeature`] means a script enabled a feature without
/// checking that it is supported.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("parameter name must not be the empty string")]
    EmptyParameterName,

    #[error("parameter '{parameter}' must be given at least one possible value")]
    NoChoices { parameter: String },

    #[error(
        "parameter {parameter} doesn't have a default value, but it was not specified in the supplied parameters"
    )]
    MissingValue { parameter: String },

    #[error("invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error(
        "got value '{value}' for parameter '{parameter}', which is not in the provided set of possible choices: [{}]",
        .choices.join(", ")
    )]
    NotInChoices {
        parameter: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("trying to enable feature {feature} that is not supported in the given configuration")]
    UnsupportedFeature { feature: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// A suite file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SuiteFileError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid suite file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("parameter '{name}' must be a string, boolean or integer, got {kind}")]
    InvalidParam { name: String, kind: String },
}
