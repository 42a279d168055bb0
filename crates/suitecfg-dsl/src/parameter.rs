//! Parameters: user-controlled, finite-choice test-suite knobs.
//!
//! A parameter is set with `--param <name>=<value>` when running the suite and
//! may fall back to a default. Every parameter has a finite set of legal
//! values so the set of configurations a suite supports stays finite; a knob
//! with an unbounded domain (a compiler path, say) belongs in the host
//! configuration instead.
//!
//! Once resolved, a parameter may produce a [`Feature`], which is then enabled
//! like any other.

use crate::error::ConfigError;
use crate::feature::Feature;
use crate::value::ParamValue;
use std::collections::BTreeMap;
use std::fmt;
use suitecfg_probe::{ProbeError, TestingConfig};

type FeatureFn<T> = Box<dyn Fn(&T) -> Option<Feature>>;
type DefaultFn<T> = Box<dyn Fn(&TestingConfig) -> Result<T, ProbeError>>;

/// Where a parameter's value comes from when it is not supplied.
pub enum ParamDefault<T> {
    Value(T),
    /// Computed from the configuration, e.g. the newest standard the compiler
    /// supports.
    Derived(DefaultFn<T>),
}

impl<T: ParamValue> ParamDefault<T> {
    fn get(&self, config: &TestingConfig) -> Result<T, ProbeError> {
        match self {
            ParamDefault::Value(value) => Ok(value.clone()),
            ParamDefault::Derived(compute) => compute(config),
        }
    }
}

/// A test-suite parameter with values of type `T`.
pub struct Parameter<T: ParamValue> {
    name: String,
    choices: Vec<T>,
    help: String,
    feature: FeatureFn<T>,
    default: Option<ParamDefault<T>>,
}

impl<T: ParamValue> Parameter<T> {
    /// Declare a parameter.
    ///
    /// `choices` is collected immediately and must not be empty; `feature`
    /// maps the resolved value to the feature it enables, if any.
    pub fn new(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = T>,
        help: impl Into<String>,
        feature: impl Fn(&T) -> Option<Feature> + 'static,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyParameterName);
        }
        let choices: Vec<T> = choices.into_iter().collect();
        if choices.is_empty() {
            return Err(ConfigError::NoChoices { parameter: name });
        }
        Ok(Self {
            name,
            choices,
            help: help.into(),
            feature: Box::new(feature),
            default: None,
        })
    }

    /// Use `value` when the parameter is not supplied.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(ParamDefault::Value(value));
        self
    }

    /// Compute the value from the configuration when the parameter is not
    /// supplied.
    pub fn with_derived_default(
        mut self,
        compute: impl Fn(&TestingConfig) -> Result<T, ProbeError> + 'static,
    ) -> Self {
        self.default = Some(ParamDefault::Derived(Box::new(compute)));
        self
    }

    /// The key used in `--param <name>=<value>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn choices(&self) -> &[T] {
        &self.choices
    }

    /// The value this parameter takes: the parsed supplied value, or else the
    /// default. Either way it must be one of the choices.
    pub fn resolve(
        &self,
        config: &TestingConfig,
        supplied: &BTreeMap<String, String>,
    ) -> Result<T, ConfigError> {
        let value = match (supplied.get(&self.name), &self.default) {
            (Some(raw), _) => T::parse_param(raw).map_err(|reason| ConfigError::InvalidValue {
                parameter: self.name.clone(),
                value: raw.clone(),
                reason,
            })?,
            (None, Some(default)) => default.get(config)?,
            (None, None) => {
                return Err(ConfigError::MissingValue {
                    parameter: self.name.clone(),
                });
            }
        };

        if !self.choices.contains(&value) {
            return Err(ConfigError::NotInChoices {
                parameter: self.name.clone(),
                value: value.to_string(),
                choices: self.choices.iter().map(ToString::to_string).collect(),
            });
        }
        Ok(value)
    }

    /// Resolve the parameter and return the feature its value enables.
    pub fn get_feature(
        &self,
        config: &TestingConfig,
        supplied: &BTreeMap<String, String>,
    ) -> Result<Option<Feature>, ConfigError> {
        let value = self.resolve(config, supplied)?;
        Ok((self.feature)(&value))
    }
}

impl<T: ParamValue> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("choices", &self.choices)
            .field("help", &self.help)
            .field("has_default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}

/// A resolved parameter, with its value rendered as text.
#[derive(Debug)]
pub struct ResolvedParameter {
    pub value: String,
    pub feature: Option<Feature>,
}

/// Object-safe view of a [`Parameter`], so parameters of different value
/// types can live in one list.
pub trait SuiteParameter {
    fn name(&self) -> &str;

    fn help(&self) -> &str;

    /// Legal values, rendered as text.
    fn choices(&self) -> Vec<String>;

    fn resolve_feature(
        &self,
        config: &TestingConfig,
        supplied: &BTreeMap<String, String>,
    ) -> Result<ResolvedParameter, ConfigError>;
}

impl<T: ParamValue> SuiteParameter for Parameter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn choices(&self) -> Vec<String> {
        self.choices.iter().map(ToString::to_string).collect()
    }

    fn resolve_feature(
        &self,
        config: &TestingConfig,
        supplied: &BTreeMap<String, String>,
    ) -> Result<ResolvedParameter, ConfigError> {
        let value = self.resolve(config, supplied)?;
        Ok(ResolvedParameter {
            value: value.to_string(),
            feature: (self.feature)(&value),
        })
    }
}
