//! Features: capabilities that are enabled whenever they are supported.
//!
//! A [`Feature`] tells the test suite about a capability of the compiler or
//! platform. Unlike a [`Parameter`](crate::Parameter), there is nothing to
//! choose: if the feature is supported it should be enabled.
//!
//! ```no_run
//! use std::rc::Rc;
//! use suitecfg_dsl::Feature;
//! use suitecfg_probe::{Prober, TestingConfig};
//!
//! let prober = Rc::new(Prober::system());
//! let probe = Rc::clone(&prober);
//! let modules = Feature::new("modules")
//!     .with_compile_flag("-fmodules")
//!     .when(move |config| probe.has_compile_flag(config, "-fmodules"));
//!
//! let mut config = TestingConfig::new("build/test", "test");
//! if modules.is_supported(&config)? {
//!     modules.enable_in(&mut config)?;
//! }
//! # Ok::<(), suitecfg_dsl::ConfigError>(())
//! ```

use crate::error::ConfigError;
use std::fmt;
use suitecfg_probe::{COMPILE_FLAGS, LINK_FLAGS, ProbeError, TestingConfig};
use tracing::debug;

type Predicate = Box<dyn Fn(&TestingConfig) -> Result<bool, ProbeError>>;
type NameFn = Box<dyn Fn(&TestingConfig) -> Result<String, ProbeError>>;

fn always_supported(_: &TestingConfig) -> Result<bool, ProbeError> {
    Ok(true)
}

/// The name a feature adds to the available features.
pub enum FeatureName {
    Literal(String),
    /// Computed from the configuration at activation time, never earlier.
    Derived(NameFn),
}

impl FeatureName {
    pub fn resolve(&self, config: &TestingConfig) -> Result<String, ProbeError> {
        match self {
            FeatureName::Literal(name) => Ok(name.clone()),
            FeatureName::Derived(derive) => derive(config),
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureName::Literal(name) => f.write_str(name),
            FeatureName::Derived(_) => f.write_str("<derived>"),
        }
    }
}

impl fmt::Debug for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureName::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            FeatureName::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// A capability flag for the test suite.
pub struct Feature {
    name: FeatureName,
    compile_flag: Option<String>,
    link_flag: Option<String>,
    when: Predicate,
}

impl Feature {
    /// A feature with a fixed name that is always supported.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_name(FeatureName::Literal(name.into()))
    }

    /// A feature whose name is computed from the configuration when enabled.
    pub fn derived(
        name: impl Fn(&TestingConfig) -> Result<String, ProbeError> + 'static,
    ) -> Self {
        Self::with_name(FeatureName::Derived(Box::new(name)))
    }

    fn with_name(name: FeatureName) -> Self {
        Self {
            name,
            compile_flag: None,
            link_flag: None,
            when: Box::new(always_supported),
        }
    }

    /// Flag appended to `%{compile_flags}` when the feature is enabled.
    pub fn with_compile_flag(mut self, flag: impl Into<String>) -> Self {
        self.compile_flag = Some(flag.into());
        self
    }

    /// Flag appended to `%{link_flags}` when the feature is enabled.
    pub fn with_link_flag(mut self, flag: impl Into<String>) -> Self {
        self.link_flag = Some(flag.into());
        self
    }

    /// Only support the feature when `predicate` holds.
    pub fn when(
        mut self,
        predicate: impl Fn(&TestingConfig) -> Result<bool, ProbeError> + 'static,
    ) -> Self {
        self.when = Box::new(predicate);
        self
    }

    pub fn name(&self) -> &FeatureName {
        &self.name
    }

    pub fn compile_flag(&self) -> Option<&str> {
        self.compile_flag.as_deref()
    }

    pub fn link_flag(&self) -> Option<&str> {
        self.link_flag.as_deref()
    }

    pub fn is_supported(&self, config: &TestingConfig) -> Result<bool, ConfigError> {
        Ok((self.when)(config)?)
    }

    /// Add this feature to `config` and return the name it was added under.
    ///
    /// Appends the compile and link flags (if any) to the end of their
    /// substitutions and adds the feature's name to the available features.
    /// Enabling an unsupported feature is an error and leaves `config`
    /// untouched.
    pub fn enable_in(&self, config: &mut TestingConfig) -> Result<String, ConfigError> {
        if !self.is_supported(config)? {
            return Err(ConfigError::UnsupportedFeature {
                feature: self.name.to_string(),
            });
        }
        let name = self.name.resolve(config)?;

        if let Some(flag) = self.compile_flag().filter(|f| !f.is_empty()) {
            config.append_to_substitution(COMPILE_FLAGS, flag);
        }
        if let Some(flag) = self.link_flag().filter(|f| !f.is_empty()) {
            config.append_to_substitution(LINK_FLAGS, flag);
        }
        debug!(feature = %name, "enabling feature");
        config.available_features.insert(name.clone());
        Ok(name)
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name)
            .field("compile_flag", &self.compile_flag)
            .field("link_flag", &self.link_flag)
            .finish_non_exhaustive()
    }
}
