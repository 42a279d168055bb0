//! Applying parameters and features to a configuration.

use crate::error::ConfigError;
use crate::feature::{Feature, FeatureName};
use crate::parameter::SuiteParameter;
use std::collections::BTreeMap;
use suitecfg_probe::TestingConfig;
use tracing::debug;

/// What a configuration pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureReport {
    /// Names of the enabled features, in activation order. A name that was
    /// already available is still listed.
    pub enabled: Vec<String>,
    /// Features that were not supported and so left out.
    pub skipped: Vec<SkippedFeature>,
    /// Each parameter's resolved value.
    pub values: BTreeMap<String, String>,
}

/// An entry of the feature list that was not enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFeature {
    /// Position in the list passed to [`configure`].
    pub index: usize,
    /// The feature's name, unless it is derived. Derived names are only
    /// computed for features that get enabled.
    pub name: Option<String>,
}

/// Resolve `parameters` against `supplied`, then enable every supported
/// feature in `features`.
///
/// Parameters are applied first, in order. A parameter whose value selects a
/// feature that cannot work is an error; an unsupported entry of `features`
/// is simply skipped.
pub fn configure(
    config: &mut TestingConfig,
    parameters: &[Box<dyn SuiteParameter>],
    features: &[Feature],
    supplied: &BTreeMap<String, String>,
) -> Result<ConfigureReport, ConfigError> {
    let mut report = ConfigureReport::default();

    for param in parameters {
        let resolved = param.resolve_feature(config, supplied)?;
        debug!(parameter = param.name(), value = %resolved.value, "resolved parameter");
        if let Some(feature) = resolved.feature {
            report.enabled.push(feature.enable_in(config)?);
        }
        report
            .values
            .insert(param.name().to_string(), resolved.value);
    }

    for (index, feature) in features.iter().enumerate() {
        if feature.is_supported(config)? {
            report.enabled.push(feature.enable_in(config)?);
        } else {
            debug!(index, feature = %feature.name(), "skipping unsupported feature");
            let name = match feature.name() {
                FeatureName::Literal(name) => Some(name.clone()),
                FeatureName::Derived(_) => None,
            };
            report.skipped.push(SkippedFeature { index, name });
        }
    }

    Ok(report)
}
