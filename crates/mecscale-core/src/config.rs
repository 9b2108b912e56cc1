//! mecscale.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};
use crate::types::PolicyKind;

/// Default slack below total capacity that triggers early activation.
pub const DEFAULT_SLACK_MARGIN: u32 = 5;
/// Default load fraction at which the conservative policy activates.
pub const DEFAULT_ACTIVATION_FRACTION: f64 = 0.5;
/// Default load fraction at which the conservative policy deactivates.
pub const DEFAULT_DEACTIVATION_FRACTION: f64 = 0.2;

/// Tunables shared by all policy variants.
///
/// Each variant reads only the fields it needs: `threshold` uses
/// `slack_margin`, `conservative` uses the two fractions, `reactive` uses
/// none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub slack_margin: u32,
    pub activation_fraction: f64,
    pub deactivation_fraction: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            slack_margin: DEFAULT_SLACK_MARGIN,
            activation_fraction: DEFAULT_ACTIVATION_FRACTION,
            deactivation_fraction: DEFAULT_DEACTIVATION_FRACTION,
        }
    }
}

impl PolicyConfig {
    pub fn with_slack_margin(mut self, slack_margin: u32) -> Self {
        self.slack_margin = slack_margin;
        self
    }

    pub fn with_fractions(mut self, activation: f64, deactivation: f64) -> Self {
        self.activation_fraction = activation;
        self.deactivation_fraction = deactivation;
        self
    }

    /// Both fractions must be finite and within `[0, 1]`.
    pub fn validate(&self) -> PolicyResult<()> {
        check_fraction("activation_fraction", self.activation_fraction)?;
        check_fraction("deactivation_fraction", self.deactivation_fraction)?;
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> PolicyResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PolicyError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MecscaleConfig {
    pub policy: Option<PolicySection>,
    pub pool: Option<PoolSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySection {
    pub kind: Option<String>,
    pub slack_margin: Option<u32>,
    pub activation_fraction: Option<f64>,
    pub deactivation_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolSection {
    pub min_servers: Option<u32>,
    pub max_servers: Option<u32>,
}

impl MecscaleConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MecscaleConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a mecscale.toml carrying the built-in defaults.
    pub fn scaffold() -> Self {
        let defaults = PolicyConfig::default();
        MecscaleConfig {
            policy: Some(PolicySection {
                kind: Some(PolicyKind::Threshold.name().to_string()),
                slack_margin: Some(defaults.slack_margin),
                activation_fraction: Some(defaults.activation_fraction),
                deactivation_fraction: Some(defaults.deactivation_fraction),
            }),
            pool: Some(PoolSection {
                min_servers: Some(1),
                max_servers: Some(8),
            }),
        }
    }

    /// Policy kind named in `[policy].kind`, if any.
    pub fn policy_kind(&self) -> PolicyResult<Option<PolicyKind>> {
        self.policy
            .as_ref()
            .and_then(|p| p.kind.as_deref())
            .map(str::parse)
            .transpose()
    }

    /// Merge `[policy]` onto the defaults and validate the result.
    pub fn policy_config(&self) -> PolicyResult<PolicyConfig> {
        let mut config = PolicyConfig::default();
        if let Some(section) = &self.policy {
            if let Some(slack) = section.slack_margin {
                config.slack_margin = slack;
            }
            if let Some(fraction) = section.activation_fraction {
                config.activation_fraction = fraction;
            }
            if let Some(fraction) = section.deactivation_fraction {
                config.deactivation_fraction = fraction;
            }
        }
        config.validate()?;
        Ok(config)
    }
}
