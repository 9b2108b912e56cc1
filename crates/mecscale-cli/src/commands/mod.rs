pub mod decide;
pub mod init;
pub mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mecscale_core::{MecscaleConfig, PolicyKind};
use mecscale_policy::Evaluator;

/// Policy selection shared by `decide` and `replay`.
///
/// Flags override `--config`, which overrides the built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Policy: threshold, reactive or conservative
    #[arg(short, long)]
    pub policy: Option<String>,
    /// Slack below total capacity that triggers activation (threshold)
    #[arg(long)]
    pub slack_margin: Option<u32>,
    /// Load fraction that triggers activation (conservative)
    #[arg(long)]
    pub activation_fraction: Option<f64>,
    /// Load fraction that triggers deactivation (conservative)
    #[arg(long)]
    pub deactivation_fraction: Option<f64>,
    /// Path to a mecscale.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Policy settings after merging flags, config file and defaults.
pub struct ResolvedPolicy {
    pub kind: PolicyKind,
    pub evaluator: Evaluator,
    pub file: MecscaleConfig,
}

impl PolicyArgs {
    pub fn resolve(&self) -> Result<ResolvedPolicy> {
        let file = match &self.config {
            Some(path) => MecscaleConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => MecscaleConfig::default(),
        };

        let mut config = file.policy_config()?;
        if let Some(slack) = self.slack_margin {
            config.slack_margin = slack;
        }
        if let Some(fraction) = self.activation_fraction {
            config.activation_fraction = fraction;
        }
        if let Some(fraction) = self.deactivation_fraction {
            config.deactivation_fraction = fraction;
        }
        let evaluator = Evaluator::new(config)?;

        let kind = match &self.policy {
            Some(name) => name.parse()?,
            None => file.policy_kind()?.unwrap_or(PolicyKind::Threshold),
        };

        Ok(ResolvedPolicy {
            kind,
            evaluator,
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_defaults() {
        let resolved = PolicyArgs::default().resolve().unwrap();
        assert_eq!(resolved.kind, PolicyKind::Threshold);
        assert_eq!(resolved.evaluator.config().slack_margin, 5);
    }

    #[test]
    fn test_resolve_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mecscale.toml");
        fs::write(
            &path,
            "[policy]\nkind = \"reactive\"\nslack_margin = 2\nactivation_fraction = 0.7\n",
        )
        .unwrap();

        let args = PolicyArgs {
            policy: Some("conservative".to_string()),
            slack_margin: Some(3),
            config: Some(path.clone()),
            ..Default::default()
        };
        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.kind, PolicyKind::Conservative);
        assert_eq!(resolved.evaluator.config().slack_margin, 3);
        assert_eq!(resolved.evaluator.config().activation_fraction, 0.7);

        let from_file = PolicyArgs {
            config: Some(path),
            ..Default::default()
        };
        let resolved = from_file.resolve().unwrap();
        assert_eq!(resolved.kind, PolicyKind::Reactive);
        assert_eq!(resolved.evaluator.config().slack_margin, 2);
    }

    #[test]
    fn test_resolve_unknown_policy() {
        let args = PolicyArgs {
            policy: Some("unknown".to_string()),
            ..Default::default()
        };
        let err = args.resolve().err().unwrap();
        assert!(err.to_string().contains("invalid policy"));
    }

    #[test]
    fn test_resolve_bad_fraction_flag() {
        let args = PolicyArgs {
            deactivation_fraction: Some(1.2),
            ..Default::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_resolve_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = PolicyArgs {
            config: Some(dir.path().join("missing.toml")),
            ..Default::default()
        };
        let err = args.resolve().err().unwrap();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
