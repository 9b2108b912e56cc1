//! `mecscale replay` — evaluate a sequence of task counts.
//!
//! Task counts come from `--tasks 3,3,6` or a `--trace` file. Each line of
//! text output starts `action:  <decision>`, the same bytes the simulation
//! scripts print when they loop over a load sequence.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use mecscale_core::trace::{load_trace, parse_task_list};
use mecscale_policy::{PoolLimits, ReplayMode, ServerPool, Step};

use super::PolicyArgs;

/// Replay options that are not policy settings.
#[derive(Debug, Default, Clone)]
pub struct ReplayArgs {
    pub servers: i64,
    pub capacity: i64,
    pub tasks: Option<String>,
    pub trace: Option<PathBuf>,
    pub apply: bool,
    pub min_servers: Option<u32>,
    pub max_servers: Option<u32>,
}

/// Run the `mecscale replay` command.
pub fn replay(args: &ReplayArgs, policy: &PolicyArgs, format: &str) -> Result<String> {
    let resolved = policy.resolve()?;

    let snapshots = match (&args.tasks, &args.trace) {
        (Some(list), None) => parse_task_list(list)?,
        (None, Some(path)) => load_trace(path)
            .with_context(|| format!("Failed to load trace {}", path.display()))?,
        (Some(_), Some(_)) => bail!("Use either --tasks or --trace, not both."),
        (None, None) => bail!("No load given. Pass --tasks 3,3,6 or --trace <file>."),
    };

    let (mode, limits) = if args.apply {
        let pool = resolved.file.pool.clone().unwrap_or_default();
        let defaults = PoolLimits::default();
        let limits = PoolLimits {
            min_servers: args
                .min_servers
                .or(pool.min_servers)
                .map_or(defaults.min_servers, i64::from),
            max_servers: args
                .max_servers
                .or(pool.max_servers)
                .map_or(defaults.max_servers, i64::from),
        };
        (ReplayMode::Apply, limits)
    } else {
        (ReplayMode::Fixed, PoolLimits::default())
    };

    let mut pool = ServerPool::new(args.capacity, args.servers, limits)?;
    let steps = pool.replay(&resolved.evaluator, &snapshots, resolved.kind, mode)?;

    info!(
        policy = %resolved.kind,
        snapshots = steps.len(),
        final_servers = pool.servers(),
        "replay complete"
    );

    match format {
        "json" => Ok(serde_json::to_string_pretty(&steps)?),
        _ => Ok(format_steps(&steps, mode)),
    }
}

// Two spaces after `action:` match the loop script's `print('action: ', action)`.
fn format_steps(steps: &[Step], mode: ReplayMode) -> String {
    steps
        .iter()
        .map(|step| match mode {
            ReplayMode::Fixed => format!("action:  {}", step.decision),
            ReplayMode::Apply => format!(
                "action:  {}  {}  servers: {} -> {}",
                step.decision,
                step.decision.label(),
                step.servers_before,
                step.servers_after
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::decide;
    use std::fs;

    fn slack_two() -> PolicyArgs {
        PolicyArgs {
            slack_margin: Some(2),
            ..Default::default()
        }
    }

    fn fixed(tasks: &str) -> ReplayArgs {
        ReplayArgs {
            servers: 3,
            capacity: 3,
            tasks: Some(tasks.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_replay_task_list() {
        let out = replay(&fixed("3,3,6,7,2,1,7,8,9,0,5,3,2"), &slack_two(), "text").unwrap();
        let actions: Vec<&str> = out.lines().collect();
        assert_eq!(actions.len(), 13);
        assert_eq!(actions[0], "action:  -1");
        assert_eq!(actions[2], "action:  0");
        assert_eq!(actions[3], "action:  1");
        assert_eq!(actions[12], "action:  -1");
    }

    #[test]
    fn test_replay_trace_file_with_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("load.trace");
        fs::write(&path, "# time tasks\n0 8\n60 8\n120 0\n").unwrap();

        let args = ReplayArgs {
            servers: 3,
            capacity: 3,
            trace: Some(path),
            apply: true,
            max_servers: Some(4),
            ..Default::default()
        };
        let out = replay(&args, &slack_two(), "text").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "action:  1  activate  servers: 3 -> 4");
        assert_eq!(lines[1], "action:  0  hold  servers: 4 -> 4");
        assert_eq!(lines[2], "action:  -1  deactivate  servers: 4 -> 3");
    }

    #[test]
    fn test_replay_pool_limits_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("mecscale.toml");
        fs::write(&config, "[policy]\nslack_margin = 2\n\n[pool]\nmax_servers = 3\n").unwrap();

        let args = ReplayArgs {
            apply: true,
            ..fixed("9,9")
        };
        let policy = PolicyArgs {
            config: Some(config),
            ..Default::default()
        };
        let out = replay(&args, &policy, "json").unwrap();
        let steps: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(steps[0]["decision"], 1);
        assert_eq!(steps[0]["change"], "suppressed");
        assert_eq!(steps[1]["servers_after"], 3);
    }

    #[test]
    fn test_replay_json_fixed_mode() {
        let out = replay(&fixed("9"), &PolicyArgs::default(), "json").unwrap();
        let steps: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(steps[0]["task_count"], 9);
        assert_eq!(steps[0]["change"], "not_applied");
        assert!(steps[0]["time"].is_null());
    }

    #[test]
    fn test_replay_output_matches_loop_script() {
        let out = replay(&fixed("7,2"), &slack_two(), "text").unwrap();
        assert_eq!(out, "action:  1\naction:  -1");
    }

    #[test]
    fn test_replay_fixed_accepts_large_server_count() {
        let args = ReplayArgs {
            servers: 5_000_000_000,
            capacity: 1,
            tasks: Some("1".to_string()),
            ..Default::default()
        };
        let out = replay(&args, &PolicyArgs::default(), "text").unwrap();
        assert_eq!(out, "action:  -1");
        assert_eq!(
            decide::decide(1, 5_000_000_000, 1, None, &PolicyArgs::default(), "text").unwrap(),
            "-1"
        );
    }

    #[test]
    fn test_replay_requires_load() {
        let args = ReplayArgs {
            servers: 3,
            capacity: 3,
            ..Default::default()
        };
        let err = replay(&args, &PolicyArgs::default(), "text").unwrap_err();
        assert!(err.to_string().contains("--tasks"));
    }

    #[test]
    fn test_replay_missing_trace() {
        let dir = tempfile::tempdir().unwrap();
        let args = ReplayArgs {
            servers: 3,
            capacity: 3,
            trace: Some(dir.path().join("missing.trace")),
            ..Default::default()
        };
        let err = replay(&args, &PolicyArgs::default(), "text").unwrap_err();
        assert!(err.to_string().contains("Failed to load trace"));
    }

    #[test]
    fn test_replay_rejects_negative_tasks() {
        let err = replay(&fixed("3,-4"), &PolicyArgs::default(), "text").unwrap_err();
        assert!(err.to_string().contains("task_count"));
    }
}
