//! `mecscale decide` — evaluate one workload.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use mecscale_core::Decision;

use super::PolicyArgs;

#[derive(Debug, Serialize)]
struct DecisionReport {
    policy: &'static str,
    task_count: i64,
    server_count: i64,
    server_capacity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<f64>,
    decision: Decision,
}

/// Run the `mecscale decide` command.
///
/// Text output is the bare decision so simulation scripts can read it
/// straight from stdout.
pub fn decide(
    tasks: i64,
    servers: i64,
    capacity: i64,
    timestamp: Option<f64>,
    policy: &PolicyArgs,
    format: &str,
) -> Result<String> {
    let resolved = policy.resolve()?;
    let decision = resolved
        .evaluator
        .evaluate(tasks, servers, capacity, resolved.kind.name())?;

    info!(
        policy = %resolved.kind,
        tasks,
        servers,
        capacity,
        timestamp,
        decision = decision.as_i32(),
        "decision"
    );

    match format {
        "json" => {
            let report = DecisionReport {
                policy: resolved.kind.name(),
                task_count: tasks,
                server_count: servers,
                server_capacity: capacity,
                timestamp,
                decision,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        _ => Ok(decision.to_string()),
    }
}
