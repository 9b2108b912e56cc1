//! Simulated server pool driven by policy decisions.
//!
//! Replays a load trace against a pool that activates or deactivates one
//! server per decision, clamped to `[min_servers, max_servers]`. Nothing
//! here touches a real server. The pool exists so a trace can be replayed
//! with the decisions feeding back into the next evaluation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mecscale_core::{Decision, PolicyError, PolicyKind, PolicyResult, Snapshot, Workload};

use crate::evaluator::Evaluator;

/// Bounds on the number of active servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLimits {
    pub min_servers: i64,
    pub max_servers: i64,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            min_servers: 1,
            max_servers: i64::MAX,
        }
    }
}

/// What happened to the pool after a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolChange {
    /// A server was activated or deactivated.
    Applied,
    /// The decision was `Hold`.
    Unchanged,
    /// The decision would have crossed a pool limit.
    Suppressed,
    /// Replay in fixed mode; decisions are reported but never applied.
    NotApplied,
}

/// Whether replay decisions feed back into the pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Evaluate every snapshot against the initial server count.
    Fixed,
    /// Apply each decision before evaluating the next snapshot.
    Apply,
}

/// One evaluated snapshot of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub time: Option<f64>,
    pub task_count: i64,
    pub servers_before: i64,
    pub servers_after: i64,
    pub decision: Decision,
    pub change: PoolChange,
}

#[derive(Debug, Clone)]
pub struct ServerPool {
    server_capacity: i64,
    servers: i64,
    limits: PoolLimits,
}

impl ServerPool {
    /// Create a pool of `initial_servers` servers of `server_capacity` each.
    ///
    /// Requires `server_capacity >= 1` and
    /// `1 <= min_servers <= initial_servers <= max_servers`.
    pub fn new(server_capacity: i64, initial_servers: i64, limits: PoolLimits) -> PolicyResult<Self> {
        if server_capacity < 1 {
            return Err(PolicyError::parameter(
                "server_capacity",
                server_capacity,
                "must be at least 1",
            ));
        }
        if limits.min_servers < 1 {
            return Err(PolicyError::parameter(
                "min_servers",
                limits.min_servers,
                "must be at least 1",
            ));
        }
        if limits.max_servers < limits.min_servers {
            return Err(PolicyError::parameter(
                "max_servers",
                limits.max_servers,
                "must not be below min_servers",
            ));
        }
        if initial_servers < limits.min_servers || initial_servers > limits.max_servers {
            return Err(PolicyError::parameter(
                "server_count",
                initial_servers,
                "must lie within [min_servers, max_servers]",
            ));
        }

        Ok(Self {
            server_capacity,
            servers: initial_servers,
            limits,
        })
    }

    pub fn servers(&self) -> i64 {
        self.servers
    }

    /// Apply one decision, clamped to the pool limits.
    pub fn apply(&mut self, decision: Decision) -> PoolChange {
        match decision {
            Decision::Hold => PoolChange::Unchanged,
            Decision::Activate if self.servers >= self.limits.max_servers => {
                warn!(
                    servers = self.servers,
                    max = self.limits.max_servers,
                    "activation suppressed: pool at max_servers"
                );
                PoolChange::Suppressed
            }
            Decision::Deactivate if self.servers <= self.limits.min_servers => {
                warn!(
                    servers = self.servers,
                    min = self.limits.min_servers,
                    "deactivation suppressed: pool at min_servers"
                );
                PoolChange::Suppressed
            }
            Decision::Activate => {
                self.servers += 1;
                info!(servers = self.servers, "activated server");
                PoolChange::Applied
            }
            Decision::Deactivate => {
                self.servers -= 1;
                info!(servers = self.servers, "deactivated server");
                PoolChange::Applied
            }
        }
    }

    /// Evaluate one snapshot against the current pool size, then apply it.
    pub fn step(
        &mut self,
        evaluator: &Evaluator,
        snapshot: Snapshot,
        kind: PolicyKind,
    ) -> PolicyResult<Step> {
        let (decision, servers_before) = self.observe(evaluator, snapshot, kind)?;
        let change = self.apply(decision);

        Ok(Step {
            time: snapshot.time,
            task_count: snapshot.task_count,
            servers_before,
            servers_after: self.servers,
            decision,
            change,
        })
    }

    /// Evaluate a whole trace. Stops at the first invalid snapshot.
    pub fn replay(
        &mut self,
        evaluator: &Evaluator,
        trace: &[Snapshot],
        kind: PolicyKind,
        mode: ReplayMode,
    ) -> PolicyResult<Vec<Step>> {
        let mut steps = Vec::with_capacity(trace.len());

        for snapshot in trace {
            let step = match mode {
                ReplayMode::Apply => self.step(evaluator, *snapshot, kind)?,
                ReplayMode::Fixed => {
                    let (decision, servers) = self.observe(evaluator, *snapshot, kind)?;
                    Step {
                        time: snapshot.time,
                        task_count: snapshot.task_count,
                        servers_before: servers,
                        servers_after: servers,
                        decision,
                        change: PoolChange::NotApplied,
                    }
                }
            };
            steps.push(step);
        }

        debug!(
            snapshots = steps.len(),
            policy = %kind,
            final_servers = self.servers,
            "replay finished"
        );

        Ok(steps)
    }

    fn observe(
        &self,
        evaluator: &Evaluator,
        snapshot: Snapshot,
        kind: PolicyKind,
    ) -> PolicyResult<(Decision, i64)> {
        let workload = Workload::new(snapshot.task_count, self.servers, self.server_capacity)?;
        Ok((evaluator.decide(&workload, kind), self.servers))
    }
}
