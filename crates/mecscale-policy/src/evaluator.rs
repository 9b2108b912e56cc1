//! Policy evaluator — maps a workload to a scaling decision.
//!
//! The evaluator is a pure function of its inputs and its configuration.
//! It holds no per-pool state, so one instance can be shared freely
//! between threads and simulation runs.

use tracing::debug;

use mecscale_core::{Decision, PolicyConfig, PolicyKind, PolicyResult, Workload};

/// Evaluates workloads under a fixed [`PolicyConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluator {
    config: PolicyConfig,
}

impl Evaluator {
    /// Create an evaluator, rejecting fractions outside `[0, 1]`.
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Validate raw inputs, resolve the policy by name, and decide.
    ///
    /// Fails with `InvalidPolicy` for an unrecognized name and with
    /// `InvalidParameter` for a negative task count or a server count or
    /// capacity below 1.
    pub fn evaluate(
        &self,
        task_count: i64,
        server_count: i64,
        server_capacity: i64,
        policy: &str,
    ) -> PolicyResult<Decision> {
        let kind: PolicyKind = policy.parse()?;
        let workload = Workload::new(task_count, server_count, server_capacity)?;
        Ok(self.decide(&workload, kind))
    }

    /// Decide for an already validated workload.
    ///
    /// Activation is checked before deactivation, so activation wins when
    /// a configuration makes both conditions hold.
    pub fn decide(&self, workload: &Workload, kind: PolicyKind) -> Decision {
        let decision = match kind {
            PolicyKind::Threshold => self.threshold(workload),
            PolicyKind::Reactive => reactive(workload),
            PolicyKind::Conservative => self.conservative(workload),
        };

        debug!(
            policy = %kind,
            tasks = workload.task_count(),
            servers = workload.server_count(),
            capacity = workload.server_capacity(),
            decision = decision.as_i32(),
            "evaluated scaling policy"
        );

        decision
    }

    fn threshold(&self, workload: &Workload) -> Decision {
        let tasks = workload.task_count() as i128;
        let activate_at = workload.total_capacity() - self.config.slack_margin as i128;

        if tasks >= activate_at {
            Decision::Activate
        } else if below_reduced_capacity(workload) {
            Decision::Deactivate
        } else {
            Decision::Hold
        }
    }

    fn conservative(&self, workload: &Workload) -> Decision {
        let tasks = workload.task_count() as f64;
        let total = workload.total_capacity() as f64;

        if tasks >= self.config.activation_fraction * total {
            Decision::Activate
        } else if tasks <= self.config.deactivation_fraction * total {
            Decision::Deactivate
        } else {
            Decision::Hold
        }
    }
}

// A task count above the ceiling counts as reaching it.
fn reactive(workload: &Workload) -> Decision {
    let tasks = workload.task_count() as i128;

    if tasks >= workload.total_capacity() {
        Decision::Activate
    } else if below_reduced_capacity(workload) {
        Decision::Deactivate
    } else {
        Decision::Hold
    }
}

/// True when the load would still fit, with a task to spare, after
/// removing one server: `task_count < (server_count - 1) * capacity - 1`.
fn below_reduced_capacity(workload: &Workload) -> bool {
    (workload.task_count() as i128) < workload.reduced_capacity() - 1
}

/// Evaluate with the default configuration.
pub fn evaluate(
    task_count: i64,
    server_count: i64,
    server_capacity: i64,
    policy: &str,
) -> PolicyResult<Decision> {
    Evaluator::default().evaluate(task_count, server_count, server_capacity, policy)
}
