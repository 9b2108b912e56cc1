//! Shared types used across mecscale crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Scaling signal returned by a policy.
///
/// Serialized as the signed integer the simulation expects: `1`, `-1`, `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Decision {
    /// Remove one server from the pool.
    Deactivate,
    /// Leave the pool as it is.
    Hold,
    /// Add one server to the pool.
    Activate,
}

impl Decision {
    pub fn as_i32(self) -> i32 {
        match self {
            Decision::Activate => 1,
            Decision::Deactivate => -1,
            Decision::Hold => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Activate => "activate",
            Decision::Deactivate => "deactivate",
            Decision::Hold => "hold",
        }
    }
}

impl From<Decision> for i32 {
    fn from(decision: Decision) -> Self {
        decision.as_i32()
    }
}

impl TryFrom<i32> for Decision {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Decision::Activate),
            -1 => Ok(Decision::Deactivate),
            0 => Ok(Decision::Hold),
            other => Err(format!("decision must be -1, 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Which decision rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Activate once load is within `slack_margin` tasks of total capacity.
    Threshold,
    /// Activate only when load reaches total capacity.
    Reactive,
    /// Activate and deactivate at fixed fractions of total capacity.
    Conservative,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::Threshold,
        PolicyKind::Reactive,
        PolicyKind::Conservative,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Threshold => "threshold",
            PolicyKind::Reactive => "reactive",
            PolicyKind::Conservative => "conservative",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            // `by_threshold` is the method name used by the simulation scripts.
            "threshold" | "by_threshold" => Ok(PolicyKind::Threshold),
            "reactive" => Ok(PolicyKind::Reactive),
            "conservative" => Ok(PolicyKind::Conservative),
            other => Err(PolicyError::InvalidPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated `(task_count, server_count, server_capacity)` triple.
///
/// Fields are private so a `Workload` always satisfies `task_count >= 0`,
/// `server_count >= 1` and `server_capacity >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Workload {
    task_count: u64,
    server_count: u64,
    server_capacity: u64,
}

impl Workload {
    /// Validate raw counts coming from an external caller.
    pub fn new(task_count: i64, server_count: i64, server_capacity: i64) -> PolicyResult<Self> {
        if task_count < 0 {
            return Err(PolicyError::parameter(
                "task_count",
                task_count,
                "must not be negative",
            ));
        }
        if server_count < 1 {
            return Err(PolicyError::parameter(
                "server_count",
                server_count,
                "must be at least 1",
            ));
        }
        if server_capacity < 1 {
            return Err(PolicyError::parameter(
                "server_capacity",
                server_capacity,
                "must be at least 1",
            ));
        }

        Ok(Self {
            task_count: task_count as u64,
            server_count: server_count as u64,
            server_capacity: server_capacity as u64,
        })
    }

    pub fn task_count(&self) -> u64 {
        self.task_count
    }

    pub fn server_count(&self) -> u64 {
        self.server_count
    }

    pub fn server_capacity(&self) -> u64 {
        self.server_capacity
    }

    /// `server_count * server_capacity`. Widened so it cannot overflow.
    pub fn total_capacity(&self) -> i128 {
        self.server_count as i128 * self.server_capacity as i128
    }

    /// Capacity left if one server were deactivated.
    pub fn reduced_capacity(&self) -> i128 {
        (self.server_count as i128 - 1) * self.server_capacity as i128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_integer_mapping() {
        assert_eq!(Decision::Activate.as_i32(), 1);
        assert_eq!(Decision::Deactivate.as_i32(), -1);
        assert_eq!(Decision::Hold.as_i32(), 0);
        assert_eq!(Decision::try_from(-1), Ok(Decision::Deactivate));
        assert!(Decision::try_from(2).is_err());
    }

    #[test]
    fn decision_displays_bare_integer() {
        assert_eq!(Decision::Activate.to_string(), "1");
        assert_eq!(Decision::Deactivate.to_string(), "-1");
        assert_eq!(Decision::Hold.to_string(), "0");
    }

    #[test]
    fn decision_orders_by_signal() {
        assert!(Decision::Deactivate < Decision::Hold);
        assert!(Decision::Hold < Decision::Activate);
    }

    #[test]
    fn decision_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Decision::Deactivate).unwrap(), "-1");
        let parsed: Decision = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Decision::Activate);
        assert!(serde_json::from_str::<Decision>("5").is_err());
    }

    #[test]
    fn policy_kind_parse() {
        assert_eq!("threshold".parse::<PolicyKind>().unwrap(), PolicyKind::Threshold);
        assert_eq!("by_threshold".parse::<PolicyKind>().unwrap(), PolicyKind::Threshold);
        assert_eq!("reactive".parse::<PolicyKind>().unwrap(), PolicyKind::Reactive);
        assert_eq!(
            "conservative".parse::<PolicyKind>().unwrap(),
            PolicyKind::Conservative
        );
    }

    #[test]
    fn policy_kind_unknown_is_invalid_policy() {
        let err = "unknown".parse::<PolicyKind>().unwrap_err();
        assert_eq!(err, PolicyError::InvalidPolicy("unknown".to_string()));
    }

    #[test]
    fn policy_kind_name_round_trips() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.name().parse::<PolicyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn workload_rejects_out_of_domain_values() {
        assert!(Workload::new(-1, 3, 3).unwrap_err().is_invalid_parameter());
        assert!(Workload::new(0, 0, 3).unwrap_err().is_invalid_parameter());
        assert!(Workload::new(0, 3, 0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn workload_capacity() {
        let w = Workload::new(4, 3, 3).unwrap();
        assert_eq!(w.total_capacity(), 9);
        assert_eq!(w.reduced_capacity(), 6);

        let single = Workload::new(0, 1, 3).unwrap();
        assert_eq!(single.reduced_capacity(), 0);
    }

    #[test]
    fn workload_capacity_does_not_overflow() {
        let w = Workload::new(0, i64::MAX, i64::MAX).unwrap();
        assert_eq!(w.total_capacity(), i64::MAX as i128 * i64::MAX as i128);
    }
}
