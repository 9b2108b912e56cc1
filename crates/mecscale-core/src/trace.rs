//! Load traces: the sequence of task counts a replay is driven by.
//!
//! A trace file holds one snapshot per line, either `<tasks>` or
//! `<time> <tasks>`. Fields may be separated by whitespace or a comma.
//! Blank lines and `#` comments are skipped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// One point of a load trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time of the snapshot, when the trace carries one.
    pub time: Option<f64>,
    pub task_count: i64,
}

impl Snapshot {
    pub fn new(task_count: i64) -> Self {
        Self {
            time: None,
            task_count,
        }
    }

    pub fn at(time: f64, task_count: i64) -> Self {
        Self {
            time: Some(time),
            task_count,
        }
    }
}

/// Parse trace text into snapshots.
pub fn parse_trace(content: &str) -> PolicyResult<Vec<Snapshot>> {
    let mut snapshots = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        snapshots.push(parse_line(line, idx + 1)?);
    }

    Ok(snapshots)
}

/// Read and parse a trace file.
pub fn load_trace(path: &Path) -> anyhow::Result<Vec<Snapshot>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_trace(&content)?)
}

/// Parse an inline list such as `3,3,6,7`.
pub fn parse_task_list(list: &str) -> PolicyResult<Vec<Snapshot>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(idx, field)| parse_tasks(field, idx + 1).map(Snapshot::new))
        .collect()
}

fn parse_line(line: &str, line_no: usize) -> PolicyResult<Snapshot> {
    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    match fields.as_slice() {
        [tasks] => Ok(Snapshot::new(parse_tasks(tasks, line_no)?)),
        [time, tasks] => {
            let time: f64 = time.parse().map_err(|_| PolicyError::InvalidTrace {
                line: line_no,
                reason: format!("expected a snapshot time, got {time:?}"),
            })?;
            if !time.is_finite() {
                return Err(PolicyError::InvalidTrace {
                    line: line_no,
                    reason: format!("snapshot time must be finite, got {time}"),
                });
            }
            Ok(Snapshot::at(time, parse_tasks(tasks, line_no)?))
        }
        _ => Err(PolicyError::InvalidTrace {
            line: line_no,
            reason: format!("expected `<tasks>` or `<time> <tasks>`, got {} fields", fields.len()),
        }),
    }
}

// Negative counts parse here and are rejected later by `Workload::new`.
fn parse_tasks(field: &str, line_no: usize) -> PolicyResult<i64> {
    field.parse().map_err(|_| PolicyError::InvalidTrace {
        line: line_no,
        reason: format!("expected an integer task count, got {field:?}"),
    })
}
