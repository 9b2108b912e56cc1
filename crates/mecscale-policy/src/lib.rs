//! mecscale-policy — scaling decisions for a simulated edge server pool.
//!
//! Given the current task count `k`, active server count `m` and per-server
//! capacity `n`, decides whether to activate a server, deactivate one, or
//! hold. The decision is advisory; applying it belongs to the caller.
//!
//! # Policies
//!
//! ```text
//! total = m * n
//!
//! threshold:     +1 if k >= total - slack_margin
//!                -1 if k <  (m - 1) * n - 1
//!
//! reactive:      +1 if k >= total
//!                -1 if k <  (m - 1) * n - 1
//!
//! conservative:  +1 if k >= activation_fraction * total
//!                -1 if k <= deactivation_fraction * total
//!
//! otherwise 0; activation is checked first
//! ```
//!
//! [`ServerPool`] replays a load trace with the decisions applied to an
//! in-memory pool.

pub mod evaluator;
pub mod pool;

pub use evaluator::{Evaluator, evaluate};
pub use pool::{PoolChange, PoolLimits, ReplayMode, ServerPool, Step};
