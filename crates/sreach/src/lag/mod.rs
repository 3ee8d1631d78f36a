//! Lagrangian backward-reachability engine.
//!
//! Control flow: driver → recursion → per-step backward reach → per-
//! direction boundary solve, composing results bottom-up into
//! progressively earlier effective targets.
//!
//! Code cross-refs: `step::backward_reach_step`,
//! `recursion::{lag_under_recursion, lag_over_recursion}`,
//! `driver::sreach_set_lag`.

mod driver;
mod recursion;
mod step;

pub use driver::{sreach_set_lag, ApproxMode, LagOptions, LagResult};
pub use step::BoundaryRecord;
