//! Top-level driver: mode selection, probability-to-scale mapping,
//! degenerate horizons, dispatch into the recursion.

use std::str::FromStr;

use crate::diag::{DiagCode, DiagSink, Diagnostic};
use crate::dirs::DirectionSet;
use crate::error::SreachError;
use crate::geom::{ConvexSet, CONVERT_DIM_WARN};
use crate::lp::LpBackend;
use crate::sys::{DisturbanceLevelSet, Dynamics, Tube};

use super::recursion::{lag_over_recursion, lag_under_recursion};
use super::step::BoundaryRecord;

/// Approximation direction. Under-approximation is sound from inside
/// (result ⊆ true reach-avoid set); over-approximation from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproxMode {
    Under,
    Over,
}

impl FromStr for ApproxMode {
    type Err = SreachError;

    fn from_str(s: &str) -> Result<Self, SreachError> {
        match s {
            "under" => Ok(ApproxMode::Under),
            "over" => Ok(ApproxMode::Over),
            other => Err(SreachError::invalid(format!(
                "unrecognized approximation mode `{other}` (expected `under` or `over`)"
            ))),
        }
    }
}

/// Driver options. The mode tag must agree with the method string passed
/// to [`sreach_set_lag`]; a mismatch is a configuration error.
#[derive(Clone, Copy, Debug)]
pub struct LagOptions {
    pub mode: ApproxMode,
    pub verbose: bool,
    pub want_effective_tube: bool,
    pub want_boundary_data: bool,
}

impl Default for LagOptions {
    fn default() -> Self {
        Self {
            mode: ApproxMode::Under,
            verbose: false,
            want_effective_tube: true,
            want_boundary_data: false,
        }
    }
}

/// Result record with named optional outputs; presence is explicit, never
/// positional.
#[derive(Debug)]
pub struct LagResult {
    /// The initial-state under- or over-approximation (element 0 of the
    /// effective tube).
    pub approx: ConvexSet,
    pub effective_tube: Option<Tube>,
    pub boundary_data: Option<Vec<BoundaryRecord>>,
    pub diagnostics: Vec<crate::diag::Diagnostic>,
}

/// Lagrangian stochastic reach-avoid set approximation.
///
/// Converts the probabilistic guarantee into a deterministic one by scaling
/// the bounded disturbance set to the per-step level `θ = p^{1/N}` (under)
/// or `θ = (1-p)^{1/N}` (over), then runs the matching backward recursion.
/// Degenerate invocations (horizon 0 or probability 0) return the given
/// tube unchanged without running any step.
#[allow(clippy::too_many_arguments)]
pub fn sreach_set_lag(
    method: &str,
    dynamics: &Dynamics,
    tube: &Tube,
    prob: f64,
    level_model: &dyn DisturbanceLevelSet,
    dirs: &DirectionSet,
    opts: &LagOptions,
    backend: &dyn LpBackend,
) -> Result<LagResult, SreachError> {
    let mode = ApproxMode::from_str(method)?;
    if mode != opts.mode {
        return Err(SreachError::invalid(format!(
            "method `{method}` disagrees with options mode {:?}",
            opts.mode
        )));
    }
    if !(0.0..=1.0).contains(&prob) {
        return Err(SreachError::invalid(format!(
            "probability {prob} outside [0, 1]"
        )));
    }
    let n = dynamics.state_dim();
    let m = dynamics.input_dim();
    if tube.dim() != n {
        return Err(SreachError::invalid(format!(
            "tube dimension {} does not match state dimension {n}",
            tube.dim()
        )));
    }
    let horizon = tube.horizon();
    if let Some(limit) = dynamics.horizon_limit() {
        if horizon > limit {
            return Err(SreachError::invalid(format!(
                "time-varying dynamics cover {limit} steps but the tube needs {horizon}"
            )));
        }
    }
    let want_dim = match mode {
        ApproxMode::Under => n + m,
        ApproxMode::Over => n,
    };
    if dirs.dim() != want_dim {
        return Err(SreachError::invalid(format!(
            "direction set has dimension {}, {:?}-approximation needs {want_dim}",
            dirs.dim(),
            mode
        )));
    }

    let mut sink = DiagSink::new();
    if opts.verbose {
        log::info!(
            "lagrangian {mode:?}-approximation: horizon {horizon}, {} directions",
            dirs.len()
        );
    }

    // Degenerate: nothing to prove, the tube is its own answer.
    if horizon == 0 || prob == 0.0 {
        return Ok(LagResult {
            approx: tube.first().clone(),
            effective_tube: opts
                .want_effective_tube
                .then(|| tube.clone()),
            boundary_data: None,
            diagnostics: sink.into_vec(),
        });
    }

    if n > CONVERT_DIM_WARN {
        sink.push(Diagnostic::new(
            DiagCode::HighDimensionConversion,
            format!(
                "state dimension {n} exceeds the practical threshold for \
                 dual-representation conversion"
            ),
        ));
    }

    // Per-step deterministic level, asymmetric by approximation direction.
    let level = match mode {
        ApproxMode::Under => prob.powf(1.0 / horizon as f64),
        ApproxMode::Over => (1.0 - prob).powf(1.0 / horizon as f64),
    };
    let dists = level_model.bounded_set(level)?;
    if dists.dim() != dynamics.dist_mat(0).ncols() {
        return Err(SreachError::invalid(format!(
            "disturbance dimension {} does not match disturbance matrix columns {}",
            dists.dim(),
            dynamics.dist_mat(0).ncols()
        )));
    }

    let (effective, records) = match mode {
        ApproxMode::Under => lag_under_recursion(
            dynamics,
            tube,
            &dists,
            dirs,
            backend,
            &mut sink,
            opts.want_boundary_data,
        )?,
        ApproxMode::Over => {
            let eff = lag_over_recursion(dynamics, tube, &dists, dirs, backend, &mut sink)?;
            (eff, Vec::new())
        }
    };

    let approx = effective[0].clone();
    let effective_tube = if opts.want_effective_tube {
        Some(Tube::new(effective)?)
    } else {
        None
    };
    Ok(LagResult {
        approx,
        effective_tube,
        boundary_data: (opts.want_boundary_data && mode == ApproxMode::Under)
            .then_some(records),
        diagnostics: sink.into_vec(),
    })
}
