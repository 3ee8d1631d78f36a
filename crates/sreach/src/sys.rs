//! System-side inputs: dynamics, target tubes, disturbance collections.
//!
//! All of these are caller-owned and read-only during the recursion; the
//! engine never mutates a tube or a dynamics object once handed in.

use nalgebra::DMatrix;

use crate::error::SreachError;
use crate::geom::{ConvexSet, Disturbance};

/// Discrete-time affine dynamics
/// `x_{k+1} = Φ(k) x_k + Γ(k) u_k + F(k) w_k`, time-invariant or
/// time-varying with one matrix triple per step.
#[derive(Clone, Debug)]
pub struct Dynamics {
    kind: DynKind,
    input_space: ConvexSet,
    state_dim: usize,
    input_dim: usize,
}

#[derive(Clone, Debug)]
enum DynKind {
    Lti {
        state: DMatrix<f64>,
        input: DMatrix<f64>,
        dist: DMatrix<f64>,
    },
    Ltv {
        state: Vec<DMatrix<f64>>,
        input: Vec<DMatrix<f64>>,
        dist: Vec<DMatrix<f64>>,
    },
}

impl Dynamics {
    /// Time-invariant dynamics. The state matrix must be square and
    /// invertible (the backward-step preimage identity requires it).
    pub fn lti(
        state: DMatrix<f64>,
        input: DMatrix<f64>,
        dist: DMatrix<f64>,
        input_space: ConvexSet,
    ) -> Result<Self, SreachError> {
        let (n, m) = validate_triple(&state, &input, &dist)?;
        if input_space.dim() != m {
            return Err(SreachError::invalid(format!(
                "input space dimension {} does not match input matrix columns {}",
                input_space.dim(),
                m
            )));
        }
        Ok(Self {
            kind: DynKind::Lti { state, input, dist },
            input_space,
            state_dim: n,
            input_dim: m,
        })
    }

    /// Time-varying dynamics, one matrix triple per time step.
    pub fn ltv(
        state: Vec<DMatrix<f64>>,
        input: Vec<DMatrix<f64>>,
        dist: Vec<DMatrix<f64>>,
        input_space: ConvexSet,
    ) -> Result<Self, SreachError> {
        if state.is_empty() || state.len() != input.len() || state.len() != dist.len() {
            return Err(SreachError::invalid(
                "time-varying dynamics need one matrix triple per step",
            ));
        }
        let (n, m) = validate_triple(&state[0], &input[0], &dist[0])?;
        for k in 1..state.len() {
            let (nk, mk) = validate_triple(&state[k], &input[k], &dist[k])?;
            if nk != n || mk != m {
                return Err(SreachError::invalid(format!(
                    "dynamics dimensions change at step {k}"
                )));
            }
        }
        if input_space.dim() != m {
            return Err(SreachError::invalid(
                "input space dimension does not match input matrix columns",
            ));
        }
        Ok(Self {
            kind: DynKind::Ltv { state, input, dist },
            input_space,
            state_dim: n,
            input_dim: m,
        })
    }

    #[inline]
    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn input_space(&self) -> &ConvexSet {
        &self.input_space
    }

    #[inline]
    pub fn is_time_invariant(&self) -> bool {
        matches!(self.kind, DynKind::Lti { .. })
    }

    /// Number of steps the dynamics can drive; `None` when unlimited (LTI).
    pub fn horizon_limit(&self) -> Option<usize> {
        match &self.kind {
            DynKind::Lti { .. } => None,
            DynKind::Ltv { state, .. } => Some(state.len()),
        }
    }

    pub fn state_mat(&self, t: usize) -> &DMatrix<f64> {
        match &self.kind {
            DynKind::Lti { state, .. } => state,
            DynKind::Ltv { state, .. } => &state[t],
        }
    }

    pub fn input_mat(&self, t: usize) -> &DMatrix<f64> {
        match &self.kind {
            DynKind::Lti { input, .. } => input,
            DynKind::Ltv { input, .. } => &input[t],
        }
    }

    pub fn dist_mat(&self, t: usize) -> &DMatrix<f64> {
        match &self.kind {
            DynKind::Lti { dist, .. } => dist,
            DynKind::Ltv { dist, .. } => &dist[t],
        }
    }
}

fn validate_triple(
    state: &DMatrix<f64>,
    input: &DMatrix<f64>,
    dist: &DMatrix<f64>,
) -> Result<(usize, usize), SreachError> {
    let n = state.nrows();
    if state.ncols() != n {
        return Err(SreachError::invalid("state matrix must be square"));
    }
    if state.clone().try_inverse().is_none() {
        return Err(SreachError::invalid(
            "state matrix must be invertible for backward reachability",
        ));
    }
    if input.nrows() != n || dist.nrows() != n {
        return Err(SreachError::invalid(
            "input/disturbance matrices must have state-dimension rows",
        ));
    }
    Ok((n, input.ncols()))
}

/// Fixed-length ordered sequence of target sets, one per time step.
/// Immutable once constructed; index 0 is the initial time.
#[derive(Clone, Debug)]
pub struct Tube {
    sets: Vec<ConvexSet>,
}

impl Tube {
    pub fn new(sets: Vec<ConvexSet>) -> Result<Self, SreachError> {
        if sets.is_empty() {
            return Err(SreachError::invalid("target tube must be nonempty"));
        }
        let dim = sets[0].dim();
        if sets.iter().any(|s| s.dim() != dim) {
            return Err(SreachError::invalid(
                "all tube elements must share one state dimension",
            ));
        }
        Ok(Self { sets })
    }

    /// Constant tube: the same set at every one of `len` steps.
    pub fn constant(set: ConvexSet, len: usize) -> Result<Self, SreachError> {
        if len == 0 {
            return Err(SreachError::invalid("tube length must be positive"));
        }
        Ok(Self {
            sets: vec![set; len],
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // construction guarantees at least one element
    }

    /// Time horizon N = number of transitions = len - 1.
    #[inline]
    pub fn horizon(&self) -> usize {
        self.sets.len() - 1
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.sets[0].dim()
    }

    #[inline]
    pub fn get(&self, k: usize) -> &ConvexSet {
        &self.sets[k]
    }

    #[inline]
    pub fn first(&self) -> &ConvexSet {
        &self.sets[0]
    }

    #[inline]
    pub fn last(&self) -> &ConvexSet {
        self.sets.last().unwrap_or_else(|| unreachable!())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConvexSet> {
        self.sets.iter()
    }
}

impl std::ops::Index<usize> for Tube {
    type Output = ConvexSet;
    fn index(&self, k: usize) -> &ConvexSet {
        &self.sets[k]
    }
}

/// Nonempty collection of disturbance realizations. Each realization must
/// individually satisfy the probability bound; their backward images are
/// merged after the fact.
#[derive(Clone, Debug)]
pub struct DisturbanceList {
    items: Vec<Disturbance>,
}

impl DisturbanceList {
    pub fn new(items: Vec<Disturbance>) -> Result<Self, SreachError> {
        if items.is_empty() {
            return Err(SreachError::invalid(
                "disturbance realization list must be nonempty",
            ));
        }
        let dim = items[0].dim();
        if items.iter().any(|d| d.dim() != dim) {
            return Err(SreachError::invalid(
                "disturbance realizations must share one dimension",
            ));
        }
        Ok(Self { items })
    }

    pub fn single(d: Disturbance) -> Self {
        Self { items: vec![d] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // construction guarantees at least one realization
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.items[0].dim()
    }

    #[inline]
    pub fn get(&self, i: usize) -> &Disturbance {
        &self.items[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Disturbance> {
        self.items.iter()
    }
}

/// Peer routine mapping a per-step probability level to a bounded
/// disturbance set (typically by bisection over the distribution's level
/// sets). Out of scope here; the engine only consumes the contract.
pub trait DisturbanceLevelSet {
    fn bounded_set(&self, level: f64) -> Result<DisturbanceList, SreachError>;
}

/// Adapter for callers that precomputed the bounded set themselves: the
/// level argument is ignored and the fixed list is returned.
#[derive(Clone, Debug)]
pub struct FixedDisturbance(pub DisturbanceList);

impl DisturbanceLevelSet for FixedDisturbance {
    fn bounded_set(&self, _level: f64) -> Result<DisturbanceList, SreachError> {
        Ok(self.0.clone())
    }
}

/// Level model scaling a base set about the origin: `bounded_set(θ) = θ·W`.
/// Appropriate when the base set is the level-1 bound of an origin-centered
/// distribution.
#[derive(Clone, Debug)]
pub struct ScaledDisturbance(pub DisturbanceList);

impl DisturbanceLevelSet for ScaledDisturbance {
    fn bounded_set(&self, level: f64) -> Result<DisturbanceList, SreachError> {
        let items = self
            .0
            .iter()
            .map(|d| d.scale(level))
            .collect::<Result<Vec<_>, _>>()?;
        DisturbanceList::new(items)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::DVector;

    use super::*;
    use crate::geom::SupportFnSet;

    #[test]
    fn tube_rejects_mixed_dimensions() {
        let sets = vec![ConvexSet::interval(0.0, 1.0), ConvexSet::empty(2)];
        assert!(Tube::new(sets).is_err());
    }

    #[test]
    fn ltv_horizon_limit_counts_triples() {
        let eye = DMatrix::identity(1, 1);
        let d = Dynamics::ltv(
            vec![eye.clone(); 3],
            vec![eye.clone(); 3],
            vec![eye; 3],
            ConvexSet::interval(-1.0, 1.0),
        )
        .expect("dynamics");
        assert_eq!(d.horizon_limit(), Some(3));
        assert!(!d.is_time_invariant());
    }

    #[test]
    fn singular_state_matrix_is_rejected() {
        let err = Dynamics::lti(
            DMatrix::zeros(2, 2),
            DMatrix::zeros(2, 1),
            DMatrix::identity(2, 2),
            ConvexSet::interval(-1.0, 1.0),
        );
        assert!(err.is_err());
    }

    #[test]
    fn scaled_disturbance_shrinks_with_the_level() {
        let base = DisturbanceList::single(Disturbance::SupportFn(SupportFnSet::Ball {
            center: DVector::zeros(2),
            radius: 1.0,
        }));
        let model = ScaledDisturbance(base);
        let half = model.bounded_set(0.5).expect("scaled");
        let dir = DVector::from_column_slice(&[1.0, 0.0]);
        let s = half.get(0).support(&dir).expect("support");
        assert!((s - 0.5).abs() < 1e-12);

        let poly = DisturbanceList::single(Disturbance::Polytope(ConvexSet::interval(-2.0, 2.0)));
        let model = ScaledDisturbance(poly);
        let quarter = model.bounded_set(0.25).expect("scaled");
        let dir = DVector::from_column_slice(&[1.0]);
        assert!((quarter.get(0).support(&dir).expect("support") - 0.5).abs() < 1e-12);
    }
}
