//! Default backend: dense two-phase tableau simplex.
//!
//! Scope
//! - Small dense programs only (a handful of free variables, tens to a few
//!   hundred rows), which is exactly what the recursion submits: one ray
//!   maximization per direction and one Chebyshev program per step.
//! - Bland's rule, so the method terminates without cycling; an iteration
//!   cap converts pathological inputs into an `Error` status instead of a
//!   hang.
//! - Deterministic: identical programs yield identical optimizers, which
//!   the recursion relies on for reproducible vertex ordering.

use nalgebra::{DMatrix, DVector};

use super::{LinearProgram, LpBackend, LpOutcome, LpStatus};

const PIV_TOL: f64 = 1e-9;
const RC_TOL: f64 = 1e-9;
const RESID_OK: f64 = 1e-7;
const RESID_LOOSE: f64 = 1e-4;
const MAX_ITERS: usize = 10_000;

/// Two-phase dense simplex over free variables (split internally into
/// nonnegative pairs).
#[derive(Clone, Copy, Debug, Default)]
pub struct DenseSimplex;

enum LoopEnd {
    Optimal,
    Unbounded,
    IterLimit,
}

impl LpBackend for DenseSimplex {
    fn solve(&self, prob: &LinearProgram) -> LpOutcome {
        let n = prob.nvars();
        let m = prob.a.nrows();
        if n == 0 {
            return LpOutcome::terminal(LpStatus::Error);
        }
        if m == 0 {
            // Unconstrained: bounded only for a zero objective.
            if prob.objective.iter().all(|c| c.abs() < RC_TOL) {
                return LpOutcome {
                    status: LpStatus::Solved,
                    x: Some(DVector::zeros(n)),
                    value: Some(0.0),
                };
            }
            return LpOutcome::terminal(LpStatus::Unbounded);
        }

        // Standard form: x = u - w with u, w >= 0, one slack per row; rows
        // with negative rhs are negated and receive an artificial.
        let art_rows: Vec<usize> = (0..m).filter(|&i| prob.b[i] < 0.0).collect();
        let art_start = 2 * n + m;
        let ncols = art_start + art_rows.len();
        let mut tab = DMatrix::<f64>::zeros(m, ncols);
        let mut rhs = DVector::<f64>::zeros(m);
        let mut basis = vec![0usize; m];
        let mut art_idx = 0usize;
        for i in 0..m {
            let sign = if prob.b[i] < 0.0 { -1.0 } else { 1.0 };
            for j in 0..n {
                tab[(i, j)] = sign * prob.a[(i, j)];
                tab[(i, n + j)] = -sign * prob.a[(i, j)];
            }
            tab[(i, 2 * n + i)] = sign;
            rhs[i] = sign * prob.b[i];
            if sign < 0.0 {
                let col = art_start + art_idx;
                tab[(i, col)] = 1.0;
                basis[i] = col;
                art_idx += 1;
            } else {
                basis[i] = 2 * n + i;
            }
        }

        if !art_rows.is_empty() {
            // Phase 1: maximize minus the artificial sum.
            let mut c1 = DVector::<f64>::zeros(ncols);
            for k in 0..art_rows.len() {
                c1[art_start + k] = -1.0;
            }
            match simplex_loop(&mut tab, &mut rhs, &mut basis, &c1, ncols) {
                LoopEnd::Optimal => {}
                LoopEnd::Unbounded | LoopEnd::IterLimit => {
                    return LpOutcome::terminal(LpStatus::Error)
                }
            }
            let infeas: f64 = basis
                .iter()
                .zip(rhs.iter())
                .filter(|(&b, _)| b >= art_start)
                .map(|(_, &v)| v)
                .sum();
            if infeas > RESID_LOOSE {
                return LpOutcome::terminal(LpStatus::Infeasible);
            }
            // Drive artificials out of the basis where possible; rows that
            // resist are redundant and keep a banned zero-level artificial.
            for i in 0..m {
                if basis[i] < art_start {
                    continue;
                }
                if let Some(j) = (0..art_start).find(|&j| tab[(i, j)].abs() > PIV_TOL) {
                    pivot(&mut tab, &mut rhs, &mut basis, i, j);
                }
            }
        }

        // Phase 2: the caller's objective over the split variables, with
        // artificial columns banned from entering.
        let mut c2 = DVector::<f64>::zeros(ncols);
        for j in 0..n {
            c2[j] = prob.objective[j];
            c2[n + j] = -prob.objective[j];
        }
        let end = simplex_loop(&mut tab, &mut rhs, &mut basis, &c2, art_start);
        match end {
            LoopEnd::Unbounded => return LpOutcome::terminal(LpStatus::Unbounded),
            LoopEnd::IterLimit => return LpOutcome::terminal(LpStatus::Error),
            LoopEnd::Optimal => {}
        }

        let mut vals = DVector::<f64>::zeros(ncols);
        for i in 0..m {
            vals[basis[i]] = rhs[i];
        }
        let x = DVector::from_iterator(n, (0..n).map(|j| vals[j] - vals[n + j]));
        let resid = (0..m)
            .map(|i| {
                let mut row = 0.0;
                for j in 0..n {
                    row += prob.a[(i, j)] * x[j];
                }
                row - prob.b[i]
            })
            .fold(0.0f64, f64::max);
        let status = if resid <= RESID_OK {
            LpStatus::Solved
        } else if resid <= RESID_LOOSE {
            LpStatus::SolvedInaccurate
        } else {
            return LpOutcome::terminal(LpStatus::Error);
        };
        let value = prob.objective.dot(&x);
        LpOutcome {
            status,
            x: Some(x),
            value: Some(value),
        }
    }
}

/// Gauss-Jordan simplex iterations with Bland's rule. Columns at or beyond
/// `enter_limit` are banned from entering.
fn simplex_loop(
    tab: &mut DMatrix<f64>,
    rhs: &mut DVector<f64>,
    basis: &mut [usize],
    costs: &DVector<f64>,
    enter_limit: usize,
) -> LoopEnd {
    let m = tab.nrows();
    for _ in 0..MAX_ITERS {
        // Reduced costs priced from the current basis.
        let mut entering = None;
        'cols: for j in 0..enter_limit {
            if basis.contains(&j) {
                continue;
            }
            let mut d = costs[j];
            for i in 0..m {
                d -= costs[basis[i]] * tab[(i, j)];
            }
            if d > RC_TOL {
                entering = Some(j);
                break 'cols; // Bland: first improving index
            }
        }
        let Some(j) = entering else {
            return LoopEnd::Optimal;
        };
        // Ratio test, ties broken by smallest basis index (Bland).
        let mut leave: Option<(usize, f64)> = None;
        for i in 0..m {
            let t = tab[(i, j)];
            if t > PIV_TOL {
                let ratio = rhs[i] / t;
                match leave {
                    None => leave = Some((i, ratio)),
                    Some((li, lr)) => {
                        if ratio < lr - PIV_TOL
                            || ((ratio - lr).abs() <= PIV_TOL && basis[i] < basis[li])
                        {
                            leave = Some((i, ratio));
                        }
                    }
                }
            }
        }
        let Some((r, _)) = leave else {
            return LoopEnd::Unbounded;
        };
        pivot(tab, rhs, basis, r, j);
    }
    LoopEnd::IterLimit
}

fn pivot(tab: &mut DMatrix<f64>, rhs: &mut DVector<f64>, basis: &mut [usize], r: usize, j: usize) {
    let m = tab.nrows();
    let ncols = tab.ncols();
    let p = tab[(r, j)];
    for col in 0..ncols {
        tab[(r, col)] /= p;
    }
    rhs[r] /= p;
    for i in 0..m {
        if i == r {
            continue;
        }
        let f = tab[(i, j)];
        if f.abs() < PIV_TOL * PIV_TOL {
            continue;
        }
        for col in 0..ncols {
            let v = tab[(r, col)] * f;
            tab[(i, col)] -= v;
        }
        rhs[i] -= rhs[r] * f;
    }
    basis[r] = j;
}
