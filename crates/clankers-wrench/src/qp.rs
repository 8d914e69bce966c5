//! QP backend seam and the Clarabel implementation.
//!
//! The distribution hands over a dense box- and inequality-constrained QP:
//!
//! ```text
//! minimize    1/2 x^T H x + f^T x
//! subject to  C x <= d
//!             x_min <= x <= x_max
//! ```
//!
//! Clarabel (pure Rust interior-point solver) takes `A x + s = b, s >= 0`,
//! so the box bounds become extra rows `-x <= -x_min` and `x <= x_max`.
//! Infinite bounds produce no row.

use std::time::Instant;

use clankers_core::{DistributionError, QpSolverType};
use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT::NonnegativeConeT,
};
use nalgebra::{DMatrix, DVector};

// ---------------------------------------------------------------------------
// QpCoeff
// ---------------------------------------------------------------------------

/// Dense QP coefficients, sized once and reused across solves.
#[derive(Clone, Debug)]
pub struct QpCoeff {
    /// Number of decision variables.
    pub dim_var: usize,
    /// Number of inequality rows (excluding box bounds).
    pub dim_ineq: usize,
    /// Symmetric objective matrix H (`dim_var` × `dim_var`).
    pub obj_mat: DMatrix<f64>,
    /// Objective vector f.
    pub obj_vec: DVector<f64>,
    /// Inequality matrix C (`dim_ineq` × `dim_var`).
    pub ineq_mat: DMatrix<f64>,
    /// Inequality vector d.
    pub ineq_vec: DVector<f64>,
    pub x_min: DVector<f64>,
    pub x_max: DVector<f64>,
}

impl Default for QpCoeff {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl QpCoeff {
    pub fn new(dim_var: usize, dim_ineq: usize) -> Self {
        Self {
            dim_var,
            dim_ineq,
            obj_mat: DMatrix::zeros(dim_var, dim_var),
            obj_vec: DVector::zeros(dim_var),
            ineq_mat: DMatrix::zeros(dim_ineq, dim_var),
            ineq_vec: DVector::zeros(dim_ineq),
            x_min: DVector::zeros(dim_var),
            x_max: DVector::zeros(dim_var),
        }
    }

    /// Resize every buffer, zeroing contents.
    pub fn setup(&mut self, dim_var: usize, dim_ineq: usize) {
        *self = Self::new(dim_var, dim_ineq);
    }
}

// ---------------------------------------------------------------------------
// QpBackend
// ---------------------------------------------------------------------------

/// Result of a QP solve.
#[derive(Clone, Debug)]
pub struct QpSolution {
    /// Solution (or last iterate when not converged), length `dim_var`.
    pub x: DVector<f64>,
    /// Whether the backend reports an optimal solution.
    pub converged: bool,
    /// Solve time in microseconds.
    pub solve_time_us: u64,
}

/// Trait that concrete QP solvers must implement.
pub trait QpBackend {
    /// Solve the problem described by `coeff`.
    ///
    /// A problem that is solved but infeasible or not converged is reported
    /// with `converged == false`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::Backend`] if the solver could not be set
    /// up at all.
    fn solve(&mut self, coeff: &QpCoeff) -> Result<QpSolution, DistributionError>;

    /// Human-readable solver name (e.g., "clarabel").
    fn name(&self) -> &str;
}

/// Allocate the backend selected by `solver_type`.
pub fn allocate_qp_solver(solver_type: QpSolverType, max_iter: u32) -> Box<dyn QpBackend> {
    match solver_type {
        QpSolverType::Any | QpSolverType::Clarabel => Box::new(ClarabelBackend::new(max_iter)),
    }
}

// ---------------------------------------------------------------------------
// ClarabelBackend
// ---------------------------------------------------------------------------

/// Interior-point backend built on Clarabel.
#[derive(Clone, Debug)]
pub struct ClarabelBackend {
    max_iter: u32,
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ClarabelBackend {
    pub const fn new(max_iter: u32) -> Self {
        Self { max_iter }
    }
}

impl QpBackend for ClarabelBackend {
    fn solve(&mut self, coeff: &QpCoeff) -> Result<QpSolution, DistributionError> {
        let start = Instant::now();
        let n = coeff.dim_var;

        // 1. Stack inequalities and finite box bounds
        let lower: Vec<usize> = (0..n).filter(|&i| coeff.x_min[i].is_finite()).collect();
        let upper: Vec<usize> = (0..n).filter(|&i| coeff.x_max[i].is_finite()).collect();
        let m = coeff.dim_ineq + lower.len() + upper.len();

        let mut a_all = DMatrix::zeros(m, n);
        let mut b_all = DVector::zeros(m);
        a_all
            .view_mut((0, 0), (coeff.dim_ineq, n))
            .copy_from(&coeff.ineq_mat);
        b_all.rows_mut(0, coeff.dim_ineq).copy_from(&coeff.ineq_vec);

        let mut row = coeff.dim_ineq;
        for &i in &lower {
            a_all[(row, i)] = -1.0;
            b_all[row] = -coeff.x_min[i];
            row += 1;
        }
        for &i in &upper {
            a_all[(row, i)] = 1.0;
            b_all[row] = coeff.x_max[i];
            row += 1;
        }

        // 2. Convert to Clarabel format
        let p_csc = dmatrix_to_csc_upper_tri(&coeff.obj_mat);
        let a_csc = dmatrix_to_csc(&a_all);
        let cones = if m > 0 {
            vec![NonnegativeConeT(m)]
        } else {
            Vec::new()
        };

        // 3. Solve
        let settings = DefaultSettingsBuilder::default()
            .max_iter(self.max_iter)
            .verbose(false)
            .build()
            .map_err(|e| DistributionError::Backend(format!("invalid settings: {e:?}")))?;

        let mut solver = DefaultSolver::new(
            &p_csc,
            coeff.obj_vec.as_slice(),
            &a_csc,
            b_all.as_slice(),
            &cones,
            settings,
        )
        .map_err(|e| DistributionError::Backend(format!("setup failed: {e:?}")))?;

        solver.solve();
        let sol = &solver.solution;

        let converged = matches!(sol.status, SolverStatus::Solved | SolverStatus::AlmostSolved);
        if !converged {
            tracing::debug!(status = ?sol.status, "clarabel did not converge");
        }

        let elapsed = start.elapsed();

        Ok(QpSolution {
            x: DVector::from_column_slice(&sol.x),
            converged,
            solve_time_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        })
    }

    fn name(&self) -> &str {
        "clarabel"
    }
}

/// Convert a nalgebra `DMatrix<f64>` to a Clarabel `CscMatrix<f64>` (full matrix).
fn dmatrix_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Convert a symmetric nalgebra `DMatrix<f64>` to upper-triangular `CscMatrix<f64>`.
fn dmatrix_to_csc_upper_tri(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..=j.min(nrows.saturating_sub(1)) {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}
