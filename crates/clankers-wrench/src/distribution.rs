//! Distribution of a desired total wrench over contact ridges.
//!
//! Each call to [`WrenchDistribution::run`] rebuilds a QP from the current
//! contact geometry:
//!
//! ```text
//! minimize    |W^(1/2) (G x - w_des)|^2 + lambda |x|^2
//! subject to  -B_c <= G_local_c x_c <= B_c     (contacts with a bound)
//!             x_min <= x <= x_max
//! ```
//!
//! where `G` stacks every contact's grasp matrix and `x` stacks every
//! contact's ridge forces, in contact order.

use clankers_contact::{Marker, SharedContact, local_wrench_list, total_ridge_num, wrench_list};
use clankers_core::{DistributionError, Wrench, WrenchDistributionConfig};
use nalgebra::{DVector, Matrix6xX, Vector3};
use tracing::{debug, warn};

use crate::qp::{QpBackend, QpCoeff, allocate_qp_solver};

/// Rows added per bounded contact (two-sided bound on six components).
const INEQ_ROWS_PER_CONTACT: usize = 12;

/// Where a [`WrenchDistribution`] stands after its last call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionState {
    /// No ridges to distribute over.
    Uninitialized,
    /// Ridges available, no solve attempted yet.
    Ready,
    /// Last solve converged.
    Solved,
    /// Last solve did not converge; the stored result is the backend's
    /// last iterate.
    Infeasible,
}

/// QP-based wrench distribution over a set of shared contacts.
pub struct WrenchDistribution {
    contacts: Vec<SharedContact>,
    config: WrenchDistributionConfig,
    backend: Box<dyn QpBackend>,

    qp_coeff: QpCoeff,
    total_grasp_mat: Matrix6xX<f64>,
    weighted_grasp_mat: Matrix6xX<f64>,

    state: DistributionState,
    desired_total_wrench: Wrench,
    moment_origin: Vector3<f64>,
    result_ridge_forces: DVector<f64>,
    result_total_wrench: Wrench,
}

impl WrenchDistribution {
    /// Create a distribution using the backend selected by
    /// `config.qp_solver_type`.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::Config`] if `config` is invalid.
    pub fn new(
        contacts: Vec<SharedContact>,
        config: WrenchDistributionConfig,
    ) -> Result<Self, DistributionError> {
        let backend = allocate_qp_solver(config.qp_solver_type, config.max_solver_iters);
        Self::with_backend(contacts, config, backend)
    }

    /// Create a distribution with an explicit backend.
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::Config`] if `config` is invalid.
    pub fn with_backend(
        contacts: Vec<SharedContact>,
        config: WrenchDistributionConfig,
        backend: Box<dyn QpBackend>,
    ) -> Result<Self, DistributionError> {
        config.validate()?;
        let mut dist = Self {
            contacts: Vec::new(),
            config,
            backend,
            qp_coeff: QpCoeff::default(),
            total_grasp_mat: Matrix6xX::zeros(0),
            weighted_grasp_mat: Matrix6xX::zeros(0),
            state: DistributionState::Uninitialized,
            desired_total_wrench: Wrench::zero(),
            moment_origin: Vector3::zeros(),
            result_ridge_forces: DVector::zeros(0),
            result_total_wrench: Wrench::zero(),
        };
        dist.set_contacts(contacts);
        Ok(dist)
    }

    /// Replace the contact set and reset the stored result.
    pub fn set_contacts(&mut self, contacts: Vec<SharedContact>) {
        self.contacts = contacts;
        let ridge_num = total_ridge_num(&self.contacts);
        self.result_ridge_forces = DVector::zeros(ridge_num);
        self.result_total_wrench = Wrench::zero();
        self.state = if ridge_num == 0 {
            DistributionState::Uninitialized
        } else {
            DistributionState::Ready
        };
    }

    /// Distribute `desired` (moments about `moment_origin`) over the contacts.
    ///
    /// Returns the achieved total wrench about `moment_origin`. A solve that
    /// does not converge still returns the backend's result and moves the
    /// state to [`DistributionState::Infeasible`].
    ///
    /// # Errors
    ///
    /// Returns [`DistributionError::Backend`] if the backend fails to run;
    /// stored results are left untouched in that case.
    ///
    /// # Panics
    ///
    /// Panics if a contact is mutably borrowed elsewhere during the call.
    pub fn run(
        &mut self,
        desired: &Wrench,
        moment_origin: &Vector3<f64>,
    ) -> Result<Wrench, DistributionError> {
        let ridge_num = total_ridge_num(&self.contacts);
        if ridge_num == 0 {
            debug!(contacts = self.contacts.len(), "no contact ridges, skipping solve");
            self.desired_total_wrench = *desired;
            self.moment_origin = *moment_origin;
            self.result_ridge_forces = DVector::zeros(0);
            self.result_total_wrench = Wrench::zero();
            self.state = DistributionState::Uninitialized;
            return Ok(Wrench::zero());
        }

        let bounded_num = self
            .contacts
            .iter()
            .filter(|c| c.borrow().max_wrench().is_some())
            .count();
        self.resize(ridge_num, bounded_num * INEQ_ROWS_PER_CONTACT);

        self.assemble_constraints();
        if moment_origin.norm() > 0.0 {
            self.shift_moment_origin(moment_origin);
        }
        self.assemble_objective(desired);

        let solution = self.backend.solve(&self.qp_coeff)?;
        if solution.x.len() != ridge_num {
            return Err(DistributionError::Backend(format!(
                "{} returned {} ridge forces, expected {ridge_num}",
                self.backend.name(),
                solution.x.len()
            )));
        }

        self.state = if solution.converged {
            DistributionState::Solved
        } else {
            warn!(
                backend = self.backend.name(),
                ridge_num,
                bounded_num,
                "wrench distribution QP did not converge"
            );
            DistributionState::Infeasible
        };
        self.desired_total_wrench = *desired;
        self.moment_origin = *moment_origin;
        self.result_ridge_forces = solution.x;
        self.result_total_wrench =
            Wrench::from_vector(&(&self.total_grasp_mat * &self.result_ridge_forces));

        Ok(self.result_total_wrench)
    }

    /// Re-size buffers when the problem shape changed.
    fn resize(&mut self, ridge_num: usize, ineq_num: usize) {
        if self.qp_coeff.dim_var == ridge_num && self.qp_coeff.dim_ineq == ineq_num {
            return;
        }
        debug!(
            ridge_num,
            ineq_num,
            prev_ridge_num = self.qp_coeff.dim_var,
            prev_ineq_num = self.qp_coeff.dim_ineq,
            "resizing wrench distribution QP"
        );
        self.qp_coeff.setup(ridge_num, ineq_num);
        self.total_grasp_mat = Matrix6xX::zeros(ridge_num);
        self.weighted_grasp_mat = Matrix6xX::zeros(ridge_num);
    }

    /// Stack grasp matrices and the per-contact local wrench bounds.
    fn assemble_constraints(&mut self) {
        let coeff = &mut self.qp_coeff;
        coeff.ineq_mat.fill(0.0);
        coeff.ineq_vec.fill(0.0);

        let mut col = 0;
        let mut row = 0;
        for contact in &self.contacts {
            let contact = contact.borrow();
            let n = contact.ridge_num();
            self.total_grasp_mat
                .columns_mut(col, n)
                .copy_from(contact.grasp_mat());

            if let Some(max_wrench) = contact.max_wrench() {
                let bound = max_wrench.to_vector();
                let local = contact.local_grasp_mat();

                let mut lower = coeff.ineq_mat.view_mut((row, col), (6, n));
                lower.copy_from(local);
                lower.neg_mut();
                coeff
                    .ineq_mat
                    .view_mut((row + 6, col), (6, n))
                    .copy_from(local);
                coeff.ineq_vec.rows_mut(row, 6).copy_from(&bound);
                coeff.ineq_vec.rows_mut(row + 6, 6).copy_from(&bound);
                row += INEQ_ROWS_PER_CONTACT;
            }
            col += n;
        }

        let [min, max] = self.config.ridge_force_min_max;
        coeff.x_min.fill(min);
        coeff.x_max.fill(max);
    }

    /// Re-express every column's moment about `origin`.
    fn shift_moment_origin(&mut self, origin: &Vector3<f64>) {
        for mut column in self.total_grasp_mat.column_iter_mut() {
            let force = column.fixed_rows::<3>(3).into_owned();
            let mut moment = column.fixed_rows_mut::<3>(0);
            moment -= origin.cross(&force);
        }
    }

    /// `H = G^T W G + lambda I`, `f = -G^T W w_des`.
    fn assemble_objective(&mut self, desired: &Wrench) {
        let weight = self.config.wrench_weight.to_wrench().to_vector();
        let coeff = &mut self.qp_coeff;

        self.weighted_grasp_mat.copy_from(&self.total_grasp_mat);
        for (i, mut row) in self.weighted_grasp_mat.row_iter_mut().enumerate() {
            row *= weight[i];
        }

        self.total_grasp_mat
            .tr_mul_to(&self.weighted_grasp_mat, &mut coeff.obj_mat);
        for i in 0..coeff.dim_var {
            coeff.obj_mat[(i, i)] += self.config.regular_weight;
        }

        let weighted_desired = weight.component_mul(&desired.to_vector());
        self.total_grasp_mat
            .tr_mul_to(&weighted_desired, &mut coeff.obj_vec);
        coeff.obj_vec.neg_mut();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub const fn state(&self) -> DistributionState {
        self.state
    }

    pub const fn config(&self) -> &WrenchDistributionConfig {
        &self.config
    }

    pub fn contacts(&self) -> &[SharedContact] {
        &self.contacts
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Desired wrench of the last `run`.
    pub const fn desired_total_wrench(&self) -> &Wrench {
        &self.desired_total_wrench
    }

    /// Moment origin of the last `run`.
    pub const fn moment_origin(&self) -> &Vector3<f64> {
        &self.moment_origin
    }

    /// Stacked ridge forces of the last `run`, in contact order.
    pub const fn result_ridge_forces(&self) -> &DVector<f64> {
        &self.result_ridge_forces
    }

    /// Achieved total wrench of the last `run`, about its moment origin.
    pub const fn result_total_wrench(&self) -> &Wrench {
        &self.result_total_wrench
    }

    /// World-frame wrench of each contact from the last result, about the
    /// last moment origin.
    ///
    /// # Panics
    ///
    /// Panics if contact ridge counts changed since the last `run`.
    pub fn result_wrench_list(&self) -> Vec<Wrench> {
        wrench_list(
            &self.contacts,
            self.result_ridge_forces.as_slice(),
            &self.moment_origin,
        )
    }

    /// Contact-frame wrench of each contact from the last result.
    ///
    /// # Panics
    ///
    /// Panics if contact ridge counts changed since the last `run`.
    pub fn result_local_wrench_list(&self) -> Vec<Wrench> {
        local_wrench_list(&self.contacts, self.result_ridge_forces.as_slice())
    }

    /// Debug markers of every contact, force arrows drawn from the last
    /// result.
    ///
    /// Arrows are zero-length when the stored result no longer matches the
    /// contact ridge counts.
    pub fn markers(&self, force_scale: f64, fric_pyramid_scale: f64) -> Vec<Marker> {
        let ridge_num = total_ridge_num(&self.contacts);
        let zeros;
        let ridge_forces = if self.result_ridge_forces.len() == ridge_num {
            self.result_ridge_forces.as_slice()
        } else {
            zeros = vec![0.0; ridge_num];
            zeros.as_slice()
        };

        let mut markers = Vec::new();
        let mut idx = 0;
        for contact in &self.contacts {
            let contact = contact.borrow();
            let n = contact.ridge_num();
            markers.extend(contact.markers(
                force_scale,
                fric_pyramid_scale,
                &ridge_forces[idx..idx + n],
            ));
            idx += n;
        }
        markers
    }
}

impl std::fmt::Debug for WrenchDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrenchDistribution")
            .field("contacts", &self.contacts.len())
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("ridge_num", &self.result_ridge_forces.len())
            .finish_non_exhaustive()
    }
}
