//! Contact model: vertices with friction pyramid ridges and grasp matrices.
//!
//! A contact is a set of vertices, each carrying the ridge directions of its
//! friction pyramid. With `K = vertices * ridges`, the contact's grasp matrix
//! is the 6×K map from ridge force magnitudes to the resulting wrench:
//!
//! ```text
//! column(v, r) = [ p_v × d_r ; d_r ]      (moment rows above force rows)
//! ```
//!
//! The global grasp matrix uses world-frame vertices and ridges and takes
//! moments about the world origin. The local grasp matrix uses the same
//! formula in the contact's own frame and never changes after construction.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use clankers_core::{ContactConfig, ContactError, Wrench};
use nalgebra::{Isometry3, Matrix6xX, Point3, Vector3, Vector6};

use crate::friction::FrictionPyramid;
use crate::registry::VertexRegistry;

/// Contact shared between the distribution and other readers
/// (visualization, diagnostics). Single-threaded by construction.
pub type SharedContact = Rc<RefCell<Contact>>;

// ---------------------------------------------------------------------------
// ContactKind
// ---------------------------------------------------------------------------

/// Shape of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Placeholder for a limb not in contact. Has no ridges.
    Empty,
    /// Planar patch: every vertex shares the patch normal.
    Surface,
    /// Enveloping or pinch grasp: every vertex has its own normal.
    Grasp,
}

impl ContactKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Surface => "Surface",
            Self::Grasp => "Grasp",
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VertexWithRidges
// ---------------------------------------------------------------------------

/// A contact vertex and the ridge directions of its friction pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexWithRidges {
    pub vertex: Vector3<f64>,
    pub ridges: Vec<Vector3<f64>>,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A contact between the body and its environment.
#[derive(Debug, Clone)]
pub struct Contact {
    name: String,
    kind: ContactKind,
    pose: Isometry3<f64>,
    /// Vertices and ridges in the contact frame.
    local_vertices: Vec<VertexWithRidges>,
    /// Vertices and ridges in the world frame.
    vertices: Vec<VertexWithRidges>,
    grasp_mat: Matrix6xX<f64>,
    local_grasp_mat: Matrix6xX<f64>,
    max_wrench: Option<Wrench>,
}

impl Contact {
    /// Contact with no vertices, contributing nothing to the wrench.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::from_local(
            name.into(),
            ContactKind::Empty,
            Vec::new(),
            &Isometry3::identity(),
            None,
        )
    }

    /// Surface contact with the default four-ridge pyramid.
    ///
    /// `local_vertices` are points of the patch in the contact frame whose
    /// normal is +z; `pose` places the patch in the world.
    pub fn surface(
        name: impl Into<String>,
        fric_coeff: f64,
        local_vertices: &[Vector3<f64>],
        pose: &Isometry3<f64>,
        max_wrench: Option<Wrench>,
    ) -> Self {
        let pyramid = FrictionPyramid::with_default_ridges(fric_coeff);
        Self::surface_with_pyramid(name, &pyramid, local_vertices, pose, max_wrench)
    }

    /// Surface contact with an explicit friction pyramid.
    pub fn surface_with_pyramid(
        name: impl Into<String>,
        pyramid: &FrictionPyramid,
        local_vertices: &[Vector3<f64>],
        pose: &Isometry3<f64>,
        max_wrench: Option<Wrench>,
    ) -> Self {
        let local = local_vertices
            .iter()
            .map(|v| VertexWithRidges {
                vertex: *v,
                ridges: pyramid.local_ridges().to_vec(),
            })
            .collect();
        Self::from_local(name.into(), ContactKind::Surface, local, pose, max_wrench)
    }

    /// Grasp contact with the default four-ridge pyramid.
    ///
    /// Each entry of `local_vertices` is a full pose in the contact frame;
    /// its z axis is the normal of that contact point.
    pub fn grasp(
        name: impl Into<String>,
        fric_coeff: f64,
        local_vertices: &[Isometry3<f64>],
        pose: &Isometry3<f64>,
        max_wrench: Option<Wrench>,
    ) -> Self {
        let pyramid = FrictionPyramid::with_default_ridges(fric_coeff);
        Self::grasp_with_pyramid(name, &pyramid, local_vertices, pose, max_wrench)
    }

    /// Grasp contact with an explicit friction pyramid.
    pub fn grasp_with_pyramid(
        name: impl Into<String>,
        pyramid: &FrictionPyramid,
        local_vertices: &[Isometry3<f64>],
        pose: &Isometry3<f64>,
        max_wrench: Option<Wrench>,
    ) -> Self {
        let local = local_vertices
            .iter()
            .map(|vertex_pose| VertexWithRidges {
                vertex: vertex_pose.translation.vector,
                ridges: pyramid.ridges_in_frame(&vertex_pose.rotation),
            })
            .collect();
        Self::from_local(name.into(), ContactKind::Grasp, local, pose, max_wrench)
    }

    /// Build a contact from configuration, looking vertex tables up by name.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingVertices`] if the named table is absent
    /// and [`ContactError::InvalidFrictionCoeff`] for a negative or
    /// non-finite friction coefficient.
    pub fn from_config(
        config: &ContactConfig,
        registry: &VertexRegistry,
    ) -> Result<Self, ContactError> {
        let contact = match config {
            ContactConfig::Empty { name } => Self::empty(name.clone()),
            ContactConfig::Surface {
                name,
                fric_coeff,
                vertices_name,
                pose,
                max_wrench,
                ridge_num,
            } => {
                let pyramid = checked_pyramid(*fric_coeff, *ridge_num)?;
                Self::surface_with_pyramid(
                    name.clone(),
                    &pyramid,
                    registry.surface_vertices(vertices_name)?,
                    &pose.to_isometry(),
                    max_wrench.map(|w| w.to_wrench()),
                )
            }
            ContactConfig::Grasp {
                name,
                fric_coeff,
                vertices_name,
                pose,
                max_wrench,
                ridge_num,
            } => {
                let pyramid = checked_pyramid(*fric_coeff, *ridge_num)?;
                Self::grasp_with_pyramid(
                    name.clone(),
                    &pyramid,
                    registry.grasp_vertices(vertices_name)?,
                    &pose.to_isometry(),
                    max_wrench.map(|w| w.to_wrench()),
                )
            }
        };
        tracing::debug!(
            name = contact.name(),
            kind = %contact.kind(),
            ridge_num = contact.ridge_num(),
            "contact constructed from config"
        );
        Ok(contact)
    }

    fn from_local(
        name: String,
        kind: ContactKind,
        local_vertices: Vec<VertexWithRidges>,
        pose: &Isometry3<f64>,
        max_wrench: Option<Wrench>,
    ) -> Self {
        let ridge_num: usize = local_vertices.iter().map(|v| v.ridges.len()).sum();
        let mut local_grasp_mat = Matrix6xX::zeros(ridge_num);
        let mut col = 0;
        for local in &local_vertices {
            for ridge in &local.ridges {
                local_grasp_mat.set_column(col, &spatial_column(&local.vertex, ridge));
                col += 1;
            }
        }

        let mut contact = Self {
            name,
            kind,
            pose: Isometry3::identity(),
            vertices: local_vertices.clone(),
            local_vertices,
            grasp_mat: Matrix6xX::zeros(ridge_num),
            local_grasp_mat,
            max_wrench,
        };
        contact.update_vertices(pose);
        contact
    }

    /// Wrap into a [`SharedContact`].
    pub fn into_shared(self) -> SharedContact {
        Rc::new(RefCell::new(self))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> ContactKind {
        self.kind
    }

    /// Current contact pose in the world.
    pub const fn pose(&self) -> &Isometry3<f64> {
        &self.pose
    }

    /// Number of ridges, i.e. columns of the grasp matrix.
    pub fn ridge_num(&self) -> usize {
        self.grasp_mat.ncols()
    }

    /// Vertices and ridges in the world frame.
    pub fn vertices(&self) -> &[VertexWithRidges] {
        &self.vertices
    }

    /// Vertices and ridges in the contact frame.
    pub fn local_vertices(&self) -> &[VertexWithRidges] {
        &self.local_vertices
    }

    /// Grasp matrix in the world frame, moments about the world origin.
    pub const fn grasp_mat(&self) -> &Matrix6xX<f64> {
        &self.grasp_mat
    }

    /// Grasp matrix in the contact frame.
    pub const fn local_grasp_mat(&self) -> &Matrix6xX<f64> {
        &self.local_grasp_mat
    }

    /// Bound on the contact-frame wrench, if any.
    pub const fn max_wrench(&self) -> Option<&Wrench> {
        self.max_wrench.as_ref()
    }

    pub fn set_max_wrench(&mut self, max_wrench: Option<Wrench>) {
        self.max_wrench = max_wrench;
    }

    // -----------------------------------------------------------------------
    // Geometry update
    // -----------------------------------------------------------------------

    /// Move the contact to `pose`.
    ///
    /// Recomputes world-frame vertices, ridges and grasp matrix columns in
    /// place. The local grasp matrix is unchanged.
    pub fn update_vertices(&mut self, pose: &Isometry3<f64>) {
        self.pose = *pose;
        let mut col = 0;
        for (local, global) in self.local_vertices.iter().zip(&mut self.vertices) {
            global.vertex = (pose * Point3::from(local.vertex)).coords;
            for (local_ridge, ridge) in local.ridges.iter().zip(&mut global.ridges) {
                *ridge = pose.rotation * local_ridge;
                self.grasp_mat
                    .set_column(col, &spatial_column(&global.vertex, ridge));
                col += 1;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Wrench evaluation
    // -----------------------------------------------------------------------

    /// World-frame wrench produced by `ridge_forces`, moments about
    /// `moment_origin`.
    ///
    /// # Panics
    ///
    /// Panics if `ridge_forces.len() != self.ridge_num()`.
    pub fn wrench(&self, ridge_forces: &[f64], moment_origin: &Vector3<f64>) -> Wrench {
        assert_eq!(
            ridge_forces.len(),
            self.ridge_num(),
            "ridge force dimension mismatch for contact {}",
            self.name
        );

        let mut total = Wrench::zero();
        let mut forces = ridge_forces.iter();
        for vertex_with_ridges in &self.vertices {
            let arm = vertex_with_ridges.vertex - moment_origin;
            for (ridge, ratio) in vertex_with_ridges.ridges.iter().zip(&mut forces) {
                let force = *ratio * ridge;
                total.force += force;
                total.moment += arm.cross(&force);
            }
        }
        total
    }

    /// Contact-frame wrench produced by `ridge_forces`.
    ///
    /// # Panics
    ///
    /// Panics if `ridge_forces.len() != self.ridge_num()`.
    pub fn local_wrench(&self, ridge_forces: &[f64]) -> Wrench {
        assert_eq!(
            ridge_forces.len(),
            self.ridge_num(),
            "ridge force dimension mismatch for contact {}",
            self.name
        );
        Wrench::from_vector(&mul_columns(&self.local_grasp_mat, ridge_forces))
    }

    /// Net force at each vertex (sum over its ridges).
    ///
    /// # Panics
    ///
    /// Panics if `ridge_forces.len() != self.ridge_num()`.
    pub fn vertex_forces(&self, ridge_forces: &[f64]) -> Vec<Vector3<f64>> {
        assert_eq!(
            ridge_forces.len(),
            self.ridge_num(),
            "ridge force dimension mismatch for contact {}",
            self.name
        );
        let mut forces = ridge_forces.iter();
        self.vertices
            .iter()
            .map(|v| {
                v.ridges
                    .iter()
                    .zip(&mut forces)
                    .map(|(ridge, ratio)| *ratio * ridge)
                    .sum::<Vector3<f64>>()
            })
            .collect()
    }
}

/// Spatial force of a unit force along `ridge` applied at `vertex`.
fn spatial_column(vertex: &Vector3<f64>, ridge: &Vector3<f64>) -> Vector6<f64> {
    let moment = vertex.cross(ridge);
    Vector6::new(moment.x, moment.y, moment.z, ridge.x, ridge.y, ridge.z)
}

/// `mat * x` for a 6×K matrix and a K-slice.
fn mul_columns(mat: &Matrix6xX<f64>, x: &[f64]) -> Vector6<f64> {
    mat.column_iter()
        .zip(x)
        .fold(Vector6::zeros(), |acc, (col, xi)| acc + col * *xi)
}

fn checked_pyramid(fric_coeff: f64, ridge_num: usize) -> Result<FrictionPyramid, ContactError> {
    if !fric_coeff.is_finite() || fric_coeff < 0.0 {
        return Err(ContactError::InvalidFrictionCoeff(fric_coeff));
    }
    let pyramid = FrictionPyramid::new(fric_coeff, ridge_num);
    tracing::debug!(
        fric_coeff = pyramid.fric_coeff(),
        ridge_num = pyramid.ridge_num(),
        "friction pyramid built"
    );
    Ok(pyramid)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
