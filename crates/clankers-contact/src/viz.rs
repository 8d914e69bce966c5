//! Renderer-agnostic debug markers for contacts.
//!
//! Produces arrows for per-vertex forces, wireframe friction pyramids and
//! the contact region. Drawing them is left to whatever visualization the
//! caller runs.

use nalgebra::Vector3;

use crate::contact::{Contact, ContactKind};

/// Default scale of force arrows (m/N).
pub const DEFAULT_FORCE_SCALE: f64 = 2e-3;

/// Default length of friction pyramid edges (m).
pub const DEFAULT_FRIC_PYRAMID_SCALE: f64 = 5e-2;

/// A single debug marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Arrow {
        name: String,
        start: Vector3<f64>,
        end: Vector3<f64>,
    },
    Polyhedron {
        name: String,
        vertices: Vec<Vector3<f64>>,
        triangles: Vec<[usize; 3]>,
    },
    Polygon {
        name: String,
        vertices: Vec<Vector3<f64>>,
    },
    Point {
        name: String,
        position: Vector3<f64>,
    },
}

impl Marker {
    pub fn name(&self) -> &str {
        match self {
            Self::Arrow { name, .. }
            | Self::Polyhedron { name, .. }
            | Self::Polygon { name, .. }
            | Self::Point { name, .. } => name,
        }
    }
}

impl Contact {
    /// Debug markers for this contact.
    ///
    /// A non-positive `force_scale` omits force arrows and a non-positive
    /// `fric_pyramid_scale` omits pyramids. `ridge_forces` is only read when
    /// arrows are requested.
    ///
    /// # Panics
    ///
    /// Panics if arrows are requested and `ridge_forces.len()` differs from
    /// the ridge count.
    pub fn markers(
        &self,
        force_scale: f64,
        fric_pyramid_scale: f64,
        ridge_forces: &[f64],
    ) -> Vec<Marker> {
        let mut markers = Vec::new();

        if force_scale > 0.0 {
            let forces = self.vertex_forces(ridge_forces);
            for (idx, (v, force)) in self.vertices().iter().zip(forces).enumerate() {
                markers.push(Marker::Arrow {
                    name: format!("{}_Force{idx}", self.name()),
                    start: v.vertex,
                    end: v.vertex + force_scale * force,
                });
            }
        }

        if fric_pyramid_scale > 0.0 {
            for (idx, v) in self.vertices().iter().enumerate() {
                let n = v.ridges.len();
                let mut vertices = Vec::with_capacity(n + 1);
                vertices.push(v.vertex);
                vertices.extend(v.ridges.iter().map(|r| v.vertex + fric_pyramid_scale * r));
                let triangles = (0..n).map(|r| [0, r + 1, (r + 1) % n + 1]).collect();
                markers.push(Marker::Polyhedron {
                    name: format!("{}_FricPyramid{idx}", self.name()),
                    vertices,
                    triangles,
                });
            }
        }

        match self.kind() {
            ContactKind::Empty => {}
            ContactKind::Surface => markers.push(Marker::Polygon {
                name: format!("{}_SurfaceRegion", self.name()),
                vertices: self.vertices().iter().map(|v| v.vertex).collect(),
            }),
            ContactKind::Grasp => {
                for (idx, v) in self.vertices().iter().enumerate() {
                    markers.push(Marker::Point {
                        name: format!("{}_GraspRegion_{idx}", self.name()),
                        position: v.vertex,
                    });
                }
            }
        }

        markers
    }
}
