//! Polyhedral approximation of the Coulomb friction cone.
//!
//! A [`FrictionPyramid`] replaces the circular cone `|f_t| <= mu * f_n` by
//! `N` ridge directions evenly spaced in azimuth. Any nonnegative
//! combination of the ridges lies inside the cone, so the wrench
//! distribution only has to keep each ridge magnitude nonnegative.

use std::f64::consts::TAU;

use nalgebra::{UnitQuaternion, Vector3};

/// Ridge count used when none is specified.
pub const DEFAULT_RIDGE_NUM: usize = 4;

/// Friction pyramid in the contact's local frame (normal = +z).
#[derive(Debug, Clone, PartialEq)]
pub struct FrictionPyramid {
    fric_coeff: f64,
    local_ridges: Vec<Vector3<f64>>,
}

impl FrictionPyramid {
    /// Build a pyramid with `ridge_num` ridges.
    ///
    /// Ridge `i` has azimuth `2 pi i / ridge_num` and makes an angle of
    /// `atan(fric_coeff)` with the local z axis. `ridge_num == 0` yields an
    /// empty pyramid.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(fric_coeff: f64, ridge_num: usize) -> Self {
        let local_ridges = (0..ridge_num)
            .map(|i| {
                let theta = TAU * (i as f64 / ridge_num as f64);
                Vector3::new(fric_coeff * theta.cos(), fric_coeff * theta.sin(), 1.0).normalize()
            })
            .collect();
        Self {
            fric_coeff,
            local_ridges,
        }
    }

    /// Pyramid with [`DEFAULT_RIDGE_NUM`] ridges.
    pub fn with_default_ridges(fric_coeff: f64) -> Self {
        Self::new(fric_coeff, DEFAULT_RIDGE_NUM)
    }

    pub const fn fric_coeff(&self) -> f64 {
        self.fric_coeff
    }

    pub const fn ridge_num(&self) -> usize {
        self.local_ridges.len()
    }

    /// Unit ridge directions in the local frame.
    pub fn local_ridges(&self) -> &[Vector3<f64>] {
        &self.local_ridges
    }

    /// Ridge directions re-expressed in the frame reached by `rotation`.
    pub fn ridges_in_frame(&self, rotation: &UnitQuaternion<f64>) -> Vec<Vector3<f64>> {
        self.local_ridges.iter().map(|r| rotation * r).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
