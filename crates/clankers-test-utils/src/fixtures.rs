//! Canonical contact geometry shared by contact and distribution tests.

use std::f64::consts::{FRAC_PI_2, PI};

use clankers_core::Wrench;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// Friction coefficient used by the biped fixtures.
pub const FOOT_FRIC_COEFF: f64 = 0.5;

/// Three-vertex left foot patch, at the identity pose.
pub fn left_foot_vertices() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(-0.1, -0.1, 0.0),
        Vector3::new(-0.1, 0.1, 0.0),
        Vector3::new(0.1, 0.0, 0.0),
    ]
}

/// Single-vertex right foot patch.
pub fn right_foot_vertices() -> Vec<Vector3<f64>> {
    vec![Vector3::zeros()]
}

/// Pose of the right foot: offset sideways and up, no rotation.
pub fn right_foot_pose() -> Isometry3<f64> {
    Isometry3::translation(0.0, -0.5, 0.5)
}

/// Two opposing fingertip poses of a pinch grasp.
pub fn pinch_grasp_vertices() -> Vec<Isometry3<f64>> {
    vec![
        Isometry3::identity(),
        Isometry3::from_parts(Translation3::identity(), rot_x(PI)),
    ]
}

/// Pose of the left hand holding a vertical handle.
pub fn left_hand_pose() -> Isometry3<f64> {
    Isometry3::from_parts(Translation3::new(0.5, 0.5, 1.0), rot_y(FRAC_PI_2))
}

/// Wrench the biped scenarios ask for: body weight plus a small roll moment.
pub fn standing_wrench() -> Wrench {
    Wrench::new(Vector3::new(10.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 500.0))
}

pub fn rot_x(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle)
}

pub fn rot_y(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
}

/// Pose with a rotation about x followed by a translation.
pub fn pose_rot_x(angle: f64, translation: Vector3<f64>) -> Isometry3<f64> {
    Isometry3::from_parts(translation.into(), rot_x(angle))
}
