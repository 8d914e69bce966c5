//! Shared test fixtures and utilities for Clankers crates.
//!
//! Provides deterministic RNG setup, random ridge force vectors, and the
//! canonical foot and hand contact geometry used across test suites.

pub mod fixtures;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    FOOT_FRIC_COEFF, left_foot_vertices, left_hand_pose, pinch_grasp_vertices, pose_rot_x,
    right_foot_pose, right_foot_vertices, rot_x, rot_y, standing_wrench,
};
pub use rng::{random_ridge_forces, seeded_rng};
