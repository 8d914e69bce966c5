//! Distribution of a desired total wrench over a set of contacts.
//!
//! [`WrenchDistribution`] stacks the grasp matrices of its contacts and
//! solves a small QP for nonnegative ridge forces that reproduce the desired
//! wrench, subject to per-ridge bounds and optional per-contact wrench
//! limits. The QP is handed to a [`QpBackend`]; [`ClarabelBackend`] is the
//! default.

pub mod distribution;
pub mod qp;

pub use distribution::{DistributionState, WrenchDistribution};
pub use qp::{ClarabelBackend, QpBackend, QpCoeff, QpSolution, allocate_qp_solver};
