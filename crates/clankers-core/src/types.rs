use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use nalgebra::{Vector3, Vector6};

// ---------------------------------------------------------------------------
// Wrench
// ---------------------------------------------------------------------------

/// Spatial force: a moment (couple) and a force acting about a common point.
///
/// The 6D vector layout is `[moment; force]`, matching the column layout of
/// contact grasp matrices.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wrench {
    /// Moment about the reference point (N·m).
    pub moment: Vector3<f64>,
    /// Force (N).
    pub force: Vector3<f64>,
}

impl Wrench {
    pub const fn new(moment: Vector3<f64>, force: Vector3<f64>) -> Self {
        Self { moment, force }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Build from a `[moment; force]` vector.
    pub fn from_vector(v: &Vector6<f64>) -> Self {
        Self {
            moment: v.fixed_rows::<3>(0).into(),
            force: v.fixed_rows::<3>(3).into(),
        }
    }

    /// Pack into a `[moment; force]` vector.
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.moment.x,
            self.moment.y,
            self.moment.z,
            self.force.x,
            self.force.y,
            self.force.z,
        )
    }

    /// Euclidean norm of the stacked 6D vector.
    pub fn norm(&self) -> f64 {
        self.to_vector().norm()
    }

    /// Re-express this wrench about a new point.
    ///
    /// `offset` is the new moment origin relative to the current one.
    pub fn shifted(&self, offset: &Vector3<f64>) -> Self {
        Self {
            moment: self.moment - offset.cross(&self.force),
            force: self.force,
        }
    }

    /// True if every component is within `bound` in absolute value.
    pub fn within(&self, bound: &Self, tolerance: f64) -> bool {
        let v = self.to_vector();
        let b = bound.to_vector();
        v.iter()
            .zip(b.iter())
            .all(|(x, limit)| x.abs() <= limit + tolerance)
    }
}

impl Add for Wrench {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.moment + rhs.moment, self.force + rhs.force)
    }
}

impl AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Self) {
        self.moment += rhs.moment;
        self.force += rhs.force;
    }
}

impl Sub for Wrench {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.moment - rhs.moment, self.force - rhs.force)
    }
}

impl SubAssign for Wrench {
    fn sub_assign(&mut self, rhs: Self) {
        self.moment -= rhs.moment;
        self.force -= rhs.force;
    }
}

impl Neg for Wrench {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.moment, -self.force)
    }
}

impl Sum for Wrench {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl std::fmt::Display for Wrench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "moment=[{:.4}, {:.4}, {:.4}] force=[{:.4}, {:.4}, {:.4}]",
            self.moment.x, self.moment.y, self.moment.z, self.force.x, self.force.y, self.force.z
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vector_layout_is_moment_then_force() {
        let w = Wrench::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
        let v = w.to_vector();
        assert_relative_eq!(v, Vector6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
        assert_eq!(Wrench::from_vector(&v), w);
    }

    #[test]
    fn sum_of_wrenches() {
        let a = Wrench::new(Vector3::x(), Vector3::y());
        let b = Wrench::new(Vector3::z(), Vector3::x());
        let total: Wrench = [a, b].into_iter().sum();
        assert_relative_eq!(total.moment, Vector3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(total.force, Vector3::new(1.0, 1.0, 0.0));
        assert_relative_eq!((total - b).moment, a.moment);
        assert_relative_eq!((-a).force, -Vector3::y());
    }

    #[test]
    fn shifting_moment_origin() {
        // Pure vertical force at the origin, viewed from (1, 0, 0).
        let w = Wrench::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 10.0));
        let shifted = w.shifted(&Vector3::new(1.0, 0.0, 0.0));
        // (0 - 1, 0, 0) x (0, 0, 10) = (0, 10, 0)
        assert_relative_eq!(shifted.moment, Vector3::new(0.0, 10.0, 0.0));
        assert_relative_eq!(shifted.force, w.force);
    }

    #[test]
    fn within_bound() {
        let bound = Wrench::new(Vector3::repeat(1.0), Vector3::repeat(10.0));
        let inside = Wrench::new(Vector3::new(-1.0, 0.5, 0.0), Vector3::new(10.0, -9.0, 0.0));
        let outside = Wrench::new(Vector3::zeros(), Vector3::new(0.0, 0.0, -10.5));
        assert!(inside.within(&bound, 0.0));
        assert!(!outside.within(&bound, 1e-3));
    }

    #[test]
    fn zero_is_default() {
        assert_eq!(Wrench::zero(), Wrench::default());
        assert_relative_eq!(Wrench::zero().norm(), 0.0);
    }
}
