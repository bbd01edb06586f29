//! Axis-aligned cutting planes.

use std::fmt;

use mesh_types::{Aabb, Point3, Vector3};

/// Which side of an [`AxisPlane`] is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeepSide {
    /// Keep `p[axis] >= value`. The plane is a box's lower face.
    Above,
    /// Keep `p[axis] <= value`. The plane is a box's upper face.
    Below,
}

/// Where a point lies relative to an [`AxisPlane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneSide {
    /// Strictly on the kept side.
    Inside,
    /// Within epsilon of the plane.
    On,
    /// Strictly on the discarded side.
    Outside,
}

/// A half-space bounded by a plane perpendicular to one coordinate axis.
///
/// # Example
///
/// ```
/// use mesh_clip::{AxisPlane, KeepSide, PlaneSide};
/// use mesh_types::Point3;
///
/// let plane = AxisPlane::new(0, 60.0, KeepSide::Below);
/// assert_eq!(plane.classify(&Point3::new(70.0, 0.0, 0.0), 1e-9), PlaneSide::Outside);
/// assert_eq!(plane.to_string(), "x <= 60");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlane {
    /// 0 for x, 1 for y, 2 for z.
    pub axis: usize,
    /// Plane position along `axis`.
    pub value: f64,
    /// Kept half-space.
    pub keep: KeepSide,
}

impl AxisPlane {
    /// Create a plane.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    pub fn new(axis: usize, value: f64, keep: KeepSide) -> Self {
        assert!(axis < 3, "axis must be 0, 1 or 2");
        Self { axis, value, keep }
    }

    /// The six faces of `aabb`, ordered x-min, x-max, y-min, y-max, z-min, z-max.
    #[must_use]
    pub fn box_faces(aabb: &Aabb) -> [Self; 6] {
        let mut planes = [Self::new(0, 0.0, KeepSide::Above); 6];
        for axis in 0..3 {
            planes[axis * 2] = Self::new(axis, aabb.min[axis], KeepSide::Above);
            planes[axis * 2 + 1] = Self::new(axis, aabb.max[axis], KeepSide::Below);
        }
        planes
    }

    /// Distance past the plane into the discarded half-space.
    ///
    /// Negative on the kept side.
    #[inline]
    #[must_use]
    pub fn excess(&self, p: &Point3<f64>) -> f64 {
        match self.keep {
            KeepSide::Above => self.value - p[self.axis],
            KeepSide::Below => p[self.axis] - self.value,
        }
    }

    /// Classify `p` with tolerance `epsilon`.
    #[inline]
    #[must_use]
    pub fn classify(&self, p: &Point3<f64>, epsilon: f64) -> PlaneSide {
        let d = self.excess(p);
        if d > epsilon {
            PlaneSide::Outside
        } else if d < -epsilon {
            PlaneSide::Inside
        } else {
            PlaneSide::On
        }
    }

    /// Unit normal pointing out of the kept half-space.
    #[must_use]
    pub fn outward_normal(&self) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        n[self.axis] = match self.keep {
            KeepSide::Above => -1.0,
            KeepSide::Below => 1.0,
        };
        n
    }

    /// `+1` if the outward normal points along the axis, `-1` otherwise.
    #[inline]
    #[must_use]
    pub fn orientation(&self) -> f64 {
        match self.keep {
            KeepSide::Above => -1.0,
            KeepSide::Below => 1.0,
        }
    }

    /// Point on segment `a`-`b` lying exactly on the plane.
    ///
    /// The axis coordinate is set to `value` rather than interpolated, so
    /// every crossing on this plane agrees on it bit for bit.
    #[must_use]
    pub fn intersect(&self, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
        let da = self.excess(a);
        let db = self.excess(b);
        let t = if (da - db).abs() > f64::EPSILON {
            (da / (da - db)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let mut p = a + (b - a) * t;
        p[self.axis] = self.value;
        p
    }

    /// In-plane coordinates of `p`.
    ///
    /// The pair is `(axis + 1, axis + 2)` cyclically, so counter-clockwise
    /// in these coordinates is counter-clockwise seen from `+axis`.
    #[inline]
    #[must_use]
    pub fn project(&self, p: &Point3<f64>) -> [f64; 2] {
        [p[(self.axis + 1) % 3], p[(self.axis + 2) % 3]]
    }
}

impl fmt::Display for AxisPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = ["x", "y", "z"][self.axis];
        let op = match self.keep {
            KeepSide::Above => ">=",
            KeepSide::Below => "<=",
        };
        write!(f, "{name} {op} {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_faces_order() {
        let aabb = Aabb::new(Point3::new(0.0, 1.0, 2.0), Point3::new(10.0, 11.0, 12.0));
        let planes = AxisPlane::box_faces(&aabb);
        let names: Vec<String> = planes.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["x >= 0", "x <= 10", "y >= 1", "y <= 11", "z >= 2", "z <= 12"]
        );
    }

    #[test]
    fn classification_uses_tolerance() {
        let plane = AxisPlane::new(2, 5.0, KeepSide::Above);
        let eps = 1e-6;
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 6.0), eps), PlaneSide::Inside);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 5.0 - 1e-7), eps), PlaneSide::On);
        assert_eq!(plane.classify(&Point3::new(0.0, 0.0, 4.0), eps), PlaneSide::Outside);
    }

    #[test]
    fn intersection_lands_on_plane() {
        let plane = AxisPlane::new(1, 0.3, KeepSide::Below);
        let p = plane.intersect(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 1.0, 4.0));
        assert_relative_eq!(p.y, 0.3);
        assert_relative_eq!(p.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(p.z, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn projection_is_right_handed() {
        for axis in 0..3 {
            let plane = AxisPlane::new(axis, 0.0, KeepSide::Below);
            let mut u = Vector3::zeros();
            u[(axis + 1) % 3] = 1.0;
            let mut v = Vector3::zeros();
            v[(axis + 2) % 3] = 1.0;
            assert_eq!(u.cross(&v), plane.outward_normal());
            assert_eq!(plane.project(&Point3::from(u)), [1.0, 0.0]);
        }
    }
}
