//! Vertex type.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGB colour with 8-bit channels.
///
/// Only used for previews: fragments written to disk carry geometry alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl VertexColor {
    /// Create a colour from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Light grey, used for the translucent source mesh in previews.
    pub const LIGHT_GREY: Self = Self::new(211, 211, 211);
}

/// A mesh vertex: a position plus optional per-vertex data.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0);
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// assert!(v.normal.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in mesh space.
    pub position: Point3<f64>,
    /// Unit normal, filled in by normal recomputation.
    pub normal: Option<Vector3<f64>>,
    /// Display colour.
    pub color: Option<VertexColor>,
}

impl Vertex {
    /// Create a vertex with no normal or colour.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            color: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Return a copy of this vertex carrying `color`.
    #[inline]
    #[must_use]
    pub const fn with_color(mut self, color: VertexColor) -> Self {
        self.color = Some(color);
        self
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_vertex_has_no_attributes() {
        let v = Vertex::new(Point3::new(1.0, 0.0, 0.0));
        assert!(v.normal.is_none());
        assert!(v.color.is_none());
    }

    #[test]
    fn with_color_sets_color() {
        let v = Vertex::from_coords(0.0, 0.0, 0.0).with_color(VertexColor::new(1, 2, 3));
        assert_eq!(v.color, Some(VertexColor::new(1, 2, 3)));
    }

    #[test]
    fn from_point() {
        let v: Vertex = Point3::new(4.0, 5.0, 6.0).into();
        assert_eq!(v.position.z, 6.0);
    }
}
