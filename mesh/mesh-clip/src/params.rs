//! Capping parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerances for [`crate::SurfaceCapper`].
///
/// # Presets
///
/// - [`CapParams::default()`]: exact caps, fallback fill, closure required
/// - [`CapParams::lenient()`]: returns whatever the fallback produced, even if
///   some edges remain open
///
/// # Example
///
/// ```
/// use mesh_clip::CapParams;
///
/// let params = CapParams::default().with_plane_epsilon(1e-6);
/// assert!(params.require_closed);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapParams {
    /// Vertices within this distance of a cutting plane are snapped onto it.
    ///
    /// Default: `1e-9`
    pub plane_epsilon: f64,

    /// Weld distance used when cleaning the capped fragment.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Largest boundary loop the fallback fill will close.
    ///
    /// Default: `usize::MAX`
    pub max_hole_edges: usize,

    /// Fail with [`crate::ClipError::OpenBoundary`] or
    /// [`crate::ClipError::NonManifold`] unless the fragment ends up a closed
    /// 2-manifold.
    ///
    /// Default: `true`
    pub require_closed: bool,
}

impl Default for CapParams {
    fn default() -> Self {
        Self {
            plane_epsilon: 1e-9,
            weld_epsilon: 1e-6,
            max_hole_edges: usize::MAX,
            require_closed: true,
        }
    }
}

impl CapParams {
    /// Accept fragments that stay open after the fallback.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            require_closed: false,
            ..Self::default()
        }
    }

    /// Set the plane snapping distance.
    #[must_use]
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon;
        self
    }

    /// Set the weld distance.
    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the fallback hole size limit.
    #[must_use]
    pub fn with_max_hole_edges(mut self, edges: usize) -> Self {
        self.max_hole_edges = edges;
        self
    }

    /// Require or relax closure.
    #[must_use]
    pub fn with_require_closed(mut self, required: bool) -> Self {
        self.require_closed = required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let p = CapParams::default();
        assert_eq!(p.max_hole_edges, usize::MAX);
        assert!(p.require_closed);

        let p = CapParams::lenient().with_weld_epsilon(0.01).with_max_hole_edges(64);
        assert!(!p.require_closed);
        assert_eq!(p.max_hole_edges, 64);
        assert!((p.weld_epsilon - 0.01).abs() < f64::EPSILON);
    }
}
