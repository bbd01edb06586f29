//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately; each face is three indices into
/// `vertices`, wound counter-clockwise when viewed from outside.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with room for the given counts.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Assemble a mesh from existing buffers.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Build a mesh from flat `[x, y, z, ...]` positions and `[a, b, c, ...]` indices.
    ///
    /// Returns an empty mesh if either slice length is not a multiple of three.
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Self { vertices, faces }
    }

    /// Position of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Callers index with face entries that
    /// have already been validated.
    #[inline]
    #[must_use]
    pub fn position(&self, index: u32) -> Point3<f64> {
        self.vertices[index as usize].position
    }

    /// True if every face index refers to an existing vertex.
    #[must_use]
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n))
    }

    /// Signed enclosed volume, by summing origin tetrahedra.
    ///
    /// Positive for a closed mesh wound outward, negative when inside out,
    /// meaningless for open meshes. Faces with bad indices are ignored.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Absolute enclosed volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// True if the signed volume is negative.
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Sum of triangle areas.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Reverse every face and negate stored normals.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            if let Some(n) = vertex.normal.as_mut() {
                *n = -*n;
            }
        }
    }

    /// Append `other`, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().cloned());
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(face_index)?;
        Some(Triangle::new(
            self.vertices.get(a as usize)?.position,
            self.vertices.get(b as usize)?.position,
            self.vertices.get(c as usize)?.position,
        ))
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Closed, outward-wound box mesh spanning `aabb`.
///
/// Eight shared corners, two triangles per side.
#[must_use]
pub fn box_mesh(aabb: &Aabb) -> IndexedMesh {
    let vertices = aabb.corners().into_iter().map(Vertex::new).collect();

    // Corner i has x = i & 1, y = i & 2, z = i & 4.
    let faces = vec![
        // -z
        [0, 2, 3],
        [0, 3, 1],
        // +z
        [4, 5, 7],
        [4, 7, 6],
        // -y
        [0, 1, 5],
        [0, 5, 4],
        // +y
        [2, 6, 7],
        [2, 7, 3],
        // -x
        [0, 4, 6],
        [0, 6, 2],
        // +x
        [1, 3, 7],
        [1, 7, 5],
    ];

    IndexedMesh::from_parts(vertices, faces)
}

/// Box mesh over the unit cube `[0, 1]^3`.
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    box_mesh(&Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)))
}
