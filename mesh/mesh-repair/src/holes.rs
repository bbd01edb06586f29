//! Hole detection and filling.
//!
//! A hole is a closed loop of open edges. Loops are traced against the
//! direction their faces use, so triangles built along a loop already have
//! the winding of the surrounding surface and the filled mesh stays
//! consistently oriented.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::{fill_holes, MeshAdjacency};
//!
//! let mut mesh = unit_cube();
//! mesh.faces.truncate(10); // drop the +x side
//!
//! let filled = fill_holes(&mut mesh, usize::MAX).unwrap_or(0);
//! assert_eq!(filled, 1);
//! assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
//! ```

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Triangle, Vector3};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::adjacency::MeshAdjacency;
use crate::error::{RepairError, RepairResult};

/// A closed loop of open edges.
///
/// `vertices` is ordered so that a face `[v[i], v[i+1], c]` would be wound like
/// its neighbours across edge `v[i]`-`v[i+1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices around the loop.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Directed edges joined head to tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeChains {
    /// Chains that came back to their first vertex, as vertex sequences.
    /// A closed chain of `n` edges has `n` vertices.
    pub closed: Vec<Vec<u32>>,
    /// Chains that ran out of edges before closing.
    pub open: usize,
}

/// Join directed edges `(a, b)` into chains, each edge used once.
///
/// Chains start from the edges in the order given. Where several edges leave
/// one vertex, the first unused one is followed.
///
/// ```
/// use mesh_repair::chain_edges;
///
/// let chains = chain_edges(&[(0, 1), (1, 2), (2, 0), (5, 6)]);
/// assert_eq!(chains.closed, vec![vec![0, 1, 2]]);
/// assert_eq!(chains.open, 1);
/// ```
#[must_use]
pub fn chain_edges(edges: &[(u32, u32)]) -> EdgeChains {
    let mut successors: HashMap<u32, SmallVec<[u32; 2]>> = HashMap::new();
    for &(a, b) in edges {
        successors.entry(a).or_default().push(b);
    }

    let mut chains = EdgeChains::default();
    for &(start, first) in edges {
        if !take_edge(&mut successors, start, first) {
            continue;
        }

        let mut vertices = vec![start];
        let mut current = first;
        let closed = loop {
            if current == start {
                break true;
            }
            vertices.push(current);
            match take_any(&mut successors, current) {
                Some(next) => current = next,
                None => break false,
            }
        };

        if closed {
            chains.closed.push(vertices);
        } else {
            chains.open += 1;
        }
    }
    chains
}

/// Trace every closed boundary loop of `mesh`.
///
/// Chains of open edges that do not close up are logged and skipped.
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::{detect_holes, MeshAdjacency};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let holes = detect_holes(&mesh, &MeshAdjacency::build(&mesh.faces));
/// assert_eq!(holes.len(), 1);
/// assert_eq!(holes[0].vertices, vec![0, 2, 1]);
/// ```
#[must_use]
pub fn detect_holes(mesh: &IndexedMesh, adjacency: &MeshAdjacency) -> Vec<BoundaryLoop> {
    // Reverse each open half-edge: the fill must traverse it the other way.
    let mut reversed: Vec<(u32, u32)> = adjacency
        .boundary_half_edges(&mesh.faces)
        .into_iter()
        .map(|(a, b)| (b, a))
        .collect();
    reversed.sort_unstable();

    if reversed.is_empty() {
        return Vec::new();
    }

    let chains = chain_edges(&reversed);
    if chains.open > 0 {
        warn!(
            open_chains = chains.open,
            "Boundary chains that do not close were skipped"
        );
    }
    let loops: Vec<BoundaryLoop> = chains
        .closed
        .into_iter()
        .filter(|vertices| vertices.len() >= 3)
        .map(|vertices| BoundaryLoop { vertices })
        .collect();
    debug!(
        holes = loops.len(),
        boundary_edges = reversed.len(),
        "Detected boundary loops"
    );

    loops
}

fn take_edge(successors: &mut HashMap<u32, SmallVec<[u32; 2]>>, from: u32, to: u32) -> bool {
    let Some(list) = successors.get_mut(&from) else {
        return false;
    };
    match list.iter().position(|&v| v == to) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

fn take_any(successors: &mut HashMap<u32, SmallVec<[u32; 2]>>, from: u32) -> Option<u32> {
    let list = successors.get_mut(&from)?;
    if list.is_empty() {
        None
    } else {
        Some(list.remove(0))
    }
}

/// Triangulate one hole by ear clipping, falling back to a fan if clipping
/// gets stuck.
///
/// Triangles follow the loop order, so they match the surrounding winding.
///
/// # Errors
///
/// Returns [`RepairError::InvalidIndex`] if the loop names a missing vertex.
pub fn fill_hole_ear_clipping(
    mesh: &IndexedMesh,
    boundary: &BoundaryLoop,
) -> RepairResult<Vec<[u32; 3]>> {
    let ids = &boundary.vertices;
    let n = ids.len();
    if n < 3 {
        return Ok(Vec::new());
    }

    let positions = ids
        .iter()
        .map(|&idx| {
            mesh.vertices
                .get(idx as usize)
                .map(|v| v.position)
                .ok_or(RepairError::InvalidIndex {
                    index: idx,
                    vertex_count: mesh.vertices.len(),
                })
        })
        .collect::<RepairResult<Vec<Point3<f64>>>>()?;

    let normal = loop_normal(&positions);
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(ids, &positions, &remaining, [prev, remaining[i], next], &normal)
        });

        let Some(i) = ear else {
            debug!(
                remaining = remaining.len(),
                "Ear clipping stuck, finishing with a fan"
            );
            break;
        };

        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push([ids[prev], ids[remaining[i]], ids[next]]);
        remaining.remove(i);
    }

    for w in 1..remaining.len() - 1 {
        triangles.push([ids[remaining[0]], ids[remaining[w]], ids[remaining[w + 1]]]);
    }

    Ok(triangles)
}

/// Newell normal of a polygon, or +Z if it has no area.
fn loop_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    let n = positions.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let p = positions[i];
        let q = positions[(i + 1) % n];
        normal.x += (p.y - q.y) * (p.z + q.z);
        normal.y += (p.z - q.z) * (p.x + q.x);
        normal.z += (p.x - q.x) * (p.y + q.y);
    }
    normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

fn is_ear(
    ids: &[u32],
    positions: &[Point3<f64>],
    remaining: &[usize],
    [prev, curr, next]: [usize; 3],
    normal: &Vector3<f64>,
) -> bool {
    let tri = Triangle::new(positions[prev], positions[curr], positions[next]);
    let Some(tri_normal) = tri.normal() else {
        return false;
    };
    if tri_normal.dot(normal) <= 0.0 {
        return false;
    }

    let corners = [ids[prev], ids[curr], ids[next]];
    !remaining.iter().any(|&idx| {
        !corners.contains(&ids[idx]) && point_in_triangle(&positions[idx], &tri, normal)
    })
}

/// Closed containment test in the plane most orthogonal to `normal`.
fn point_in_triangle(p: &Point3<f64>, tri: &Triangle, normal: &Vector3<f64>) -> bool {
    let drop = normal.iamax();
    let (u, v) = match drop {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };
    let flat = |q: &Point3<f64>| (q[u], q[v]);
    let (p, a, b, c) = (flat(p), flat(&tri.v0), flat(&tri.v1), flat(&tri.v2));

    let side = |s: (f64, f64), e0: (f64, f64), e1: (f64, f64)| {
        (e1.0 - e0.0) * (s.1 - e0.1) - (e1.1 - e0.1) * (s.0 - e0.0)
    };
    let d1 = side(p, a, b);
    let d2 = side(p, b, c);
    let d3 = side(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Fill every hole with at most `max_hole_edges` edges.
///
/// Returns the number of holes filled. Pass `usize::MAX` to close holes of
/// any size.
///
/// # Errors
///
/// Returns an error if a loop refers to a missing vertex or yields no
/// triangles.
pub fn fill_holes(mesh: &mut IndexedMesh, max_hole_edges: usize) -> RepairResult<usize> {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let holes = detect_holes(mesh, &adjacency);

    let mut filled = 0;
    for hole in &holes {
        if hole.edge_count() > max_hole_edges {
            warn!(
                edges = hole.edge_count(),
                max_hole_edges, "Skipping hole above size limit"
            );
            continue;
        }

        let triangles = fill_hole_ear_clipping(mesh, hole)?;
        if triangles.is_empty() {
            return Err(RepairError::HoleFillFailed {
                reason: format!("no triangles for a hole with {} edges", hole.edge_count()),
            });
        }
        mesh.faces.extend(triangles);
        filled += 1;
    }

    if filled > 0 {
        debug!(filled, "Filled holes");
    }
    Ok(filled)
}
