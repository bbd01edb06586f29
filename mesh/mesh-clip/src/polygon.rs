//! Planar polygon helpers for cap construction.

/// Twice the signed area of a closed 2D polygon. Positive when
/// counter-clockwise.
#[must_use]
pub fn signed_area2(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let [x0, y0] = points[i];
            let [x1, y1] = points[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum()
}

/// Even-odd point in polygon test.
#[must_use]
pub fn contains_point(polygon: &[[f64; 2]], p: [f64; 2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let [xi, yi] = polygon[i];
        let [xj, yj] = polygon[j];
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Positions of `ring` that are real corners.
///
/// A point is dropped when it continues the straight line from its
/// predecessor to its successor. Back-tracking spikes are kept.
#[must_use]
pub fn corner_indices(ring: &[[f64; 2]]) -> Vec<usize> {
    const TOLERANCE: f64 = 1e-10;
    let n = ring.len();
    (0..n)
        .filter(|&i| {
            let [px, py] = ring[(i + n - 1) % n];
            let [cx, cy] = ring[i];
            let [nx, ny] = ring[(i + 1) % n];
            let (ax, ay) = (cx - px, cy - py);
            let (bx, by) = (nx - cx, ny - cy);
            let cross = ax * by - ay * bx;
            let dot = ax * bx + ay * by;
            let scale = ax.hypot(ay) * bx.hypot(by);
            !(dot > 0.0 && cross.abs() <= TOLERANCE * scale)
        })
        .collect()
}

/// Triangulate an outer ring with holes.
///
/// Returns index triples into the concatenation `outer ++ holes[0] ++ ...`.
/// Triangle winding is whatever the triangulator produces; callers orient
/// the result themselves.
///
/// # Errors
///
/// Returns the triangulator's message if it rejects the input.
pub fn triangulate(outer: &[[f64; 2]], holes: &[&[[f64; 2]]]) -> Result<Vec<[usize; 3]>, String> {
    if outer.len() < 3 {
        return Ok(Vec::new());
    }
    if outer.len() == 3 && holes.is_empty() {
        return Ok(vec![[0, 1, 2]]);
    }

    let total = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut coords: Vec<f64> = Vec::with_capacity(total * 2);
    let mut hole_starts = Vec::with_capacity(holes.len());
    coords.extend(outer.iter().flatten());
    for hole in holes {
        hole_starts.push(coords.len() / 2);
        coords.extend(hole.iter().flatten());
    }

    let flat = earcutr::earcut(&coords, &hole_starts, 2).map_err(|e| format!("{e:?}"))?;
    Ok(flat.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
    const INNER: [[f64; 2]; 4] = [[1.0, 1.0], [1.0, 3.0], [3.0, 3.0], [3.0, 1.0]];

    fn area_of(points: &[[f64; 2]], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| signed_area2(&[points[t[0]], points[t[1]], points[t[2]]]).abs() / 2.0)
            .sum()
    }

    #[test]
    fn orientation_sign() {
        assert_relative_eq!(signed_area2(&SQUARE), 32.0);
        assert_relative_eq!(signed_area2(&INNER), -8.0);
    }

    #[test]
    fn point_in_square() {
        assert!(contains_point(&SQUARE, [2.0, 2.0]));
        assert!(!contains_point(&SQUARE, [5.0, 2.0]));
        assert!(!contains_point(&INNER, [0.5, 0.5]));
    }

    #[test]
    fn square_with_hole_covers_the_ring() {
        let tris = triangulate(&SQUARE, &[&INNER]).unwrap();
        let all: Vec<[f64; 2]> = SQUARE.iter().chain(INNER.iter()).copied().collect();
        assert_relative_eq!(area_of(&all, &tris), 12.0, epsilon = 1e-9);
        assert_eq!(tris.len(), 8);
    }

    #[test]
    fn concave_outline() {
        let l_shape = [
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ];
        let tris = triangulate(&l_shape, &[]).unwrap();
        assert_eq!(tris.len(), 4);
        assert_relative_eq!(area_of(&l_shape, &tris), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_points_are_not_corners() {
        let ring = [
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ];
        assert_eq!(corner_indices(&ring), vec![0, 2, 3, 5]);
    }

    #[test]
    fn too_few_points_gives_nothing() {
        assert!(triangulate(&[[0.0, 0.0], [1.0, 0.0]], &[]).unwrap().is_empty());
    }
}
