//! Planar validity checks for farm rings.
//!
//! A ring is checked in this order:
//!
//! 1. no coordinates at all → [`Validity::Empty`]
//! 2. any NaN/infinite coordinate → invalid
//! 3. fewer than three distinct vertices → invalid
//! 4. all vertices collinear → [`Validity::Empty`]
//! 5. a vertex visited twice → invalid (spike)
//! 6. non-adjacent edges crossing or overlapping → invalid
//! 7. vanishing planar area → [`Validity::Empty`]
//!
//! Interior rings get the same treatment except that an empty interior is
//! ignored.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Coord, Line, LineString, Polygon};

use super::types::InvalidReason;

/// Planar area in square degrees below which a ring is considered empty.
pub const MIN_POLYGON_AREA: f64 = 1e-14;

/// Outcome of a validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    /// No coordinates or zero area
    Empty,
    Invalid(InvalidReason),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Checks a polygon's rings.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Validity {
    match validate_ring(polygon.exterior()) {
        Validity::Valid => {}
        other => return other,
    }

    for interior in polygon.interiors() {
        match validate_ring(interior) {
            Validity::Valid | Validity::Empty => {}
            invalid => return invalid,
        }
    }

    Validity::Valid
}

fn validate_ring(ring: &LineString<f64>) -> Validity {
    if ring.0.is_empty() {
        return Validity::Empty;
    }
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Validity::Invalid(InvalidReason::NonFiniteCoordinate);
    }

    let vertices = open_vertices(ring);
    let distinct = count_distinct(&vertices);
    if distinct < 3 {
        return Validity::Invalid(InvalidReason::TooFewPoints { count: distinct });
    }

    if is_collinear(&vertices) {
        return Validity::Empty;
    }

    if has_spike(&vertices) {
        return Validity::Invalid(InvalidReason::Spike);
    }
    if has_self_intersection(&vertices) {
        return Validity::Invalid(InvalidReason::SelfIntersection);
    }

    let closed = Polygon::new(LineString::from(vertices), vec![]);
    if closed.unsigned_area() < MIN_POLYGON_AREA {
        return Validity::Empty;
    }

    Validity::Valid
}

/// True when every vertex lies on the line through the first vertex and the
/// vertex farthest from it.
fn is_collinear(vertices: &[Coord<f64>]) -> bool {
    let origin = vertices[0];
    let far = vertices.iter().copied().fold(origin, |best, c| {
        if distance_sq(origin, c) > distance_sq(origin, best) {
            c
        } else {
            best
        }
    });
    let (dx, dy) = (far.x - origin.x, far.y - origin.y);

    vertices.iter().all(|c| {
        let cross = dx * (c.y - origin.y) - dy * (c.x - origin.x);
        cross.abs() / 2.0 < MIN_POLYGON_AREA
    })
}

fn distance_sq(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// Ring vertices without the closing coordinate and without consecutive
/// repeats.
fn open_vertices(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut vertices: Vec<Coord<f64>> = ring.0.clone();
    vertices.dedup();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

fn count_distinct(vertices: &[Coord<f64>]) -> usize {
    let mut seen: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        if !seen.contains(vertex) {
            seen.push(*vertex);
        }
    }
    seen.len()
}

/// A vertex appearing at two non-adjacent positions.
fn has_spike(vertices: &[Coord<f64>]) -> bool {
    let n = vertices.len();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if vertices[i] == vertices[j] {
                return true;
            }
        }
    }
    false
}

/// Any pair of non-adjacent edges that cross or overlap.
///
/// Edges meeting only at a shared endpoint are a touch, not a crossing.
fn has_self_intersection(vertices: &[Coord<f64>]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let edge_i = Line::new(vertices[i], vertices[(i + 1) % n]);

        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let edge_j = Line::new(vertices[j], vertices[(j + 1) % n]);

            match line_intersection(edge_i, edge_j) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let on_i_end = intersection == edge_i.start || intersection == edge_i.end;
                    let on_j_end = intersection == edge_j.start || intersection == edge_j.end;
                    if !(on_i_end && on_j_end) {
                        return true;
                    }
                }
                Some(LineIntersection::Collinear { .. }) => return true,
                None => {}
            }
        }
    }

    false
}
