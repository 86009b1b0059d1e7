use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

const BARYCENTRIC_TOLERANCE: f64 = 100.0 * f64::EPSILON;

/// Triangles with twice their area below this times the squared extent are dropped.
const DEGENERATE_AREA: f64 = 16.0 * f64::EPSILON;

type TriangleEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Delaunay triangulation of the sample points with an R-tree over the
/// triangle bounding boxes for point location.
pub(crate) struct Triangulation {
    pub(crate) points: Vec<[f64; 2]>,
    pub(crate) triangles: Vec<[usize; 3]>,
    /// Neighbouring triangle across the edge opposite vertex k.
    pub(crate) neighbors: Vec<[Option<usize>; 3]>,
    index: RTree<TriangleEnvelope>,
}

impl Triangulation {
    /// `None` when the points do not span a triangle (fewer than three,
    /// or all collinear).
    pub(crate) fn new(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let delaunay_points: Vec<delaunator::Point> =
            points.iter().map(|p| delaunator::Point { x: p[0], y: p[1] }).collect();
        let delaunay = delaunator::triangulate(&delaunay_points);
        if delaunay.triangles.is_empty() {
            return None;
        }

        // Hull runs of collinear points leave zero-area slivers behind
        let (mut min, mut max) = (points[0], points[0]);
        for p in points {
            min = [min[0].min(p[0]), min[1].min(p[1])];
            max = [max[0].max(p[0]), max[1].max(p[1])];
        }
        let extent = (max[0] - min[0]).max(max[1] - min[1]);
        let area_tolerance = DEGENERATE_AREA * extent * extent;

        let n_triangles = delaunay.triangles.len() / 3;
        let mut kept = vec![None; n_triangles];
        let mut triangles = Vec::with_capacity(n_triangles);
        for (t, slot) in kept.iter_mut().enumerate() {
            let tri = [delaunay.triangles[3 * t], delaunay.triangles[3 * t + 1], delaunay.triangles[3 * t + 2]];
            if orient2d(points[tri[0]], points[tri[1]], points[tri[2]]).abs() > area_tolerance {
                *slot = Some(triangles.len());
                triangles.push(tri);
            }
        }
        if triangles.is_empty() {
            return None;
        }

        // Half-edge 3t + j runs from vertex j to vertex j + 1, i.e. it is
        // opposite vertex (j + 2) % 3
        let mut neighbors = Vec::with_capacity(triangles.len());
        for t in (0..n_triangles).filter(|t| kept[*t].is_some()) {
            let mut across = [None; 3];
            for (k, slot) in across.iter_mut().enumerate() {
                let opposite = delaunay.halfedges[3 * t + (k + 1) % 3];
                if opposite != delaunator::EMPTY {
                    *slot = kept[opposite / 3];
                }
            }
            neighbors.push(across);
        }

        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(t, tri)| {
                let (mut min, mut max) = (points[tri[0]], points[tri[0]]);
                for v in &tri[1..] {
                    let p = points[*v];
                    min = [min[0].min(p[0]), min[1].min(p[1])];
                    max = [max[0].max(p[0]), max[1].max(p[1])];
                }
                GeomWithData::new(Rectangle::from_corners(min, max), t)
            })
            .collect();

        Some(Triangulation {
            points: points.to_vec(),
            triangles,
            neighbors,
            index: RTree::bulk_load(envelopes),
        })
    }

    /// Barycentric coordinates of (x, y) in triangle `t`, unclamped.
    pub(crate) fn barycentric(&self, t: usize, x: f64, y: f64) -> Option<[f64; 3]> {
        let [a, b, c] = self.triangles[t].map(|v| self.points[v]);
        let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
        if det == 0.0 {
            return None;
        }
        let l1 = ((b[1] - c[1]) * (x - c[0]) + (c[0] - b[0]) * (y - c[1])) / det;
        let l2 = ((c[1] - a[1]) * (x - c[0]) + (a[0] - c[0]) * (y - c[1])) / det;
        Some([l1, l2, 1.0 - l1 - l2])
    }

    /// Triangle containing (x, y) with its barycentric coordinates.
    pub(crate) fn locate(&self, x: f64, y: f64) -> Option<(usize, [f64; 3])> {
        let query = AABB::from_point([x, y]);
        self.index
            .locate_in_envelope_intersecting(&query)
            .filter_map(|candidate| {
                let t = candidate.data;
                self.barycentric(t, x, y).map(|b| (t, b))
            })
            .find(|(_, b)| b.iter().all(|l| *l >= -BARYCENTRIC_TOLERANCE))
    }

    pub(crate) fn centroid(&self, t: usize) -> [f64; 2] {
        let [a, b, c] = self.triangles[t].map(|v| self.points[v]);
        [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0]
    }
}

/// Twice the signed area of (a, b, c).
fn orient2d(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}
