//! Clough-Tocher C1 cubic interpolation.
//!
//! Each Delaunay triangle is split at its centroid into three cubic
//! Bernstein-Bezier patches. Vertex values and estimated vertex gradients fix
//! the control points along the outer edges, and the normal derivative across
//! each outer edge is constrained using the neighbouring triangle, which makes
//! the surface C1 everywhere inside the hull.

use crate::interpolation::triangulation::Triangulation;
use crate::interpolation::{InterpolationError, Method, Samples, ScatteredInterpolator};

pub struct CloughTocherInterpolator {
    triangulation: Triangulation,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
}

impl CloughTocherInterpolator {
    pub fn new(samples: Samples) -> Result<Self, InterpolationError> {
        let triangulation = Triangulation::new(&samples.points).ok_or(InterpolationError::Degenerate {
            samples: samples.len(),
            method: Method::Cubic,
        })?;
        let gradients = estimate_gradients(&triangulation, &samples.values);
        Ok(CloughTocherInterpolator { triangulation, values: samples.values, gradients })
    }

    /// Edge shape factor for the edge opposite vertex `k` of triangle `t`.
    fn edge_factor(&self, t: usize, k: usize) -> f64 {
        let Some(neighbor) = self.triangulation.neighbors[t][k] else {
            return -0.5;
        };
        let centroid = self.triangulation.centroid(neighbor);
        let Some(c) = self.triangulation.barycentric(t, centroid[0], centroid[1]) else {
            return -0.5;
        };
        let (a, b) = match k {
            0 => (c[2], c[1]),
            1 => (c[0], c[2]),
            _ => (c[1], c[0]),
        };
        let denominator = 2.0 - 3.0 * a - 3.0 * b;
        if denominator == 0.0 {
            return -0.5;
        }
        (2.0 * a + b - 1.0) / denominator
    }

    fn patch_value(&self, t: usize, b: [f64; 3]) -> f64 {
        let vertices = self.triangulation.triangles[t];
        let [p1, p2, p3] = vertices.map(|v| self.triangulation.points[v]);
        let [f1, f2, f3] = vertices.map(|v| self.values[v]);
        let [g1, g2, g3] = vertices.map(|v| self.gradients[v]);

        let e12 = [p2[0] - p1[0], p2[1] - p1[1]];
        let e23 = [p3[0] - p2[0], p3[1] - p2[1]];
        let e31 = [p1[0] - p3[0], p1[1] - p3[1]];
        let dot = |g: [f64; 2], e: [f64; 2]| g[0] * e[0] + g[1] * e[1];

        let df12 = dot(g1, e12);
        let df21 = -dot(g2, e12);
        let df23 = dot(g2, e23);
        let df32 = -dot(g3, e23);
        let df31 = dot(g3, e31);
        let df13 = -dot(g1, e31);

        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        let g = [self.edge_factor(t, 0), self.edge_factor(t, 1), self.edge_factor(t, 2)];

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Coordinates inside the sub-triangle that holds the point
        let min = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - min;
        let b2 = b[1] - min;
        let b3 = b[2] - min;
        let b4 = 3.0 * min;

        b1.powi(3) * c3000
            + 3.0 * b1.powi(2) * b2 * c2100
            + 3.0 * b1.powi(2) * b3 * c2010
            + 3.0 * b1.powi(2) * b4 * c2001
            + 3.0 * b1 * b2.powi(2) * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3.powi(2) * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4.powi(2) * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2.powi(2) * b3 * c0210
            + 3.0 * b2.powi(2) * b4 * c0201
            + 3.0 * b2 * b3.powi(2) * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4.powi(2) * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3.powi(2) * b4 * c0021
            + 3.0 * b3 * b4.powi(2) * c0012
            + b4.powi(3) * c0003
    }
}

impl ScatteredInterpolator for CloughTocherInterpolator {
    fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        let (t, b) = self.triangulation.locate(x, y)?;
        Some(self.patch_value(t, b))
    }
}

/// Vertex gradients from an inverse-distance weighted least squares plane
/// through the Delaunay neighbours. Exact for linear data.
fn estimate_gradients(triangulation: &Triangulation, values: &[f64]) -> Vec<[f64; 2]> {
    let n = triangulation.points.len();
    let mut neighbors: Vec<Vec<usize>> = vec![vec![]; n];
    for tri in &triangulation.triangles {
        for (i, &v) in tri.iter().enumerate() {
            for (j, &w) in tri.iter().enumerate() {
                if i != j && !neighbors[v].contains(&w) {
                    neighbors[v].push(w);
                }
            }
        }
    }

    neighbors
        .iter()
        .enumerate()
        .map(|(v, adjacent)| {
            let origin = triangulation.points[v];
            let (mut sxx, mut sxy, mut syy, mut sxf, mut syf) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for &w in adjacent {
                let dx = triangulation.points[w][0] - origin[0];
                let dy = triangulation.points[w][1] - origin[1];
                let df = values[w] - values[v];
                let distance2 = dx * dx + dy * dy;
                if distance2 == 0.0 {
                    continue;
                }
                let weight = 1.0 / distance2;
                sxx += weight * dx * dx;
                sxy += weight * dx * dy;
                syy += weight * dy * dy;
                sxf += weight * dx * df;
                syf += weight * dy * df;
            }
            let det = sxx * syy - sxy * sxy;
            if det.abs() <= f64::EPSILON * (sxx * syy).abs() || det == 0.0 {
                return [0.0, 0.0];
            }
            [(syy * sxf - sxy * syf) / det, (sxx * syf - sxy * sxf) / det]
        })
        .collect()
}
