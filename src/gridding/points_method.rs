use std::rc::Rc;

use crate::error::{GriddingError, Result};
use crate::interpolation::{griddata, Method};
use crate::model::layer::{GriddingReport, SkipReason, SurfaceGridder};
use crate::model::points::Points;
use crate::model::surface::RegularSurface;
use crate::stream::{describe, SharedStream, Stream};

/// Grids a scattered point set directly onto the surface nodes.
pub struct PointsGridder {
    points: Points,
    method: Method,
    coarsen: usize,
    stream: SharedStream,
}

impl PointsGridder {
    pub fn new(points: Points) -> Self {
        Self { points, method: Method::Linear, coarsen: 1, stream: None }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_coarsen(mut self, coarsen: usize) -> Self {
        self.coarsen = coarsen;
        self
    }

    pub fn with_stream(mut self, stream: Rc<dyn Stream>) -> Self {
        self.stream = Some(stream);
        self
    }
}

impl SurfaceGridder for PointsGridder {
    fn with_rerun_stream(self: Box<Self>, stream: Rc<dyn Stream>) -> Box<dyn SurfaceGridder> {
        Box::new(self.with_stream(stream))
    }

    fn name(&self) -> &'static str {
        "points"
    }

    fn grid(&self, surface: &mut RegularSurface) -> Result<GriddingReport> {
        let points = self.points.coarsened(self.coarsen)?;
        self.stream.stream_message("points", &format!("Length of xc array: {}", points.len()));

        let (xi, yi) = surface.get_xy_values();
        let mut report = GriddingReport::default();
        match griddata(&points.x, &points.y, &points.z, xi.view(), yi.view(), self.method, f64::NAN) {
            Ok(zi) => {
                surface.set_array(zi)?;
                report.process(1);
            }
            Err(err) if err.is_degenerate() => {
                self.stream.stream_message("points", &err.to_string());
                surface.clear();
                report.skip(1, SkipReason::Degenerate);
            }
            Err(err) => return Err(GriddingError::GriddingFailure(err.to_string())),
        }

        self.stream.stream_surface("points/surface", &surface.values().filled(f64::NAN));
        self.stream.stream_message(
            "points",
            &format!("Gridding points with {} ... DONE: {}", self.method, describe(surface.values().filled(f64::NAN).iter())),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use crate::model::surface::SurfaceGeometry;
    use crate::stream::MemoryStream;
    use super::*;

    fn surface() -> RegularSurface {
        let geometry = SurfaceGeometry { ncol: 5, nrow: 4, xori: 1.0, yori: 1.0, xinc: 2.0, yinc: 2.0, rotation: 0.0 };
        RegularSurface::new(geometry).unwrap()
    }

    #[test]
    fn test_nearest_reproduces_sample_at_node() {
        // One sample on every node, slightly offset, plus a frame around the map
        let mut surface = surface();
        let (xi, yi) = surface.get_xy_values();
        let mut x = vec![];
        let mut y = vec![];
        let mut z = vec![];
        for ((i, j), xv) in xi.indexed_iter() {
            x.push(xv + 0.1);
            y.push(yi[[i, j]] - 0.1);
            z.push((i * 10 + j) as f64);
        }
        for corner in [(-5.0, -5.0), (20.0, -5.0), (-5.0, 20.0), (20.0, 20.0)] {
            x.push(corner.0);
            y.push(corner.1);
            z.push(-1.0);
        }
        let gridder = PointsGridder::new(Points::new(x, y, z).unwrap()).with_method(Method::Nearest);
        let report = gridder.grid(&mut surface).unwrap();
        assert_eq!(report.processed, vec![1]);
        for ((i, j), value) in surface.values().data.indexed_iter() {
            assert_eq!(*value, (i * 10 + j) as f64);
        }
        assert_eq!(surface.values().count(), 20);
    }

    #[test]
    fn test_linear_outside_hull_is_missing() {
        let mut surface = surface();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut x = vec![];
        let mut y = vec![];
        for _ in 0..200 {
            x.push(rng.gen_range(0.0..6.0));
            y.push(rng.gen_range(0.0..6.0));
        }
        let z = x.iter().zip(&y).map(|(x, y)| 2.0 * x + y).collect();
        let gridder = PointsGridder::new(Points::new(x, y, z).unwrap()).with_coarsen(2);
        gridder.grid(&mut surface).unwrap();

        let values = surface.values();
        assert!(values.mask[[4, 3]]);
        assert!(!values.mask[[1, 1]]);
        assert_relative_eq!(values.data[[1, 1]], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_points_leave_surface_missing() {
        let memory = Rc::new(MemoryStream::default());
        let mut surface = surface();
        let points = Points::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let report = PointsGridder::new(points).with_stream(memory.clone()).grid(&mut surface).unwrap();
        assert_eq!(report.skipped, vec![(1, SkipReason::Degenerate)]);
        assert!(surface.values().is_all_masked());
        assert!(memory.contains("points", "Degenerate"));
    }

    #[test]
    fn test_malformed_points_fail() {
        let mut surface = surface();
        let points = Points { x: vec![0.0, 1.0, 0.0], y: vec![0.0, 0.0], z: vec![1.0, 2.0, 3.0] };
        let err = PointsGridder::new(points).grid(&mut surface).unwrap_err();
        assert!(matches!(err, GriddingError::GriddingFailure(_)));
    }
}
