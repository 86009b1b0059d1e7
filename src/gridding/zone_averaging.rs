use ndarray::{s, Array3, Axis};

use crate::aggregating::Aggregator;
use crate::error::{GriddingError, Result};
use crate::masked::Masked3;
use crate::model::range::ZoneRange;
use crate::stream::{describe, SharedStream, Stream};

/// Pre-aggregated inputs for the layered gridders. Masked cells have been
/// replaced: coordinates by NaN, weight by 0 and zone by 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAveraged {
    pub x: Array3<f64>,
    pub y: Array3<f64>,
    pub weight: Array3<f64>,
    pub zone: Array3<f64>,
}

impl ZoneAveraged {
    pub fn nlay(&self) -> usize {
        self.x.dim().2
    }
}

/// Coarsens (nx, ny) by a stride and optionally collapses the layers to one
/// layer per zone id.
pub struct ZoneAverager {
    zone_range: ZoneRange,
    coarsen: usize,
    zone_avg: bool,
    stream: SharedStream,
}

impl ZoneAverager {
    pub fn new(zone_range: ZoneRange) -> Self {
        Self { zone_range, coarsen: 1, zone_avg: false, stream: None }
    }

    pub fn with_coarsen(mut self, coarsen: usize) -> Self {
        self.coarsen = coarsen;
        self
    }

    pub fn with_zone_avg(mut self, zone_avg: bool) -> Self {
        self.zone_avg = zone_avg;
        self
    }

    pub fn with_stream(mut self, stream: SharedStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn aggregate(&self, x: &Masked3, y: &Masked3, weight: &Masked3, zone: &Masked3) -> Result<ZoneAveraged> {
        if self.coarsen == 0 {
            return Err(GriddingError::InvalidStride(self.coarsen));
        }
        for other in [y, weight, zone] {
            if other.shape() != x.shape() {
                return Err(GriddingError::shape_mismatch(x.shape(), other.shape()));
            }
        }
        self.stream.stream_message("zone_averaging", &format!("Initial weight sum is {}", weight.sum()));

        let mut inputs = [x.clone(), y.clone(), weight.clone(), zone.clone()];
        if self.coarsen > 1 {
            self.stream.stream_message("zone_averaging", &format!("Coarsen is {}", self.coarsen));
            let c = self.coarsen as isize;
            for masked in inputs.iter_mut() {
                *masked = Masked3 {
                    data: masked.data.slice(s![..;c, ..;c, ..]).to_owned(),
                    mask: masked.mask.slice(s![..;c, ..;c, ..]).to_owned(),
                };
            }
        }

        if self.zone_avg {
            inputs = self.collapse_zones(&inputs);
        }
        let [x, y, weight, zone] = inputs;
        self.stream.stream_message("zone_averaging", &format!("Reduced shape is {:?}", x.shape()));
        self.stream.stream_message("zone_averaging", &format!("weight {}", describe(weight.data.iter())));

        Ok(ZoneAveraged {
            x: x.filled(f64::NAN),
            y: y.filled(f64::NAN),
            weight: weight.filled(0.0),
            zone: zone.filled(0.0),
        })
    }

    /// One layer per zone id in range: coordinates and zone are averaged,
    /// the weight is summed.
    fn collapse_zones(&self, inputs: &[Masked3; 4]) -> [Masked3; 4] {
        let (nx, ny, _) = inputs[0].data.dim();
        let nzones = self.zone_range.zones().count();
        let aggregators = [Aggregator::Average, Aggregator::Average, Aggregator::Sum, Aggregator::Average];
        let mut collapsed: [Masked3; 4] = std::array::from_fn(|_| Masked3 {
            data: Array3::zeros((nx, ny, nzones)),
            mask: Array3::from_elem((nx, ny, nzones), true),
        });
        let zone = &inputs[3].data;

        for (iz, zone_id) in self.zone_range.zones().enumerate() {
            let outside = zone.mapv(|z| z != zone_id as f64);
            for ((input, output), aggregator) in inputs.iter().zip(collapsed.iter_mut()).zip(aggregators) {
                let layer = aggregator.aggregate_layers(&input.clone().mask_also(&outside));
                output.data.index_axis_mut(Axis(2), iz).assign(&layer.data);
                output.mask.index_axis_mut(Axis(2), iz).assign(&layer.mask);
            }
            self.stream.stream_message(
                "zone_averaging",
                &format!("Zone {} weight sum is {}", zone_id, collapsed[2].data.index_axis(Axis(2), iz).sum()),
            );
        }
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use super::*;

    fn inputs() -> [Masked3; 4] {
        // 4 x 2 columns, 3 layers; layers 1-2 are zone 1, layer 3 zone 2
        let x = Array3::from_shape_fn((4, 2, 3), |(i, _, k)| i as f64 * 10.0 + k as f64);
        let y = Array3::from_shape_fn((4, 2, 3), |(_, j, _)| j as f64 * 10.0);
        let w = Array3::from_shape_fn((4, 2, 3), |(_, _, k)| (k + 1) as f64);
        let z = Array3::from_shape_fn((4, 2, 3), |(_, _, k)| if k < 2 { 1.0 } else { 2.0 });
        [Masked3::new(x), Masked3::new(y), Masked3::new(w), Masked3::new(z)]
    }

    #[test]
    fn test_identity() {
        let [x, y, w, z] = inputs();
        let result = ZoneAverager::new(ZoneRange::new(1, 2).unwrap()).aggregate(&x, &y, &w, &z).unwrap();
        assert_eq!(result.x, x.data);
        assert_eq!(result.y, y.data);
        assert_eq!(result.weight, w.data);
        assert_eq!(result.zone, z.data);
    }

    #[test]
    fn test_coarsen_keeps_layers() {
        let [x, y, w, z] = inputs();
        let result = ZoneAverager::new(ZoneRange::new(1, 2).unwrap())
            .with_coarsen(3)
            .aggregate(&x, &y, &w, &z)
            .unwrap();
        assert_eq!(result.x.dim(), (2, 1, 3));
        assert_relative_eq!(result.x[[1, 0, 2]], 32.0);
    }

    #[test]
    fn test_zone_average() {
        let [x, y, w, z] = inputs();
        let result = ZoneAverager::new(ZoneRange::new(1, 3).unwrap())
            .with_zone_avg(true)
            .aggregate(&x, &y, &w, &z)
            .unwrap();
        assert_eq!(result.nlay(), 3);
        // zone 1: x averaged over k = 0, 1 and weight summed
        assert_relative_eq!(result.x[[2, 0, 0]], 20.5);
        assert_relative_eq!(result.weight[[2, 0, 0]], 3.0);
        assert_relative_eq!(result.zone[[2, 0, 0]], 1.0);
        assert_relative_eq!(result.weight[[2, 0, 1]], 3.0);
        assert_relative_eq!(result.zone[[2, 0, 1]], 2.0);
        // zone 3 has no cells
        assert!(result.x[[0, 0, 2]].is_nan());
        assert_eq!(result.weight[[0, 0, 2]], 0.0);
        assert_eq!(result.zone[[0, 0, 2]], 0.0);
    }

    #[test]
    fn test_masked_cells_are_replaced() {
        let [x, y, w, z] = inputs();
        let mut inactive = Array3::from_elem((4, 2, 3), false);
        inactive[[0, 0, 0]] = true;
        let x = x.mask_also(&inactive);
        let w = w.mask_also(&inactive);
        let result = ZoneAverager::new(ZoneRange::all()).aggregate(&x, &y, &w, &z).unwrap();
        assert!(result.x[[0, 0, 0]].is_nan());
        assert_eq!(result.weight[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_shape_and_stride_errors() {
        let [x, y, w, _] = inputs();
        let zone = Masked3::new(Array3::zeros((4, 2, 2)));
        let averager = ZoneAverager::new(ZoneRange::all());
        assert!(matches!(averager.aggregate(&x, &y, &w, &zone), Err(GriddingError::ShapeMismatch { .. })));
        let averager = ZoneAverager::new(ZoneRange::all()).with_coarsen(0);
        assert!(matches!(averager.aggregate(&x, &y, &w, &x), Err(GriddingError::InvalidStride(0))));
    }
}
