use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::interpolation::{InterpolationError, Method, Samples, ScatteredInterpolator};

type IndexedSample = GeomWithData<[f64; 2], usize>;

/// Value of the closest sample, defined over the whole plane.
pub struct NearestInterpolator {
    tree: RTree<IndexedSample>,
    values: Vec<f64>,
}

impl NearestInterpolator {
    pub fn new(samples: Samples) -> Result<Self, InterpolationError> {
        if samples.is_empty() {
            return Err(InterpolationError::Degenerate { samples: 0, method: Method::Nearest });
        }
        let indexed = samples
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| GeomWithData::new(*point, idx))
            .collect();
        Ok(NearestInterpolator { tree: RTree::bulk_load(indexed), values: samples.values })
    }
}

impl ScatteredInterpolator for NearestInterpolator {
    fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        self.tree.nearest_neighbor(&[x, y]).map(|sample| self.values[sample.data])
    }
}
