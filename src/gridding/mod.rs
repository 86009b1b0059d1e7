//! Layered and scattered gridding onto regular surfaces.

pub mod average_method;
pub mod points_method;
pub mod thickness_method;
pub mod zone_averaging;

use ndarray::{Array2, ArrayView2};

use crate::error::Result;
use crate::interpolation::{griddata, Method};
use crate::stream::{SharedStream, Stream};

pub use average_method::AverageGridder;
pub use points_method::PointsGridder;
pub use thickness_method::ThicknessGridder;
pub use zone_averaging::{ZoneAveraged, ZoneAverager};

/// Flattens a layer slice in column-major order (first index fastest).
pub(crate) fn column_major(layer: ArrayView2<f64>) -> Vec<f64> {
    layer.t().iter().copied().collect()
}

/// Mean zone id of a layer rounded half to even, `None` without any value.
pub(crate) fn rounded_mean<'a, I>(values: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (sum, count) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;
    if !mean.is_finite() {
        return None;
    }
    Some(mean.round_ties_even() as i64)
}

/// Linear interpolation of one layer onto the surface nodes with 0.0 outside
/// the hull. Degenerate layers are reported and give `None`.
pub(crate) fn interpolate_layer(
    stream: &SharedStream,
    path: &str,
    samples: (&[f64], &[f64], &[f64]),
    nodes: (&Array2<f64>, &Array2<f64>),
) -> Result<Option<Array2<f64>>> {
    let (xc, yc, zc) = samples;
    let (xi, yi) = nodes;
    match griddata(xc, yc, zc, xi.view(), yi.view(), Method::Linear, 0.0) {
        Ok(zi) => Ok(Some(zi)),
        Err(err) if err.is_degenerate() => {
            stream.stream_message(path, &err.to_string());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
