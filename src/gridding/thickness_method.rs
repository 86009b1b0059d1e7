use std::rc::Rc;
use ndarray::{Array2, Axis};

use crate::constants::{SIGNAL_EPSILON, UNDEF_LIMIT};
use crate::error::{GriddingError, Result};
use crate::gridding::zone_averaging::ZoneAverager;
use crate::gridding::{column_major, interpolate_layer, rounded_mean};
use crate::model::layer::{GriddingReport, SkipReason, SurfaceGridder};
use crate::model::property::GridProperty;
use crate::model::range::{LayerRange, ZoneRange};
use crate::model::surface::RegularSurface;
use crate::stream::{SharedStream, Stream};

/// Sums a thickness-like property over the selected layers, e.g. hydrocarbon
/// pore thickness. The layers may first be coarsened and collapsed per zone.
pub struct ThicknessGridder {
    x: GridProperty,
    y: GridProperty,
    thickness: GridProperty,
    zones: GridProperty,
    zone_range: Option<ZoneRange>,
    layer_range: Option<LayerRange>,
    zone_avg: bool,
    coarsen: usize,
    stream: SharedStream,
}

impl ThicknessGridder {
    pub fn new(x: GridProperty, y: GridProperty, thickness: GridProperty, zones: GridProperty) -> Self {
        Self {
            x,
            y,
            thickness,
            zones,
            zone_range: None,
            layer_range: None,
            zone_avg: false,
            coarsen: 1,
            stream: None,
        }
    }

    pub fn with_zone_range(mut self, zone_range: ZoneRange) -> Self {
        self.zone_range = Some(zone_range);
        self
    }

    pub fn with_layer_range(mut self, layer_range: LayerRange) -> Self {
        self.layer_range = Some(layer_range);
        self
    }

    pub fn with_zone_avg(mut self, zone_avg: bool) -> Self {
        self.zone_avg = zone_avg;
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

impl SurfaceGridder for ThicknessGridder {
    fn with_rerun_stream(self: Box<Self>, stream: Rc<dyn Stream>) -> Box<dyn SurfaceGridder> {
        Box::new(self.with_stream(stream))
    }

    fn name(&self) -> &'static str {
        "thickness"
    }

    fn grid(&self, surface: &mut RegularSurface) -> Result<GriddingReport> {
        let zone_range = self.zone_range.ok_or(GriddingError::MissingZoneRange)?;
        if self.layer_range.is_some() && self.zone_avg {
            return Err(GriddingError::ConflictingOptions("Cannot combine layer range and zone averaging".to_string()));
        }

        let averaged = ZoneAverager::new(zone_range)
            .with_coarsen(self.coarsen)
            .with_zone_avg(self.zone_avg)
            .with_stream(self.stream.clone())
            .aggregate(self.x.values(), self.y.values(), self.thickness.values(), self.zones.values())?;
        let nlay = averaged.nlay();
        let layer_range = match self.layer_range {
            Some(range) => range.clamp(nlay),
            None => LayerRange { min: 1, max: nlay as i64 },
        };

        let (xi, yi) = surface.get_xy_values();
        let mut zsum = Array2::<f64>::zeros(xi.raw_dim());
        let mut report = GriddingReport::default();

        for k in 1..=nlay {
            let k0 = k - 1;
            if !layer_range.contains(k as i64) {
                report.skip(k, SkipReason::OutsideLayerRange);
                continue;
            }
            self.stream.stream_message("thickness", &format!("Mapping for (combined) layer no {}", k));

            match rounded_mean(averaged.zone.index_axis(Axis(2), k0).iter()) {
                Some(zone) if zone_range.contains(zone) => {}
                _ => {
                    self.stream.stream_message("thickness", "SKIP (not active zone)");
                    report.skip(k, SkipReason::OutsideZoneRange);
                    continue;
                }
            }

            let thickness = averaged.weight.index_axis(Axis(2), k0);
            let propsum = thickness.sum();
            if propsum.abs() < SIGNAL_EPSILON {
                self.stream.stream_message("thickness", &format!("Too little signal, skip layer K = {}", k));
                report.skip(k, SkipReason::NoSignal);
                continue;
            }
            self.stream.stream_scalar(&format!("thickness/layer_{}/sum", k), propsum);

            let xc = column_major(averaged.x.index_axis(Axis(2), k0));
            let yc = column_major(averaged.y.index_axis(Axis(2), k0));
            let zc = column_major(thickness);
            let keep: Vec<usize> = (0..xc.len()).filter(|idx| xc[*idx] < UNDEF_LIMIT).collect();
            let x: Vec<f64> = keep.iter().map(|idx| xc[*idx]).collect();
            let y: Vec<f64> = keep.iter().map(|idx| yc[*idx]).collect();
            let z: Vec<f64> = keep.iter().map(|idx| zc[*idx]).collect();

            let path = format!("thickness/layer_{}", k);
            let Some(zi) = interpolate_layer(&self.stream, &path, (&x, &y, &z), (&xi, &yi))? else {
                report.skip(k, SkipReason::Degenerate);
                continue;
            };
            self.stream.stream_surface(&path, &zi);

            zsum = zsum + zi;
            report.process(k);
            self.stream.stream_scalar("thickness/mean", zsum.mean().unwrap_or(0.0));
        }

        surface.set_array(zsum)?;
        self.stream.stream_surface("thickness/surface", &surface.values().filled(f64::NAN));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use crate::model::grid::RegularBoxGrid;
    use crate::model::surface::SurfaceGeometry;
    use super::*;

    const DIMENSIONS: (usize, usize, usize) = (5, 5, 3);

    fn surface() -> RegularSurface {
        let geometry = SurfaceGeometry { ncol: 4, nrow: 4, xori: 0.5, yori: 0.5, xinc: 1.2, yinc: 1.2, rotation: 0.0 };
        RegularSurface::new(geometry).unwrap()
    }

    fn gridder(zone_of_layer: [i32; 3]) -> ThicknessGridder {
        let grid = RegularBoxGrid::new(DIMENSIONS, [0.0; 3], [1.0; 3]);
        let (x, y, _) = grid.cell_centers();
        let thickness = Array3::from_shape_fn(DIMENSIONS, |(i, j, k)| 0.1 * (i + j) as f64 + k as f64);
        let zones = Array3::from_shape_fn(DIMENSIONS, |(_, _, k)| zone_of_layer[k]);
        ThicknessGridder::new(x, y, GridProperty::new("hcpv", thickness), GridProperty::discrete("zone", zones))
    }

    #[test]
    fn test_missing_zone_range() {
        let err = gridder([1, 1, 1]).grid(&mut surface()).unwrap_err();
        assert!(matches!(err, GriddingError::MissingZoneRange));
    }

    #[test]
    fn test_conflicting_options() {
        let err = gridder([1, 1, 1])
            .with_zone_range(ZoneRange::new(1, 1).unwrap())
            .with_layer_range(LayerRange::new(1, 2).unwrap())
            .with_zone_avg(true)
            .grid(&mut surface())
            .unwrap_err();
        assert!(matches!(err, GriddingError::ConflictingOptions(_)));
    }

    #[test]
    fn test_sum_equals_sum_of_single_layers() {
        let zone_range = ZoneRange::new(1, 1).unwrap();
        let mut total = surface();
        let report = gridder([1, 1, 1])
            .with_zone_range(zone_range)
            .with_layer_range(LayerRange::new(1, 3).unwrap())
            .grid(&mut total)
            .unwrap();
        // The first layer carries no signal in cell (0, 0) only, so it is still used
        assert_eq!(report.processed, vec![1, 2, 3]);

        let mut summed = Array2::<f64>::zeros((4, 4));
        for k in 1..=3 {
            let mut single = surface();
            gridder([1, 1, 1])
                .with_zone_range(zone_range)
                .with_layer_range(LayerRange::new(k, k).unwrap())
                .grid(&mut single)
                .unwrap();
            summed = summed + &single.values().data;
        }
        for (t, s) in total.values().data.iter().zip(summed.iter()) {
            assert_relative_eq!(*t, *s, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_linear_thickness_field() {
        let mut surface = surface();
        gridder([1, 1, 1]).with_zone_range(ZoneRange::new(1, 1).unwrap()).grid(&mut surface).unwrap();
        let (xi, yi) = surface.get_xy_values();
        // Per layer 0.1 * (x + y - 1) + k, summed over k = 0, 1, 2
        let expected = 3.0 * 0.1 * (xi[[2, 1]] + yi[[2, 1]] - 1.0) + 3.0;
        assert_relative_eq!(surface.values().data[[2, 1]], expected, epsilon = 1e-9);
    }

    #[test]
    fn test_unmatched_zone_range_gives_zeros() {
        let mut surface = surface();
        let report = gridder([1, 1, 2]).with_zone_range(ZoneRange::new(7, 9).unwrap()).grid(&mut surface).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.skipped_for(SkipReason::OutsideZoneRange), vec![1, 2, 3]);
        assert!(surface.values().data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zone_filter_and_zone_avg() {
        let mut by_layer = surface();
        let report = gridder([1, 1, 2]).with_zone_range(ZoneRange::new(1, 1).unwrap()).grid(&mut by_layer).unwrap();
        assert_eq!(report.processed, vec![1, 2]);

        // Collapsing zone 1 sums its two layers before interpolation
        let mut collapsed = surface();
        let report = gridder([1, 1, 2])
            .with_zone_range(ZoneRange::new(1, 1).unwrap())
            .with_zone_avg(true)
            .grid(&mut collapsed)
            .unwrap();
        assert_eq!(report.processed, vec![1]);
        for (a, b) in by_layer.values().data.iter().zip(collapsed.values().data.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_layer_is_skipped() {
        let grid = RegularBoxGrid::new(DIMENSIONS, [0.0; 3], [1.0; 3]);
        let (x, y, _) = grid.cell_centers();
        let thickness = Array3::from_shape_fn(DIMENSIONS, |(_, _, k)| if k == 1 { 0.0 } else { 1.0 });
        let zones = GridProperty::discrete("zone", Array3::ones(DIMENSIONS));
        let mut surface = surface();
        let report = ThicknessGridder::new(x, y, GridProperty::new("hcpv", thickness), zones)
            .with_zone_range(ZoneRange::new(1, 1).unwrap())
            .with_coarsen(2)
            .grid(&mut surface)
            .unwrap();
        assert_eq!(report.skipped, vec![(2, SkipReason::NoSignal)]);
        assert_relative_eq!(surface.values().data[[1, 1]], 2.0, epsilon = 1e-9);
    }
}
