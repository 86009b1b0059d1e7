use std::rc::Rc;
use ndarray::{s, Array2, Axis, Zip};

use crate::constants::{UNDEF_LIMIT, WEIGHT_EPSILON};
use crate::error::{GriddingError, Result};
use crate::gridding::{column_major, interpolate_layer, rounded_mean};
use crate::masked::Masked2;
use crate::model::layer::{GriddingReport, SkipReason, SurfaceGridder};
use crate::model::property::GridProperty;
use crate::model::range::{LayerRange, ZoneRange};
use crate::model::surface::RegularSurface;
use crate::stream::{describe, SharedStream, Stream};

/// Weighted average of a 3D property onto a surface, layer by layer.
/// Each layer contributes its interpolated value * weight and weight.
pub struct AverageGridder {
    x: GridProperty,
    y: GridProperty,
    value: GridProperty,
    weight: GridProperty,
    layer_range: LayerRange,
    zones: Option<GridProperty>,
    zone_range: ZoneRange,
    sampling: usize,
    truncate_le: Option<f64>,
    stream: SharedStream,
}

impl AverageGridder {
    pub fn new(x: GridProperty, y: GridProperty, value: GridProperty, weight: GridProperty) -> Self {
        Self {
            x,
            y,
            value,
            weight,
            layer_range: LayerRange::all(),
            zones: None,
            zone_range: ZoneRange::all(),
            sampling: 1,
            truncate_le: None,
            stream: None,
        }
    }

    pub fn with_layer_range(mut self, layer_range: LayerRange) -> Self {
        self.layer_range = layer_range;
        self
    }

    /// Enables the zone filter.
    pub fn with_zones(mut self, zones: GridProperty) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn with_zone_range(mut self, zone_range: ZoneRange) -> Self {
        self.zone_range = zone_range;
        self
    }

    pub fn with_sampling(mut self, sampling: usize) -> Self {
        self.sampling = sampling;
        self
    }

    /// Result values below `truncate_le` become missing.
    pub fn with_truncate_le(mut self, truncate_le: f64) -> Self {
        self.truncate_le = Some(truncate_le);
        self
    }

    pub fn with_stream(mut self, stream: Rc<dyn Stream>) -> Self {
        self.stream = Some(stream);
        self
    }

    fn check_inputs(&self) -> Result<()> {
        if self.sampling == 0 {
            return Err(GriddingError::InvalidStride(self.sampling));
        }
        let dimensions = self.x.dimensions();
        for prop in [&self.y, &self.value, &self.weight].into_iter().chain(self.zones.as_ref()) {
            prop.check_dimensions(dimensions)?;
        }
        Ok(())
    }

    /// `Some(zone)` when the layer's mean zone lies outside the zone range.
    fn zone_outside(&self, k0: usize) -> Option<Option<i64>> {
        let zones = self.zones.as_ref()?;
        let sf = self.sampling as isize;
        let layer = zones.values().data.slice(s![..;sf, ..;sf, k0]);
        let mask = zones.values().mask.slice(s![..;sf, ..;sf, k0]);
        let active = layer.iter().zip(mask.iter()).filter(|(_, m)| !**m).map(|(v, _)| v);
        match rounded_mean(active) {
            Some(zone) if self.zone_range.contains(zone) => None,
            zone => Some(zone),
        }
    }
}

impl SurfaceGridder for AverageGridder {
    fn with_rerun_stream(self: Box<Self>, stream: Rc<dyn Stream>) -> Box<dyn SurfaceGridder> {
        Box::new(self.with_stream(stream))
    }

    fn name(&self) -> &'static str {
        "average"
    }

    fn grid(&self, surface: &mut RegularSurface) -> Result<GriddingReport> {
        self.check_inputs()?;
        let (_, _, nlay) = self.x.dimensions();
        self.stream.stream_message(
            "average",
            &format!("Layer from {} to {}, zone from {} to {}", self.layer_range.min, self.layer_range.max, self.zone_range.min, self.zone_range.max),
        );

        let xprop = self.x.undef_filled();
        let yprop = self.y.undef_filled();
        let mprop = self.value.undef_filled();
        // No weight where the value is undefined
        let mut dzprop = self.weight.values().filled(0.0);
        Zip::from(&mut dzprop).and(&mprop).for_each(|dz, &m| {
            if m > UNDEF_LIMIT {
                *dz = 0.0;
            }
        });

        let (xi, yi) = surface.get_xy_values();
        let mut wsum = Array2::<f64>::zeros(xi.raw_dim());
        let mut dzsum = Array2::<f64>::zeros(xi.raw_dim());
        let mut report = GriddingReport::default();

        for k in 1..=nlay {
            let k0 = k - 1;
            if !self.layer_range.contains(k as i64) {
                self.stream.stream_message("average", &format!("SKIP LAYER {}", k));
                report.skip(k, SkipReason::OutsideLayerRange);
                continue;
            }
            if let Some(zone) = self.zone_outside(k0) {
                self.stream.stream_message("average", &format!("SKIP LAYER {} (zone {:?})", k, zone));
                report.skip(k, SkipReason::OutsideZoneRange);
                continue;
            }
            self.stream.stream_message("average", &format!("USE LAYER {}", k));

            let xc = column_major(xprop.index_axis(Axis(2), k0));
            let yc = column_major(yprop.index_axis(Axis(2), k0));
            let zv = column_major(mprop.index_axis(Axis(2), k0));
            let dz = column_major(dzprop.index_axis(Axis(2), k0));

            let mut xs = vec![];
            let mut ys = vec![];
            let mut zvdz = vec![];
            let mut dzs = vec![];
            for idx in (0..xc.len()).step_by(self.sampling) {
                if xc[idx] >= UNDEF_LIMIT {
                    continue;
                }
                xs.push(xc[idx]);
                ys.push(yc[idx]);
                zvdz.push(zv[idx] * dz[idx]);
                dzs.push(dz[idx]);
            }

            let path = format!("average/layer_{}", k);
            let Some(zvdzi) = interpolate_layer(&self.stream, &path, (&xs, &ys, &zvdz), (&xi, &yi))? else {
                report.skip(k, SkipReason::Degenerate);
                continue;
            };
            let Some(dzi) = interpolate_layer(&self.stream, &path, (&xs, &ys, &dzs), (&xi, &yi))? else {
                report.skip(k, SkipReason::Degenerate);
                continue;
            };
            self.stream.stream_surface(&path, &dzi);

            wsum = wsum + zvdzi;
            dzsum = dzsum + dzi;
            report.process(k);
        }

        let no_weight = dzsum.mapv(|dz| dz == 0.0);
        let averaged = Zip::from(&wsum)
            .and(&dzsum)
            .map_collect(|&w, &dz| w / if dz == 0.0 { WEIGHT_EPSILON } else { dz });
        let mut values = Masked2::masked_invalid(averaged).mask_also(&no_weight);
        if let Some(truncate_le) = self.truncate_le {
            values = values.masked_less(truncate_le);
        }
        self.stream.stream_message("average", &format!("Result {}", describe(values.filled(f64::NAN).iter())));

        surface.set_values(values)?;
        self.stream.stream_surface("average/surface", &surface.values().filled(f64::NAN));
        Ok(report)
    }
}
