use std::fs::File;
use std::io::{Read, Seek, Write};
use anyhow::{Context, Result};
use ndarray::{Array1, Array3};
use ndarray_npy::{NpzReader, NpzWriter};
use serde::Deserialize;

use crate::gridding::{AverageGridder, PointsGridder, ThicknessGridder};
use crate::interpolation::Method;
use crate::model::layer::SurfaceGridder;
use crate::model::points::Points;
use crate::model::property::GridProperty;
use crate::model::range::{LayerRange, ZoneRange};
use crate::model::surface::{RegularSurface, SurfaceGeometry};

fn default_method() -> String {
    "linear".to_string()
}

fn default_stride() -> usize {
    1
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Points {
        #[serde(default = "default_method")]
        method: String,
        #[serde(default = "default_stride")]
        coarsen: usize,
    },
    Average {
        layer_range: Option<LayerRange>,
        zone_range: Option<ZoneRange>,
        #[serde(default = "default_stride")]
        sampling: usize,
        truncate_le: Option<f64>,
    },
    Thickness {
        zone_range: Option<ZoneRange>,
        layer_range: Option<LayerRange>,
        #[serde(default)]
        zone_avg: bool,
        #[serde(default = "default_stride")]
        coarsen: usize,
    },
}

/// A gridding job: the target surface and what to put on it.
///
/// Input arrays come from an npz archive, all float64: `x`, `y`, `z` for
/// points; `x`, `y`, `value`, `weight` and `zone` of shape (nx, ny, nz) for
/// the layered operations, where the thickness operation sums `value`. An
/// optional `actnum` array marks inactive cells with 0.
#[derive(Clone, Debug, Deserialize)]
pub struct Template {
    pub surface: SurfaceGeometry,
    pub operation: Operation,
}

impl Template {
    pub fn from_file(filename: &str) -> Result<Self> {
        let mut contents = String::new();
        File::open(filename)
            .with_context(|| format!("Could not open job file {}", filename))?
            .read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn gridder(&self, input: &str) -> Result<Box<dyn SurfaceGridder>> {
        let file = File::open(input).with_context(|| format!("Could not open input arrays {}", input))?;
        let mut npz = NpzReader::new(file)?;
        self.gridder_from(&mut npz)
    }

    pub fn gridder_from<R: Read + Seek>(&self, npz: &mut NpzReader<R>) -> Result<Box<dyn SurfaceGridder>> {
        let gridder: Box<dyn SurfaceGridder> = match &self.operation {
            Operation::Points { method, coarsen } => {
                let method: Method = method.parse()?;
                let x: Array1<f64> = npz.by_name("x.npy")?;
                let y: Array1<f64> = npz.by_name("y.npy")?;
                let z: Array1<f64> = npz.by_name("z.npy")?;
                let points = Points::new(x.to_vec(), y.to_vec(), z.to_vec())?;
                Box::new(PointsGridder::new(points).with_method(method).with_coarsen(*coarsen))
            }
            Operation::Average { layer_range, zone_range, sampling, truncate_le } => {
                let properties = CellArrays::read(npz)?;
                let mut gridder = AverageGridder::new(
                    properties.property("x", properties.x.clone())?,
                    properties.property("y", properties.y.clone())?,
                    properties.property("value", properties.value.clone())?,
                    properties.property("weight", properties.weight.clone())?,
                )
                .with_sampling(*sampling);
                if let Some(zone) = &properties.zone {
                    gridder = gridder.with_zones(properties.zones(zone)?);
                }
                if let Some(layer_range) = layer_range {
                    gridder = gridder.with_layer_range(*layer_range);
                }
                if let Some(zone_range) = zone_range {
                    gridder = gridder.with_zone_range(*zone_range);
                }
                if let Some(truncate_le) = truncate_le {
                    gridder = gridder.with_truncate_le(*truncate_le);
                }
                Box::new(gridder)
            }
            Operation::Thickness { zone_range, layer_range, zone_avg, coarsen } => {
                let properties = CellArrays::read(npz)?;
                let zone = properties.zone.as_ref().context("The thickness operation needs a zone array")?;
                let mut gridder = ThicknessGridder::new(
                    properties.property("x", properties.x.clone())?,
                    properties.property("y", properties.y.clone())?,
                    properties.property("value", properties.value.clone())?,
                    properties.zones(zone)?,
                )
                .with_zone_avg(*zone_avg)
                .with_coarsen(*coarsen);
                if let Some(zone_range) = zone_range {
                    gridder = gridder.with_zone_range(*zone_range);
                }
                if let Some(layer_range) = layer_range {
                    gridder = gridder.with_layer_range(*layer_range);
                }
                Box::new(gridder)
            }
        };
        Ok(gridder)
    }
}

/// Raw (nx, ny, nz) arrays of a layered job.
struct CellArrays {
    x: Array3<f64>,
    y: Array3<f64>,
    value: Array3<f64>,
    weight: Array3<f64>,
    zone: Option<Array3<f64>>,
    inactive: Option<Array3<bool>>,
}

impl CellArrays {
    fn read<R: Read + Seek>(npz: &mut NpzReader<R>) -> Result<Self> {
        let names = npz.names()?;
        let has = |name: &str| names.iter().any(|n| n == name);
        let zone = if has("zone.npy") { Some(npz.by_name("zone.npy")?) } else { None };
        let inactive = if has("actnum.npy") {
            let actnum: Array3<f64> = npz.by_name("actnum.npy")?;
            Some(actnum.mapv(|a| a == 0.0))
        } else {
            None
        };
        let weight = if has("weight.npy") {
            npz.by_name("weight.npy")?
        } else {
            let x: Array3<f64> = npz.by_name("x.npy")?;
            Array3::ones(x.raw_dim())
        };
        Ok(Self {
            x: npz.by_name("x.npy")?,
            y: npz.by_name("y.npy")?,
            value: npz.by_name("value.npy")?,
            weight,
            zone,
            inactive,
        })
    }

    fn property(&self, name: &str, values: Array3<f64>) -> Result<GridProperty> {
        let property = GridProperty::new(name, values);
        Ok(match &self.inactive {
            Some(inactive) => property.with_inactive(inactive)?,
            None => property,
        })
    }

    fn zones(&self, zone: &Array3<f64>) -> Result<GridProperty> {
        let property = GridProperty::discrete("zone", zone.mapv(|z| z.round() as i32));
        Ok(match &self.inactive {
            Some(inactive) => property.with_inactive(inactive)?,
            None => property,
        })
    }
}

/// Writes the surface values (missing nodes as NaN) and the mask to an npz archive.
pub fn write_surface(surface: &RegularSurface, filename: &str) -> Result<()> {
    let file = File::create(filename).with_context(|| format!("Could not create {}", filename))?;
    write_surface_to(surface, file)?;
    Ok(())
}

pub fn write_surface_to<W: Write + Seek>(surface: &RegularSurface, writer: W) -> Result<W> {
    let mut npz = NpzWriter::new(writer);
    npz.add_array("values.npy", &surface.values().filled(f64::NAN))?;
    npz.add_array("mask.npy", &surface.values().mask)?;
    Ok(npz.finish()?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use ndarray::Array3;
    use super::*;

    const JOB: &str = r#"{
        "surface": {"ncol": 3, "nrow": 3, "xori": 0.5, "yori": 0.5, "xinc": 1.0, "yinc": 1.0},
        "operation": {"type": "thickness", "zone_range": [1, 2], "coarsen": 1}
    }"#;

    fn archive(names: &[&str]) -> NpzReader<Cursor<Vec<u8>>> {
        let mut npz = NpzWriter::new(Cursor::new(Vec::new()));
        let dim = (4, 4, 2);
        for name in names {
            let values = match *name {
                "x.npy" => Array3::from_shape_fn(dim, |(i, _, _)| i as f64 + 0.5),
                "y.npy" => Array3::from_shape_fn(dim, |(_, j, _)| j as f64 + 0.5),
                "zone.npy" => Array3::from_shape_fn(dim, |(_, _, k)| (k + 1) as f64),
                _ => Array3::from_elem(dim, 1.0),
            };
            npz.add_array(*name, &values).unwrap();
        }
        NpzReader::new(Cursor::new(npz.finish().unwrap().into_inner())).unwrap()
    }

    #[test]
    fn test_parse_job() {
        let template = Template::from_json(JOB).unwrap();
        assert_eq!(template.surface.ncol, 3);
        assert_eq!(template.surface.rotation, 0.0);
        match template.operation {
            Operation::Thickness { zone_range, layer_range, zone_avg, coarsen } => {
                assert_eq!(zone_range, Some(ZoneRange::new(1, 2).unwrap()));
                assert_eq!(layer_range, None);
                assert!(!zone_avg);
                assert_eq!(coarsen, 1);
            }
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn test_points_defaults() {
        let template = Template::from_json(r#"{
            "surface": {"ncol": 2, "nrow": 2, "xori": 0, "yori": 0, "xinc": 1, "yinc": 1, "rotation": 30},
            "operation": {"type": "points"}
        }"#).unwrap();
        assert!(matches!(template.operation, Operation::Points { ref method, coarsen: 1 } if method == "linear"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let template = Template::from_json(r#"{
            "surface": {"ncol": 2, "nrow": 2, "xori": 0, "yori": 0, "xinc": 1, "yinc": 1},
            "operation": {"type": "points", "method": "kriging"}
        }"#).unwrap();
        let mut npz = archive(&[]);
        let err = template.gridder_from(&mut npz).err().unwrap();
        assert!(err.to_string().contains("kriging"));
    }

    #[test]
    fn test_thickness_job_end_to_end() {
        let template = Template::from_json(JOB).unwrap();
        let mut npz = archive(&["x.npy", "y.npy", "value.npy", "zone.npy", "actnum.npy"]);
        let gridder = template.gridder_from(&mut npz).unwrap();
        assert_eq!(gridder.name(), "thickness");

        let mut surface = RegularSurface::new(template.surface).unwrap();
        let report = gridder.grid(&mut surface).unwrap();
        assert_eq!(report.processed, vec![1, 2]);
        for v in surface.values().data.iter() {
            approx::assert_relative_eq!(*v, 2.0, epsilon = 1e-9);
        }

        let bytes = write_surface_to(&surface, Cursor::new(Vec::new())).unwrap().into_inner();
        let mut out = NpzReader::new(Cursor::new(bytes)).unwrap();
        let values: ndarray::Array2<f64> = out.by_name("values.npy").unwrap();
        assert_eq!(values.dim(), (3, 3));
    }

    #[test]
    fn test_missing_zone_array() {
        let template = Template::from_json(JOB).unwrap();
        let mut npz = archive(&["x.npy", "y.npy", "value.npy"]);
        assert!(template.gridder_from(&mut npz).is_err());
    }
}
