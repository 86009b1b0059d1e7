//! Per-layer cell outlines and values for map viewers.

use crate::constants::MISSING_VALUE;
use crate::error::{GriddingError, Result};
use crate::model::grid::CornerGrid;
use crate::model::property::GridProperty;

/// Corner (x, y) pairs of one cell's top face.
pub type CellPolygon = Vec<(f64, f64)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyValueLists {
    /// One entry per layer, each with one polygon per kept cell.
    pub coordinates: Vec<Vec<CellPolygon>>,
    /// One entry per layer, each with one value per cell.
    pub values: Vec<Vec<f64>>,
}

/// Collects the top-face corners and the property value of every cell, layer
/// by layer, with cells ordered by column then row.
///
/// With `mask` set, inactive cells have their corners collapsed to the
/// origin so they drop out, and a cell is left out of both lists when it has
/// one corner or less or its value is missing (`-999.0`), so polygons and
/// values pair up one to one. Without `mask` every value is kept and only
/// the polygon of a cell with one corner or less is dropped. Corners with x
/// equal to zero are never kept.
pub fn xy_value_lists<G>(grid: &G, property: &GridProperty, mask: bool) -> Result<XyValueLists>
where
    G: CornerGrid + ?Sized,
{
    let dimensions = grid.dimensions();
    let (nx, ny, nz) = dimensions;
    let mut corners = grid.xyz_corners();
    let actnum = grid.actnum();

    if corners.len() < 4 {
        return Err(GriddingError::TypeMismatch(format!("grid has {} cell corners, need at least 4", corners.len())));
    }
    if actnum.dim() != dimensions {
        return Err(GriddingError::TypeMismatch(format!("actnum shape {:?} does not match grid {:?}", actnum.dim(), dimensions)));
    }
    if corners.iter().any(|c| c.x.dim() != dimensions || c.y.dim() != dimensions) {
        return Err(GriddingError::TypeMismatch(format!("corner arrays do not match grid {:?}", dimensions)));
    }
    if property.dimensions() != dimensions {
        return Err(GriddingError::TypeMismatch(format!(
            "property {} has shape {:?}, grid has {:?}",
            property.name(),
            property.dimensions(),
            dimensions
        )));
    }

    if mask {
        for corner in corners.iter_mut() {
            for array in [&mut corner.x, &mut corner.y, &mut corner.z] {
                array.zip_mut_with(&actnum, |v, a| {
                    if *a == 0 {
                        *v = 0.0;
                    }
                });
            }
        }
    }

    let values = property.values();
    let mut lists = XyValueLists::default();
    for k in 0..nz {
        let mut layer_cells = Vec::with_capacity(nx * ny);
        let mut layer_values = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let polygon: CellPolygon = corners[..4]
                    .iter()
                    .map(|c| (c.x[[i, j, k]], c.y[[i, j, k]]))
                    .filter(|(x, _)| *x != 0.0)
                    .collect();
                let value = if values.mask[[i, j, k]] || actnum[[i, j, k]] == 0 {
                    MISSING_VALUE
                } else {
                    values.data[[i, j, k]]
                };

                if mask {
                    // Both lists keep the same cells
                    if polygon.len() > 1 && value != MISSING_VALUE {
                        layer_cells.push(polygon);
                        layer_values.push(value);
                    }
                } else {
                    if polygon.len() > 1 {
                        layer_cells.push(polygon);
                    }
                    layer_values.push(value);
                }
            }
        }
        lists.coordinates.push(layer_cells);
        lists.values.push(layer_values);
    }
    Ok(lists)
}
