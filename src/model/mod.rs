pub mod grid;
pub mod layer;
pub mod points;
pub mod property;
pub mod range;
pub mod surface;
pub mod template;

pub use grid::{CellCorner, CornerGrid, CornerSet, RegularBoxGrid};
pub use layer::{GriddingReport, SkipReason, SurfaceGridder};
pub use points::Points;
pub use property::GridProperty;
pub use range::{LayerRange, ZoneRange};
pub use surface::{RegularSurface, SurfaceGeometry};
