pub mod aggregating;
pub mod cells;
pub mod constants;
pub mod error;
pub mod gridding;
pub mod interpolation;
pub mod masked;
pub mod model;
pub mod stream;
