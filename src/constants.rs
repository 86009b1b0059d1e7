/// Undefined value written into continuous 3D properties for inactive cells.
pub const UNDEF: f64 = 1.0e33;

/// Anything at or above this is treated as undefined.
pub const UNDEF_LIMIT: f64 = 9.9e32;

/// Missing value marker in exported value lists.
pub const MISSING_VALUE: f64 = -999.0;

/// Substituted for an accumulated weight of exactly zero before dividing.
pub const WEIGHT_EPSILON: f64 = 1.0e-20;

/// Layers whose summed signal is below this are skipped.
pub const SIGNAL_EPSILON: f64 = 1.0e-12;

/// Open upper bound for layer and zone ranges that were not given.
pub const OPEN_RANGE_MAX: i64 = 99999;
