//! Analysis defaults shared across the crate

/// Width of the outlier band, in population standard deviations
pub const DEFAULT_THRESHOLD_STD_DEVS: f64 = 1.0;

/// Decimal places kept when reporting average speed
pub const AVERAGE_SPEED_DECIMALS: usize = 4;

/// Number of vehicles listed in the most-traveled ranking
pub const DEFAULT_TOP_N: usize = 3;
