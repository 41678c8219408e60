//! Tile extraction defaults.

/// Length of each tile along the centerline.
pub const DEFAULT_TILE_LENGTH: f64 = 25.0;

/// Width of each tile across the centerline.
pub const DEFAULT_TILE_WIDTH: f64 = 75.0;

/// One in this many points is sampled for hull construction.
pub const DEFAULT_SAMPLE_DIVISOR: usize = 10_000;

/// Concavity passed to the hull. Lower values hug the points more tightly.
pub const DEFAULT_CONCAVITY: f64 = 2.0;

/// Skeleton branches shorter than this many tile lengths are pruned.
pub const MIN_BRANCH_FACTOR: f64 = 4.0;

/// Dividers are this many tile widths long so they fully cross the ribbon.
pub const DIVIDER_OVERSHOOT: f64 = 1.5;

/// Skeleton simplification tolerance as a fraction of the densify distance.
pub const SKELETON_SIMPLIFY_FACTOR: f64 = 0.25;

/// Chaikin passes applied to the simplified skeleton.
pub const SKELETON_SMOOTHING_ITERATIONS: usize = 2;

/// Skeleton ends are trimmed until their clearance to the hull boundary
/// reaches this fraction of the median clearance along the path.
pub const END_CLEARANCE_FRACTION: f64 = 0.75;

/// Relative tolerance for floating point comparisons of lengths and areas.
pub const RELATIVE_EPSILON: f64 = 1e-9;

/// Placeholder replaced by the tile id in exported file names.
pub const TILE_ID_PLACEHOLDER: char = '#';

/// Default template for exported tile files.
pub const DEFAULT_TILE_TEMPLATE: &str = "tile_#.laz";
