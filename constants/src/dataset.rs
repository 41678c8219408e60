//! Dataset layout and sampling configuration.

/// Split directories expected under a dataset root, in processing order.
pub const SPLITS: [&str; 3] = ["train", "val", "test"];

/// Number of RailCloud-HdF files sampled per split (train, val, test).
pub const RAILCLOUD_HDF_SAMPLES: [usize; 3] = [30, 10, 10];

/// Seed for every seeded sampling step unless overridden on the command line.
pub const DEFAULT_SEED: u64 = 123;

/// Suffix stripped from a prediction file stem to recover the source cloud name.
pub const PREDICTION_SUFFIX_LEN: usize = 5;

/// Name of the extra-bytes dimension holding exported predictions.
pub const PREDICTION_DIMENSION: &str = "prediction";

/// Point format used for merged output unless overridden.
pub const DEFAULT_MERGE_POINT_FORMAT: u8 = 3;
