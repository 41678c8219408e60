//! Shared defaults for the point cloud data-preparation tools.

pub mod class;
pub mod coordinate_system;
pub mod dataset;
pub mod tiling;
