//! Tile extraction along the scan trajectory.
//!
//! The pipeline runs in four stages: the centerline is derived from a
//! seeded sample of the point projection, transects are walked along it,
//! the buffered centerline is cut at the end of each transect, and the
//! resulting tiles are returned in traversal order.
pub mod centerline;
pub mod ribbon;
pub mod skeleton;
pub mod split;
pub mod splitter;
pub mod transects;

pub use centerline::{Centerline, extract_centerline, project_xy, sample_projection};
pub use splitter::{Tiling, create_tiles, split_into_tiles};
pub use transects::{Transects, transects};
