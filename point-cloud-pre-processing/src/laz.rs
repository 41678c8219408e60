use crate::error::{PreprocessError, Result};
use crate::progress::point_progress_bar;
use las::{Header, Point, Reader, Writer};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Extra Bytes VLR record id in the LASF_Spec namespace.
pub const EXTRA_BYTES_RECORD_ID: u16 = 4;

/// Size of one extra bytes descriptor inside the VLR payload.
pub const EXTRA_BYTES_DESCRIPTOR_LEN: usize = 192;

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
pub fn create_reader(file_path: &Path) -> Result<Reader> {
    let file = File::open(file_path).map_err(|e| PreprocessError::io(file_path, e))?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// Create LAS file writer. A `.laz` extension selects compression.
pub fn create_writer(file_path: &Path, header: Header) -> Result<Writer<BufWriter<File>>> {
    Ok(Writer::from_path(file_path, header)?)
}

/// Reads every point of a cloud into memory along with its header.
pub fn read_point_cloud(file_path: &Path) -> Result<(Header, Vec<Point>)> {
    let mut reader = create_reader(file_path)?;
    log_file_info(file_path, reader.header());

    let header = reader.header().clone();
    let total_points = header.number_of_points();
    let pb = point_progress_bar(total_points, "Loading points");

    let mut points = Vec::with_capacity(total_points as usize);
    for (idx, point_result) in reader.points().enumerate() {
        points.push(point_result?);

        if idx % 50_000 == 0 {
            pb.set_position(idx as u64);
        }
    }
    pb.finish_and_clear();

    debug!("Loaded {} points from {}", points.len(), file_path.display());
    Ok((header, points))
}

/// Writes points to a new file using the given header.
pub fn write_point_cloud(file_path: &Path, header: Header, points: &[Point]) -> Result<()> {
    let mut writer = create_writer(file_path, header)?;
    for point in points {
        writer.write_point(point.clone())?;
    }
    writer.close()?;
    Ok(())
}

/// Whether a path has a .las or .laz extension, ignoring case.
pub fn is_point_cloud_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("las") || ext.eq_ignore_ascii_case("laz"))
}

/// Log coordinate system and file information for debugging.
/// Provides detailed information about LAS file structure and extra dimensions.
pub fn log_file_info(file_path: &Path, header: &Header) {
    debug!("LAS/LAZ File Information:");
    debug!("  File: {}", file_path.display());
    debug!(
        "  Version: {}.{}",
        header.version().major,
        header.version().minor
    );
    debug!("  Points: {}", header.number_of_points());
    debug!("  Point format: {:?}", header.point_format().to_u8());

    let transforms = header.transforms();
    debug!(
        "  Scale factors: X={}, Y={}, Z={}",
        transforms.x.scale, transforms.y.scale, transforms.z.scale
    );
    debug!(
        "  Offsets: X={}, Y={}, Z={}",
        transforms.x.offset, transforms.y.offset, transforms.z.offset
    );

    for vlr in header.vlrs() {
        if vlr.record_id == EXTRA_BYTES_RECORD_ID {
            for descriptor in vlr.data.chunks_exact(EXTRA_BYTES_DESCRIPTOR_LEN) {
                let field_name = String::from_utf8_lossy(&descriptor[4..36]);
                let field_name = field_name.trim_end_matches('\0');
                debug!(
                    "  Extra bytes field '{}' (data type {})",
                    field_name, descriptor[2]
                );
            }
        }
    }
}
