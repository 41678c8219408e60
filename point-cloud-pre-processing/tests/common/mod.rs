#![allow(dead_code)]

use las::point::{Classification, Format};
use las::{Builder, Point, Reader, Writer};
use std::path::Path;

pub fn point(x: f64, y: f64, z: f64) -> Point {
    Point {
        x,
        y,
        z,
        ..Default::default()
    }
}

pub fn classified(x: f64, y: f64, code: u8, intensity: u16) -> Point {
    Point {
        x,
        y,
        z: 1.0,
        intensity,
        classification: Classification::new(code).unwrap(),
        ..Default::default()
    }
}

/// Writes `points` as a format 0 LAS file.
pub fn write_cloud(path: &Path, points: &[Point]) {
    let mut builder = Builder::from((1, 2));
    builder.point_format = Format::new(0).unwrap();
    let header = builder.into_header().unwrap();

    let mut writer = Writer::from_path(path, header).unwrap();
    for p in points {
        writer.write_point(p.clone()).unwrap();
    }
    writer.close().unwrap();
}

pub fn read_cloud(path: &Path) -> Vec<Point> {
    let mut reader = Reader::from_path(path).unwrap();
    reader.points().map(|p| p.unwrap()).collect()
}

/// Points on a regular grid covering `[0, length) x [-half_width, half_width]`.
pub fn corridor(length: usize, half_width: i32) -> Vec<Point> {
    (0..length)
        .flat_map(|x| (-half_width..=half_width).map(move |y| point(x as f64 + 0.5, y as f64, 0.0)))
        .collect()
}
