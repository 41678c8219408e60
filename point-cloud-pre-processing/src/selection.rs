//! Tile selection lists.
use crate::error::{PreprocessError, Result};
use crate::tile_file::Tile;
use log::warn;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parses a file of newline-separated 1-based tile indices.
/// Blank lines are ignored; anything else that is not an integer is an error.
pub fn read_selection(path: &Path) -> Result<Vec<usize>> {
    let text = fs::read_to_string(path).map_err(|e| PreprocessError::io(path, e))?;
    text.lines()
        .enumerate()
        .map(|(line_no, line)| (line_no, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.parse::<usize>().map_err(|_| {
                PreprocessError::Config(format!(
                    "{}:{}: '{line}' is not a tile index",
                    path.display(),
                    line_no + 1
                ))
            })
        })
        .collect()
}

/// Picks the selected tiles, or all of them when there is no selection.
///
/// Indices address tiles by 1-based position. Index 0 or one past the last
/// tile is a configuration error; repeated indices are exported once.
pub fn select_tiles<'a>(tiles: &'a [Tile], selection: Option<&[usize]>) -> Result<Vec<&'a Tile>> {
    let Some(selection) = selection else {
        return Ok(tiles.iter().collect());
    };

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(selection.len());
    for &index in selection {
        if index == 0 || index > tiles.len() {
            return Err(PreprocessError::Config(format!(
                "tile index {index} is out of range 1..={}",
                tiles.len()
            )));
        }
        if !seen.insert(index) {
            warn!("Tile index {index} selected more than once");
            continue;
        }
        selected.push(&tiles[index - 1]);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn tiles(n: u32) -> Vec<Tile> {
        (1..=n)
            .map(|id| Tile {
                id,
                polygon: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
            })
            .collect()
    }

    #[test]
    fn parses_indices_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.txt");
        fs::write(&path, "2\n\n 4 \n").unwrap();
        assert_eq!(read_selection(&path).unwrap(), vec![2, 4]);
    }

    #[test]
    fn rejects_non_numeric_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.txt");
        fs::write(&path, "2\nfour\n").unwrap();
        assert!(matches!(
            read_selection(&path),
            Err(PreprocessError::Config(_))
        ));
    }

    #[test]
    fn selects_by_position() {
        let all = tiles(5);
        let chosen = select_tiles(&all, Some(&[4, 2])).unwrap();
        let ids: Vec<u32> = chosen.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[test]
    fn no_selection_means_every_tile() {
        let all = tiles(3);
        assert_eq!(select_tiles(&all, None).unwrap().len(), 3);
    }

    #[test]
    fn out_of_range_indices_are_fatal() {
        let all = tiles(3);
        assert!(select_tiles(&all, Some(&[0])).is_err());
        assert!(select_tiles(&all, Some(&[1, 4])).is_err());
    }

    #[test]
    fn duplicates_are_exported_once() {
        let all = tiles(3);
        let chosen = select_tiles(&all, Some(&[3, 3, 1])).unwrap();
        assert_eq!(chosen.len(), 2);
    }
}
