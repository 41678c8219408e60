//! Classification remap tables for the supported datasets.

/// A single source classification code and the training label it becomes.
pub struct ClassRemap {
    pub from: u8,
    pub to: u8,
}

/// RailCloud-HdF codes collapsed into the five training labels.
/// Codes absent from the table keep their original value.
pub const RAILCLOUD_HDF_REMAP: &[ClassRemap] = &[
    ClassRemap { from: 1, to: 0 },
    ClassRemap { from: 2, to: 0 },
    ClassRemap { from: 3, to: 0 },
    ClassRemap { from: 6, to: 0 },
    ClassRemap { from: 4, to: 1 },
    ClassRemap { from: 5, to: 2 },
    ClassRemap { from: 7, to: 3 },
    ClassRemap { from: 8, to: 4 },
];

/// Looks up the training label for a classification code.
pub fn remap_class(table: &[ClassRemap], code: u8) -> u8 {
    table
        .iter()
        .find(|c| c.from == code)
        .map_or(code, |c| c.to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn railcloud_codes_collapse_to_training_labels() {
        let mapped: Vec<u8> = (0..=9)
            .map(|code| remap_class(RAILCLOUD_HDF_REMAP, code))
            .collect();
        assert_eq!(mapped, vec![0, 0, 0, 0, 1, 2, 0, 3, 4, 9]);
    }
}
