//! Equal-width severity binning over the filtered records

use tracing::{debug, info};

use crate::{
    error::{QuakemapError, Result},
    types::{ClassifiedRecord, LEVEL_COUNT, LEVEL_MAX, LEVEL_MIN, TimedRecord, invert_depth_label},
};

/// Bin edges for `LEVEL_COUNT` equal-width bins over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    edges: [f64; LEVEL_COUNT + 1],
}

impl Bins {
    /// `None` when `values` is empty.
    pub fn spanning(values: &[f64]) -> Option<Self> {
        let (min, max) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })?;

        let width = (max - min) / LEVEL_COUNT as f64;
        let mut edges = [0.0; LEVEL_COUNT + 1];
        for (i, edge) in edges.iter_mut().enumerate() {
            *edge = min + width * i as f64;
        }
        edges[LEVEL_COUNT] = max;
        Some(Self { edges })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    fn is_degenerate(&self) -> bool {
        self.edges[0] == self.edges[LEVEL_COUNT]
    }

    /// 0-based bin of `value`. Bins are right-closed; the first one also holds the minimum.
    /// A zero-width range puts everything in the top bin.
    pub fn bin_of(&self, value: f64) -> usize {
        if self.is_degenerate() {
            return LEVEL_COUNT - 1;
        }
        self.edges[1..]
            .iter()
            .position(|&upper| value <= upper)
            .unwrap_or(LEVEL_COUNT - 1)
    }

    /// Ordinal label of `value`, starting at `LEVEL_MIN` for the first bin.
    pub fn label_of(&self, value: f64) -> i64 {
        i64::from(LEVEL_MIN) + self.bin_of(value) as i64
    }
}

fn checked_label(label: i64, row: usize, column: &'static str) -> Result<u8> {
    if !(i64::from(LEVEL_MIN)..=i64::from(LEVEL_MAX)).contains(&label) {
        return Err(QuakemapError::ClassificationRange { row, column, label });
    }
    Ok(label as u8)
}

/// Assign magnitude and (inverted) depth levels to every record.
///
/// Bin edges come from this batch alone, so a different subset of records
/// produces different edges.
pub fn classify(timed: Vec<TimedRecord>) -> Result<Vec<ClassifiedRecord>> {
    let magnitudes: Vec<f64> = timed.iter().map(|t| t.record.magnitude).collect();
    let depths: Vec<f64> = timed.iter().map(|t| t.record.depth).collect();

    let (Some(magnitude_bins), Some(depth_bins)) =
        (Bins::spanning(&magnitudes), Bins::spanning(&depths))
    else {
        info!("No records to classify");
        return Ok(Vec::new());
    };
    info!(
        "Magnitude bin edges {:?}, depth bin edges {:?}",
        magnitude_bins.edges(),
        depth_bins.edges()
    );

    timed
        .into_iter()
        .map(|timed| {
            let row = timed.record.row;
            let magnitude_level =
                checked_label(magnitude_bins.label_of(timed.record.magnitude), row, "magnitude")?;
            let depth_label = checked_label(depth_bins.label_of(timed.record.depth), row, "depth")?;
            let depth_level = invert_depth_label(depth_label);
            debug!(row, magnitude_level, depth_level, "classified");

            Ok(ClassifiedRecord {
                timed,
                magnitude_level,
                depth_level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[f64]) -> Vec<i64> {
        let bins = Bins::spanning(values).unwrap();
        values.iter().map(|&v| bins.label_of(v)).collect()
    }

    #[test]
    fn test_extremes_get_lowest_and_highest_label() {
        let values = [6.5, 7.1, 6.9, 8.0, 7.4];
        let l = labels(&values);
        assert_eq!(l[0], 4);
        assert_eq!(l[3], 10);
        assert!(l.iter().all(|&x| (4..=10).contains(&x)));
    }

    #[test]
    fn test_evenly_spread_values_fill_every_bin() {
        // Midpoints of the seven bins over [0, 7].
        let values = [0.0, 0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.0];
        assert_eq!(labels(&values), vec![4, 4, 5, 6, 7, 8, 9, 10, 10]);
    }

    #[test]
    fn test_interior_edge_goes_to_lower_bin() {
        let values = [0.0, 1.0, 2.0, 7.0];
        assert_eq!(labels(&values), vec![4, 4, 5, 10]);
    }

    #[test]
    fn test_single_value_gets_top_label() {
        assert_eq!(labels(&[7.2]), vec![10]);
        assert_eq!(labels(&[3.0, 3.0, 3.0]), vec![10, 10, 10]);
    }

    #[test]
    fn test_empty_has_no_bins() {
        assert!(Bins::spanning(&[]).is_none());
    }

    #[test]
    fn test_checked_label_rejects_out_of_range() {
        let err = checked_label(11, 3, "magnitude").unwrap_err();
        assert!(matches!(
            err,
            QuakemapError::ClassificationRange { row: 3, column: "magnitude", label: 11 }
        ));
        assert_eq!(checked_label(4, 1, "depth").unwrap(), 4);
    }

    #[test]
    fn test_inversion_is_involutive() {
        for label in LEVEL_MIN..=LEVEL_MAX {
            assert_eq!(invert_depth_label(invert_depth_label(label)), label);
        }
    }
}
