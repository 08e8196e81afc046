#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::error::OptionError;

/// Queries with more segments than this are not mapped; the segment
/// index has to fit in the 8 bits anchors reserve for it.
pub const MAX_SEGS: usize = 255;

/// Extra diagnostics written through the logger at debug level.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct DebugFlags {
    /// Repeat length and every anchor before chaining
    pub seed: bool,
    /// Every linear chain
    pub lchain: bool,
    /// Scratch arena statistics after each query
    pub qname: bool,
}

/// Mapping options. The defaults are tuned for long reads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct MapOpt {
    pub seed: u32,
    /// Minimizers with at least this many occurrences are not used as
    /// anchors
    pub occ_max1: usize,
    /// Minimizers with more occurrences than this get less weight
    pub occ_weight: usize,
    /// Longest combined query to map; 0 for no limit
    pub max_qlen: u32,
    pub max_gap: i32,
    /// Overrides the reference gap bound when positive
    pub max_gap_ref: i32,
    pub max_gap_pre: i32,
    /// Longest fragment for multi-segment queries; 0 if unknown
    pub max_frag_len: i32,
    pub max_lc_skip: i32,
    pub max_lc_iter: i32,
    pub max_gc_skip: i32,
    pub max_gc_seq_ext: i32,
    pub max_rmq_size: i32,
    pub bw: i32,
    pub ref_bonus: i32,
    pub min_lc_cnt: i32,
    pub min_lc_score: i32,
    pub min_gc_cnt: i32,
    pub min_gc_score: i32,
    pub chn_pen_gap: f32,
    pub chn_pen_skip: f32,
    /// Expected sequence divergence, used to decay the chaining gap
    /// penalties with k
    pub div: f32,
    pub mask_level: f32,
    pub sub_diff: i32,
    pub pri_ratio: f32,
    pub best_n: usize,
    pub splice: bool,
    pub short_read: bool,
    /// Chain with the RMQ chainer instead of the DP one
    pub rmq: bool,
    /// Expand anchors with the heap merge instead of sorting
    pub heap_sort: bool,
    /// Skip anchors of a query onto its own graph position
    pub no_diag: bool,
    pub debug: DebugFlags,
}

impl Default for MapOpt {
    fn default() -> Self {
        MapOpt {
            seed: 11,
            occ_max1: 50,
            occ_weight: 20,
            max_qlen: 0,
            max_gap: 5000,
            max_gap_ref: -1,
            max_gap_pre: 1000,
            max_frag_len: 0,
            max_lc_skip: 25,
            max_lc_iter: 10000,
            max_gc_skip: 25,
            max_gc_seq_ext: 5,
            max_rmq_size: 100000,
            bw: 500,
            ref_bonus: 0,
            min_lc_cnt: 5,
            min_lc_score: 40,
            min_gc_cnt: 5,
            min_gc_score: 50,
            chn_pen_gap: 1.0,
            chn_pen_skip: 0.05,
            div: 0.01,
            mask_level: 0.5,
            sub_diff: 6,
            pri_ratio: 0.8,
            best_n: 5,
            splice: false,
            short_read: false,
            rmq: false,
            heap_sort: false,
            no_diag: false,
            debug: DebugFlags::default(),
        }
    }
}

impl MapOpt {
    pub fn new() -> Self {
        Default::default()
    }

    /// Short-read mode: the query gap bound grows with the query.
    pub fn short_read() -> Self {
        MapOpt {
            short_read: true,
            heap_sort: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), OptionError> {
        fn positive(v: i64, name: &'static str) -> Result<(), OptionError> {
            if v > 0 {
                Ok(())
            } else {
                Err(OptionError::NonPositive(name))
            }
        }
        fn within(v: f32, lo: f32, hi: f32, name: &'static str) -> Result<(), OptionError> {
            if (lo..=hi).contains(&v) {
                Ok(())
            } else {
                Err(OptionError::OutOfRange(name, lo, hi))
            }
        }
        positive(self.occ_max1 as i64, "occ_max1")?;
        positive(self.occ_weight as i64, "occ_weight")?;
        positive(self.max_gap as i64, "max_gap")?;
        positive(self.bw as i64, "bw")?;
        within(self.mask_level, 0.0, 1.0, "mask_level")?;
        within(self.pri_ratio, 0.0, 1.0, "pri_ratio")?;
        within(self.div, 0.0, 1.0, "div")?;
        Ok(())
    }

    /// Save the options to a JSON file.
    #[cfg(feature = "serde1")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;
        use std::{fs::File, io::BufWriter};
        let file = File::create(path.as_ref())
            .with_context(|| format!("creating {}", path.as_ref().display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load options from a JSON file. Missing fields take their
    /// default values.
    #[cfg(feature = "serde1")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        use std::{fs::File, io::BufReader};
        let file = File::open(path.as_ref())
            .with_context(|| format!("opening {}", path.as_ref().display()))?;
        let opt: MapOpt = serde_json::from_reader(BufReader::new(file))?;
        opt.validate()?;
        Ok(opt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MapOpt::default().validate().is_ok());
        assert!(MapOpt::short_read().validate().is_ok());
    }

    #[test]
    fn invalid_fields_are_named() {
        let opt = MapOpt {
            pri_ratio: 1.5,
            ..Default::default()
        };
        assert_eq!(
            opt.validate(),
            Err(OptionError::OutOfRange("pri_ratio", 0.0, 1.0))
        );
        let opt = MapOpt {
            bw: 0,
            ..Default::default()
        };
        let err = opt.validate().unwrap_err();
        assert_eq!(err.to_string(), "Option `bw` must be positive");
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn json_round_trip_with_defaults() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opt.json");
        let opt = MapOpt {
            max_gap: 1234,
            no_diag: true,
            ..Default::default()
        };
        opt.save_json(&path).unwrap();
        assert_eq!(MapOpt::load_json(&path).unwrap(), opt);

        let partial = dir.path().join("partial.json");
        let mut f = std::fs::File::create(&partial).unwrap();
        write!(f, "{{\"bw\": 77}}").unwrap();
        drop(f);
        let loaded = MapOpt::load_json(&partial).unwrap();
        assert_eq!(loaded.bw, 77);
        assert_eq!(loaded.max_gap, 5000);
    }
}
