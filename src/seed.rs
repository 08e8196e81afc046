use crate::gfa::Orientation;
use crate::index::{MinimizerIndex, Occurrence};
use crate::sketch::Minimizer;

/// A query minimizer together with everywhere it occurs in the graph.
#[derive(Debug, Clone)]
pub struct MatchGroup<'a> {
    pub occs: &'a [Occurrence],
    pub qpos: u32,
    pub qstrand: Orientation,
    pub span: u32,
    pub seg: u32,
    pub tandem: bool,
    pub weight: u8,
}

impl<'a> MatchGroup<'a> {
    #[inline]
    pub fn n(&self) -> usize {
        self.occs.len()
    }
}

/// Matches of a query, minus minimizers that are too repetitive to
/// anchor on.
#[derive(Debug, Clone, Default)]
pub struct Matches<'a> {
    pub groups: Vec<MatchGroup<'a>>,
    /// Total occurrences over all groups
    pub n_anchors: usize,
    /// Query bases covered by repetitive minimizers
    pub rep_len: u32,
}

/// Accumulates the union of query intervals, assuming they arrive
/// with non-decreasing ends.
#[derive(Debug, Default, Clone, Copy)]
struct RepeatSpan {
    st: u32,
    en: u32,
    len: u32,
}

impl RepeatSpan {
    fn add(&mut self, st: u32, en: u32) {
        if st > self.en {
            self.len += self.en - self.st;
            self.st = st;
            self.en = en;
        } else {
            self.en = en;
        }
    }

    fn total(&self) -> u32 {
        self.len + (self.en - self.st)
    }
}

/// Look every minimizer up in the index. Minimizers occurring
/// `max_occ` times or more only count towards the repeat length; the
/// rest, including those without any hit, become match groups, with
/// their query positions appended to `mini_pos`. A minimizer is
/// flagged tandem when a neighbouring query minimizer has the same
/// hash.
pub fn collect_matches<'a, I: MinimizerIndex + ?Sized>(
    index: &'a I,
    max_occ: usize,
    mv: &[Minimizer],
    mini_pos: &mut Vec<u32>,
) -> Matches<'a> {
    let mut rep = RepeatSpan::default();
    let mut m = Matches {
        groups: Vec::with_capacity(mv.len()),
        ..Default::default()
    };
    mini_pos.clear();

    for (i, q) in mv.iter().enumerate() {
        let occs = index.get(q.hash);
        if occs.len() >= max_occ {
            let (st, en) = q.range();
            rep.add(st, en);
            continue;
        }
        let tandem = (i > 0 && mv[i - 1].hash == q.hash)
            || (i + 1 < mv.len() && mv[i + 1].hash == q.hash);
        mini_pos.push(q.pos);
        m.n_anchors += occs.len();
        m.groups.push(MatchGroup {
            occs,
            qpos: q.pos,
            qstrand: q.strand,
            span: q.span,
            seg: q.seg,
            tandem,
            weight: 255,
        });
    }
    m.rep_len = rep.total();
    m
}

const WEIGHT_BASE: f32 = 10.0;
const LOG2_BASE: f32 = 3.321928;

/// Weight of a minimizer occurring `n` times, given the occurrence
/// count `occ_weight` above which minimizers start losing weight.
/// Never below 70% of full weight.
#[inline]
pub fn occ_weight(n: usize, base: usize) -> u8 {
    if n <= base {
        return 255;
    }
    let x = WEIGHT_BASE * n as f32 / base as f32;
    let y = LOG2_BASE / x.log2();
    if y >= 1.0 {
        255
    } else {
        (255.0 * y.max(0.7)) as u8
    }
}

/// Down-weight groups by how often their minimizer occurs.
pub fn cal_weight(groups: &mut [MatchGroup<'_>], base: usize) {
    for g in groups.iter_mut() {
        g.weight = occ_weight(g.n(), base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::Graph;
    use crate::index::MemIndex;
    use proptest::prelude::*;

    fn mini(hash: u64, pos: u32) -> Minimizer {
        Minimizer {
            hash,
            span: 10,
            seg: 0,
            pos,
            strand: Orientation::Forward,
        }
    }

    fn index_with(counts: &[(u64, u32)]) -> MemIndex {
        let mut index = MemIndex::new(Graph::new(), 10, 5);
        for &(hash, n) in counts {
            for p in 0..n {
                index.insert(
                    hash,
                    Occurrence {
                        seg: 0,
                        pos: p * 100,
                        strand: Orientation::Forward,
                    },
                );
            }
        }
        index.finish();
        index
    }

    #[test]
    fn repeat_intervals_are_merged() {
        let mut rep = RepeatSpan::default();
        rep.add(10, 20);
        rep.add(15, 25);
        rep.add(30, 35);
        // [10, 25) and [30, 35)
        assert_eq!(rep.total(), 20);
    }

    #[test]
    fn repetitive_minimizers_only_add_repeat_length() {
        let index = index_with(&[(1, 60), (2, 3), (3, 55)]);
        // k-mers [10,20), [15,25) and [30,40) are repetitive
        let mv = vec![mini(1, 19), mini(3, 24), mini(2, 28), mini(1, 39), mini(9, 45)];
        let mut mini_pos = Vec::new();
        let m = collect_matches(&index, 50, &mv, &mut mini_pos);
        assert_eq!(m.rep_len, 25);
        assert_eq!(m.groups.len(), 2);
        assert_eq!(m.n_anchors, 3);
        assert_eq!(mini_pos, vec![28, 45]);
        assert!(!m.groups[0].tandem);
        assert_eq!(m.groups[1].n(), 0);
    }

    #[test]
    fn minimizers_without_hits_keep_their_position() {
        let index = index_with(&[(1, 2)]);
        let mv = vec![mini(1, 10), mini(7, 20), mini(1, 30)];
        let mut mini_pos = Vec::new();
        let m = collect_matches(&index, 50, &mv, &mut mini_pos);
        assert_eq!(mini_pos, vec![10, 20, 30]);
        assert_eq!(m.groups.len(), 3);
        assert_eq!(m.n_anchors, 4);
        assert!(m.groups[1].occs.is_empty());
    }

    #[test]
    fn tandem_neighbours() {
        let index = index_with(&[(1, 2), (2, 2)]);
        let mv = vec![mini(1, 10), mini(1, 12), mini(2, 20), mini(1, 30)];
        let mut mini_pos = Vec::new();
        let m = collect_matches(&index, 50, &mv, &mut mini_pos);
        let tandem: Vec<bool> = m.groups.iter().map(|g| g.tandem).collect();
        assert_eq!(tandem, vec![true, true, false, false]);
        assert_eq!(m.n_anchors, 8);
    }

    #[test]
    fn weight_thresholds() {
        assert_eq!(occ_weight(20, 20), 255);
        assert_eq!(occ_weight(0, 0), 255);
        // y = 1 - 1 / log2(20), about 0.77
        assert!((190..200).contains(&occ_weight(40, 20)));
        assert!(occ_weight(400, 20) < occ_weight(40, 20));
        assert_eq!(occ_weight(1_000_000, 20), (255.0f32 * 0.7) as u8);

        let index = index_with(&[(1, 30)]);
        let mut mini_pos = Vec::new();
        let mut m = collect_matches(&index, 100, &[mini(1, 10)], &mut mini_pos);
        cal_weight(&mut m.groups, 2);
        assert_eq!(m.groups[0].weight, occ_weight(30, 2));
    }

    proptest! {
        #[test]
        fn weight_never_increases_with_occurrences(
            base in 1usize..100,
            n in 0usize..100_000,
            extra in 0usize..100_000,
        ) {
            prop_assert!(occ_weight(n + extra, base) <= occ_weight(n, base));
            prop_assert!(occ_weight(n, base) >= 178);
        }
    }
}
