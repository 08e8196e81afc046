use fnv::FnvHashMap;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::gfa::{Graph, Orientation};
use crate::sketch::{sketch, Minimizer};

/// One place a minimizer occurs in the graph: the segment, the
/// position of the last base of the k-mer on the forward strand, and
/// the strand the k-mer was canonical on. The derived ordering sorts
/// by segment, then position, then strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Occurrence {
    pub seg: u32,
    pub pos: u32,
    pub strand: Orientation,
}

/// Lookup side of a graph minimizer index. Occurrence lists must be
/// sorted; the anchor expansion merges them without sorting again.
pub trait MinimizerIndex {
    fn k(&self) -> usize;

    fn w(&self) -> usize;

    fn graph(&self) -> &Graph;

    /// All occurrences of minimizers with hash `hash`, sorted.
    fn get(&self, hash: u64) -> &[Occurrence];
}

/// A minimizer index held in a hash map, filled by the caller.
#[derive(Debug, Clone)]
pub struct MemIndex {
    k: usize,
    w: usize,
    graph: Graph,
    table: FnvHashMap<u64, Vec<Occurrence>>,
}

impl MemIndex {
    pub fn new(graph: Graph, k: usize, w: usize) -> Self {
        MemIndex {
            k,
            w,
            graph,
            table: FnvHashMap::default(),
        }
    }

    /// Index every segment sequence of the graph by sketching it with
    /// the index's (w, k).
    pub fn from_segments(graph: Graph, k: usize, w: usize) -> Self {
        let mut index = Self::new(graph, k, w);
        let mut mv: Vec<Minimizer> = Vec::new();
        for (i, s) in index.graph.segs.iter().enumerate() {
            mv.clear();
            sketch(&s.seq, w, k, i as u32, &mut mv);
            for m in mv.iter() {
                index.table.entry(m.hash).or_default().push(Occurrence {
                    seg: m.seg,
                    pos: m.pos,
                    strand: m.strand,
                });
            }
        }
        index.finish();
        index
    }

    /// Add an occurrence. [`MemIndex::finish`] must be called before
    /// the index is queried.
    pub fn insert(&mut self, hash: u64, occ: Occurrence) {
        self.table.entry(hash).or_default().push(occ);
    }

    /// Sort and deduplicate every occurrence list.
    pub fn finish(&mut self) {
        for occs in self.table.values_mut() {
            occs.sort_unstable();
            occs.dedup();
        }
    }

    pub fn n_minimizers(&self) -> usize {
        self.table.len()
    }
}

impl MinimizerIndex for MemIndex {
    fn k(&self) -> usize {
        self.k
    }

    fn w(&self) -> usize {
        self.w
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn get(&self, hash: u64) -> &[Occurrence] {
        self.table.get(&hash).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
