use std::cmp::Reverse;

use crate::anchor::Anchor;
use crate::gfa::{Graph, Orientation};
use crate::hash::wang_hash;

/// Parameters handed to the linear (per segment) chainers.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LinearChainParams {
    pub max_gap_ref: i32,
    pub max_gap_qry: i32,
    /// Maximum distance used by the RMQ chainer
    pub max_gap_pre: i32,
    pub bw: i32,
    pub max_skip: i32,
    pub max_iter: i32,
    pub max_rmq_size: i32,
    pub min_cnt: i32,
    pub min_score: i32,
    pub pen_gap: f32,
    pub pen_skip: f32,
    pub is_splice: bool,
    pub n_segs: usize,
    pub qlen: u32,
    pub hash: u32,
}

/// Parameters handed to the graph chainer.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct GraphChainParams {
    pub max_gap_ref: i32,
    pub max_gap_qry: i32,
    pub bw: i32,
    pub max_skip: i32,
    pub max_seq_ext: i32,
    pub ref_bonus: i32,
    pub pen_gap: f32,
    pub pen_skip: f32,
    pub mask_level: f32,
    pub qlen: u32,
    pub hash: u32,
}

/// A chain of anchors on a single segment strand: `cnt` anchors from
/// `off` in the anchor array it was built over.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearChain {
    pub off: usize,
    pub cnt: usize,
    pub score: i32,
    pub target: u32,
    pub strand: Orientation,
    pub qs: u32,
    pub qe: u32,
    pub rs: i32,
    pub re: i32,
}

impl LinearChain {
    /// Summarize `anchors[off..off + cnt]`, which must be non-empty
    /// and lie on one target strand in chain order.
    pub fn from_anchors(off: usize, cnt: usize, score: i32, anchors: &[Anchor]) -> Self {
        let chain = &anchors[off..off + cnt];
        let (first, last) = (&chain[0], &chain[cnt - 1]);
        LinearChain {
            off,
            cnt,
            score,
            target: first.target,
            strand: first.strand,
            qs: first.qstart().max(0) as u32,
            qe: last.qpos + 1,
            rs: first.tpos + 1 - first.span as i32,
            re: last.tpos + 1,
        }
    }
}

/// Output of linear chaining. `anchors` may be reordered or
/// compacted relative to the input; chains index into it.
#[derive(Default, Debug, Clone)]
pub struct LinearChains {
    pub anchors: Vec<Anchor>,
    pub chains: Vec<LinearChain>,
}

/// A graph chain as found by the graph chainer: its score and the
/// linear chains it strings together, in path order.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GraphChainPlan {
    pub score: i32,
    pub lchains: Vec<usize>,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GraphChain {
    pub id: usize,
    pub parent: usize,
    pub score: i32,
    /// Best score among chains overlapping this one on the query
    pub subsc: i32,
    /// Secondary chains scoring within `sub_diff` of this one
    pub n_sub: usize,
    pub n_anchor: usize,
    pub qs: u32,
    pub qe: u32,
    pub mapq: u8,
    pub flt: bool,
    pub hash: u32,
    /// Linear chains, with offsets into `anchors`
    pub lchains: Vec<LinearChain>,
    pub anchors: Vec<Anchor>,
}

impl GraphChain {
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.parent == self.id
    }

    #[inline]
    fn qlen(&self) -> u32 {
        self.qe - self.qs
    }
}

/// All chains found for one query.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ChainSet {
    pub chains: Vec<GraphChain>,
    pub rep_len: u32,
}

/// External chaining routines. The two linear chainers turn sorted
/// anchors into chains on individual segments, the graph chainer
/// connects those through the graph. Primary/secondary assignment and
/// mapping quality have default implementations.
pub trait Chainer {
    fn chain_rmq(&self, p: &LinearChainParams, anchors: Vec<Anchor>) -> LinearChains;

    fn chain_dp(&self, p: &LinearChainParams, anchors: Vec<Anchor>) -> LinearChains;

    fn chain_graph(
        &self,
        graph: &Graph,
        p: &GraphChainParams,
        lc: &LinearChains,
        qseq: &[u8],
        mini_pos: &[u32],
    ) -> Vec<GraphChainPlan>;

    fn set_parent(&self, cs: &mut ChainSet, mask_level: f32, sub_diff: i32) {
        cs.set_parent(mask_level, sub_diff);
    }

    fn set_mapq(&self, cs: &mut ChainSet, qlen: u32, n_mini: usize, min_score: i32) {
        let _ = (qlen, n_mini);
        cs.set_mapq(min_score);
    }
}

impl ChainSet {
    /// Materialize graph chains from the plans, copying out their
    /// anchors. Chains with fewer than `min_cnt` anchors or a score
    /// below `min_score` are dropped; the rest are ordered by score,
    /// ties broken by a hash of the query start seeded with `hash`.
    pub fn assemble(
        plans: &[GraphChainPlan],
        lc: &LinearChains,
        min_cnt: usize,
        min_score: i32,
        hash: u32,
    ) -> Self {
        let mut chains = Vec::with_capacity(plans.len());
        for plan in plans.iter() {
            if plan.score < min_score {
                continue;
            }
            let mut gc = GraphChain {
                score: plan.score,
                ..Default::default()
            };
            for l in plan.lchains.iter().filter_map(|&i| lc.chains.get(i)) {
                let off = gc.anchors.len();
                gc.anchors.extend_from_slice(&lc.anchors[l.off..l.off + l.cnt]);
                gc.lchains.push(LinearChain { off, ..*l });
            }
            gc.n_anchor = gc.anchors.len();
            if gc.n_anchor == 0 || gc.n_anchor < min_cnt {
                continue;
            }
            gc.qs = gc.anchors.iter().map(|a| a.qstart().max(0) as u32).min().unwrap_or(0);
            gc.qe = gc.anchors.iter().map(|a| a.qpos + 1).max().unwrap_or(0);
            gc.hash = wang_hash(gc.qs ^ hash);
            chains.push(gc);
        }
        chains.sort_by_key(|c| (Reverse(c.score), c.hash));
        for (i, c) in chains.iter_mut().enumerate() {
            c.id = i;
            c.parent = i;
        }
        ChainSet { chains, rep_len: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Chains must be ordered by score. A chain becomes secondary to
    /// the first higher scoring primary it overlaps on the query by
    /// more than `mask_level` of the shorter of the two.
    pub fn set_parent(&mut self, mask_level: f32, sub_diff: i32) {
        let mut primaries: Vec<usize> = Vec::new();
        for i in 0..self.chains.len() {
            let (qs, qe, score) = {
                let c = &self.chains[i];
                (c.qs, c.qe, c.score)
            };
            let mut parent = i;
            for &p in primaries.iter() {
                let pc = &self.chains[p];
                let ov = qe.min(pc.qe) as i64 - qs.max(pc.qs) as i64;
                let min_len = (qe - qs).min(pc.qlen());
                if ov > 0 && ov as f32 > mask_level * min_len as f32 {
                    parent = p;
                    break;
                }
            }
            if parent == i {
                primaries.push(i);
            } else {
                let pc = &mut self.chains[parent];
                pc.subsc = pc.subsc.max(score);
                if score + sub_diff >= pc.score {
                    pc.n_sub += 1;
                }
            }
            self.chains[i].parent = parent;
        }
    }

    /// Mark secondary chains for removal: a secondary survives if it
    /// scores at least `pri_ratio` of its parent or within `min_diff`
    /// of it, up to `best_n` secondaries in total.
    pub fn filter_sub(&mut self, pri_ratio: f32, min_diff: i32, best_n: usize) {
        if pri_ratio <= 0.0 || self.chains.is_empty() {
            return;
        }
        let mut n_2nd = 0;
        for i in 0..self.chains.len() {
            let p = self.chains[i].parent;
            if p == i {
                continue;
            }
            let (score, p_score) = (self.chains[i].score, self.chains[p].score);
            let close = score as f32 >= p_score as f32 * pri_ratio || score + min_diff >= p_score;
            if close && n_2nd < best_n {
                n_2nd += 1;
            } else {
                self.chains[i].flt = true;
            }
        }
    }

    /// Remove chains marked as filtered, renumbering ids and parents.
    pub fn drop_filtered(&mut self) {
        let mut new_id = vec![usize::MAX; self.chains.len()];
        let mut k = 0;
        for (i, c) in self.chains.iter().enumerate() {
            if !c.flt {
                new_id[i] = k;
                k += 1;
            }
        }
        self.chains.retain(|c| !c.flt);
        for c in self.chains.iter_mut() {
            c.id = new_id[c.id];
            c.parent = new_id[c.parent];
        }
    }

    /// Mapping quality of primaries, from the gap to the best
    /// overlapping secondary, scaled down for short, anchor-poor or
    /// repetitive hits. Secondaries get 0.
    pub fn set_mapq(&mut self, min_score: i32) {
        const Q_COEF: f32 = 40.0;
        let sum_sc: i64 = self
            .chains
            .iter()
            .filter(|c| c.is_primary())
            .map(|c| c.score as i64)
            .sum();
        let uniq_ratio = if sum_sc + self.rep_len as i64 > 0 {
            sum_sc as f32 / (sum_sc + self.rep_len as i64) as f32
        } else {
            0.0
        };
        for c in self.chains.iter_mut() {
            if !c.is_primary() || c.score <= 0 {
                c.mapq = 0;
                continue;
            }
            let score = c.score as f32;
            let pen_s1 = (if c.score > 100 { 1.0 } else { 0.01 * score }) * uniq_ratio;
            let pen_cm = if c.n_anchor > 10 {
                1.0
            } else {
                0.1 * c.n_anchor as f32
            };
            let pen = pen_s1.min(pen_cm);
            let subsc = c.subsc.max(min_score) as f32;
            let sub_gap = 1.0 - subsc / score;
            let mut mapq = (pen * Q_COEF * sub_gap * score.ln()) as i32;
            mapq -= (4.343 * ((c.n_sub + 1) as f32).ln() + 0.499) as i32;
            c.mapq = mapq.clamp(0, 60) as u8;
        }
    }
}
