use bstr::ByteSlice;

use crate::anchor::Anchor;
use crate::chain::{ChainSet, Chainer, GraphChainParams, LinearChainParams, LinearChains};
use crate::expand::{expand_bulk, expand_heap};
use crate::filter::filter_anchors;
use crate::gfa::Graph;
use crate::hash::{wang_hash, x31_hash};
use crate::index::MinimizerIndex;
use crate::options::{MapOpt, MAX_SEGS};
use crate::scratch::Scratch;
use crate::seed::{cal_weight, collect_matches};
use crate::sketch::{collect_minimizers, Minimizer};

/// Per-query seed for tie-breaking, from the query name, its length
/// and the configured seed.
pub fn query_hash(qname: Option<&[u8]>, qlen: u32, seed: u32) -> u32 {
    let h = qname.map(x31_hash).unwrap_or(0);
    wang_hash(h ^ wang_hash(qlen).wrapping_add(wang_hash(seed)))
}

/// Largest gaps allowed between chained anchors, on the query and on
/// the reference.
pub fn gap_bounds(opt: &MapOpt, qlen: u32) -> (i32, i32) {
    let qlen = qlen.min(i32::MAX as u32) as i32;
    let qry = if opt.short_read {
        qlen.max(opt.max_gap)
    } else {
        opt.max_gap
    };
    let rf = if opt.max_gap_ref > 0 {
        opt.max_gap_ref
    } else if opt.max_frag_len > 0 {
        (opt.max_frag_len - qlen).max(opt.max_gap)
    } else {
        opt.max_gap
    };
    (qry, rf)
}

/// Chaining gap and skip penalties, decayed by the chance of a k-mer
/// surviving the expected divergence.
pub fn gap_penalties(opt: &MapOpt, k: usize) -> (f32, f32) {
    let tmp = (-opt.div * k as f32).exp();
    (opt.chn_pen_gap * tmp, opt.chn_pen_skip * tmp)
}

/// Whether isolated anchors are dropped before chaining.
pub fn use_prefilter(opt: &MapOpt) -> bool {
    !opt.rmq
        && !opt.splice
        && !opt.short_read
        && opt.max_gap_pre > 0
        && (opt.max_gap_pre as i64) * 2 < opt.max_gap as i64
}

/// Change in diagonal (query minus reference position) from `prev`
/// to `a`; 0 for the first anchor.
fn diagonal_shift(prev: Option<&Anchor>, a: &Anchor) -> i64 {
    prev.map_or(0, |p| {
        (a.qpos as i64 - p.qpos as i64) - (a.tpos as i64 - p.tpos as i64)
    })
}

fn log_anchors(graph: &Graph, rep_len: u32, anchors: &[Anchor]) {
    log::debug!("RS\t{}", rep_len);
    let mut prev: Option<&Anchor> = None;
    for a in anchors.iter() {
        let name = graph
            .seg(a.target)
            .map(|s| s.name.as_bstr())
            .unwrap_or_else(|| b"*".as_bstr());
        let dd = diagonal_shift(prev, a);
        log::debug!(
            "SD\t{}\t{}\t{}\t{}\t{}\t{}",
            name,
            a.tpos,
            a.strand,
            a.qpos,
            a.span,
            dd
        );
        prev = Some(a);
    }
}

fn log_lchains(graph: &Graph, lc: &LinearChains) {
    for (i, c) in lc.chains.iter().enumerate() {
        let name = graph
            .seg(c.target)
            .map(|s| s.name.as_bstr())
            .unwrap_or_else(|| b"*".as_bstr());
        log::debug!(
            "LC\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i,
            name,
            c.strand,
            c.rs,
            c.re,
            c.qs,
            c.qe,
            c.score,
            c.cnt
        );
    }
}

/// Map one query, made of one or more segments, onto the graph of
/// `index`. Queries that are empty, have no or too many segments, or
/// are longer than `opt.max_qlen` map to an empty chain set without
/// touching the scratch space.
pub fn map_frag<I, C, S>(
    index: &I,
    chainer: &C,
    qseqs: &[S],
    scratch: &mut Scratch,
    opt: &MapOpt,
    qname: Option<&[u8]>,
) -> ChainSet
where
    I: MinimizerIndex + ?Sized,
    C: Chainer + ?Sized,
    S: AsRef<[u8]>,
{
    let n_segs = qseqs.len();
    let qlen_sum: u64 = qseqs.iter().map(|s| s.as_ref().len() as u64).sum();
    if qlen_sum == 0 || n_segs == 0 || n_segs > MAX_SEGS || qlen_sum > u32::MAX as u64 {
        return ChainSet::default();
    }
    if opt.max_qlen > 0 && qlen_sum > opt.max_qlen as u64 {
        return ChainSet::default();
    }
    let qlen = qlen_sum as u32;
    let graph = index.graph();
    let k = index.k();
    let hash = query_hash(qname, qlen, opt.seed);

    let arena = &mut scratch.arena;
    let mut mv: Vec<Minimizer> = arena.acquire(qlen as usize / index.w().max(1) * 2);
    collect_minimizers(k, index.w(), qseqs, &mut mv);
    let n_mini = mv.len();

    let mut mini_pos: Vec<u32> = arena.acquire(n_mini);
    let mut m = collect_matches(index, opt.occ_max1, &mv, &mut mini_pos);
    cal_weight(&mut m.groups, opt.occ_weight);

    let mut anchors: Vec<Anchor> = arena.acquire(m.n_anchors);
    if opt.heap_sort {
        let mut fwd: Vec<Anchor> = arena.acquire(m.n_anchors);
        let mut rev: Vec<Anchor> = arena.acquire(m.n_anchors);
        expand_heap(graph, &m.groups, &mut fwd, &mut rev, &mut anchors);
        arena.release(fwd);
        arena.release(rev);
    } else {
        let self_name = if opt.no_diag { qname } else { None };
        expand_bulk(graph, &m.groups, self_name, &mut anchors);
    }
    let rep_len = m.rep_len;
    if opt.debug.seed {
        log_anchors(graph, rep_len, &anchors);
    }

    let (max_gap_qry, max_gap_ref) = gap_bounds(opt, qlen);
    let (pen_gap, pen_skip) = gap_penalties(opt, k);
    if use_prefilter(opt) {
        filter_anchors(&mut anchors, opt.max_gap_pre);
    }
    log::debug!(
        "{}: {} minimizers, {} match groups, {} anchors, rep_len {}",
        qname.unwrap_or(b"*").as_bstr(),
        n_mini,
        m.groups.len(),
        anchors.len(),
        rep_len
    );
    drop(m);

    let lp = LinearChainParams {
        max_gap_ref,
        max_gap_qry,
        max_gap_pre: opt.max_gap_pre,
        bw: opt.bw,
        max_skip: opt.max_lc_skip,
        max_iter: opt.max_lc_iter,
        max_rmq_size: opt.max_rmq_size,
        min_cnt: opt.min_lc_cnt,
        min_score: opt.min_lc_score,
        pen_gap,
        pen_skip,
        is_splice: opt.splice,
        n_segs,
        qlen,
        hash,
    };
    let lc = if anchors.is_empty() {
        LinearChains {
            anchors,
            chains: Vec::new(),
        }
    } else if opt.rmq {
        chainer.chain_rmq(&lp, anchors)
    } else {
        chainer.chain_dp(&lp, anchors)
    };
    scratch.frag_gap = max_gap_ref;
    arena.release(mv);
    if opt.debug.lchain {
        log_lchains(graph, &lc);
    }

    let mut qseq: Vec<u8> = arena.acquire(qlen as usize);
    for s in qseqs.iter() {
        qseq.extend_from_slice(s.as_ref());
    }
    let gp = GraphChainParams {
        max_gap_ref,
        max_gap_qry,
        bw: opt.bw,
        max_skip: opt.max_gc_skip,
        max_seq_ext: opt.max_gc_seq_ext,
        ref_bonus: opt.ref_bonus,
        pen_gap,
        pen_skip,
        mask_level: opt.mask_level,
        qlen,
        hash,
    };
    let plans = if lc.chains.is_empty() {
        Vec::new()
    } else {
        chainer.chain_graph(graph, &gp, &lc, &qseq, &mini_pos)
    };
    let min_gc_cnt = opt.min_gc_cnt.max(0) as usize;
    let mut cs = ChainSet::assemble(&plans, &lc, min_gc_cnt, opt.min_gc_score, hash);
    cs.rep_len = rep_len;
    arena.release(qseq);
    arena.release(lc.anchors);
    arena.release(mini_pos);

    chainer.set_parent(&mut cs, opt.mask_level, opt.sub_diff);
    cs.filter_sub(opt.pri_ratio, k as i32 * 2, opt.best_n);
    cs.drop_filtered();
    chainer.set_mapq(&mut cs, qlen, n_mini, opt.min_gc_score);

    scratch.finish_query(qname, qlen, &opt.debug);
    cs
}

/// Map a single-segment query.
pub fn map<I, C>(
    index: &I,
    chainer: &C,
    seq: &[u8],
    scratch: &mut Scratch,
    opt: &MapOpt,
    qname: Option<&[u8]>,
) -> ChainSet
where
    I: MinimizerIndex + ?Sized,
    C: Chainer + ?Sized,
{
    map_frag(index, chainer, &[seq], scratch, opt, qname)
}
