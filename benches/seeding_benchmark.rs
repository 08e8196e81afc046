use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use gfamap::anchor::Anchor;
use gfamap::augment::{Contig, Insertion};
use gfamap::chain::{
    Chainer, GraphChainParams, GraphChainPlan, LinearChain, LinearChainParams, LinearChains,
};
use gfamap::expand::{expand_bulk, expand_heap};
use gfamap::gfa::{Graph, Vertex};
use gfamap::index::{MemIndex, MinimizerIndex};
use gfamap::scratch::Scratch;
use gfamap::seed::collect_matches;
use gfamap::sketch::collect_minimizers;
use gfamap::{map, MapOpt};

fn random_seq(len: usize, seed: u64) -> Vec<u8> {
    let mut x = seed ^ 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            b"ACGT"[(x & 3) as usize]
        })
        .collect()
}

/// A graph of `n` segments sharing a repeated block, so that some
/// minimizers have many occurrences.
fn repeat_graph(n: usize, len: usize) -> (Graph, Vec<u8>) {
    let block = random_seq(300, 7);
    let mut g = Graph::new();
    let mut first = Vec::new();
    for i in 0..n {
        let mut seq = random_seq(len, i as u64 + 1);
        seq.extend_from_slice(&block);
        if i == 0 {
            first = seq.clone();
        }
        g.add_segment(format!("s{}", i).as_bytes(), &seq).unwrap();
    }
    (g, first)
}

/// Every maximal run of anchors on one target strand is a chain.
struct RunChainer;

impl RunChainer {
    fn runs(&self, p: &LinearChainParams, anchors: Vec<Anchor>) -> LinearChains {
        let mut chains = Vec::new();
        let mut st = 0;
        for i in 1..=anchors.len() {
            if i == anchors.len()
                || (anchors[i].target, anchors[i].strand)
                    != (anchors[st].target, anchors[st].strand)
            {
                if (i - st) as i32 >= p.min_cnt {
                    chains.push(LinearChain::from_anchors(st, i - st, (i - st) as i32, &anchors));
                }
                st = i;
            }
        }
        LinearChains { anchors, chains }
    }
}

impl Chainer for RunChainer {
    fn chain_rmq(&self, p: &LinearChainParams, anchors: Vec<Anchor>) -> LinearChains {
        self.runs(p, anchors)
    }

    fn chain_dp(&self, p: &LinearChainParams, anchors: Vec<Anchor>) -> LinearChains {
        self.runs(p, anchors)
    }

    fn chain_graph(
        &self,
        _graph: &Graph,
        _p: &GraphChainParams,
        lc: &LinearChains,
        _qseq: &[u8],
        _mini_pos: &[u32],
    ) -> Vec<GraphChainPlan> {
        lc.chains
            .iter()
            .enumerate()
            .map(|(i, c)| GraphChainPlan {
                score: c.score,
                lchains: vec![i],
            })
            .collect()
    }
}

fn expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    for &n in [10usize, 40].iter() {
        let (g, first) = repeat_graph(n, 5000);
        let index = MemIndex::from_segments(g, 15, 10);
        let query = &first[2000..];
        let mut mv = Vec::new();
        collect_minimizers(15, 10, &[query], &mut mv);
        let mut mini_pos = Vec::new();
        let m = collect_matches(&index, 100, &mv, &mut mini_pos);
        let graph = index.graph();

        let mut fwd = Vec::new();
        let mut rev = Vec::new();
        let mut out = Vec::new();
        group.bench_with_input(BenchmarkId::new("heap", n), &m.groups, |b, groups| {
            b.iter(|| expand_heap(graph, groups, &mut fwd, &mut rev, &mut out));
        });
        group.bench_with_input(BenchmarkId::new("bulk", n), &m.groups, |b, groups| {
            b.iter(|| expand_bulk(graph, groups, None, &mut out));
        });
    }
    group.finish();
}

fn mapping(c: &mut Criterion) {
    let (g, first) = repeat_graph(20, 5000);
    let index = MemIndex::from_segments(g, 15, 10);
    let query = first[1000..4000].to_vec();
    let chainer = RunChainer;
    let mut scratch = Scratch::new();
    for &(id, heap_sort) in [("bulk", false), ("heap", true)].iter() {
        let opt = MapOpt {
            heap_sort,
            ..Default::default()
        };
        c.bench_with_input(BenchmarkId::new("map", id), &query, |b, q| {
            b.iter(|| map(&index, &chainer, q, &mut scratch, &opt, Some(b"q")));
        });
    }
}

fn augmenting(c: &mut Criterion) {
    let (g, _) = repeat_graph(50, 2000);
    let n_seg = g.n_seg() as u32;
    let mut ins = Vec::new();
    let mut contigs = Vec::new();
    for i in 0..1000u32 {
        let s = i % n_seg;
        let t = (i * 7 + 3) % n_seg;
        ins.push(Insertion {
            v: [Vertex::forward(s), Vertex::forward(t)],
            voff: [1 + i * 13 % 2000, 1 + i * 31 % 2000],
            coff: [0, i % 20],
        });
        contigs.push(Contig::new(format!("c{}", i).as_bytes(), &random_seq(20, i as u64)));
    }
    c.bench_function("augment 1000 insertions", |b| {
        b.iter(|| {
            let mut g = g.clone();
            g.augment(&ins, &contigs);
            g
        });
    });
}

criterion_group!(benches, expansion, mapping, augmenting);
criterion_main!(benches);
