use bstr::BString;
use fnv::FnvHashSet;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::gfa::{Arc, Graph, Segment, Vertex};

/// A stretch of contig sequence to be spliced into the graph. It
/// leaves the graph at offset `voff[0]` on oriented segment `v[0]`
/// and comes back in at offset `voff[1]` on `v[1]`; `coff` is the
/// half-open range of contig sequence in between, possibly empty.
/// Offsets are on the strand of the respective vertex.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Insertion {
    pub v: [Vertex; 2],
    pub voff: [u32; 2],
    pub coff: [u32; 2],
}

/// Name and sequence of the contig an insertion was taken from.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Contig {
    pub name: BString,
    pub seq: BString,
}

impl Contig {
    pub fn new(name: &[u8], seq: &[u8]) -> Self {
        Contig {
            name: name.into(),
            seq: seq.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitPoint {
    seg: u32,
    /// Forward-strand position << 1 | which side of it is attached to
    side: u64,
    ins: usize,
    end: usize,
}

impl SplitPoint {
    #[inline]
    fn pos(&self) -> u32 {
        (self.side >> 1) as u32
    }
}

/// Maps each oriented vertex of the graph before a split to the
/// vertex whose end coincides with its end afterwards: the last
/// piece on the forward strand, the first piece on the reverse one.
#[derive(Debug, Clone)]
pub(crate) struct VertexMap {
    exits: Vec<Vertex>,
}

impl VertexMap {
    fn new(n_seg: usize) -> Self {
        VertexMap {
            exits: vec![Vertex::default(); n_seg * 2],
        }
    }

    fn set(&mut self, seg: usize, first: u32, last: u32) {
        self.exits[seg << 1] = Vertex::forward(last);
        self.exits[seg << 1 | 1] = Vertex::backward(first);
    }

    /// Where an arc leaving old `v` now leaves from.
    #[inline]
    pub(crate) fn exit(&self, v: Vertex) -> Vertex {
        self.exits[v.index()]
    }

    /// Where an arc entering old `w` now enters.
    #[inline]
    pub(crate) fn entry(&self, w: Vertex) -> Vertex {
        self.exit(w.flip()).flip()
    }
}

fn piece(s: &Segment, st: u32, en: u32) -> Segment {
    let seq = if s.seq.len() == s.len as usize {
        BString::from(&s.seq[st as usize..en as usize])
    } else {
        BString::default()
    };
    Segment {
        name: BString::default(),
        seq,
        len: en - st,
        pnid: s.pnid,
        ppos: s.ppos + st,
        rank: s.rank,
    }
}

/// Add a zero-overlap arc `v -> w` unless the graph already has one.
fn link(
    arcs: &mut Vec<Arc>,
    present: &mut FnvHashSet<(Vertex, Vertex)>,
    v: Vertex,
    w: Vertex,
) {
    if !present.insert((v, w)) {
        return;
    }
    let link_id = arcs.len() as u64;
    arcs.push(Arc {
        v,
        w,
        link_id,
        ..Default::default()
    });
}

impl Graph {
    /// Splice insertions into the graph. Every segment is cut at each
    /// distinct position an insertion is anchored to, contig material
    /// becomes new segments tagged with the contig name as path and
    /// rank `max_rank + 1`, and all arcs are rewired to the pieces.
    /// Segments are renamed `v{index}` afterwards.
    ///
    /// Contig `i` provides the sequence for insertion `i`.
    ///
    /// # Panics
    ///
    /// If an insertion is anchored at the very start of a segment on
    /// the side leaving it, or at the very end on the side entering
    /// it, or refers to a contig range that doesn't exist.
    pub fn augment(&mut self, ins: &[Insertion], contigs: &[Contig]) {
        if ins.is_empty() || contigs.is_empty() {
            return;
        }
        let n_old = self.segs.len();

        let mut points = Vec::with_capacity(ins.len() * 2);
        for (i, p) in ins.iter().enumerate() {
            for end in 0..2 {
                let v = p.v[end];
                let len = self.segs[v.seg() as usize].len;
                assert!(
                    p.voff[end] <= len,
                    "insertion {} end {}: offset {} past segment end",
                    i,
                    end,
                    p.voff[end]
                );
                let pos = if v.is_reverse() {
                    len - p.voff[end]
                } else {
                    p.voff[end]
                };
                let side = (pos as u64) << 1 | (v.orient().bit() ^ end as u32) as u64;
                assert!(
                    side != 0 && side != ((len as u64) << 1 | 1),
                    "insertion {} end {} is anchored outside segment {}",
                    i,
                    end,
                    v.seg()
                );
                points.push(SplitPoint {
                    seg: v.seg(),
                    side,
                    ins: i,
                    end,
                });
            }
        }
        points.sort_by_key(|p| (p.seg, p.side));

        let mut n_pieces = n_old;
        for (k, p) in points.iter().enumerate() {
            let len = self.segs[p.seg as usize].len;
            let repeated = k > 0 && {
                let q = &points[k - 1];
                q.seg == p.seg && q.pos() == p.pos()
            };
            if !repeated && p.pos() > 0 && p.pos() < len {
                n_pieces += 1;
            }
        }
        let n_ctg = ins.iter().filter(|p| p.coff[1] > p.coff[0]).count();
        let n_new = n_pieces + n_ctg;

        let old_segs = std::mem::take(&mut self.segs);
        let mut segs = Vec::with_capacity(n_new);
        let mut map = VertexMap::new(n_old);
        let mut sides = vec![[Vertex::default(); 2]; ins.len()];
        let mut runs = Vec::with_capacity(n_old);

        let mut k = 0;
        for (j, s) in old_segs.iter().enumerate() {
            let first = segs.len() as u32;
            let mut off = 0;
            while k < points.len() && points[k].seg as usize == j {
                let p = points[k];
                let pos = p.pos();
                if pos > off && pos < s.len {
                    segs.push(piece(s, off, pos));
                    off = pos;
                }
                let cur = segs.len() as u32;
                sides[p.ins][p.end] = if p.side & 1 == 1 {
                    Vertex::backward(cur)
                } else if pos == s.len {
                    Vertex::forward(cur)
                } else {
                    Vertex::forward(cur - 1)
                };
                k += 1;
            }
            segs.push(piece(s, off, s.len));
            let last = segs.len() as u32 - 1;
            map.set(j, first, last);
            runs.push((first, last));
        }
        assert_eq!(segs.len(), n_pieces);

        let rank = self.max_rank + 1;
        let mut ins_seg = vec![None; ins.len()];
        for (i, p) in ins.iter().enumerate() {
            if p.coff[1] <= p.coff[0] {
                continue;
            }
            assert!(i < contigs.len(), "no contig for insertion {}", i);
            let ctg = &contigs[i];
            let (st, en) = (p.coff[0] as usize, p.coff[1] as usize);
            assert!(
                en <= ctg.seq.len(),
                "insertion {} runs past the end of contig {}",
                i,
                ctg.name
            );
            let pnid = self.pnames.get_or_insert(&ctg.name);
            ins_seg[i] = Some(segs.len() as u32);
            segs.push(Segment {
                name: BString::default(),
                seq: BString::from(&ctg.seq[st..en]),
                len: (en - st) as u32,
                pnid: Some(pnid),
                ppos: p.coff[0],
                rank,
            });
        }
        assert_eq!(segs.len(), n_new);

        for a in self.arcs.iter_mut() {
            a.v = map.exit(a.v);
            a.w = map.entry(a.w);
        }
        let mut present: FnvHashSet<(Vertex, Vertex)> =
            self.arcs.iter().map(|a| (a.v, a.w)).collect();
        let arcs = &mut self.arcs;
        for &(first, last) in runs.iter() {
            for s in first..last {
                link(arcs, &mut present, Vertex::forward(s), Vertex::forward(s + 1));
            }
        }
        for (side, seg) in sides.iter().zip(ins_seg.iter()) {
            match seg {
                Some(c) => {
                    let c = Vertex::forward(*c);
                    link(arcs, &mut present, side[0], c);
                    link(arcs, &mut present, c, side[1].flip());
                }
                None => link(arcs, &mut present, side[0], side[1].flip()),
            }
        }

        self.segs = segs;
        if n_ctg > 0 {
            self.max_rank = rank;
        }
        self.fix_arc_len();
        self.rename_segments();
        self.is_srt = false;
        self.is_symm = false;
        self.arc_sort();
        self.arc_index();

        log::debug!(
            "augment: {} insertions, {} -> {} segments ({} from contigs), {} arcs",
            ins.len(),
            n_old,
            n_new,
            n_ctg,
            self.arcs.len()
        );
    }
}
