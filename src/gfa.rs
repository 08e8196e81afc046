//! The in-memory sequence graph: segments, the arcs between oriented
//! segments, and the name tables both refer to.

pub mod names;
pub mod orientation;
pub mod vertex;

pub use self::names::*;
pub use self::orientation::*;
pub use self::vertex::*;

use bstr::{BStr, BString, ByteSlice};
use fnv::FnvHashSet;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// A segment of the graph. Besides the sequence itself, a segment
/// remembers where it came from: the path (or stable sequence) it was
/// cut out of, its offset on that path, and the rank of that path.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Segment {
    pub name: BString,
    pub seq: BString,
    pub len: u32,
    pub pnid: Option<u32>,
    pub ppos: u32,
    pub rank: u32,
}

impl Segment {
    pub fn new(name: &[u8], seq: &[u8]) -> Self {
        Segment {
            name: BString::from(name),
            seq: BString::from(seq),
            len: seq.len() as u32,
            ..Default::default()
        }
    }
}

/// A link from the end of oriented segment `v` to the start of
/// oriented segment `w`.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Arc {
    pub v: Vertex,
    pub w: Vertex,
    /// Cached length of the segment under `v`
    pub lv: u32,
    /// Cached length of the segment under `w`
    pub lw: u32,
    pub ov: u32,
    pub ow: u32,
    pub link_id: u64,
    pub del: bool,
    /// Set on arcs added as the reverse complement of another arc
    pub comp: bool,
}

/// A sequence graph. Arcs are looked up per source vertex through an
/// index that [`Graph::arc_index`] rebuilds; any change to `arcs`
/// leaves that index stale until it is rebuilt.
#[derive(Default, Debug, Clone)]
pub struct Graph {
    pub segs: Vec<Segment>,
    pub arcs: Vec<Arc>,
    arc_idx: Vec<(usize, usize)>,
    seg_names: NameMap,
    pub pnames: NameMap,
    pub max_rank: u32,
    /// Segments are sorted by path coordinates
    pub is_srt: bool,
    /// Every arc has its complement present
    pub is_symm: bool,
}

impl Graph {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn n_seg(&self) -> usize {
        self.segs.len()
    }

    #[inline]
    pub fn n_vtx(&self) -> usize {
        self.segs.len() * 2
    }

    #[inline]
    pub fn seg(&self, id: u32) -> Option<&Segment> {
        self.segs.get(id as usize)
    }

    #[inline]
    pub fn seg_len(&self, id: u32) -> Option<u32> {
        self.seg(id).map(|s| s.len)
    }

    pub fn segment_id<N: AsRef<[u8]>>(&self, name: N) -> Option<u32> {
        self.seg_names.map_name(name)
    }

    /// Add a segment with the given name and sequence, returning its
    /// index. Names must be unique.
    pub fn add_segment(&mut self, name: &[u8], seq: &[u8]) -> GraphResult<u32> {
        if self.seg_names.map_name(name).is_some() {
            return Err(GraphError::DuplicateSegment(name.into()));
        }
        let id = self.seg_names.get_or_insert(name);
        debug_assert_eq!(id as usize, self.segs.len());
        self.segs.push(Segment::new(name, seq));
        self.is_srt = false;
        Ok(id)
    }

    /// Register a path name, returning its id.
    pub fn add_pname<N: AsRef<[u8]>>(&mut self, name: N) -> u32 {
        self.pnames.get_or_insert(name)
    }

    pub fn pname(&self, pnid: u32) -> Option<&'_ BStr> {
        self.pnames.inverse_map_name(pnid)
    }

    /// The name positions on `seg` are reported against: its path
    /// name if it has one, otherwise the segment name.
    pub fn coord_name<'a>(&'a self, seg: &'a Segment) -> &'a BStr {
        seg.pnid
            .and_then(|id| self.pname(id))
            .unwrap_or_else(|| seg.name.as_bstr())
    }

    fn check_vertex(&self, v: Vertex) -> GraphResult<()> {
        if (v.seg() as usize) < self.segs.len() {
            Ok(())
        } else {
            Err(GraphError::SegmentOutOfRange(v.seg()))
        }
    }

    /// Add an arc `v -> w`, returning its position in `arcs`. The
    /// arc index must be rebuilt before querying the new arc.
    pub fn add_arc(
        &mut self,
        v: Vertex,
        w: Vertex,
        ov: u32,
        ow: u32,
    ) -> GraphResult<usize> {
        self.check_vertex(v)?;
        self.check_vertex(w)?;
        let id = self.arcs.len();
        self.arcs.push(Arc {
            v,
            w,
            lv: self.segs[v.seg() as usize].len,
            lw: self.segs[w.seg() as usize].len,
            ov,
            ow,
            link_id: id as u64,
            del: false,
            comp: false,
        });
        self.is_symm = false;
        Ok(id)
    }

    /// Refresh the cached segment lengths on every arc.
    pub fn fix_arc_len(&mut self) {
        let segs = &self.segs;
        for a in self.arcs.iter_mut() {
            a.lv = segs[a.v.seg() as usize].len;
            a.lw = segs[a.w.seg() as usize].len;
        }
    }

    /// Sort arcs by source vertex, then by destination.
    pub fn arc_sort(&mut self) {
        self.arcs.sort_by_key(|a| (a.v, a.w));
    }

    /// Rebuild the per-vertex arc index. Arcs must be sorted.
    pub fn arc_index(&mut self) {
        let n_vtx = self.n_vtx();
        self.arc_idx.clear();
        self.arc_idx.resize(n_vtx, (0, 0));
        let mut st = 0;
        for i in 1..=self.arcs.len() {
            if i == self.arcs.len() || self.arcs[i].v != self.arcs[st].v {
                let v = self.arcs[st].v.index();
                if v < n_vtx {
                    self.arc_idx[v] = (st, i - st);
                }
                st = i;
            }
        }
    }

    /// Arcs leaving `v`, according to the last [`Graph::arc_index`].
    pub fn arcs(&self, v: Vertex) -> &[Arc] {
        match self.arc_idx.get(v.index()) {
            Some(&(st, n)) => &self.arcs[st..st + n],
            None => &[],
        }
    }

    pub fn find_arc(&self, v: Vertex, w: Vertex) -> Option<&Arc> {
        self.arcs(v).iter().find(|a| a.w == w && !a.del)
    }

    /// Add the complement `w' -> v'` of every arc that lacks one, then
    /// re-sort and re-index.
    pub fn symmetrize(&mut self) {
        let present: FnvHashSet<(Vertex, Vertex)> =
            self.arcs.iter().map(|a| (a.v, a.w)).collect();
        let missing: Vec<Arc> = self
            .arcs
            .iter()
            .filter(|a| !present.contains(&(a.w.flip(), a.v.flip())))
            .map(|a| Arc {
                v: a.w.flip(),
                w: a.v.flip(),
                lv: a.lw,
                lw: a.lv,
                ov: a.ow,
                ow: a.ov,
                link_id: a.link_id,
                del: a.del,
                comp: true,
            })
            .collect();
        self.arcs.extend(missing);
        self.arc_sort();
        self.arc_index();
        self.is_symm = true;
    }

    /// Drop every segment name and rename segment `i` to `v{i}`.
    pub(crate) fn rename_segments(&mut self) {
        self.seg_names.clear();
        for (i, s) in self.segs.iter_mut().enumerate() {
            s.name = format!("v{}", i).into();
            self.seg_names.get_or_insert(&s.name);
        }
    }
}
