use crate::anchor::{reflect, Anchor};
use crate::gfa::{Graph, Orientation};
use crate::index::Occurrence;
use crate::kmerge::{merge_sorted_by_key, reverse_runs_by_key, KMerge};
use crate::seed::MatchGroup;

#[inline]
fn make_anchor(graph: &Graph, g: &MatchGroup<'_>, occ: Occurrence) -> Anchor {
    let (strand, tpos) = if occ.strand == g.qstrand {
        (Orientation::Forward, occ.pos as i32)
    } else {
        let len = graph.segs[occ.seg as usize].len;
        (Orientation::Backward, reflect(len, occ.pos, g.span))
    };
    Anchor {
        target: occ.seg,
        strand,
        tpos,
        qpos: g.qpos,
        span: g.span as u8,
        seg: g.seg as u8,
        tandem: g.tandem,
        weight: g.weight,
    }
}

/// Expand match groups into anchors sorted by reference key, merging
/// the already sorted occurrence lists instead of sorting. `fwd` and
/// `rev` are working space.
///
/// Occurrences come out in increasing position, so anchors on the
/// reverse strand come out decreasing within each target; those runs
/// are flipped before the two strands are merged.
pub fn expand_heap(
    graph: &Graph,
    groups: &[MatchGroup<'_>],
    fwd: &mut Vec<Anchor>,
    rev: &mut Vec<Anchor>,
    out: &mut Vec<Anchor>,
) {
    fwd.clear();
    rev.clear();
    out.clear();
    let sources = groups.iter().map(|g| g.occs.iter().copied());
    for (i, occ) in KMerge::new(sources) {
        let a = make_anchor(graph, &groups[i], occ);
        if a.strand.is_reverse() {
            rev.push(a);
        } else {
            fwd.push(a);
        }
    }
    reverse_runs_by_key(rev, |a| a.target);
    merge_sorted_by_key(fwd, rev, out, |a| a.ref_key());
}

/// Expand every match group into anchors, then sort by reference key
/// and query key. With `self_name` set, hits of the query onto its
/// own position in the graph are left out: same strand, same
/// coordinate name, and a path position equal to the query position.
pub fn expand_bulk(
    graph: &Graph,
    groups: &[MatchGroup<'_>],
    self_name: Option<&[u8]>,
    out: &mut Vec<Anchor>,
) {
    out.clear();
    for g in groups.iter() {
        for &occ in g.occs.iter() {
            if let Some(qname) = self_name {
                let seg = &graph.segs[occ.seg as usize];
                if occ.strand == g.qstrand
                    && seg.ppos as u64 + occ.pos as u64 == g.qpos as u64
                    && graph.coord_name(seg) == qname
                {
                    continue;
                }
            }
            out.push(make_anchor(graph, g, occ));
        }
    }
    out.sort_unstable_by_key(|a| (a.ref_key(), a.query_key()));
}
