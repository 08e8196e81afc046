use crate::anchor::Anchor;

#[inline]
fn is_neighbour(a: &Anchor, b: &Anchor, r: i64) -> Option<bool> {
    // `b` follows `a` in reference order
    let dr = b.ref_key() as i64 - a.ref_key() as i64;
    if dr > r {
        return None;
    }
    let dq = b.qpos as i64 - a.qpos as i64;
    Some((0..=r).contains(&dq))
}

/// Drop isolated anchors. `anchors` must be sorted by reference key;
/// an anchor is kept if another anchor lies within `r` of it along the
/// reference and within `[0, r]` along the query in the same
/// direction. The order of the kept anchors is unchanged. Returns the
/// number of anchors left.
pub fn filter_anchors(anchors: &mut Vec<Anchor>, r: i32) -> usize {
    let n = anchors.len();
    let r = r as i64;
    let mut kept = vec![false; n];

    for i in 0..n {
        for j in (0..i).rev() {
            match is_neighbour(&anchors[j], &anchors[i], r) {
                None => break,
                Some(false) => continue,
                Some(true) => {
                    kept[i] = true;
                    kept[j] = true;
                    break;
                }
            }
        }
    }
    for i in (0..n).rev() {
        if kept[i] {
            continue;
        }
        for j in i + 1..n {
            match is_neighbour(&anchors[i], &anchors[j], r) {
                None => break,
                Some(false) => continue,
                Some(true) => {
                    kept[i] = true;
                    kept[j] = true;
                    break;
                }
            }
        }
    }

    let mut i = 0;
    anchors.retain(|_| {
        let k = kept[i];
        i += 1;
        k
    });
    anchors.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfa::Orientation;
    use proptest::prelude::*;

    fn anchor(target: u32, tpos: i32, qpos: u32) -> Anchor {
        Anchor {
            target,
            tpos,
            qpos,
            span: 15,
            weight: 255,
            ..Default::default()
        }
    }

    #[test]
    fn isolated_anchors_are_dropped() {
        let mut v = vec![
            anchor(0, 100, 10),
            anchor(0, 150, 60),
            anchor(0, 5000, 70),
            anchor(1, 10, 80),
            anchor(1, 30, 75),
        ];
        let n = filter_anchors(&mut v, 100);
        assert_eq!(n, 2);
        assert_eq!(v, vec![anchor(0, 100, 10), anchor(0, 150, 60)]);
    }

    #[test]
    fn strands_do_not_pair() {
        let mut v = vec![anchor(0, 100, 10), anchor(0, 110, 20)];
        v[1].strand = Orientation::Backward;
        assert_eq!(filter_anchors(&mut v, 1000), 0);
    }

    #[test]
    fn empty_and_single() {
        let mut v = Vec::new();
        assert_eq!(filter_anchors(&mut v, 10), 0);
        let mut v = vec![anchor(0, 1, 1)];
        assert_eq!(filter_anchors(&mut v, 10), 0);
    }

    fn brute_force(v: &[Anchor], r: i64) -> Vec<Anchor> {
        (0..v.len())
            .filter(|&i| {
                (0..v.len()).any(|j| {
                    j != i && {
                        let (a, b) = if j < i { (&v[j], &v[i]) } else { (&v[i], &v[j]) };
                        is_neighbour(a, b, r) == Some(true)
                    }
                })
            })
            .map(|i| v[i])
            .collect()
    }

    proptest! {
        #[test]
        fn matches_pairwise_definition(
            raw in prop::collection::vec((0u32..3, any::<bool>(), 0i32..2000, 0u32..2000), 0..60),
            r in 1i32..300,
        ) {
            let mut v: Vec<Anchor> = raw
                .into_iter()
                .map(|(t, rev, tpos, qpos)| {
                    let mut a = anchor(t, tpos, qpos);
                    if rev {
                        a.strand = Orientation::Backward;
                    }
                    a
                })
                .collect();
            v.sort_by_key(|a| (a.ref_key(), a.query_key()));
            let expected = brute_force(&v, r as i64);
            filter_anchors(&mut v, r);
            prop_assert_eq!(v, expected);
        }
    }
}
