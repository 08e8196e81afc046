use std::cmp::Reverse;
use std::collections::binary_heap::{BinaryHeap, PeekMut};

/// Lazy merge of any number of sorted iterators. Yields each item
/// together with the index of the source it came from; equal items
/// come out in source order.
pub struct KMerge<I>
where
    I: Iterator,
    I::Item: Ord,
{
    heap: BinaryHeap<Reverse<(I::Item, usize)>>,
    sources: Vec<I>,
}

impl<I> KMerge<I>
where
    I: Iterator,
    I::Item: Ord,
{
    pub fn new<S: IntoIterator<Item = I>>(sources: S) -> Self {
        let mut sources: Vec<I> = sources.into_iter().collect();
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (i, src) in sources.iter_mut().enumerate() {
            if let Some(x) = src.next() {
                heap.push(Reverse((x, i)));
            }
        }
        KMerge { heap, sources }
    }
}

impl<I> Iterator for KMerge<I>
where
    I: Iterator,
    I::Item: Ord,
{
    type Item = (usize, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let mut top = self.heap.peek_mut()?;
        let src = (top.0).1;
        match self.sources[src].next() {
            Some(next) => {
                // replace the top in place; the heap is restored when
                // `top` is dropped
                let Reverse((item, _)) = std::mem::replace(&mut *top, Reverse((next, src)));
                Some((src, item))
            }
            None => {
                let Reverse((item, _)) = PeekMut::pop(top);
                Some((src, item))
            }
        }
    }
}

/// Reverse every maximal run of consecutive elements sharing a key.
pub fn reverse_runs_by_key<T, K, F>(v: &mut [T], mut key: F)
where
    K: PartialEq,
    F: FnMut(&T) -> K,
{
    let mut st = 0;
    while st < v.len() {
        let k = key(&v[st]);
        let mut en = st + 1;
        while en < v.len() && key(&v[en]) == k {
            en += 1;
        }
        v[st..en].reverse();
        st = en;
    }
}

/// Merge two slices, each sorted by `key`, onto the end of `out`.
/// Elements of `a` go first on ties.
pub fn merge_sorted_by_key<T, K, F>(a: &[T], b: &[T], out: &mut Vec<T>, mut key: F)
where
    T: Copy,
    K: Ord,
    F: FnMut(&T) -> K,
{
    out.reserve(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if key(&a[i]) <= key(&b[j]) {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}
