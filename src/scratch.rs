use std::mem::size_of;

use bstr::ByteSlice;

use crate::anchor::Anchor;
use crate::options::DebugFlags;
use crate::sketch::Minimizer;

/// Once any pooled buffer grows past this many bytes, the arena is
/// thrown away after the query instead of being kept for reuse.
pub const LARGE_BLOCK: usize = 1 << 28;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes held by pooled buffers
    pub capacity: usize,
    /// Buffers currently back in the pool
    pub n_blocks: usize,
    /// Buffers the arena ever handed out
    pub n_cores: usize,
    /// Bytes held by the largest pooled buffer
    pub largest: usize,
}

/// Free list of buffers of one element type.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<Vec<T>>,
    n_cores: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool {
            free: Vec::new(),
            n_cores: 0,
        }
    }
}

impl<T> Pool<T> {
    fn acquire(&mut self, cap: usize) -> Vec<T> {
        match self.free.pop() {
            Some(mut v) => {
                v.clear();
                v.reserve(cap);
                v
            }
            None => {
                self.n_cores += 1;
                Vec::with_capacity(cap)
            }
        }
    }

    fn release(&mut self, mut v: Vec<T>) {
        v.clear();
        self.free.push(v);
    }

    fn add_stats(&self, st: &mut ArenaStats) {
        st.n_cores += self.n_cores;
        st.n_blocks += self.free.len();
        for v in self.free.iter() {
            let bytes = v.capacity() * size_of::<T>();
            st.capacity += bytes;
            st.largest = st.largest.max(bytes);
        }
    }
}

/// Element types the arena keeps buffers for.
pub trait Pooled: Sized {
    fn pool(arena: &mut ScratchArena) -> &mut Pool<Self>;
}

macro_rules! impl_pooled {
    ($($t:ty => $field:ident),* $(,)?) => {
        $(
            impl Pooled for $t {
                #[inline]
                fn pool(arena: &mut ScratchArena) -> &mut Pool<Self> {
                    &mut arena.$field
                }
            }
        )*
    };
}

/// Reusable buffers for the mapping of one query at a time. Every
/// buffer acquired while mapping a query must be released before the
/// query is done.
#[derive(Default, Debug)]
pub struct ScratchArena {
    anchors: Pool<Anchor>,
    minimizers: Pool<Minimizer>,
    positions: Pool<u32>,
    bytes: Pool<u8>,
}

impl_pooled!(
    Anchor => anchors,
    Minimizer => minimizers,
    u32 => positions,
    u8 => bytes,
);

impl ScratchArena {
    pub fn new() -> Self {
        Default::default()
    }

    /// An empty buffer with room for at least `cap` elements.
    pub fn acquire<T: Pooled>(&mut self, cap: usize) -> Vec<T> {
        T::pool(self).acquire(cap)
    }

    pub fn release<T: Pooled>(&mut self, v: Vec<T>) {
        T::pool(self).release(v)
    }

    pub fn stats(&self) -> ArenaStats {
        let mut st = ArenaStats::default();
        self.anchors.add_stats(&mut st);
        self.minimizers.add_stats(&mut st);
        self.positions.add_stats(&mut st);
        self.bytes.add_stats(&mut st);
        st
    }

    /// True if a buffer handed out is still missing.
    pub fn leaked(&self) -> bool {
        let st = self.stats();
        st.n_blocks != st.n_cores
    }
}

/// Per-worker state for mapping: one arena, plus the reference gap
/// bound of the last query.
#[derive(Debug)]
pub struct Scratch {
    pub arena: ScratchArena,
    pub frag_gap: i32,
    reset_above: usize,
}

impl Default for Scratch {
    fn default() -> Self {
        Scratch {
            arena: ScratchArena::new(),
            frag_gap: 0,
            reset_above: LARGE_BLOCK,
        }
    }
}

impl Scratch {
    pub fn new() -> Self {
        Default::default()
    }

    /// Scratch space that drops its arena once a buffer holds more
    /// than `bytes` bytes.
    pub fn with_reset_threshold(bytes: usize) -> Self {
        Scratch {
            reset_above: bytes,
            ..Default::default()
        }
    }

    /// Bookkeeping after a query: log arena statistics if asked to,
    /// abort the process if a buffer leaked, and drop the arena if it
    /// grew too large.
    pub fn finish_query(&mut self, qname: Option<&[u8]>, qlen: u32, debug: &DebugFlags) {
        let st = self.arena.stats();
        let name = qname.unwrap_or(b"*").as_bstr();
        if debug.qname {
            log::debug!(
                "QM\t{}\t{}\tcap={},nCore={},largest={}",
                name,
                qlen,
                st.capacity,
                st.n_cores,
                st.largest
            );
        }
        if st.n_blocks != st.n_cores {
            log::error!(
                "scratch buffers leaked while mapping {} ({} of {} returned)",
                name,
                st.n_blocks,
                st.n_cores
            );
            std::process::abort();
        }
        if st.largest > self.reset_above {
            log::debug!("resetting scratch arena after {} ({} bytes)", name, st.largest);
            self.arena = ScratchArena::new();
        }
    }
}
