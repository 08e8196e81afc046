#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::gfa::Orientation;
use crate::hash::hash64;

/// A query minimizer. `pos` is the position of the last base of the
/// k-mer; `strand` is Backward when the reverse complement k-mer was
/// the smaller of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Minimizer {
    pub hash: u64,
    pub span: u32,
    /// Index of the query segment the minimizer was found on
    pub seg: u32,
    pub pos: u32,
    pub strand: Orientation,
}

impl Minimizer {
    /// Start of the k-mer, one past its end.
    #[inline]
    pub fn range(&self) -> (u32, u32) {
        let en = self.pos + 1;
        (en - self.span, en)
    }
}

const fn nt4_table() -> [u8; 256] {
    let mut t = [4u8; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t[b'U' as usize] = 3;
    t[b'u' as usize] = 3;
    t
}

static SEQ_NT4: [u8; 256] = nt4_table();

/// `(hash << 8 | span, seg << 32 | pos << 1 | strand)`; all ones is empty.
type Slot = (u64, u64);

const EMPTY: Slot = (u64::MAX, u64::MAX);

#[inline]
fn emit(out: &mut Vec<Minimizer>, s: Slot) {
    out.push(Minimizer {
        hash: s.0 >> 8,
        span: (s.0 & 0xff) as u32,
        seg: (s.1 >> 32) as u32,
        pos: (s.1 as u32) >> 1,
        strand: Orientation::from_bit(s.1 as u32),
    });
}

/// Append the (w, k)-minimizers of `seq` to `out`, tagging them with
/// segment index `seg`. Symmetric k-mers are skipped, any base other
/// than ACGT/U restarts the k-mer, and when several k-mers in a window
/// share the minimal hash all of them are kept.
///
/// # Panics
///
/// If `w` isn't within 1..256 or `k` isn't within 1..=28.
pub fn sketch(seq: &[u8], w: usize, k: usize, seg: u32, out: &mut Vec<Minimizer>) {
    assert!(w > 0 && w < 256, "window size {} out of range", w);
    assert!(k > 0 && k <= 28, "k-mer size {} out of range", k);

    let shift1 = 2 * (k - 1);
    let mask = (1u64 << (2 * k)) - 1;
    let mut kmer = [0u64; 2];
    let mut buf = [EMPTY; 256];
    let buf = &mut buf[..w];
    let (mut l, mut buf_pos, mut min_pos) = (0usize, 0usize, 0usize);
    let mut min = EMPTY;

    for (i, &b) in seq.iter().enumerate() {
        let c = SEQ_NT4[b as usize] as u64;
        let mut info = EMPTY;
        if c < 4 {
            kmer[0] = (kmer[0] << 2 | c) & mask;
            kmer[1] = (kmer[1] >> 2) | (3 ^ c) << shift1;
            if kmer[0] == kmer[1] {
                continue;
            }
            let z = if kmer[0] < kmer[1] { 0 } else { 1 };
            l += 1;
            if l >= k {
                info = (
                    hash64(kmer[z], mask) << 8 | k as u64,
                    (seg as u64) << 32 | (i as u64) << 1 | z as u64,
                );
            }
        } else {
            l = 0;
        }
        buf[buf_pos] = info;

        // first full window: keep every k-mer tied with the minimum
        if l == w + k - 1 && min.0 != u64::MAX {
            for j in (buf_pos + 1..w).chain(0..buf_pos) {
                if min.0 == buf[j].0 && buf[j].1 != min.1 {
                    emit(out, buf[j]);
                }
            }
        }

        if info.0 <= min.0 {
            if l >= w + k && min.0 != u64::MAX {
                emit(out, min);
            }
            min = info;
            min_pos = buf_pos;
        } else if buf_pos == min_pos {
            // the minimum slid out of the window
            if l >= w + k - 1 && min.0 != u64::MAX {
                emit(out, min);
            }
            min.0 = u64::MAX;
            for j in (buf_pos + 1..w).chain(0..=buf_pos) {
                if min.0 >= buf[j].0 {
                    min = buf[j];
                    min_pos = j;
                }
            }
            if l >= w + k - 1 && min.0 != u64::MAX {
                for j in (buf_pos + 1..w).chain(0..=buf_pos) {
                    if min.0 == buf[j].0 && min.1 != buf[j].1 {
                        emit(out, buf[j]);
                    }
                }
            }
        }

        buf_pos += 1;
        if buf_pos == w {
            buf_pos = 0;
        }
    }
    if min.0 != u64::MAX {
        emit(out, min);
    }
}

/// Sketch every segment of a multi-segment query into `out`. Positions
/// are shifted onto the concatenation of the segments, in order.
pub fn collect_minimizers<S: AsRef<[u8]>>(
    k: usize,
    w: usize,
    qseqs: &[S],
    out: &mut Vec<Minimizer>,
) {
    out.clear();
    let mut sum = 0u32;
    for (i, seq) in qseqs.iter().enumerate() {
        let seq = seq.as_ref();
        let n0 = out.len();
        sketch(seq, w, k, i as u32, out);
        for m in out[n0..].iter_mut() {
            m.pos += sum;
        }
        sum += seq.len() as u32;
    }
}
