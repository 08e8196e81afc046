/// Invertible integer hash over the low bits selected by `mask`. Used
/// to order k-mers when picking minimizers.
#[inline]
pub fn hash64(key: u64, mask: u64) -> u64 {
    let mut key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    key = (key.wrapping_add(key << 3)).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    key = (key.wrapping_add(key << 2)).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key = key.wrapping_add(key << 31) & mask;
    key
}

/// Thomas Wang's 32-bit integer hash.
#[inline]
pub fn wang_hash(key: u32) -> u32 {
    let mut key = key;
    key = key.wrapping_add(!(key << 15));
    key ^= key >> 10;
    key = key.wrapping_add(key << 3);
    key ^= key >> 6;
    key = key.wrapping_add(!(key << 11));
    key ^= key >> 16;
    key
}

/// The classic `h * 31 + c` string hash, seeded with the first byte.
#[inline]
pub fn x31_hash(s: &[u8]) -> u32 {
    match s.split_first() {
        None => 0,
        Some((&first, rest)) => rest.iter().fold(first as u32, |h, &c| {
            (h << 5).wrapping_sub(h).wrapping_add(c as u32)
        }),
    }
}
