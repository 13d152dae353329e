/// Interpret up to the first 8 bytes as a little endian unsigned integer.
/// Bytes past the eighth do not fit and are ignored.
#[inline]
pub(crate) fn le_uint(data: &[u8]) -> u64 {
    data.iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (i * 8)))
}

/// Number of filler bytes needed to bring `position` to a 4 byte boundary
#[inline]
pub(crate) const fn padding_len(position: u64) -> u64 {
    match position % 4 {
        0 => 0,
        x => 4 - x,
    }
}
