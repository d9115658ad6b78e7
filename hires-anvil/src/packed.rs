//! Fixed-width integers packed into arrays of 64-bit words.
//!
//! Chunk data stores palette indices and heightmaps this way. Two layouts
//! exist on disk:
//! - straddled (data versions < 2500): values are laid out back to back and
//!   may span two words.
//! - aligned (data versions >= 2500): each word holds `64 / bits` values,
//!   the remaining high bits are unused.

#[inline]
fn mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Read element `index` from a straddled long array.
///
/// Indices beyond the array yield 0.
pub fn value_from_long_array(data: &[i64], index: usize, bits: u32) -> u64 {
    let bit_index = index * bits as usize;
    let first = bit_index >> 6;
    let offset = (bit_index & 0x3F) as u32;
    if first >= data.len() {
        return 0;
    }

    let mut value = (data[first] as u64) >> offset;
    if offset > 0 && first + 1 < data.len() {
        value |= (data[first + 1] as u64) << (64 - offset);
    }
    value & mask(bits)
}

/// Read element `index` from an aligned long array.
///
/// Indices beyond the array, and widths that do not fit a word, yield 0.
pub fn value_from_aligned_long_array(data: &[i64], index: usize, bits: u32) -> u64 {
    if bits == 0 || bits > 64 {
        return 0;
    }
    let per_long = (64 / bits) as usize;
    let long_index = index / per_long;
    if long_index >= data.len() {
        return 0;
    }
    let bit = ((index % per_long) as u32) * bits;
    ((data[long_index] as u64) >> bit) & mask(bits)
}

/// Number of words a straddled array of `count` values needs.
pub fn straddled_len(count: usize, bits: u32) -> usize {
    (count * bits as usize).div_ceil(64)
}

/// Number of words an aligned array of `count` values needs.
pub fn aligned_len(count: usize, bits: u32) -> usize {
    if bits == 0 || bits > 64 {
        return 0;
    }
    count.div_ceil((64 / bits) as usize)
}

/// Smallest `n` so that `2^n >= value`.
pub fn ceil_log2(value: usize) -> u32 {
    if value <= 1 { 0 } else { usize::BITS - (value - 1).leading_zeros() }
}

/// Pack values back to back, the inverse of [`value_from_long_array`].
pub fn pack_straddled(values: &[u64], bits: u32) -> Vec<i64> {
    let mut data = vec![0u64; straddled_len(values.len(), bits)];
    let m = mask(bits);
    for (index, value) in values.iter().enumerate() {
        let value = value & m;
        let bit_index = index * bits as usize;
        let first = bit_index >> 6;
        let offset = (bit_index & 0x3F) as u32;
        data[first] |= value << offset;
        if offset > 0 && offset + bits > 64 {
            data[first + 1] |= value >> (64 - offset);
        }
    }
    data.into_iter().map(|w| w as i64).collect()
}

/// Pack values without spanning words, the inverse of [`value_from_aligned_long_array`].
pub fn pack_aligned(values: &[u64], bits: u32) -> Vec<i64> {
    if bits == 0 || bits > 64 {
        return Vec::new();
    }
    let mut data = vec![0u64; aligned_len(values.len(), bits)];
    let per_long = (64 / bits) as usize;
    let m = mask(bits);
    for (index, value) in values.iter().enumerate() {
        let bit = ((index % per_long) as u32) * bits;
        data[index / per_long] |= (value & m) << bit;
    }
    data.into_iter().map(|w| w as i64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random(count: usize, bits: u32, seed: u64) -> Vec<u64> {
        let mut state = seed | 1;
        (0..count)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state & mask(bits)
            })
            .collect()
    }

    #[test]
    fn test_straddled_round_trip() {
        for bits in 1..=32 {
            for &count in &[0usize, 1, 63, 64, 4096, 10000] {
                let values = pseudo_random(count, bits, bits as u64 * 7919 + count as u64);
                let packed = pack_straddled(&values, bits);
                assert_eq!(packed.len(), straddled_len(count, bits));
                let unpacked: Vec<u64> = (0..count)
                    .map(|i| value_from_long_array(&packed, i, bits))
                    .collect();
                assert_eq!(unpacked, values, "bits {} count {}", bits, count);
            }
        }
    }

    #[test]
    fn test_aligned_round_trip() {
        for bits in 1..=32 {
            for &count in &[0usize, 1, 64, 4096, 10000] {
                let values = pseudo_random(count, bits, bits as u64 * 104729 + count as u64);
                let packed = pack_aligned(&values, bits);
                let unpacked: Vec<u64> = (0..count)
                    .map(|i| value_from_aligned_long_array(&packed, i, bits))
                    .collect();
                assert_eq!(unpacked, values, "bits {} count {}", bits, count);
            }
        }
    }

    #[test]
    fn test_value_straddles_word_boundary() {
        // 5 bits: element 12 occupies bits 60..65
        let mut data = vec![0i64; 2];
        data[0] = (0b1011u64 << 60) as i64;
        data[1] = 0b1;
        assert_eq!(value_from_long_array(&data, 12, 5), 0b11011);
    }

    #[test]
    fn test_out_of_range_index_is_zero() {
        assert_eq!(value_from_long_array(&[], 5, 4), 0);
        assert_eq!(value_from_aligned_long_array(&[-1], 16, 4), 0);
        assert_eq!(value_from_aligned_long_array(&[-1], 15, 4), 0xF);
    }

    #[test]
    fn test_oversized_width_reads_zero() {
        let data = vec![-1i64; 4160];
        assert_eq!(value_from_aligned_long_array(&data, 273, 65), 0);
        assert_eq!(aligned_len(4096, 65), 0);
        assert!(pack_aligned(&[1, 2, 3], 65).is_empty());
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(0), 0);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(16), 4);
        assert_eq!(ceil_log2(17), 5);
    }

    #[test]
    fn test_straddled_length_matches_section_formula() {
        // bits_per_block = len * 64 / 4096
        for bits in 4..=14 {
            let len = straddled_len(4096, bits);
            assert_eq!(len * 64 / 4096, bits as usize);
        }
    }
}
