// SPDX-License-Identifier: MIT

//! Bit manipulation over byte slices.
//!
//! The sspos bitmap stores one bit per data block, LSB first:
//! block `k` lives in byte `k / 8`, bit `k % 8`. The same helpers back the
//! in-memory reachability map built by the checker.

/// Extension trait for bitmap operations on byte slices.
pub trait BitmapOps {
    /// Sets or clears a bit. Out of range bits are ignored.
    fn set_bit(&mut self, bit: usize, value: bool);

    /// Returns `false` for out of range bits.
    fn get_bit(&self, bit: usize) -> bool;

    /// Finds the lowest zero bit at or after `start`, below `limit`.
    fn find_first_zero(&self, start: usize, limit: usize) -> Option<usize>;

    /// Number of set bits below `limit`.
    fn count_ones_below(&self, limit: usize) -> usize;
}

impl BitmapOps for [u8] {
    #[inline]
    fn set_bit(&mut self, bit: usize, value: bool) {
        if let Some(byte) = self.get_mut(bit / 8) {
            let mask = 1u8 << (bit % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    #[inline]
    fn get_bit(&self, bit: usize) -> bool {
        self.get(bit / 8)
            .is_some_and(|b| (b & (1 << (bit % 8))) != 0)
    }

    fn find_first_zero(&self, start: usize, limit: usize) -> Option<usize> {
        let limit = limit.min(self.len() * 8);
        let mut bit = start;
        while bit < limit {
            let byte = self[bit / 8];
            if bit % 8 == 0 && byte == 0xFF {
                bit += 8;
                continue;
            }
            // Mask off the bits below `bit` inside this byte.
            let free = !byte & (0xFFu8 << (bit % 8));
            if free == 0 {
                bit = (bit / 8 + 1) * 8;
                continue;
            }
            let found = (bit / 8) * 8 + free.trailing_zeros() as usize;
            return (found < limit).then_some(found);
        }
        None
    }

    fn count_ones_below(&self, limit: usize) -> usize {
        let limit = limit.min(self.len() * 8);
        let full = limit / 8;
        let mut count: usize = self[..full].iter().map(|b| b.count_ones() as usize).sum();
        let rem = limit % 8;
        if rem > 0 {
            let mask = (1u8 << rem) - 1;
            count += (self[full] & mask).count_ones() as usize;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_bit_lsb_first() {
        let mut bitmap = [0u8; 4];

        bitmap.set_bit(0, true);
        assert_eq!(bitmap[0], 0b0000_0001);

        bitmap.set_bit(7, true);
        assert_eq!(bitmap[0], 0b1000_0001);

        bitmap.set_bit(8, true);
        assert!(bitmap.get_bit(8));
        assert_eq!(bitmap[1], 0b0000_0001);

        bitmap.set_bit(0, false);
        assert!(!bitmap.get_bit(0));
        assert_eq!(bitmap[0], 0b1000_0000);
    }

    #[test]
    fn test_out_of_range() {
        let mut bitmap = [0u8; 2];
        bitmap.set_bit(100, true);
        assert_eq!(bitmap, [0, 0]);
        assert!(!bitmap.get_bit(100));
    }

    #[test]
    fn test_find_first_zero() {
        let bitmap = [0xFFu8, 0b1111_1110, 0];
        assert_eq!(bitmap.find_first_zero(0, 24), Some(8));

        let bitmap = [0xFFu8, 0b1111_1101, 0];
        assert_eq!(bitmap.find_first_zero(0, 24), Some(9));
        assert_eq!(bitmap.find_first_zero(10, 24), Some(16));

        let full = [0xFFu8; 4];
        assert_eq!(full.find_first_zero(0, 32), None);
    }

    #[test]
    fn test_find_first_zero_respects_limit() {
        let bitmap = [0b0000_0111u8, 0];
        assert_eq!(bitmap.find_first_zero(0, 3), None);
        assert_eq!(bitmap.find_first_zero(0, 4), Some(3));
    }

    #[test]
    fn test_count_ones_below() {
        let bitmap = [0b1010_1010u8, 0b1111_0000, 0b0000_1111];
        assert_eq!(bitmap.count_ones_below(24), 12);
        assert_eq!(bitmap.count_ones_below(8), 4);
        assert_eq!(bitmap.count_ones_below(12), 4);
        assert_eq!(bitmap.count_ones_below(16), 8);
        assert_eq!(bitmap.count_ones_below(18), 10);
    }
}
