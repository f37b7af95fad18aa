//! Least-significant-bit read/write over any integer sample type.

/// A carrier sample whose low bit can hold one payload bit.
pub trait LsbSample: Copy {
    /// Current low bit.
    fn lsb(self) -> bool;
    /// The sample with its low bit replaced.
    fn with_lsb(self, bit: bool) -> Self;
}

macro_rules! impl_lsb_sample {
    ($($ty:ty),*) => {
        $(
            impl LsbSample for $ty {
                #[inline]
                fn lsb(self) -> bool {
                    self & 1 == 1
                }

                #[inline]
                fn with_lsb(self, bit: bool) -> Self {
                    (self & !1) | bit as $ty
                }
            }
        )*
    };
}

impl_lsb_sample!(u8, i16, i32);

/// Write `bits[i]` into the low bit of `samples[positions[i]]`.
///
/// Samples outside `positions` are not touched. Callers validate that
/// every position is in range and that `bits` and `positions` have the
/// same length before mutating.
pub fn embed<S: LsbSample>(samples: &mut [S], bits: &[bool], positions: &[usize]) {
    debug_assert_eq!(bits.len(), positions.len());
    for (&pos, &bit) in positions.iter().zip(bits) {
        samples[pos] = samples[pos].with_lsb(bit);
    }
}

/// Read the low bit of `samples[p]` for each position, in order.
pub fn extract<S: LsbSample>(samples: &[S], positions: &[usize]) -> Vec<bool> {
    positions.iter().map(|&pos| samples[pos].lsb()).collect()
}
