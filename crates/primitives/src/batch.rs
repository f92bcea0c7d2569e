use alloy_primitives::B256;

/// The identifying information of a committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::From)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct BatchInfo {
    /// The index of the batch.
    pub index: u64,
    /// The hash of the canonical batch header encoding.
    pub hash: B256,
}

impl BatchInfo {
    /// Returns a new instance of [`BatchInfo`].
    pub const fn new(index: u64, hash: B256) -> Self {
        Self { index, hash }
    }
}
