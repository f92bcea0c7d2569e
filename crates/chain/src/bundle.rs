use crate::error::ChainError;

/// An entry of the bundle size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleSizeEntry {
    /// The number of batches per bundle in this range.
    pub size: u64,
    /// The last batch index governed by this size.
    pub end_batch_index: u64,
}

/// The append-only table mapping batch index ranges to bundle sizes.
///
/// Each entry governs the batches from the previous entry's end (exclusive) to
/// its own end (inclusive). Past the last entry the bundle size is one, so a
/// chain with an empty table finalizes batch by batch.
#[derive(Debug, Default)]
pub struct BundleSizeTable {
    entries: Vec<BundleSizeEntry>,
}

impl BundleSizeTable {
    /// Returns the table entries in append order.
    pub fn entries(&self) -> &[BundleSizeEntry] {
        &self.entries
    }

    /// Appends an entry. The entry must extend the table and its range must
    /// hold a whole number of bundles.
    pub fn push(&mut self, size: u64, end_batch_index: u64) -> Result<(), ChainError> {
        let prev_end = self.entries.last().map(|entry| entry.end_batch_index).unwrap_or(0);
        if size == 0 ||
            end_batch_index <= prev_end ||
            (end_batch_index - prev_end) % size != 0
        {
            return Err(ChainError::InvalidBundleSizeEntry { size, end_batch_index })
        }

        self.entries.push(BundleSizeEntry { size, end_batch_index });
        Ok(())
    }

    /// Returns the bundle size governing the batch after the given index.
    pub fn size_after(&self, batch_index: u64) -> u64 {
        self.entries
            .iter()
            .find(|entry| batch_index < entry.end_batch_index)
            .map(|entry| entry.size)
            .unwrap_or(1)
    }

    /// Returns the end index the next bundle must reach, given the last
    /// verified batch index.
    pub fn expected_end(&self, last_verified: u64) -> u64 {
        last_verified + self.size_after(last_verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_single_batch_bundles() {
        let table = BundleSizeTable::default();
        assert_eq!(table.expected_end(0), 1);
        assert_eq!(table.expected_end(41), 42);
    }

    #[test]
    fn test_should_enforce_alignment() -> eyre::Result<()> {
        let mut table = BundleSizeTable::default();
        table.push(5, 20)?;

        // 20 -> 32 is not a whole number of 5-bundles.
        assert_eq!(
            table.push(5, 32),
            Err(ChainError::InvalidBundleSizeEntry { size: 5, end_batch_index: 32 })
        );
        assert_eq!(
            table.push(0, 40),
            Err(ChainError::InvalidBundleSizeEntry { size: 0, end_batch_index: 40 })
        );
        assert_eq!(
            table.push(5, 20),
            Err(ChainError::InvalidBundleSizeEntry { size: 5, end_batch_index: 20 })
        );

        table.push(10, 40)?;
        assert_eq!(table.expected_end(0), 5);
        assert_eq!(table.expected_end(15), 20);
        assert_eq!(table.expected_end(20), 30);
        assert_eq!(table.expected_end(40), 41);

        Ok(())
    }
}
