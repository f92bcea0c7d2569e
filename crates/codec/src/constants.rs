/// The length in bytes of each item in the skipped L1 messages bitmap.
pub const SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE: usize = 32;

/// The length in bytes of an encoded block context.
pub const BLOCK_CONTEXT_BYTES_SIZE: usize = 60;

/// The length in bytes of the block context prefix folded into the chunk data hash.
/// The trailing L1 message count is excluded since it is recomputable from the bitmap.
pub const BLOCK_CONTEXT_HASH_PREFIX_BYTES_SIZE: usize = 58;

/// The length in bytes of the size prefix carried by each embedded transaction.
pub const TRANSACTION_LENGTH_PREFIX_BYTES_SIZE: usize = 4;
