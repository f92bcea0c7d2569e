//! Chunk codec implementations.
//!
//! A chunk is an ordered sequence of blocks. The V0 layout embeds the RLP
//! bytes of every L2 transaction next to the block contexts; from V1 onwards
//! the transaction payload lives in the data blob and the chunk carries the
//! block contexts only.

pub use v0::ChunkV0;
mod v0;

pub use v1::ChunkV1;
mod v1;
