//! V0 layout of the batch header.

pub use batch_header::BatchHeaderV0;
mod batch_header;
