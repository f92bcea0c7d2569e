//! V7 layout of the batch header.

pub use batch_header::BatchHeaderV7;
mod batch_header;
