//! V1 layout of the batch header, shared by versions 1 and 2.

pub use batch_header::BatchHeaderV1;
mod batch_header;
