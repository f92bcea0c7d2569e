//! V3 layout of the batch header, shared by versions 3 through 6.

pub use batch_header::BatchHeaderV3;
mod batch_header;
