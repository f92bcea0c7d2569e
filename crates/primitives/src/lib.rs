//! Primitive types for the settlement layer.

#![cfg_attr(not(feature = "std"), no_std)]
#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub use batch::BatchInfo;
mod batch;

pub use context::CallContext;
mod context;

pub use config::SystemConfig;
mod config;

pub use message::{L1Message, L1_MESSAGE_TX_TYPE};
mod message;
