//!
//! Protobuf messages generated from `shared/protobuf`,
//! the contract with payments, seats and tickets consumers.
//!

include!(concat!(env!("OUT_DIR"), "/protobuf.rs"));

mod timestamp;

pub use timestamp::*;
