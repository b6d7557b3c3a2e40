//! The encode/decode pipeline coordinators (§4.4, §4.5).

pub mod decode;
pub mod encode;

pub use decode::DecodeCoordinator;
pub use encode::{BuildParams, CoordinatorState, EncodeCoordinator};
