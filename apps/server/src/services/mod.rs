//! Service layer.
//!
//! Operations that write through the store gateway and then tell connected
//! staff clients about it.

pub mod orders;

pub use orders::OrderService;
