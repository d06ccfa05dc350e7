//! Shared wire protocol for the firn UDP id service.
//!
//! Pins the exact datagram layout spoken between the server and its
//! clients, so both sides share one compile-time contract:
//!
//! ```text
//! request:           | 0 (8 bits) |
//! success response:  | 0 (8 bits) | id (64 bits, big-endian) |
//! failure response:  | 1 (8 bits) |
//! ```
//!
//! The transport makes no delivery guarantees and performs no
//! deduplication or retries: duplicate or lost datagrams may yield
//! duplicate or missing ids at the transport layer, never at the
//! generator layer. No error detail crosses the wire; every failure
//! collapses into the single failure frame.

mod error;
mod types;
mod wire;

pub use crate::error::*;
pub use crate::types::*;
pub use crate::wire::*;
