//! Globally-unique id generation for a fixed fleet of nodes.
//!
//! Each node in the system is identified by a numeric id handed out
//! externally, and independently issues ids that are guaranteed to be
//! unique across the whole system without any runtime coordination.
//!
//! # Id structure
//!
//! In the default [`FirnId`] layout, ids are 64-bit non-negative integers:
//!
//! ```text
//!  Bit Index:  63             27 26            10 9             0
//!              +----------------+---------------+---------------+
//!  Field:      | time part (37) | sequence (17) | node id (10)  |
//!              +----------------+---------------+---------------+
//!              |<----- MSB --------- 64 bits -------- LSB ----->|
//! ```
//!
//! The time part counts whole seconds since [`FIRN_EPOCH`] and makes ids
//! generated in different seconds unique; 2^37 seconds is roughly 4355
//! years of budget. The sequence disambiguates ids generated within the
//! same second, allowing up to 2^17 = 131,072 ids per second per node.
//! The node id makes ids generated by different nodes unique, for up to
//! 1024 nodes. Alternative layouts can be declared with
//! [`define_global_id!`].
//!
//! # Subnodes
//!
//! Several generators can share one node id without locking by
//! partitioning the per-second sequence space into residue classes: a
//! generator configured as subnode `i` of `n` starts each second at
//! sequence `i` and advances in strides of `n`. Generators holding
//! distinct subnode ids never produce the same `(time part, sequence)`
//! pair, so each thread or task can own its generator outright.
//!
//! # Assumptions
//!
//! - No two live nodes share a node id, unless they are subnodes with
//!   distinct subnode ids under a common subnode count.
//! - Node clocks are kept reasonably in sync (e.g. via NTP) and never
//!   move backwards past a reading the generator has already observed.

mod clock;
mod error;
mod id;
mod node;

pub use crate::clock::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::node::*;
