//! UDP request/response wrapper around the firn id generator.
//!
//! One socket, N worker tasks: each worker exclusively owns a generator
//! pinned to subnode `i` of `N` under the shared node id, so workers
//! never coordinate and never collide. Every request is answered with
//! exactly one response; there are no retries and no delivery
//! guarantees beyond UDP's.

pub mod config;
pub mod server;
pub mod telemetry;
