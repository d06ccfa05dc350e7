use firn::{FIRN_EPOCH, FirnId, NodeGenerator, SystemClock};

/// The canonical id layout spoken on the wire.
///
/// Fixed at compile time: the success frame carries exactly the 64-bit
/// big-endian packed representation of this type, which enforces a
/// strict client-server contract for binary encoding.
pub type WireId = FirnId;

/// The number of bytes required to serialize a single [`WireId`] in
/// big-endian format.
pub const ID_SIZE: usize = size_of::<u64>();

/// The epoch the wire id's time part is measured from.
pub const EPOCH: core::time::Duration = FIRN_EPOCH;

/// The clock used by server-side generators for timestamp embedding.
pub type Clock = SystemClock;

/// The generator type used by each server worker.
///
/// Parameterized per worker with a distinct subnode slot under the
/// shared node id.
pub type Generator = NodeGenerator<WireId, Clock>;

/// Receive buffer size for a single datagram; requests and responses
/// are both far smaller.
pub const MAX_DATAGRAM: usize = 1024;
