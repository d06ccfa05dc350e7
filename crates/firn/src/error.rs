use core::time::Duration;

/// Rejected generator configuration.
///
/// Raised once at construction; a generator that constructed successfully
/// never reports these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The node id does not fit the id layout's node id field.
    #[error("node_id must be in 0..={max}, got: {node_id}")]
    NodeIdOutOfRange { node_id: u64, max: u64 },

    /// The subnode count must be a positive integer.
    #[error("subnode_count must be a positive integer, got: 0")]
    SubnodeCountZero,

    /// The subnode id must be lower than the subnode count.
    #[error("subnode_id must be lower than subnode_count ({subnode_count}), got: {subnode_id}")]
    SubnodeIdOutOfRange {
        subnode_id: u64,
        subnode_count: u64,
    },
}

/// All possible id generation failures.
///
/// Only [`Error::OutOfSequence`] clears itself once the clock advances to
/// the next second; the other kinds indicate a misconfigured or
/// malfunctioning node. The generator never retries internally: it
/// reports the specific kind and leaves retry policy to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The clock reading is lower than the last observed reading.
    ///
    /// Any regression, however small, risks reissuing an already issued
    /// `(time part, sequence)` pair, so there is no tolerance window.
    #[error("clock moved backwards: now={now:?}, last observed={last:?}")]
    ClockMovedBackward { now: Duration, last: Duration },

    /// The clock reading precedes the configured epoch.
    #[error("current time {now:?} is behind the node epoch {epoch:?}")]
    ClockBeforeEpoch { now: Duration, epoch: Duration },

    /// The seconds since the epoch no longer fit the time part field.
    ///
    /// Permanent: the node has outlived its configured time budget and
    /// must be reconfigured with a wider time field or a later epoch.
    #[error("maximum seconds since epoch exceeded: {second} (max: {max})")]
    EpochExhausted { second: u64, max: u64 },

    /// The per-second sequence space is exhausted for this (sub)node.
    #[error("ran out of ids for this second: {second}")]
    OutOfSequence { second: u64 },
}

impl Error {
    /// Returns true if waiting for the clock to reach the next second can
    /// clear the error.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::OutOfSequence { .. })
    }
}
