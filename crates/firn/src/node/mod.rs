use core::marker::PhantomData;
use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Clock, ConfigError, Error, FIRN_EPOCH, GlobalId};

#[cfg(test)]
mod tests;

/// Configuration for a [`NodeGenerator`], fixed for its lifetime.
///
/// The field bit widths live on the id type; this struct carries the
/// node's identity, its optional subnode slot, and the epoch. The
/// defaults (`subnode 0 of 1`, [`FIRN_EPOCH`]) describe a classical
/// single-sequence node.
///
/// # Example
///
/// ```
/// use firn::NodeConfig;
///
/// // Worker 2 of 8 sharing node id 123.
/// let config = NodeConfig::new(123).subnode(2, 8);
/// assert_eq!(config.subnode_count, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Node identity, assigned externally, unique among live nodes.
    pub node_id: u64,
    /// This generator's residue class offset within the sequence space.
    pub subnode_id: u64,
    /// Number of residue classes the sequence space is split into.
    pub subnode_count: u64,
    /// Reference instant subtracted from clock readings.
    pub epoch: Duration,
}

impl NodeConfig {
    /// Configuration for a plain, unpartitioned node.
    pub const fn new(node_id: u64) -> Self {
        Self {
            node_id,
            subnode_id: 0,
            subnode_count: 1,
            epoch: FIRN_EPOCH,
        }
    }

    /// Pins this generator to subnode `subnode_id` of `subnode_count`.
    pub const fn subnode(mut self, subnode_id: u64, subnode_count: u64) -> Self {
        self.subnode_id = subnode_id;
        self.subnode_count = subnode_count;
        self
    }

    /// Overrides the epoch the time part is measured from.
    pub const fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }
}

/// A single node (or subnode) of the id generation system.
///
/// The generator owns its clock and its mutable state outright, and
/// [`get_id`](Self::get_id) takes `&mut self`: concurrent use of one
/// instance requires caller-side serialization (a mutex around the call,
/// or funneling calls through a single-owner task). The intended way to
/// get concurrency *without* locking is one generator per thread or task,
/// each pinned to a distinct subnode id under a shared node id: their
/// sequence values occupy disjoint residue classes modulo the subnode
/// count, so they stay collision-free with no shared state at all.
///
/// A freshly constructed generator deliberately treats the second it was
/// constructed in as exhausted: an unknown number of ids may already have
/// been issued for that second by a prior incarnation of the node. Calls
/// fail with [`Error::OutOfSequence`] until the clock crosses into the
/// next whole second.
///
/// # Example
///
/// ```
/// use firn::{Error, FirnId, NodeGenerator, SystemClock};
///
/// let mut node = NodeGenerator::<FirnId, _>::new(123, SystemClock)?;
///
/// match node.get_id() {
///     Ok(id) => println!("issued {id}"),
///     // Expected during the construction second; clears on the next one.
///     Err(Error::OutOfSequence { .. }) => {}
///     Err(e) => panic!("defective node: {e}"),
/// }
/// # Ok::<(), firn::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct NodeGenerator<ID, C>
where
    ID: GlobalId,
    C: Clock,
{
    config: NodeConfig,
    clock: C,
    last_now: Duration,
    last_sequence: u64,
    _id: PhantomData<ID>,
}

impl<ID, C> NodeGenerator<ID, C>
where
    ID: GlobalId,
    C: Clock,
{
    /// Creates an unpartitioned generator for `node_id`, reading the
    /// construction time from `clock`.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::NodeIdOutOfRange`] if `node_id` does not
    /// fit the layout's node id field. The bound is inclusive:
    /// `ID::max_node_id()` itself is a valid node id.
    pub fn new(node_id: u64, clock: C) -> Result<Self, ConfigError> {
        Self::with_config(NodeConfig::new(node_id), clock)
    }

    /// Creates a generator from an explicit [`NodeConfig`].
    ///
    /// Validation fails fast and leaves no partial state behind.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NodeIdOutOfRange`] unless
    ///   `node_id <= ID::max_node_id()`
    /// - [`ConfigError::SubnodeCountZero`] unless `subnode_count >= 1`
    /// - [`ConfigError::SubnodeIdOutOfRange`] unless
    ///   `subnode_id < subnode_count`
    pub fn with_config(config: NodeConfig, clock: C) -> Result<Self, ConfigError> {
        if config.node_id > ID::max_node_id() {
            return Err(ConfigError::NodeIdOutOfRange {
                node_id: config.node_id,
                max: ID::max_node_id(),
            });
        }
        if config.subnode_count == 0 {
            return Err(ConfigError::SubnodeCountZero);
        }
        if config.subnode_id >= config.subnode_count {
            return Err(ConfigError::SubnodeIdOutOfRange {
                subnode_id: config.subnode_id,
                subnode_count: config.subnode_count,
            });
        }

        // The construction second is considered exhausted: the sentinel
        // sits one past the maximum valid sequence, so the stride math
        // overflows the field until a new second begins.
        let last_now = clock.now();
        Ok(Self {
            config,
            clock,
            last_now,
            last_sequence: ID::max_sequence() + 1,
            _id: PhantomData,
        })
    }

    /// Returns the configuration this generator was constructed with.
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Returns a new id, or the specific reason one cannot be issued.
    ///
    /// Never blocks and never retries internally. The last observed clock
    /// reading advances even when the call fails with
    /// [`Error::OutOfSequence`], so rapid retries within an exhausted
    /// second fail deterministically instead of oscillating.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackward`]: the clock regressed past the last
    ///   observed reading; fatal, the time source is defective.
    /// - [`Error::ClockBeforeEpoch`]: the clock is behind the configured
    ///   epoch; fatal configuration or environment issue.
    /// - [`Error::EpochExhausted`]: the time part no longer fits its bit
    ///   budget; permanent, the node must be reconfigured.
    /// - [`Error::OutOfSequence`]: this (sub)node's sequence space for
    ///   the current second is used up; transient, retry next second.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn get_id(&mut self) -> Result<ID, Error> {
        let now = self.clock.now();
        let (second, sequence) = self.next(now)?;
        Ok(ID::from_parts(second, sequence, self.config.node_id))
    }

    /// Starting from the previous state, computes the next
    /// `(time part, sequence)` pair and commits the state transition.
    fn next(&mut self, now: Duration) -> Result<(u64, u64), Error> {
        if now < self.last_now {
            return Err(Error::ClockMovedBackward {
                now,
                last: self.last_now,
            });
        }
        if now < self.config.epoch {
            return Err(Error::ClockBeforeEpoch {
                now,
                epoch: self.config.epoch,
            });
        }

        let epoch_secs = self.config.epoch.as_secs();
        let second = now.as_secs() - epoch_secs;
        if second > ID::max_time_part() {
            return Err(Error::EpochExhausted {
                second,
                max: ID::max_time_part(),
            });
        }

        // A pre-epoch `last_now` (possible at construction) compares as a
        // different second, never as the current one.
        let last_second = self.last_now.as_secs().checked_sub(epoch_secs);
        let sequence = if last_second == Some(second) {
            // Same second: advance by the subnode stride. Saturation can
            // only land above `max_sequence`, which reads as exhaustion.
            self.last_sequence.saturating_add(self.config.subnode_count)
        } else {
            // New second: restart at this subnode's residue class offset.
            self.config.subnode_id
        };

        // Observed time advances even on sequence exhaustion, so repeated
        // calls within the same second keep failing the same way.
        self.last_now = now;
        if sequence > ID::max_sequence() {
            return Err(Error::OutOfSequence { second });
        }
        self.last_sequence = sequence;

        Ok((second, sequence))
    }
}
