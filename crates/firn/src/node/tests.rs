use super::*;
use crate::{Clock, ConfigError, Error, FirnId, GlobalId, SystemClock};
use core::time::Duration;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

crate::define_global_id!(
    /// A 1/2/3-bit layout small enough to enumerate exhaustively.
    TinyId,
    time: 1,
    sequence: 2,
    node: 3
);

/// Epoch used by the tiny-layout tests. Non-zero so a generator can be
/// constructed slightly *before* its epoch, mirroring a node that comes
/// up while its clock still reads a pre-epoch instant.
const TINY_EPOCH: Duration = Duration::from_secs(10);

struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    fn at(now: Duration) -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(now),
        })
    }

    fn at_secs_f64(secs: f64) -> Rc<Self> {
        Self::at(Duration::from_secs_f64(secs))
    }

    fn set(&self, to: Duration) {
        self.now.set(to);
    }

    fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for Rc<ManualClock> {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

fn tiny_node(
    node_id: u64,
    subnode_id: u64,
    subnode_count: u64,
) -> (NodeGenerator<TinyId, Rc<ManualClock>>, Rc<ManualClock>) {
    let clock = ManualClock::at(TINY_EPOCH - Duration::from_millis(500));
    let config = NodeConfig::new(node_id)
        .subnode(subnode_id, subnode_count)
        .epoch(TINY_EPOCH);
    let node = NodeGenerator::with_config(config, clock.clone()).unwrap();
    (node, clock)
}

/// Drains a generator completely: advances the clock one second at a
/// time, collecting every id issued for that second, until the layout's
/// time budget runs out.
fn collect_all<ID: GlobalId>(
    node: &mut NodeGenerator<ID, Rc<ManualClock>>,
    clock: &ManualClock,
) -> Vec<Vec<ID>> {
    let mut all = Vec::new();
    loop {
        clock.advance(Duration::from_secs(1));
        let mut per_second = Vec::new();
        loop {
            match node.get_id() {
                Ok(id) => per_second.push(id),
                Err(Error::OutOfSequence { .. }) => break,
                Err(Error::EpochExhausted { .. }) => return all,
                Err(e) => panic!("unexpected error while draining: {e}"),
            }
        }
        all.push(per_second);
    }
}

// TinyId enumeration for every (subnode_id, subnode_count) pair, missing
// the node id (since it should never change). Each inner slice holds the
// (time_part, sequence) pairs issued within one second.
#[rustfmt::skip]
const TINY_NODE_TUPLE_IDS: &[((u64, u64), &[&[(u64, u64)]])] = &[
    ((0, 1), &[&[(0, 0), (0, 1), (0, 2), (0, 3)], &[(1, 0), (1, 1), (1, 2), (1, 3)]]),
    ((0, 2), &[&[(0, 0), (0, 2)], &[(1, 0), (1, 2)]]),
    ((1, 2), &[&[(0, 1), (0, 3)], &[(1, 1), (1, 3)]]),
    ((0, 3), &[&[(0, 0), (0, 3)], &[(1, 0), (1, 3)]]),
    ((1, 3), &[&[(0, 1)], &[(1, 1)]]),
    ((2, 3), &[&[(0, 2)], &[(1, 2)]]),
    ((0, 4), &[&[(0, 0)], &[(1, 0)]]),
    ((1, 4), &[&[(0, 1)], &[(1, 1)]]),
    ((2, 4), &[&[(0, 2)], &[(1, 2)]]),
    ((3, 4), &[&[(0, 3)], &[(1, 3)]]),
    ((0, 5), &[&[(0, 0)], &[(1, 0)]]),
    ((1, 5), &[&[(0, 1)], &[(1, 1)]]),
    ((2, 5), &[&[(0, 2)], &[(1, 2)]]),
    ((3, 5), &[&[(0, 3)], &[(1, 3)]]),
    ((4, 5), &[&[], &[]]),
];

#[test]
fn tiny_node_tuple_ids() {
    for node_id in 0..=TinyId::max_node_id() {
        for &((subnode_id, subnode_count), expected) in TINY_NODE_TUPLE_IDS {
            let (mut node, clock) = tiny_node(node_id, subnode_id, subnode_count);
            let actual: Vec<Vec<(u64, u64, u64)>> = collect_all(&mut node, &clock)
                .into_iter()
                .map(|ids| {
                    ids.into_iter()
                        .map(|id| (id.time_part(), id.sequence(), id.node_id()))
                        .collect()
                })
                .collect();
            let expected: Vec<Vec<(u64, u64, u64)>> = expected
                .iter()
                .map(|ids| {
                    ids.iter()
                        .map(|&(time_part, sequence)| (time_part, sequence, node_id))
                        .collect()
                })
                .collect();
            assert_eq!(
                actual, expected,
                "node {node_id}, subnode {subnode_id}/{subnode_count}"
            );
        }
    }
}

#[test]
fn tiny_node_int_ids() {
    let (mut node, clock) = tiny_node(2, 0, 1);
    let raw: Vec<Vec<u64>> = collect_all(&mut node, &clock)
        .into_iter()
        .map(|ids| ids.into_iter().map(|id| id.to_raw()).collect())
        .collect();
    assert_eq!(
        raw,
        vec![
            vec![0b000010, 0b001010, 0b010010, 0b011010],
            vec![0b100010, 0b101010, 0b110010, 0b111010],
        ]
    );
}

#[test]
fn default_subnode_is_zero_of_one() {
    let (mut explicit, explicit_clock) = tiny_node(7, 0, 1);
    let clock = ManualClock::at(TINY_EPOCH - Duration::from_millis(500));
    let mut defaulted = NodeGenerator::<TinyId, _>::with_config(
        NodeConfig::new(7).epoch(TINY_EPOCH),
        clock.clone(),
    )
    .unwrap();
    assert_eq!(
        collect_all(&mut defaulted, &clock),
        collect_all(&mut explicit, &explicit_clock)
    );
}

#[test]
fn subnode_sequences_partition_the_sequence_space() {
    let capacity = TinyId::max_sequence() + 1;
    for subnode_count in 1..=5 {
        let mut seen = BTreeSet::new();
        for subnode_id in 0..subnode_count {
            let (mut node, clock) = tiny_node(0, subnode_id, subnode_count);
            let all = collect_all(&mut node, &clock);
            for id in &all[0] {
                assert_eq!(id.sequence() % subnode_count, subnode_id);
                assert!(
                    seen.insert(id.sequence()),
                    "sequence {} issued by two subnodes of {subnode_count}",
                    id.sequence()
                );
            }
        }
        // Every residue class is owned by exactly one subnode; when the
        // count divides the space evenly, the union covers all of it.
        if capacity % subnode_count == 0 {
            assert_eq!(seen.len() as u64, capacity);
        } else {
            assert!(seen.len() as u64 <= capacity);
        }
    }
}

#[test]
fn node_id_bounds_are_validated_inclusively() {
    // The bound is inclusive: max_node_id() itself is a valid node id.
    assert!(NodeGenerator::<FirnId, _>::new(0, SystemClock).is_ok());
    assert!(NodeGenerator::<FirnId, _>::new(1023, SystemClock).is_ok());
    assert_eq!(
        NodeGenerator::<FirnId, _>::new(1024, SystemClock).unwrap_err(),
        ConfigError::NodeIdOutOfRange {
            node_id: 1024,
            max: 1023,
        }
    );
}

#[test]
fn subnode_bounds_are_validated() {
    let config = |subnode_id, subnode_count| {
        NodeConfig::new(0).subnode(subnode_id, subnode_count)
    };

    assert_eq!(
        NodeGenerator::<FirnId, _>::with_config(config(0, 0), SystemClock).unwrap_err(),
        ConfigError::SubnodeCountZero
    );

    assert!(NodeGenerator::<FirnId, _>::with_config(config(0, 1), SystemClock).is_ok());
    assert_eq!(
        NodeGenerator::<FirnId, _>::with_config(config(1, 1), SystemClock).unwrap_err(),
        ConfigError::SubnodeIdOutOfRange {
            subnode_id: 1,
            subnode_count: 1,
        }
    );

    assert!(NodeGenerator::<FirnId, _>::with_config(config(0, 2), SystemClock).is_ok());
    assert!(NodeGenerator::<FirnId, _>::with_config(config(1, 2), SystemClock).is_ok());
    assert_eq!(
        NodeGenerator::<FirnId, _>::with_config(config(2, 2), SystemClock).unwrap_err(),
        ConfigError::SubnodeIdOutOfRange {
            subnode_id: 2,
            subnode_count: 2,
        }
    );
}

#[test]
fn construction_second_is_exhausted() {
    let clock = ManualClock::at_secs_f64(41.5);
    let mut node = NodeGenerator::<FirnId, _>::with_config(
        NodeConfig::new(0).epoch(Duration::ZERO),
        clock.clone(),
    )
    .unwrap();

    // No ids for the partial second the node was constructed in.
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::OutOfSequence { second: 41 }
    );
    clock.set(Duration::from_secs_f64(41.9));
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::OutOfSequence { second: 41 }
    );

    // Ids start flowing once the clock crosses into a fresh second.
    clock.set(Duration::from_secs(42));
    let id = node.get_id().unwrap();
    assert_eq!(id.time_part(), 42);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn default_layout_issues_the_full_second_of_ids() {
    let construction = FIRN_EPOCH + Duration::from_secs(1000) + Duration::from_millis(250);
    let clock = ManualClock::at(construction);
    let mut node = NodeGenerator::<FirnId, _>::new(123, clock.clone()).unwrap();

    assert_eq!(
        node.get_id().unwrap_err(),
        Error::OutOfSequence { second: 1000 }
    );

    clock.set(FIRN_EPOCH + Duration::from_secs(1001));
    for expected_sequence in 0..=FirnId::max_sequence() {
        let id = node.get_id().unwrap();
        assert_eq!(id.time_part(), 1001);
        assert_eq!(id.sequence(), expected_sequence);
        assert_eq!(id.node_id(), 123);
    }

    // The 2^17 valid sequence values are used up; the next call fails.
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::OutOfSequence { second: 1001 }
    );

    clock.set(FIRN_EPOCH + Duration::from_secs(1002));
    let id = node.get_id().unwrap();
    assert_eq!(id.time_part(), 1002);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn clock_regression_is_rejected() {
    let clock = ManualClock::at_secs_f64(99.5);
    let mut node = NodeGenerator::<FirnId, _>::with_config(
        NodeConfig::new(1).epoch(Duration::ZERO),
        clock.clone(),
    )
    .unwrap();

    clock.set(Duration::from_secs(100));
    node.get_id().unwrap();

    // Even a sub-second regression is rejected.
    let now = Duration::from_secs(100) - Duration::from_nanos(1);
    clock.set(now);
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::ClockMovedBackward {
            now,
            last: Duration::from_secs(100),
        }
    );
}

#[test]
fn failed_calls_still_advance_the_observed_time() {
    let clock = ManualClock::at_secs_f64(5.0);
    let mut node = NodeGenerator::<FirnId, _>::with_config(
        NodeConfig::new(0).epoch(Duration::ZERO),
        clock.clone(),
    )
    .unwrap();

    // Exhausted construction second; the failure commits `now`.
    clock.set(Duration::from_secs_f64(5.6));
    assert_eq!(node.get_id().unwrap_err(), Error::OutOfSequence { second: 5 });

    // A reading below the failed call's is a regression, even though it
    // is above the last *successful* call's.
    clock.set(Duration::from_secs_f64(5.4));
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::ClockMovedBackward {
            now: Duration::from_secs_f64(5.4),
            last: Duration::from_secs_f64(5.6),
        }
    );
}

#[test]
fn pre_epoch_clock_is_rejected_until_the_epoch_arrives() {
    let clock = ManualClock::at(Duration::from_secs(5));
    let mut node = NodeGenerator::<FirnId, _>::new(9, clock.clone()).unwrap();

    assert_eq!(
        node.get_id().unwrap_err(),
        Error::ClockBeforeEpoch {
            now: Duration::from_secs(5),
            epoch: FIRN_EPOCH,
        }
    );

    // Crossing the epoch recovers; the pre-epoch construction reading
    // does not count as the current second.
    clock.set(FIRN_EPOCH + Duration::from_millis(500));
    let id = node.get_id().unwrap();
    assert_eq!(id.time_part(), 0);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.node_id(), 9);
}

#[test]
fn time_budget_exhaustion_is_permanent() {
    let budget = Duration::from_secs(1 << 37);
    let clock = ManualClock::at(FIRN_EPOCH + budget);
    let mut node = NodeGenerator::<FirnId, _>::new(0, clock.clone()).unwrap();

    assert_eq!(
        node.get_id().unwrap_err(),
        Error::EpochExhausted {
            second: 1 << 37,
            max: (1 << 37) - 1,
        }
    );

    // Time only moves forward from here, so the error never clears.
    clock.advance(Duration::from_secs(3));
    assert_eq!(
        node.get_id().unwrap_err(),
        Error::EpochExhausted {
            second: (1 << 37) + 3,
            max: (1 << 37) - 1,
        }
    );
}

#[test]
fn ids_are_unique_and_monotonic_under_a_non_decreasing_clock() {
    let clock = ManualClock::at_secs_f64(100.5);
    let mut node = NodeGenerator::<FirnId, _>::with_config(
        NodeConfig::new(42).epoch(Duration::ZERO),
        clock.clone(),
    )
    .unwrap();
    clock.set(Duration::from_secs(101));

    let mut last: Option<FirnId> = None;
    for call in 0..5000 {
        // Nudge the clock forward irregularly, crossing second
        // boundaries every so often.
        if call % 3 == 0 {
            clock.advance(Duration::from_millis(401));
        }
        let id = node.get_id().unwrap();
        if let Some(prev) = last {
            assert!(id > prev, "id {id} not above its predecessor {prev}");
            assert!(id.to_raw() > prev.to_raw());
        }
        last = Some(id);
    }
}

#[test]
fn subnodes_with_a_shared_node_id_never_collide() {
    let count = 4;
    let mut clocks = Vec::new();
    let mut nodes = Vec::new();
    for subnode_id in 0..count {
        let clock = ManualClock::at_secs_f64(200.5);
        let node = NodeGenerator::<FirnId, _>::with_config(
            NodeConfig::new(7)
                .subnode(subnode_id, count)
                .epoch(Duration::ZERO),
            clock.clone(),
        )
        .unwrap();
        clocks.push(clock);
        nodes.push(node);
    }

    // Interleave calls across independently clocked generators.
    let mut seen = BTreeSet::new();
    for round in 0..500 {
        for (node, clock) in nodes.iter_mut().zip(&clocks) {
            if round % 100 == 0 {
                clock.advance(Duration::from_secs(1));
            }
            let id = node.get_id().unwrap();
            assert!(seen.insert(id.to_raw()), "duplicate id {id}");
        }
    }
}
