use core::fmt;
use std::hash::Hash;

/// A packed, layout-compatible globally-unique identifier.
///
/// The backing integer is a `u64` split MSB-first into three fields:
/// `[time part | sequence | node id]`. Concrete layouts are declared with
/// [`define_global_id!`], which fixes the bit width of each field at
/// compile time.
///
/// # Example
///
/// ```
/// use firn::{FirnId, GlobalId};
///
/// let id = FirnId::from_parts(1000, 2, 1);
/// assert_eq!(id.time_part(), 1000);
/// assert_eq!(id.sequence(), 2);
/// assert_eq!(id.node_id(), 1);
/// ```
pub trait GlobalId:
    Sized + Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Returns the time part of the ID, in whole seconds since the epoch.
    fn time_part(&self) -> u64;

    /// Returns the maximum possible value for the time part field.
    fn max_time_part() -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Returns the node id portion of the ID.
    fn node_id(&self) -> u64;

    /// Returns the maximum possible value for the node id field.
    fn max_node_id() -> u64;

    /// Constructs a new ID from its three fields.
    fn from_parts(time_part: u64, sequence: u64, node_id: u64) -> Self;

    /// Converts this type into its raw integer representation.
    fn to_raw(&self) -> u64;

    /// Converts a raw integer into this type.
    fn from_raw(raw: u64) -> Self;
}

/// Declares a [`GlobalId`]-compatible type with custom field bit widths.
///
/// The macro defines a packed ID structure over a `u64` and generates the
/// field masks, shifts and accessors to extract each component. The three
/// widths may not exceed 64 bits in total; violations fail at compile
/// time.
///
/// ## Bit layout
///
/// The ID is packed from **MSB to LSB**:
///
/// ```text
///  Bit Index:  high bits                       low bits
///              +---------------+--------------+-------------+
///  Field:      | time part (T) | sequence (S) | node id (N) |
///              +---------------+--------------+-------------+
///              |<------- MSB ---- 64 bits ---- LSB -------->|
/// ```
///
/// ## Example
///
/// ```
/// firn::define_global_id!(
///     MyId,
///     time: 37,
///     sequence: 17,
///     node: 10
/// );
///
/// let id = MyId::from_parts(86_400, 0, 123);
/// assert_eq!(id.node_id(), 123);
/// ```
#[macro_export]
macro_rules! define_global_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        time: $time_bits:expr,
        sequence: $sequence_bits:expr,
        node: $node_bits:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            assert!(
                $time_bits < 64 && $sequence_bits < 64 && $node_bits < 64,
                "each field must be narrower than the backing u64"
            );
            assert!(
                $time_bits + $sequence_bits + $node_bits <= 64,
                "id layout overflows the backing u64"
            );
        };

        impl $name {
            pub const TIME_BITS: u64 = $time_bits;
            pub const SEQUENCE_BITS: u64 = $sequence_bits;
            pub const NODE_ID_BITS: u64 = $node_bits;

            pub const NODE_ID_SHIFT: u64 = 0;
            pub const SEQUENCE_SHIFT: u64 = Self::NODE_ID_BITS;
            pub const TIME_SHIFT: u64 = Self::NODE_ID_BITS + Self::SEQUENCE_BITS;

            pub const TIME_MASK: u64 = (1 << Self::TIME_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;
            pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;

            pub const fn from_parts(time_part: u64, sequence: u64, node_id: u64) -> Self {
                let time_part = (time_part & Self::TIME_MASK) << Self::TIME_SHIFT;
                let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                let node_id = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
                Self {
                    id: time_part | sequence | node_id,
                }
            }

            /// Extracts the time part from the packed ID.
            pub const fn time_part(&self) -> u64 {
                (self.id >> Self::TIME_SHIFT) & Self::TIME_MASK
            }

            /// Extracts the sequence from the packed ID.
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            /// Extracts the node id from the packed ID.
            pub const fn node_id(&self) -> u64 {
                (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
            }

            /// Returns the maximum representable time part value.
            pub const fn max_time_part() -> u64 {
                Self::TIME_MASK
            }

            /// Returns the maximum representable sequence value.
            pub const fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            /// Returns the maximum representable node id value.
            pub const fn max_node_id() -> u64 {
                Self::NODE_ID_MASK
            }

            /// Returns the raw packed integer.
            pub const fn to_raw(&self) -> u64 {
                self.id
            }

            /// Reinterprets a raw packed integer as this layout.
            pub const fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl $crate::GlobalId for $name {
            fn time_part(&self) -> u64 {
                self.time_part()
            }

            fn max_time_part() -> u64 {
                Self::max_time_part()
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_sequence() -> u64 {
                Self::max_sequence()
            }

            fn node_id(&self) -> u64 {
                self.node_id()
            }

            fn max_node_id() -> u64 {
                Self::max_node_id()
            }

            fn from_parts(time_part: u64, sequence: u64, node_id: u64) -> Self {
                debug_assert!(time_part <= Self::TIME_MASK, "time part overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                debug_assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
                Self::from_parts(time_part, sequence, node_id)
            }

            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let full = core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field(
                        "id",
                        &format_args!("{} (0x{:x})", self.to_raw(), self.to_raw()),
                    )
                    .field("time_part", &self.time_part())
                    .field("sequence", &self.sequence())
                    .field("node_id", &self.node_id())
                    .finish()
            }
        }
    };
}

define_global_id!(
    /// The default 64-bit id layout
    ///
    /// - 37 bits time part (seconds since [`FIRN_EPOCH`])
    /// - 17 bits sequence
    /// - 10 bits node id
    ///
    /// ```text
    ///  Bit Index:  63             27 26            10 9            0
    ///              +----------------+---------------+--------------+
    ///  Field:      | time part (37) | sequence (17) | node id (10) |
    ///              +----------------+---------------+--------------+
    ///              |<----- MSB --------- 64 bits -------- LSB ---->|
    /// ```
    /// [`FIRN_EPOCH`]: crate::FIRN_EPOCH
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    FirnId,
    time: 37,
    sequence: 17,
    node: 10
);
