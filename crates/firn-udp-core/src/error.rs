/// Rejected datagrams.
///
/// Decoding is strict: a frame must carry a known tag and exactly the
/// length that tag mandates. The server answers any undecodable request
/// with the failure frame rather than surfacing these over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The datagram carried no bytes at all.
    #[error("empty datagram")]
    Empty,

    /// The leading tag byte names no known frame.
    #[error("unknown frame tag: {tag:#04x}")]
    UnknownTag { tag: u8 },

    /// The datagram length does not match its tag's frame layout.
    #[error("bad frame length: expected {expected}, got {actual}")]
    Length { expected: usize, actual: usize },
}
