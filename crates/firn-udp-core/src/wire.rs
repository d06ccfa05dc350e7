use bytes::{BufMut, BytesMut};
use firn::GlobalId;

use crate::{DecodeError, ID_SIZE, WireId};

/// Frame tag shared by the get-id request and the success response.
pub const TAG_OK: u8 = 0;

/// Frame tag of the failure response.
pub const TAG_ERROR: u8 = 1;

/// Encoded length of a request frame.
pub const REQUEST_LEN: usize = 1;

/// Encoded length of a success response frame.
pub const OK_RESPONSE_LEN: usize = 1 + ID_SIZE;

/// A client-to-server frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ask the serving node for one freshly generated id.
    GetId,
}

impl Request {
    /// Appends the encoded frame to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Request::GetId => buf.put_u8(TAG_OK),
        }
    }

    /// Decodes a request datagram.
    ///
    /// # Errors
    ///
    /// Fails with a [`DecodeError`] for an empty datagram, an unknown
    /// tag, or trailing bytes after the tag.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (&tag, rest) = data.split_first().ok_or(DecodeError::Empty)?;
        if tag != TAG_OK {
            return Err(DecodeError::UnknownTag { tag });
        }
        if !rest.is_empty() {
            return Err(DecodeError::Length {
                expected: REQUEST_LEN,
                actual: data.len(),
            });
        }
        Ok(Request::GetId)
    }
}

/// A server-to-client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// A freshly generated id.
    Id(WireId),
    /// The request could not be served; no detail crosses the wire.
    Failure,
}

impl Response {
    /// Appends the encoded frame to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Response::Id(id) => {
                buf.put_u8(TAG_OK);
                buf.put_u64(id.to_raw());
            }
            Response::Failure => buf.put_u8(TAG_ERROR),
        }
    }

    /// Decodes a response datagram.
    ///
    /// # Errors
    ///
    /// Fails with a [`DecodeError`] for an empty datagram, an unknown
    /// status tag, or a length that does not match the status.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (&status, rest) = data.split_first().ok_or(DecodeError::Empty)?;
        match status {
            TAG_OK => {
                let raw: [u8; ID_SIZE] = rest.try_into().map_err(|_| DecodeError::Length {
                    expected: OK_RESPONSE_LEN,
                    actual: data.len(),
                })?;
                Ok(Response::Id(WireId::from_raw(u64::from_be_bytes(raw))))
            }
            TAG_ERROR => {
                if !rest.is_empty() {
                    return Err(DecodeError::Length {
                        expected: 1,
                        actual: data.len(),
                    });
                }
                Ok(Response::Failure)
            }
            tag => Err(DecodeError::UnknownTag { tag }),
        }
    }
}
