//! Envelope framing.
//!
//! The in-process transport hands envelope bytes over as-is. The legacy
//! direct-socket transport prefixes every envelope with its length as a
//! 4-byte big-endian integer.

use {
    bytes::{Buf, BufMut, Bytes, BytesMut},
    serde::{Deserialize, Serialize},
};

use crate::{Error, Result};

const LENGTH_PREFIX_BYTES: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Envelope bytes without any prefix.
    Raw,
    /// 4-byte big-endian length followed by the envelope bytes.
    #[default]
    LengthPrefixed,
}

impl Framing {
    /// Frame envelope bytes for the wire.
    pub fn encode(self, envelope: &[u8], max_len: usize) -> Result<Bytes> {
        if envelope.len() > max_len {
            return Err(Error::FrameTooLarge {
                len: envelope.len(),
                max: max_len,
            });
        }
        match self {
            Self::Raw => Ok(Bytes::copy_from_slice(envelope)),
            Self::LengthPrefixed => {
                let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_BYTES + envelope.len());
                buf.put_u32(envelope.len() as u32);
                buf.put_slice(envelope);
                Ok(buf.freeze())
            },
        }
    }

    /// Strip framing from one complete frame.
    ///
    /// For [`Framing::LengthPrefixed`] the declared length must match the
    /// remaining bytes exactly.
    pub fn decode(self, frame: &[u8], max_len: usize) -> Result<Bytes> {
        match self {
            Self::Raw => {
                if frame.len() > max_len {
                    return Err(Error::FrameTooLarge {
                        len: frame.len(),
                        max: max_len,
                    });
                }
                Ok(Bytes::copy_from_slice(frame))
            },
            Self::LengthPrefixed => {
                let mut buf = BytesMut::from(frame);
                match split_frame(&mut buf, max_len)? {
                    Some(envelope) if buf.is_empty() => Ok(envelope),
                    Some(_) => Err(Error::TrailingBytes(buf.len())),
                    None => Err(Error::Truncated {
                        what: "frame body",
                        need: declared_len(frame).unwrap_or(LENGTH_PREFIX_BYTES),
                        have: frame.len().saturating_sub(LENGTH_PREFIX_BYTES),
                    }),
                }
            },
        }
    }
}

fn declared_len(frame: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_PREFIX_BYTES] = frame.get(..LENGTH_PREFIX_BYTES)?.try_into().ok()?;
    Some(u32::from_be_bytes(prefix) as usize)
}

/// Pop one length-prefixed envelope off the front of a read buffer.
///
/// Returns `Ok(None)` until the buffer holds a complete frame, so a reader
/// can keep appending bytes and call this in a loop.
pub fn split_frame(buf: &mut BytesMut, max_len: usize) -> Result<Option<Bytes>> {
    let Some(len) = declared_len(buf) else {
        return Ok(None);
    };
    if len > max_len {
        return Err(Error::FrameTooLarge { len, max: max_len });
    }
    if buf.len() < LENGTH_PREFIX_BYTES + len {
        return Ok(None);
    }
    buf.advance(LENGTH_PREFIX_BYTES);
    Ok(Some(buf.split_to(len).freeze()))
}
