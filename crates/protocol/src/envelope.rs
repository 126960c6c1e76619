//! Type-tagged envelope wrapping an opaque payload.
//!
//! Binary layout:
//!
//! ```text
//! +----------------+-----------------+------------------+
//! | tag_len: u16be | tag: utf-8 str  | payload bytes... |
//! +----------------+-----------------+------------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};

const TAG_LEN_BYTES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    type_tag: String,
    payload: Bytes,
}

impl Envelope {
    pub fn new(type_tag: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            type_tag: type_tag.into(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serialize to the binary layout above.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let tag = self.type_tag.as_bytes();
        // Tags are short identifiers; anything past u16::MAX is truncated.
        let tag_len = tag.len().min(u16::MAX as usize);
        let mut buf = BytesMut::with_capacity(TAG_LEN_BYTES + tag_len + self.payload.len());
        buf.put_u16(tag_len as u16);
        buf.put_slice(&tag[..tag_len]);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parse the binary layout above.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = bytes;
        if buf.remaining() < TAG_LEN_BYTES {
            return Err(Error::Truncated {
                what: "envelope tag length",
                need: TAG_LEN_BYTES,
                have: buf.remaining(),
            });
        }
        let tag_len = buf.get_u16() as usize;
        if buf.remaining() < tag_len {
            return Err(Error::Truncated {
                what: "envelope tag",
                need: tag_len,
                have: buf.remaining(),
            });
        }
        let type_tag = std::str::from_utf8(&buf[..tag_len])
            .map_err(|_| Error::InvalidTag)?
            .to_string();
        buf.advance(tag_len);
        Ok(Self {
            type_tag,
            payload: Bytes::copy_from_slice(buf),
        })
    }
}
