//! Confluent wire format framing.
//!
//! ```text
//! +------+----------------+----------------------+
//! | 0x00 | schema id (BE) | Avro binary datum    |
//! | 1 B  | 4 B            | remaining bytes      |
//! +------+----------------+----------------------+
//! ```

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};

/// First byte of every framed payload.
pub const MAGIC_BYTE: u8 = 0;

const HEADER_LEN: usize = 5;

/// Prefix an Avro datum with the magic byte and schema id.
pub fn frame(schema_id: u32, datum: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + datum.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_u32(schema_id);
    buf.put_slice(datum);
    buf.to_vec()
}

/// Split a framed payload into its schema id and Avro datum.
pub fn unframe(payload: &[u8]) -> Result<(u32, &[u8])> {
    if payload.len() < HEADER_LEN {
        return Err(Error::InvalidFrame(format!(
            "payload of {} bytes is shorter than the {HEADER_LEN}-byte header",
            payload.len()
        )));
    }

    let mut header = &payload[..HEADER_LEN];
    let magic = header.get_u8();
    if magic != MAGIC_BYTE {
        return Err(Error::InvalidFrame(format!("unknown magic byte {magic:#04x}")));
    }
    let schema_id = header.get_u32();

    Ok((schema_id, &payload[HEADER_LEN..]))
}
