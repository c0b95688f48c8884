//! Definite-length decoding and minimal encoding

use crate::error::{Error, Result};
use crate::stream::ByteStream;

/// Largest number of length octets accepted in long form
///
/// Six bytes keeps every length inside 48 bits.
pub const MAX_LENGTH_BYTES: usize = 6;

/// Decode a length field at the cursor
pub fn decode_length(stream: &mut ByteStream<'_>) -> Result<usize> {
    let first = stream.get_u8()?;

    if first & 0x80 == 0 {
        return Ok(first as usize);
    }

    let count = (first & 0x7f) as usize;
    if count == 0 {
        return Err(Error::Parse(
            "indefinite length encoding not supported".to_string(),
        ));
    }
    if count > MAX_LENGTH_BYTES {
        return Err(Error::Parse(format!(
            "length exceeds {} byte limit",
            MAX_LENGTH_BYTES
        )));
    }

    let mut len: u64 = 0;
    for _ in 0..count {
        len = len << 8 | stream.get_u8()? as u64;
    }

    usize::try_from(len)
        .map_err(|_| Error::Parse(format!("length {} does not fit in memory", len)))
}

/// Encode a length in the minimal definite form
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }

    let bytes = (len as u64).to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];

    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}
