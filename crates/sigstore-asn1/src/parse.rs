//! Decoders for primitive value bytes
//!
//! These operate on the content octets only; tag checks happen in
//! [`Asn1Obj`](crate::Asn1Obj).

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Decode a two's complement INTEGER that fits in 64 bits
pub fn parse_integer(buf: &[u8]) -> Result<i64> {
    if buf.is_empty() {
        return Err(Error::Parse("empty INTEGER".to_string()));
    }
    if buf.len() > 8 {
        return Err(Error::Parse(format!(
            "INTEGER of {} bytes does not fit in 64 bits",
            buf.len()
        )));
    }

    let negative = buf[0] & 0x80 != 0;
    let mut value: i64 = if negative { -1 } else { 0 };
    for byte in buf {
        value = value << 8 | *byte as i64;
    }
    Ok(value)
}

/// Decode a BOOLEAN
pub fn parse_boolean(buf: &[u8]) -> Result<bool> {
    match buf {
        [byte] => Ok(*byte != 0),
        _ => Err(Error::Parse(format!(
            "BOOLEAN must be one byte, got {}",
            buf.len()
        ))),
    }
}

/// Decode an OBJECT IDENTIFIER into dotted notation
pub fn parse_oid(buf: &[u8]) -> Result<String> {
    if buf.is_empty() {
        return Err(Error::Parse("empty OBJECT IDENTIFIER".to_string()));
    }

    let mut arcs: Vec<u64> = Vec::new();
    let mut value: u64 = 0;
    let mut first = true;

    for (i, byte) in buf.iter().enumerate() {
        if value > (u64::MAX >> 7) {
            return Err(Error::Parse("OID arc overflows 64 bits".to_string()));
        }
        value = value << 7 | (byte & 0x7f) as u64;

        if byte & 0x80 != 0 {
            if i == buf.len() - 1 {
                return Err(Error::Parse("truncated OID arc".to_string()));
            }
            continue;
        }

        if first {
            // the first subidentifier packs two arcs as first * 40 + second
            if value < 80 {
                arcs.push(value / 40);
                arcs.push(value % 40);
            } else {
                arcs.push(2);
                arcs.push(value - 80);
            }
            first = false;
        } else {
            arcs.push(value);
        }
        value = 0;
    }

    Ok(arcs
        .iter()
        .map(|arc| arc.to_string())
        .collect::<Vec<_>>()
        .join("."))
}

/// Decode a UTCTime (`short_year`) or GeneralizedTime
///
/// Both forms must end in `Z`, optionally with three fractional digits.
/// Two-digit years of 50 and above fall in the 1900s, the rest in the 2000s.
pub fn parse_time(buf: &[u8], short_year: bool) -> Result<DateTime<Utc>> {
    let text = std::str::from_utf8(buf)
        .map_err(|_| Error::Parse("time is not valid ASCII".to_string()))?;
    let invalid = || Error::Parse(format!("invalid time format: {}", text));

    let body = text.strip_suffix('Z').ok_or_else(invalid)?;
    let (digits, fraction) = match body.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (body, None),
    };

    let year_len = if short_year { 2 } else { 4 };
    if digits.len() != year_len + 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let millis = match fraction {
        None => 0,
        Some(f) if f.len() == 3 && f.bytes().all(|b| b.is_ascii_digit()) => {
            f.parse::<u32>().map_err(|_| invalid())?
        }
        Some(_) => return Err(invalid()),
    };

    let field = |start: usize, len: usize| -> Result<u32> {
        digits[start..start + len].parse::<u32>().map_err(|_| invalid())
    };

    let mut year = field(0, year_len)? as i32;
    if short_year {
        year += if year >= 50 { 1900 } else { 2000 };
    }
    let rest = year_len;

    NaiveDate::from_ymd_opt(year, field(rest, 2)?, field(rest + 2, 2)?)
        .and_then(|date| {
            date.and_hms_milli_opt(
                field(rest + 4, 2).ok()?,
                field(rest + 6, 2).ok()?,
                field(rest + 8, 2).ok()?,
                millis,
            )
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Parse(format!("time out of range: {}", text)))
}

/// Decode a BIT STRING into one element per bit (0 or 1)
pub fn parse_bit_string(buf: &[u8]) -> Result<Vec<u8>> {
    let (unused, bytes) = buf
        .split_first()
        .ok_or_else(|| Error::Parse("empty BIT STRING".to_string()))?;

    if *unused > 7 || (bytes.is_empty() && *unused != 0) {
        return Err(Error::Parse(format!(
            "invalid BIT STRING unused bit count {}",
            unused
        )));
    }

    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for (i, byte) in bytes.iter().enumerate() {
        let skip = if i == bytes.len() - 1 { *unused } else { 0 };
        for shift in (skip..8).rev() {
            bits.push((byte >> shift) & 0x01);
        }
    }
    Ok(bits)
}

/// Decode character string content
pub fn parse_string(buf: &[u8]) -> Result<String> {
    String::from_utf8(buf.to_vec())
        .map_err(|e| Error::Parse(format!("string is not valid UTF-8: {}", e)))
}
