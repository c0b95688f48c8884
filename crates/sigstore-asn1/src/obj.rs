//! The decoded element tree

use crate::error::{Error, Result};
use crate::length::{decode_length, encode_length};
use crate::parse::{
    parse_bit_string, parse_boolean, parse_integer, parse_oid, parse_string, parse_time,
};
use crate::stream::ByteStream;
use crate::tag::Tag;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Maximum nesting depth accepted while parsing
const MAX_DEPTH: usize = 64;

/// A node in a parsed DER tree
///
/// Every node shares the input buffer and records the byte range of its own
/// encoding, so [`raw`](Self::raw) and [`value`](Self::value) are zero-copy.
/// Constructed elements have their children in [`subs`](Self::subs);
/// primitive OCTET STRINGs are speculatively parsed as DER and keep the
/// result as children when that parse consumes the content exactly.
#[derive(Clone)]
pub struct Asn1Obj {
    tag: Tag,
    buf: Arc<[u8]>,
    start: usize,
    header_len: usize,
    end: usize,
    subs: Vec<Asn1Obj>,
}

impl Asn1Obj {
    /// Parse a complete DER buffer holding exactly one element
    pub fn parse(der: &[u8]) -> Result<Self> {
        let buf: Arc<[u8]> = Arc::from(der);
        let mut stream = ByteStream::new(&buf);
        let obj = parse_element(&mut stream, &buf, 0)?;

        if stream.remaining() != 0 {
            return Err(Error::Parse(format!(
                "{} bytes of trailing data after element",
                stream.remaining()
            )));
        }
        Ok(obj)
    }

    /// Build a constructed element from children
    ///
    /// The result is encoded and parsed again, so it behaves exactly like a
    /// node read from the wire.
    pub fn from_subs(tag: Tag, subs: &[Asn1Obj]) -> Result<Self> {
        if !tag.constructed() {
            return Err(Error::Type(format!(
                "cannot build children under primitive tag {}",
                tag
            )));
        }
        let content: Vec<u8> = subs.iter().flat_map(|sub| sub.to_der()).collect();
        Self::parse(&encode_element(tag, &content))
    }

    /// Build a primitive element holding `value`
    pub fn from_value(tag: Tag, value: &[u8]) -> Result<Self> {
        if tag.constructed() {
            return Err(Error::Type(format!(
                "cannot build a primitive under constructed tag {}",
                tag
            )));
        }
        Self::parse(&encode_element(tag, value))
    }

    /// The element's tag
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Child elements (empty for primitives)
    pub fn subs(&self) -> &[Asn1Obj] {
        &self.subs
    }

    /// The complete encoding: tag, length and content
    pub fn raw(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// The content octets
    pub fn value(&self) -> &[u8] {
        &self.buf[self.start + self.header_len..self.end]
    }

    /// Length of the tag and length octets
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Re-encode this element as DER
    ///
    /// Constructed elements are rebuilt from their children. Primitive
    /// elements emit their content unchanged, even when speculative children
    /// were found inside an OCTET STRING.
    pub fn to_der(&self) -> Vec<u8> {
        if self.tag.constructed() {
            let content: Vec<u8> = self.subs.iter().flat_map(|sub| sub.to_der()).collect();
            encode_element(self.tag, &content)
        } else {
            encode_element(self.tag, self.value())
        }
    }

    fn expect_tag(&self, ok: bool, expected: &str) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(Error::Type(format!(
                "expected {}, found tag {}",
                expected, self.tag
            )))
        }
    }

    /// Decode a BOOLEAN
    pub fn to_boolean(&self) -> Result<bool> {
        self.expect_tag(self.tag.is_boolean(), "BOOLEAN")?;
        parse_boolean(self.value())
    }

    /// Decode an INTEGER that fits in an `i64`
    pub fn to_integer(&self) -> Result<i64> {
        self.expect_tag(self.tag.is_integer(), "INTEGER")?;
        parse_integer(self.value())
    }

    /// Decode an OBJECT IDENTIFIER to dotted notation
    pub fn to_oid(&self) -> Result<String> {
        self.expect_tag(self.tag.is_oid(), "OBJECT IDENTIFIER")?;
        parse_oid(self.value())
    }

    /// Decode a UTCTime or GeneralizedTime
    pub fn to_date(&self) -> Result<DateTime<Utc>> {
        if self.tag.is_utc_time() {
            parse_time(self.value(), true)
        } else if self.tag.is_generalized_time() {
            parse_time(self.value(), false)
        } else {
            Err(Error::Type(format!(
                "expected UTCTime or GeneralizedTime, found tag {}",
                self.tag
            )))
        }
    }

    /// Decode a BIT STRING into individual bits
    pub fn to_bit_string(&self) -> Result<Vec<u8>> {
        self.expect_tag(self.tag.is_bit_string(), "BIT STRING")?;
        parse_bit_string(self.value())
    }

    /// The octets of a BIT STRING with no unused bits
    ///
    /// Keys and signatures are carried this way.
    pub fn bit_string_octets(&self) -> Result<&[u8]> {
        self.expect_tag(self.tag.is_bit_string(), "BIT STRING")?;
        match self.value().split_first() {
            Some((0, octets)) => Ok(octets),
            Some((unused, _)) => Err(Error::Parse(format!(
                "BIT STRING has {} unused bits, expected whole octets",
                unused
            ))),
            None => Err(Error::Parse("empty BIT STRING".to_string())),
        }
    }

    /// Decode a UTF8String, PrintableString or IA5String
    pub fn to_utf8_string(&self) -> Result<String> {
        self.expect_tag(self.tag.is_string(), "character string")?;
        parse_string(self.value())
    }
}

impl PartialEq for Asn1Obj {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for Asn1Obj {}

impl fmt::Debug for Asn1Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asn1Obj")
            .field("tag", &format_args!("{}", self.tag))
            .field("len", &self.value().len())
            .field("subs", &self.subs)
            .finish()
    }
}

fn encode_element(tag: Tag, content: &[u8]) -> Vec<u8> {
    let length = encode_length(content.len());
    let mut out = Vec::with_capacity(1 + length.len() + content.len());
    out.push(tag.to_der());
    out.extend_from_slice(&length);
    out.extend_from_slice(content);
    out
}

fn parse_element(stream: &mut ByteStream<'_>, buf: &Arc<[u8]>, depth: usize) -> Result<Asn1Obj> {
    if depth > MAX_DEPTH {
        return Err(Error::Parse(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }

    let start = stream.position();
    let tag = Tag::from_byte(stream.get_u8()?)?;
    let len = decode_length(stream)?;
    let header_len = stream.position() - start;

    // bounds check before touching the content
    let value_start = stream.position();
    stream.slice(value_start, len)?;
    let end = value_start + len;

    let subs = if tag.constructed() {
        parse_children(buf, value_start, end, depth)?
    } else if tag.is_octet_string() && len > 0 {
        match parse_children(buf, value_start, end, depth) {
            Ok(subs) => subs,
            Err(e) => {
                tracing::trace!("OCTET STRING content is not DER, keeping it opaque: {}", e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    stream.seek(end)?;

    Ok(Asn1Obj {
        tag,
        buf: Arc::clone(buf),
        start,
        header_len,
        end,
        subs,
    })
}

/// Parse the elements packed in `buf[start..end]`
///
/// The cursor is limited to `end`, so a child can never claim bytes outside
/// its parent.
fn parse_children(buf: &Arc<[u8]>, start: usize, end: usize, depth: usize) -> Result<Vec<Asn1Obj>> {
    let mut stream = ByteStream::new(&buf[..end]);
    stream.seek(start)?;

    let mut subs = Vec::new();
    while stream.position() < end {
        subs.push(parse_element(&mut stream, buf, depth + 1)?);
    }
    Ok(subs)
}
