//! Single-byte ASN.1 identifier octets

use crate::error::{Error, Result};
use std::fmt;

const UNIVERSAL_BOOLEAN: u8 = 0x01;
const UNIVERSAL_INTEGER: u8 = 0x02;
const UNIVERSAL_BIT_STRING: u8 = 0x03;
const UNIVERSAL_OCTET_STRING: u8 = 0x04;
const UNIVERSAL_OID: u8 = 0x06;
const UNIVERSAL_UTF8_STRING: u8 = 0x0c;
const UNIVERSAL_SEQUENCE: u8 = 0x10;
const UNIVERSAL_SET: u8 = 0x11;
const UNIVERSAL_PRINTABLE_STRING: u8 = 0x13;
const UNIVERSAL_IA5_STRING: u8 = 0x16;
const UNIVERSAL_UTC_TIME: u8 = 0x17;
const UNIVERSAL_GENERALIZED_TIME: u8 = 0x18;

/// The two class bits of an identifier octet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    /// Universal (built-in ASN.1 types)
    Universal = 0,
    /// Application-specific
    Application = 1,
    /// Context-specific (`[n]` in module definitions)
    ContextSpecific = 2,
    /// Private
    Private = 3,
}

impl TagClass {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// A decoded identifier octet
///
/// Only low-tag-number form is supported: tag number `0x1f` (the long-form
/// escape) is rejected, as is universal tag 0, which is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    number: u8,
    constructed: bool,
    class: TagClass,
}

impl Tag {
    /// Universal SEQUENCE (constructed)
    pub const SEQUENCE: Tag = Tag {
        number: UNIVERSAL_SEQUENCE,
        constructed: true,
        class: TagClass::Universal,
    };

    /// Universal SET (constructed)
    pub const SET: Tag = Tag {
        number: UNIVERSAL_SET,
        constructed: true,
        class: TagClass::Universal,
    };

    /// Universal INTEGER
    pub const INTEGER: Tag = Tag::universal(UNIVERSAL_INTEGER);

    /// Universal BIT STRING
    pub const BIT_STRING: Tag = Tag::universal(UNIVERSAL_BIT_STRING);

    /// Universal OCTET STRING
    pub const OCTET_STRING: Tag = Tag::universal(UNIVERSAL_OCTET_STRING);

    /// Universal OBJECT IDENTIFIER
    pub const OID: Tag = Tag::universal(UNIVERSAL_OID);

    /// Universal UTF8String
    pub const UTF8_STRING: Tag = Tag::universal(UNIVERSAL_UTF8_STRING);

    const fn universal(number: u8) -> Tag {
        Tag {
            number,
            constructed: false,
            class: TagClass::Universal,
        }
    }

    /// Decode an identifier octet
    pub fn from_byte(byte: u8) -> Result<Self> {
        let number = byte & 0x1f;
        let constructed = byte & 0x20 == 0x20;
        let class = TagClass::from_bits(byte >> 6);

        if number == 0x1f {
            return Err(Error::Parse(format!(
                "long-form tag not supported: 0x{:02x}",
                byte
            )));
        }

        if class == TagClass::Universal && number == 0 {
            return Err(Error::Parse(format!(
                "reserved universal tag 0: 0x{:02x}",
                byte
            )));
        }

        Ok(Self {
            number,
            constructed,
            class,
        })
    }

    /// Build a context-specific tag `[number]`
    pub fn context_specific(number: u8, constructed: bool) -> Result<Self> {
        Self::from_byte((TagClass::ContextSpecific as u8) << 6 | (constructed as u8) << 5 | number)
    }

    /// The five-bit tag number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Whether the element is constructed
    pub fn constructed(&self) -> bool {
        self.constructed
    }

    /// The tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Encode back to the identifier octet
    pub fn to_der(&self) -> u8 {
        self.number | (self.constructed as u8) << 5 | (self.class as u8) << 6
    }

    fn is_universal(&self, number: u8) -> bool {
        self.class == TagClass::Universal && self.number == number
    }

    /// Whether this is a context-specific tag with the given number
    pub fn is_context_specific(&self, number: u8) -> bool {
        self.class == TagClass::ContextSpecific && self.number == number
    }

    pub fn is_boolean(&self) -> bool {
        self.is_universal(UNIVERSAL_BOOLEAN)
    }

    pub fn is_integer(&self) -> bool {
        self.is_universal(UNIVERSAL_INTEGER)
    }

    pub fn is_bit_string(&self) -> bool {
        self.is_universal(UNIVERSAL_BIT_STRING)
    }

    pub fn is_octet_string(&self) -> bool {
        self.is_universal(UNIVERSAL_OCTET_STRING)
    }

    pub fn is_oid(&self) -> bool {
        self.is_universal(UNIVERSAL_OID)
    }

    pub fn is_sequence(&self) -> bool {
        self.is_universal(UNIVERSAL_SEQUENCE)
    }

    pub fn is_utc_time(&self) -> bool {
        self.is_universal(UNIVERSAL_UTC_TIME)
    }

    pub fn is_generalized_time(&self) -> bool {
        self.is_universal(UNIVERSAL_GENERALIZED_TIME)
    }

    /// UTF8String, PrintableString or IA5String
    pub fn is_string(&self) -> bool {
        self.is_universal(UNIVERSAL_UTF8_STRING)
            || self.is_universal(UNIVERSAL_PRINTABLE_STRING)
            || self.is_universal(UNIVERSAL_IA5_STRING)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.to_der())
    }
}
