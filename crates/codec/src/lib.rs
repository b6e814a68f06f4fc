//! ## Remote Authentication Dial In User Service (RADIUS)
//!
//! [RFC2865]: https://tools.ietf.org/html/rfc2865
//! [RFC2868]: https://tools.ietf.org/html/rfc2868
//! [RFC2869]: https://tools.ietf.org/html/rfc2869
//!
//! ### RADIUS Packet Structure
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Code      |  Identifier   |            Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |                         Authenticator                         |
//! |                                                               |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Attributes ...
//! +-+-+-+-+-+-+-+-+-+-+-
//! ```
//!
//! ### RADIUS Attributes
//!
//! ```text
//! 0                   1                   2
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! |     Type      |    Length     |  Value ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```
//!
//! RADIUS carries authentication, authorization, and configuration
//! information between a Network Access Server which desires to
//! authenticate its links and a shared Authentication Server.  The
//! protocol runs over UDP; a request and its response are correlated by
//! the one-byte Identifier field, and integrity is bound to a shared
//! secret through the 16-byte Authenticator field.  Attributes carrying
//! credentials (User-Password, Tunnel-Password) are additionally hidden
//! with an MD5 keystream derived from the secret and the authenticator.

pub mod attributes;
pub mod code;
pub mod crypto;
pub mod packet;
pub mod rfc2865;
pub mod rfc2866;
pub mod rfc2868;
pub mod rfc2869;
pub mod value;
pub mod vendor;

pub use self::{
    attributes::{Attributes, Property},
    code::Code,
    packet::Packet,
};

use std::str::Utf8Error;

/// The maximum wire length of a RADIUS packet.
pub const MAX_PACKET_LENGTH: usize = 4095;

/// The maximum length of a single attribute value.
pub const MAX_ATTRIBUTE_LENGTH: usize = 253;

/// Attribute numbers the packet codec itself must know about.
///
/// Message-Authenticator and EAP-Message live in the RFC 2869 registry,
/// but the encoder needs them to decide when to reserve the HMAC slot.
pub const VENDOR_SPECIFIC_TYPE: u8 = 26;
pub const EAP_MESSAGE_TYPE: u8 = 79;
pub const MESSAGE_AUTHENTICATOR_TYPE: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes remain than a header requires.
    ShortBuffer,
    /// The packet length field disagrees with the buffer.
    InvalidPacketLength,
    /// An attribute length octet is below 2 or runs past the buffer.
    InvalidAttributeLength,
    /// An attribute value exceeds 253 bytes and cannot be framed.
    AttributeTooLong,
    /// The encoded packet would exceed the 4095-byte wire maximum.
    PacketTooLong,
    /// The packet code is not one the encoder can sign.
    UnknownCode(u8),
    /// The caller pre-populated a Message-Authenticator the encoder owns.
    MessageAuthenticatorPresent,
    /// A scalar encoder was handed an out-of-range value.
    InvalidValue,
    /// A hiding transform requires a non-empty shared secret.
    MissingSecret,
    /// A password exceeds the length the transform can carry.
    InvalidPasswordLength,
    /// A hidden attribute is not a whole number of cipher blocks.
    InvalidHiddenLength,
    /// A tunnel attribute tag is outside 0x00..=0x1F.
    InvalidTag,
    /// A salt does not have its most significant bit set.
    InvalidSalt,
    SummaryFailed,
    Utf8Error(Utf8Error),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Self::Utf8Error(value)
    }
}
