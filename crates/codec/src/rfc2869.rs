//! Typed attributes of RFC 2869 (RADIUS Extensions), the subset the
//! core protocol machinery leans on.

use bytes::BytesMut;

use std::time::SystemTime;

use crate::{
    attributes::Property,
    packet::Packet,
    rfc2866::{integer_property, string_property},
    value, Error,
};

integer_property! {
    /// The ACCT-INPUT-GIGAWORDS attribute indicates how many times the
    /// Acct-Input-Octets counter has wrapped around 2^32.
    AcctInputGigawords, 52
}

integer_property! {
    /// The ACCT-OUTPUT-GIGAWORDS attribute indicates how many times the
    /// Acct-Output-Octets counter has wrapped around 2^32.
    AcctOutputGigawords, 53
}

/// The EVENT-TIMESTAMP attribute records the time that the event
/// occurred on the NAS, in seconds since January 1, 1970 00:00 UTC.
pub struct EventTimestamp;
impl<'a> Property<'a> for EventTimestamp {
    type Inner = SystemTime;

    fn kind() -> u8 {
        55
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_date(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_date(value)
    }
}

string_property! {
    /// The CONNECT-INFO attribute is sent from the NAS to indicate the
    /// nature of the user's connection.
    ConnectInfo, 77
}

/// The EAP-MESSAGE attribute encapsulates EAP packets so the NAS does
/// not have to understand the authentication method it is passing
/// through.  An Access-Accept, Access-Reject or Access-Challenge
/// carrying this attribute must also carry a Message-Authenticator,
/// which the packet encoder inserts on its own.
pub struct EapMessage;
impl<'a> Property<'a> for EapMessage {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        79
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_octets(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Ok(value)
    }
}

/// The MESSAGE-AUTHENTICATOR attribute is an HMAC-MD5 over the whole
/// packet with this attribute's value zero-filled.  Reading it from a
/// parsed packet yields the 16 digest octets; writing it by hand is an
/// encode error whenever the codec owns the computation.
pub struct MessageAuthenticator;
impl<'a> Property<'a> for MessageAuthenticator {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        80
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        if value.len() != 16 {
            return Err(Error::InvalidAttributeLength);
        }

        buf.extend_from_slice(value);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        if value.len() != 16 {
            return Err(Error::InvalidAttributeLength);
        }

        Ok(value)
    }
}

string_property! {
    /// The NAS-PORT-ID attribute contains a text string which identifies
    /// the port of the NAS that is authenticating the user.
    NasPortId, 87
}
