//! Typed attributes of RFC 2866 (RADIUS Accounting).

use bytes::BytesMut;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{attributes::Property, packet::Packet, value, Error};

/// The ACCT-STATUS-TYPE attribute indicates whether this
/// Accounting-Request marks the beginning of the user service (Start) or
/// the end (Stop).
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum AcctStatusType {
    Start = 1,
    Stop = 2,
    InterimUpdate = 3,
    AccountingOn = 7,
    AccountingOff = 8,
}

impl<'a> Property<'a> for AcctStatusType {
    type Inner = AcctStatusType;

    fn kind() -> u8 {
        40
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

impl std::fmt::Display for AcctStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Stop => write!(f, "Stop"),
            Self::InterimUpdate => write!(f, "Interim-Update"),
            Self::AccountingOn => write!(f, "Accounting-On"),
            Self::AccountingOff => write!(f, "Accounting-Off"),
        }
    }
}

macro_rules! integer_property {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        pub struct $name;
        impl<'a> Property<'a> for $name {
            type Inner = u32;

            fn kind() -> u8 {
                $kind
            }

            fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
                value::encode_integer(value, buf);
                Ok(())
            }

            fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
                value::decode_integer(value)
            }
        }
    };
}

macro_rules! string_property {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        pub struct $name;
        impl<'a> Property<'a> for $name {
            type Inner = &'a str;

            fn kind() -> u8 {
                $kind
            }

            fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
                value::encode_string(value, buf)
            }

            fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
                value::decode_string(value)
            }
        }
    };
}

pub(crate) use {integer_property, string_property};

integer_property! {
    /// The ACCT-DELAY-TIME attribute indicates how many seconds the
    /// client has been trying to send this record for; the time of the
    /// event can be approximated by subtracting it from the arrival time.
    AcctDelayTime, 41
}

integer_property! {
    /// The ACCT-INPUT-OCTETS attribute indicates how many octets have
    /// been received from the port over the course of this service.
    AcctInputOctets, 42
}

integer_property! {
    /// The ACCT-OUTPUT-OCTETS attribute indicates how many octets have
    /// been sent to the port over the course of this service.
    AcctOutputOctets, 43
}

string_property! {
    /// The ACCT-SESSION-ID attribute is a unique Accounting ID to make
    /// it easy to match start and stop records in a log file.
    AcctSessionId, 44
}

/// The ACCT-AUTHENTIC attribute indicates how the user was
/// authenticated, whether by RADIUS, the NAS itself, or another remote
/// authentication protocol.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum AcctAuthentic {
    Radius = 1,
    Local = 2,
    Remote = 3,
}

impl<'a> Property<'a> for AcctAuthentic {
    type Inner = AcctAuthentic;

    fn kind() -> u8 {
        45
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

integer_property! {
    /// The ACCT-SESSION-TIME attribute indicates how many seconds the
    /// user has received service for.
    AcctSessionTime, 46
}

integer_property! {
    /// The ACCT-INPUT-PACKETS attribute indicates how many packets have
    /// been received from the port.
    AcctInputPackets, 47
}

integer_property! {
    /// The ACCT-OUTPUT-PACKETS attribute indicates how many packets have
    /// been sent to the port.
    AcctOutputPackets, 48
}

integer_property! {
    /// The ACCT-TERMINATE-CAUSE attribute indicates how the session was
    /// terminated.
    AcctTerminateCause, 49
}

string_property! {
    /// The ACCT-MULTI-SESSION-ID attribute links together multiple
    /// related sessions in a log file.
    AcctMultiSessionId, 50
}

integer_property! {
    /// The ACCT-LINK-COUNT attribute gives the count of links known to
    /// have been in a given multilink session at the time the record is
    /// generated.
    AcctLinkCount, 51
}
