use num_enum::{FromPrimitive, IntoPrimitive};

/// RADIUS Packet Type Codes
///
/// [RFC2865]: https://tools.ietf.org/html/rfc2865#section-3
/// [RFC5176]: https://tools.ietf.org/html/rfc5176
/// [RFC5997]: https://tools.ietf.org/html/rfc5997
///
/// The Code field is one octet and identifies the type of RADIUS packet.
/// When a packet is received with an invalid Code field, it is silently
/// discarded by servers; this codec preserves unknown codes on parse so
/// the caller can make that decision, and refuses to sign them on encode.
///
/// RADIUS codes (decimal) relevant here are assigned as follows:
///
/// 1: Access-Request
/// 2: Access-Accept
/// 3: Access-Reject
/// 4: Accounting-Request
/// 5: Accounting-Response
/// 11: Access-Challenge
/// 12: Status-Server (experimental)
/// 13: Status-Client (experimental)
/// 40: Disconnect-Request
/// 41: Disconnect-ACK
/// 42: Disconnect-NAK
/// 43: CoA-Request
/// 44: CoA-ACK
/// 45: CoA-NAK
#[repr(u8)]
#[derive(FromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Code {
    AccessRequest = 1,
    AccessAccept = 2,
    AccessReject = 3,
    AccountingRequest = 4,
    AccountingResponse = 5,
    AccessChallenge = 11,
    StatusServer = 12,
    StatusClient = 13,
    DisconnectRequest = 40,
    DisconnectAck = 41,
    DisconnectNak = 42,
    CoaRequest = 43,
    CoaAck = 44,
    CoaNak = 45,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl std::fmt::Display for Code {
    /// # Unit Test
    ///
    /// ```
    /// use radius_server_codec::Code;
    ///
    /// assert_eq!(Code::AccessRequest.to_string(), "Access-Request");
    /// assert_eq!(Code::from(11).to_string(), "Access-Challenge");
    /// assert_eq!(Code::from(200).to_string(), "Code(200)");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessRequest => write!(f, "Access-Request"),
            Self::AccessAccept => write!(f, "Access-Accept"),
            Self::AccessReject => write!(f, "Access-Reject"),
            Self::AccountingRequest => write!(f, "Accounting-Request"),
            Self::AccountingResponse => write!(f, "Accounting-Response"),
            Self::AccessChallenge => write!(f, "Access-Challenge"),
            Self::StatusServer => write!(f, "Status-Server"),
            Self::StatusClient => write!(f, "Status-Client"),
            Self::DisconnectRequest => write!(f, "Disconnect-Request"),
            Self::DisconnectAck => write!(f, "Disconnect-ACK"),
            Self::DisconnectNak => write!(f, "Disconnect-NAK"),
            Self::CoaRequest => write!(f, "CoA-Request"),
            Self::CoaAck => write!(f, "CoA-ACK"),
            Self::CoaNak => write!(f, "CoA-NAK"),
            Self::Unknown(code) => write!(f, "Code({})", code),
        }
    }
}
