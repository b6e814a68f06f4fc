//! Typed attributes of RFC 2865.
//!
//! Every item here is a mechanical projection of the attribute container
//! onto one attribute number and its dictionary type; packets consume
//! them through [`Packet::get`](crate::Packet::get) and friends.

use bytes::BytesMut;
use md5::{Digest, Md5};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use std::net::Ipv4Addr;

use crate::{attributes::Property, crypto, packet::Packet, value, Error};

/// The USER-NAME attribute indicates the name of the user to be
/// authenticated.  It MUST be sent in Access-Request packets if
/// available.
pub struct UserName;
impl<'a> Property<'a> for UserName {
    type Inner = &'a str;

    fn kind() -> u8 {
        1
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_string(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_string(value)
    }
}

/// The USER-PASSWORD attribute indicates the password of the user to be
/// authenticated.  On the wire the password is hidden with the RFC 2865
/// §5.2 construction keyed on the shared secret and the request
/// authenticator; both directions reach through the packet for them.
///
/// # Unit Test
///
/// ```
/// use radius_server_codec::rfc2865::UserPassword;
/// use radius_server_codec::{Code, Packet};
///
/// let mut packet = Packet::new(Code::AccessRequest, b"xyzzy5461".as_slice());
/// packet.add::<UserPassword>(b"arctangent".to_vec()).unwrap();
///
/// assert_eq!(packet.get::<UserPassword>(), Some(b"arctangent".to_vec()));
/// assert_eq!(packet.attributes.get(2).unwrap().len(), 16);
/// ```
pub struct UserPassword;
impl<'a> Property<'a> for UserPassword {
    type Inner = Vec<u8>;

    fn kind() -> u8 {
        2
    }

    fn encode(value: Self::Inner, packet: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        let hidden =
            crypto::encrypt_user_password(&value, &packet.secret, &packet.authenticator)?;
        buf.extend_from_slice(&hidden);
        Ok(())
    }

    fn decode(value: &'a [u8], packet: &Packet) -> Result<Self::Inner, Error> {
        crypto::decrypt_user_password(value, &packet.secret, &packet.authenticator)
    }
}

/// The CHAP-PASSWORD attribute: one octet of CHAP identifier followed by
/// the 16-octet CHAP response.
///
/// Encoding takes the plaintext password and produces the response
/// digest over identifier, password and challenge (the CHAP-Challenge
/// attribute when present, the request authenticator otherwise);
/// decoding returns the wire octets, since CHAP is not reversible.
pub struct ChapPassword;
impl<'a> Property<'a> for ChapPassword {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        3
    }

    fn encode(value: Self::Inner, packet: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        if value.len() > 128 {
            return Err(Error::InvalidPasswordLength);
        }

        let identifier = 0x01;
        let mut hasher = Md5::new();
        hasher.update([identifier]);
        hasher.update(value);
        match packet.attributes.get(ChapChallenge::kind()) {
            Some(challenge) => hasher.update(challenge),
            None => hasher.update(packet.authenticator),
        }

        buf.extend_from_slice(&[identifier]);
        buf.extend_from_slice(&hasher.finalize());
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        if value.len() != 17 {
            return Err(Error::InvalidAttributeLength);
        }

        Ok(value)
    }
}

/// Verify a CHAP-Password response against a plaintext candidate.
pub fn verify_chap_password(packet: &Packet, password: &[u8]) -> bool {
    let Some(response) = packet.get::<ChapPassword>() else {
        return false;
    };

    let mut hasher = Md5::new();
    hasher.update([response[0]]);
    hasher.update(password);
    match packet.attributes.get(ChapChallenge::kind()) {
        Some(challenge) => hasher.update(challenge),
        None => hasher.update(packet.authenticator),
    }

    let sum: [u8; 16] = hasher.finalize().into();
    sum == response[1..]
}

/// The CHAP-CHALLENGE attribute contains the CHAP challenge sent by the
/// NAS to a PPP CHAP user.
pub struct ChapChallenge;
impl<'a> Property<'a> for ChapChallenge {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        60
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_octets(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Ok(value)
    }
}

/// The NAS-IP-ADDRESS attribute indicates the identifying IP Address of
/// the NAS which is requesting authentication of the user.
pub struct NasIpAddress;
impl<'a> Property<'a> for NasIpAddress {
    type Inner = Ipv4Addr;

    fn kind() -> u8 {
        4
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_ipv4(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_ipv4(value)
    }
}

/// The NAS-PORT attribute indicates the physical port number of the NAS
/// which is authenticating the user.
pub struct NasPort;
impl<'a> Property<'a> for NasPort {
    type Inner = u32;

    fn kind() -> u8 {
        5
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_integer(value)
    }
}

/// The SERVICE-TYPE attribute indicates the type of service the user has
/// requested, or the type of service to be provided.
///
/// 1: Login
/// 2: Framed
/// 3: Callback Login
/// 4: Callback Framed
/// 5: Outbound
/// 6: Administrative
/// 7: NAS Prompt
/// 8: Authenticate Only
/// 9: Callback NAS Prompt
/// 10: Call Check
/// 11: Callback Administrative
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum ServiceType {
    LoginUser = 1,
    FramedUser = 2,
    CallbackLoginUser = 3,
    CallbackFramedUser = 4,
    OutboundUser = 5,
    AdministrativeUser = 6,
    NasPromptUser = 7,
    AuthenticateOnly = 8,
    CallbackNasPrompt = 9,
    CallCheck = 10,
    CallbackAdministrative = 11,
}

impl<'a> Property<'a> for ServiceType {
    type Inner = ServiceType;

    fn kind() -> u8 {
        6
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginUser => write!(f, "Login-User"),
            Self::FramedUser => write!(f, "Framed-User"),
            Self::CallbackLoginUser => write!(f, "Callback-Login-User"),
            Self::CallbackFramedUser => write!(f, "Callback-Framed-User"),
            Self::OutboundUser => write!(f, "Outbound-User"),
            Self::AdministrativeUser => write!(f, "Administrative-User"),
            Self::NasPromptUser => write!(f, "NAS-Prompt-User"),
            Self::AuthenticateOnly => write!(f, "Authenticate-Only"),
            Self::CallbackNasPrompt => write!(f, "Callback-NAS-Prompt"),
            Self::CallCheck => write!(f, "Call-Check"),
            Self::CallbackAdministrative => write!(f, "Callback-Administrative"),
        }
    }
}

/// The FRAMED-PROTOCOL attribute indicates the framing to be used for
/// framed access.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum FramedProtocol {
    Ppp = 1,
    Slip = 2,
    Arap = 3,
    Gandalf = 4,
    Xylogics = 5,
    X75Synchronous = 6,
}

impl<'a> Property<'a> for FramedProtocol {
    type Inner = FramedProtocol;

    fn kind() -> u8 {
        7
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

/// The FRAMED-IP-ADDRESS attribute indicates the address to be
/// configured for the user.
pub struct FramedIpAddress;
impl<'a> Property<'a> for FramedIpAddress {
    type Inner = Ipv4Addr;

    fn kind() -> u8 {
        8
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_ipv4(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_ipv4(value)
    }
}

/// The FRAMED-IP-NETMASK attribute indicates the IP netmask to be
/// configured for the user when the user is a router to a network.
pub struct FramedIpNetmask;
impl<'a> Property<'a> for FramedIpNetmask {
    type Inner = Ipv4Addr;

    fn kind() -> u8 {
        9
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_ipv4(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_ipv4(value)
    }
}

/// The FRAMED-ROUTING attribute indicates the routing method for the
/// user, when the user is a router to a network.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum FramedRouting {
    None = 0,
    Send = 1,
    Listen = 2,
    SendAndListen = 3,
}

impl<'a> Property<'a> for FramedRouting {
    type Inner = FramedRouting;

    fn kind() -> u8 {
        10
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

/// The FRAMED-MTU attribute indicates the Maximum Transmission Unit to
/// be configured for the user.
pub struct FramedMtu;
impl<'a> Property<'a> for FramedMtu {
    type Inner = u32;

    fn kind() -> u8 {
        12
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_integer(value)
    }
}

/// The FRAMED-COMPRESSION attribute indicates a compression protocol to
/// be used for the link.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum FramedCompression {
    None = 0,
    VanJacobsonTcpIp = 1,
    IpxHeader = 2,
    StacLzs = 3,
}

impl<'a> Property<'a> for FramedCompression {
    type Inner = FramedCompression;

    fn kind() -> u8 {
        13
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

/// The LOGIN-IP-HOST attribute indicates the system with which to
/// connect the user, when the Login-Service attribute is included.
pub struct LoginIpHost;
impl<'a> Property<'a> for LoginIpHost {
    type Inner = Ipv4Addr;

    fn kind() -> u8 {
        14
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_ipv4(value, buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_ipv4(value)
    }
}

/// The LOGIN-SERVICE attribute indicates the service to use to connect
/// the user to the login host.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum LoginService {
    Telnet = 0,
    Rlogin = 1,
    TcpClear = 2,
    PortMaster = 3,
    Lat = 4,
    X25Pad = 5,
    X25T3pos = 6,
    TcpClearQuiet = 8,
}

impl<'a> Property<'a> for LoginService {
    type Inner = LoginService;

    fn kind() -> u8 {
        15
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}

/// The REPLY-MESSAGE attribute indicates text which MAY be displayed to
/// the user.
pub struct ReplyMessage;
impl<'a> Property<'a> for ReplyMessage {
    type Inner = &'a str;

    fn kind() -> u8 {
        18
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_string(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_string(value)
    }
}

/// The STATE attribute is sent by the server to the client in an
/// Access-Challenge and MUST be sent unmodified in the following
/// Access-Request reply.
pub struct State;
impl<'a> Property<'a> for State {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        24
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_octets(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Ok(value)
    }
}

/// The CLASS attribute is sent by the server to the client and SHOULD be
/// sent unmodified by the client to the accounting server.
pub struct Class;
impl<'a> Property<'a> for Class {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        25
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_octets(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Ok(value)
    }
}

/// The CALLED-STATION-ID attribute allows the NAS to send the phone
/// number the user called, using Dialed Number Identification.
pub struct CalledStationId;
impl<'a> Property<'a> for CalledStationId {
    type Inner = &'a str;

    fn kind() -> u8 {
        30
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_string(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_string(value)
    }
}

/// The CALLING-STATION-ID attribute allows the NAS to send the phone
/// number the call came from, using Automatic Number Identification.
pub struct CallingStationId;
impl<'a> Property<'a> for CallingStationId {
    type Inner = &'a str;

    fn kind() -> u8 {
        31
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_string(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_string(value)
    }
}

/// The NAS-IDENTIFIER attribute contains a string identifying the NAS
/// originating the Access-Request.
pub struct NasIdentifier;
impl<'a> Property<'a> for NasIdentifier {
    type Inner = &'a str;

    fn kind() -> u8 {
        32
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_string(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        value::decode_string(value)
    }
}

/// The PROXY-STATE attribute is available to be sent by a proxy server
/// to another server when forwarding an Access-Request and MUST be
/// returned unmodified in the response.  Order between multiple
/// instances is significant, which is why the container is ordered.
pub struct ProxyState;
impl<'a> Property<'a> for ProxyState {
    type Inner = &'a [u8];

    fn kind() -> u8 {
        33
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_octets(value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Ok(value)
    }
}

/// The NAS-PORT-TYPE attribute indicates the type of the physical port
/// of the NAS which is authenticating the user.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum NasPortType {
    Async = 0,
    Sync = 1,
    IsdnSync = 2,
    IsdnAsyncV120 = 3,
    IsdnAsyncV110 = 4,
    Virtual = 5,
    Piafs = 6,
    HdlcClearChannel = 7,
    X25 = 8,
    X75 = 9,
    G3Fax = 10,
    Sdsl = 11,
    AdslCap = 12,
    AdslDmt = 13,
    Idsl = 14,
    Ethernet = 15,
    Xdsl = 16,
    Cable = 17,
    WirelessOther = 18,
    Wireless80211 = 19,
}

impl<'a> Property<'a> for NasPortType {
    type Inner = NasPortType;

    fn kind() -> u8 {
        61
    }

    fn encode(value: Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        value::encode_integer(value.into(), buf);
        Ok(())
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        Self::try_from(value::decode_integer(value)?).map_err(|_| Error::InvalidValue)
    }
}
