//! Typed attributes of RFC 2868 (Tunnel Protocol Support).
//!
//! Tunnel attributes carry a leading tag octet that groups the
//! attributes of one tunnel together.  Tags run 0x01..=0x1F; zero means
//! untagged.  For string-valued attributes a zero tag is omitted from
//! the wire, since any octet above 0x1F is part of the value itself.

use bytes::{BufMut, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;

use crate::{attributes::Property, crypto, packet::Packet, value, Error};

const TUNNEL_PASSWORD_TYPE: u8 = 69;

fn encode_tagged_string(tag: u8, value: &str, buf: &mut BytesMut) -> Result<(), Error> {
    if tag > 0x1f {
        return Err(Error::InvalidTag);
    }

    if tag != 0 {
        buf.put_u8(tag);
    }

    value::encode_string(value, buf)
}

fn decode_tagged_string(value: &[u8]) -> Result<(u8, &str), Error> {
    match value.first() {
        Some(tag) if *tag <= 0x1f => Ok((*tag, value::decode_string(&value[1..])?)),
        _ => Ok((0, value::decode_string(value)?)),
    }
}

// tagged integers are a tag octet and a 24-bit big-endian value.
fn encode_tagged_integer(tag: u8, value: u32, buf: &mut BytesMut) -> Result<(), Error> {
    if tag > 0x1f {
        return Err(Error::InvalidTag);
    }

    if value > 0x00ff_ffff {
        return Err(Error::InvalidValue);
    }

    buf.put_u8(tag);
    buf.put_slice(&value.to_be_bytes()[1..]);
    Ok(())
}

fn decode_tagged_integer(value: &[u8]) -> Result<(u8, u32), Error> {
    if value.len() != 4 {
        return Err(Error::InvalidAttributeLength);
    }

    if value[0] > 0x1f {
        return Err(Error::InvalidTag);
    }

    Ok((
        value[0],
        u32::from_be_bytes([0, value[1], value[2], value[3]]),
    ))
}

/// The TUNNEL-TYPE attribute indicates the tunneling protocol(s) to be
/// used, or the protocol in use for a session.
///
/// # Unit Test
///
/// ```
/// use radius_server_codec::rfc2868::TunnelType;
/// use radius_server_codec::{Code, Packet};
///
/// let mut packet = Packet::new(Code::AccessAccept, b"s".as_slice());
/// packet.set::<TunnelType>((11, TunnelType::IpIp)).unwrap();
///
/// assert_eq!(packet.attributes.get(64), Some(&[0x0b, 0x00, 0x00, 0x07][..]));
/// assert_eq!(packet.get::<TunnelType>(), Some((11, TunnelType::IpIp)));
/// ```
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum TunnelType {
    Pptp = 1,
    L2f = 2,
    L2tp = 3,
    Atmp = 4,
    Vtp = 5,
    Ah = 6,
    IpIp = 7,
    MinIpIp = 8,
    Esp = 9,
    Gre = 10,
    Dvs = 11,
    IpInIpTunneling = 12,
    Vlan = 13,
}

impl<'a> Property<'a> for TunnelType {
    type Inner = (u8, TunnelType);

    fn kind() -> u8 {
        64
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_integer(tag, value.into(), buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        let (tag, value) = decode_tagged_integer(value)?;
        Ok((tag, Self::try_from(value).map_err(|_| Error::InvalidValue)?))
    }
}

impl std::fmt::Display for TunnelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pptp => write!(f, "PPTP"),
            Self::L2f => write!(f, "L2F"),
            Self::L2tp => write!(f, "L2TP"),
            Self::Atmp => write!(f, "ATMP"),
            Self::Vtp => write!(f, "VTP"),
            Self::Ah => write!(f, "AH"),
            Self::IpIp => write!(f, "IP-IP"),
            Self::MinIpIp => write!(f, "MIN-IP-IP"),
            Self::Esp => write!(f, "ESP"),
            Self::Gre => write!(f, "GRE"),
            Self::Dvs => write!(f, "DVS"),
            Self::IpInIpTunneling => write!(f, "IP-in-IP-Tunneling"),
            Self::Vlan => write!(f, "VLAN"),
        }
    }
}

/// The TUNNEL-MEDIUM-TYPE attribute indicates the transport medium to
/// use when creating a tunnel for protocols that can operate over
/// multiple transports.
#[repr(u32)]
#[derive(TryFromPrimitive, IntoPrimitive)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum TunnelMediumType {
    Ipv4 = 1,
    Ipv6 = 2,
    Nsap = 3,
    Hdlc = 4,
    Bbn1822 = 5,
    Ieee802 = 6,
    E163 = 7,
    E164 = 8,
}

impl<'a> Property<'a> for TunnelMediumType {
    type Inner = (u8, TunnelMediumType);

    fn kind() -> u8 {
        65
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_integer(tag, value.into(), buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        let (tag, value) = decode_tagged_integer(value)?;
        Ok((tag, Self::try_from(value).map_err(|_| Error::InvalidValue)?))
    }
}

/// The TUNNEL-CLIENT-ENDPOINT attribute contains the address of the
/// initiator end of the tunnel.
pub struct TunnelClientEndpoint;
impl<'a> Property<'a> for TunnelClientEndpoint {
    type Inner = (u8, &'a str);

    fn kind() -> u8 {
        66
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_string(tag, value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        decode_tagged_string(value)
    }
}

/// The TUNNEL-SERVER-ENDPOINT attribute contains the address of the
/// server end of the tunnel.
pub struct TunnelServerEndpoint;
impl<'a> Property<'a> for TunnelServerEndpoint {
    type Inner = (u8, &'a str);

    fn kind() -> u8 {
        67
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_string(tag, value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        decode_tagged_string(value)
    }
}

/// The TUNNEL-PRIVATE-GROUP-ID attribute indicates the group ID for a
/// particular tunneled session.
pub struct TunnelPrivateGroupId;
impl<'a> Property<'a> for TunnelPrivateGroupId {
    type Inner = (u8, &'a str);

    fn kind() -> u8 {
        81
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_string(tag, value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        decode_tagged_string(value)
    }
}

/// The TUNNEL-ASSIGNMENT-ID attribute indicates to the tunnel initiator
/// the particular tunnel to which a session is to be assigned.
///
/// # Unit Test
///
/// ```
/// use radius_server_codec::rfc2868::TunnelAssignmentId;
/// use radius_server_codec::{Code, Packet};
///
/// let mut packet = Packet::new(Code::AccessAccept, b"s".as_slice());
/// packet.set::<TunnelAssignmentId>((4, "alt")).unwrap();
/// assert_eq!(packet.attributes.get(82), Some(&[0x04, b'a', b'l', b't'][..]));
///
/// // a zero tag stays off the wire.
/// packet.set::<TunnelAssignmentId>((0, "alt")).unwrap();
/// assert_eq!(packet.attributes.get(82), Some(&b"alt"[..]));
/// ```
pub struct TunnelAssignmentId;
impl<'a> Property<'a> for TunnelAssignmentId {
    type Inner = (u8, &'a str);

    fn kind() -> u8 {
        82
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_string(tag, value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        decode_tagged_string(value)
    }
}

/// The TUNNEL-PREFERENCE attribute indicates the relative preference
/// assigned to each tunnel when more than one set of tunneling
/// attributes is returned.
pub struct TunnelPreference;
impl<'a> Property<'a> for TunnelPreference {
    type Inner = (u8, u32);

    fn kind() -> u8 {
        83
    }

    fn encode((tag, value): Self::Inner, _: &Packet, buf: &mut BytesMut) -> Result<(), Error> {
        encode_tagged_integer(tag, value, buf)
    }

    fn decode(value: &'a [u8], _: &Packet) -> Result<Self::Inner, Error> {
        decode_tagged_integer(value)
    }
}

/// Append a TUNNEL-PASSWORD attribute (RFC 2868 §3.5).
///
/// The attribute is tag ‖ salt ‖ ciphertext; the salt is drawn fresh
/// from the CSPRNG with its most significant bit set, and the keystream
/// is seeded from the packet's secret and authenticator.  The packet is
/// normally a response built with [`Packet::response`], whose
/// authenticator is the request's.
pub fn tunnel_password_add(packet: &mut Packet, tag: u8, password: &[u8]) -> Result<(), Error> {
    let value = encode_tunnel_password(packet, tag, password)?;
    packet.attributes.add(TUNNEL_PASSWORD_TYPE, value);
    Ok(())
}

/// Set the TUNNEL-PASSWORD attribute, replacing existing values.
pub fn tunnel_password_set(packet: &mut Packet, tag: u8, password: &[u8]) -> Result<(), Error> {
    let value = encode_tunnel_password(packet, tag, password)?;
    packet.attributes.set(TUNNEL_PASSWORD_TYPE, value);
    Ok(())
}

/// Recover the first TUNNEL-PASSWORD attribute of `packet`, or `None`
/// when the packet carries none.
///
/// Decryption is keyed on the authenticator of the original request,
/// which a response packet no longer carries after a parse, so the
/// request is passed in explicitly.  Returns the tag and the plaintext.
pub fn tunnel_password_lookup(
    packet: &Packet,
    request: &Packet,
) -> Result<Option<(u8, Vec<u8>)>, Error> {
    let Some(value) = packet.attributes.get(TUNNEL_PASSWORD_TYPE) else {
        return Ok(None);
    };

    if value.len() < 3 {
        return Err(Error::InvalidAttributeLength);
    }

    let tag = value[0];
    if tag > 0x1f {
        return Err(Error::InvalidTag);
    }

    let (password, _) =
        crypto::decrypt_tunnel_password(&value[1..], &packet.secret, &request.authenticator)?;
    Ok(Some((tag, password)))
}

fn encode_tunnel_password(packet: &Packet, tag: u8, password: &[u8]) -> Result<Vec<u8>, Error> {
    if tag > 0x1f {
        return Err(Error::InvalidTag);
    }

    let mut salt = [0u8; 2];
    rand::rng().fill(&mut salt[..]);
    salt[0] |= 0x80;

    let hidden =
        crypto::encrypt_tunnel_password(password, &salt, &packet.secret, &packet.authenticator)?;

    let mut value = Vec::with_capacity(1 + hidden.len());
    value.push(tag);
    value.extend_from_slice(&hidden);
    Ok(value)
}
