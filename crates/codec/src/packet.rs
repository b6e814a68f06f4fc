use bytes::{BufMut, Bytes, BytesMut};
use md5::{Digest, Md5};
use rand::Rng;

use crate::{
    attributes::{Attributes, Property},
    code::Code,
    crypto::hmac_md5,
    Error, EAP_MESSAGE_TYPE, MAX_PACKET_LENGTH, MESSAGE_AUTHENTICATOR_TYPE,
};

/// Size of the packet header, authenticator included.
const HEADER_SIZE: usize = 20;

/// Size of the Message-Authenticator attribute, header included.
const MESSAGE_AUTHENTICATOR_SIZE: usize = 18;

/// A RADIUS packet.
///
/// A packet is either built locally with [`Packet::new`] /
/// [`Packet::response`] and mutated until it is encoded, or produced by
/// [`Packet::parse`] from an incoming datagram.  The shared secret rides
/// along so the hiding transforms and response signing can reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: Code,
    pub identifier: u8,
    pub authenticator: [u8; 16],
    pub secret: Bytes,
    pub attributes: Attributes,
}

impl Packet {
    /// Create a packet with a fresh identifier and authenticator.
    ///
    /// Both come from the thread-local CSPRNG; the authenticator doubles
    /// as the nonce every hiding transform is keyed on, so it must never
    /// be derived from the clock.
    pub fn new(code: Code, secret: impl Into<Bytes>) -> Self {
        let mut buff = [0u8; 17];
        rand::rng().fill(&mut buff[..]);

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&buff[1..]);

        Self {
            code,
            identifier: buff[0],
            authenticator,
            secret: secret.into(),
            attributes: Attributes::default(),
        }
    }

    /// Parse an encoded packet.
    ///
    /// # Unit Test
    ///
    /// ```
    /// use radius_server_codec::{Code, Packet};
    ///
    /// // RFC 2865 §7.1
    /// let buffer = [
    ///     0x01u8, 0x00, 0x00, 0x38, 0x0f, 0x40, 0x3f, 0x94, 0x73, 0x97, 0x80,
    ///     0x57, 0xbd, 0x83, 0xd5, 0xcb, 0x98, 0xf4, 0x22, 0x7a, 0x01, 0x06,
    ///     0x6e, 0x65, 0x6d, 0x6f, 0x02, 0x12, 0x0d, 0xbe, 0x70, 0x8d, 0x93,
    ///     0xd4, 0x13, 0xce, 0x31, 0x96, 0xe4, 0x3f, 0x78, 0x2a, 0x0a, 0xee,
    ///     0x04, 0x06, 0xc0, 0xa8, 0x01, 0x10, 0x05, 0x06, 0x00, 0x00, 0x00,
    ///     0x03,
    /// ];
    ///
    /// let packet = Packet::parse(&buffer, b"xyzzy5461".as_slice()).unwrap();
    /// assert_eq!(packet.code, Code::AccessRequest);
    /// assert_eq!(packet.identifier, 0);
    /// assert_eq!(packet.attributes.get(1), Some(&b"nemo"[..]));
    /// ```
    pub fn parse(bytes: &[u8], secret: impl Into<Bytes>) -> Result<Self, Error> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::ShortBuffer);
        }

        let length = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        if length < HEADER_SIZE || length > MAX_PACKET_LENGTH || length != bytes.len() {
            return Err(Error::InvalidPacketLength);
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&bytes[4..20]);

        Ok(Self {
            code: Code::from(bytes[0]),
            identifier: bytes[1],
            authenticator,
            secret: secret.into(),
            attributes: Attributes::parse(&bytes[HEADER_SIZE..])?,
        })
    }

    /// A reply sharing this packet's identifier, authenticator and
    /// secret, which is exactly what the response signing needs.
    pub fn response(&self, code: Code) -> Self {
        Self {
            code,
            identifier: self.identifier,
            authenticator: self.authenticator,
            secret: self.secret.clone(),
            attributes: Attributes::default(),
        }
    }

    /// Whether the encoder must insert a Message-Authenticator, per
    /// RFC 3579 §3.2: an EAP-Message riding any Access-* response.
    fn message_authenticator_required(&self) -> bool {
        self.attributes.get(EAP_MESSAGE_TYPE).is_some()
            && matches!(
                self.code,
                Code::AccessAccept | Code::AccessReject | Code::AccessChallenge
            )
    }

    /// Encode the packet to wire format, computing the authenticator the
    /// code calls for and, when required, the Message-Authenticator.
    pub fn encode(&self) -> Result<Bytes, Error> {
        let mut size = HEADER_SIZE + self.attributes.wire_size()?;

        let message_authenticator = self.message_authenticator_required();
        if message_authenticator {
            // the HMAC must cover a zero-filled slot the codec reserves;
            // a value from the caller would be signed as garbage.
            if self.attributes.get(MESSAGE_AUTHENTICATOR_TYPE).is_some() {
                return Err(Error::MessageAuthenticatorPresent);
            }

            size += MESSAGE_AUTHENTICATOR_SIZE;
        }

        if size > MAX_PACKET_LENGTH {
            return Err(Error::PacketTooLong);
        }

        let mut bytes = BytesMut::with_capacity(size);
        bytes.put_u8(self.code.into());
        bytes.put_u8(self.identifier);
        bytes.put_u16(size as u16);
        bytes.put_slice(&[0u8; 16]);
        self.attributes.encode_to(&mut bytes);

        if message_authenticator {
            bytes[4..20].copy_from_slice(&self.authenticator);
            bytes.put_u8(MESSAGE_AUTHENTICATOR_TYPE);
            bytes.put_u8(MESSAGE_AUTHENTICATOR_SIZE as u8);
            bytes.put_slice(&[0u8; 16]);

            let digest = hmac_md5(&self.secret, &[&bytes])?;
            bytes[size - 16..].copy_from_slice(&digest);
        }

        match self.code {
            Code::AccessRequest | Code::StatusServer => {
                bytes[4..20].copy_from_slice(&self.authenticator);
            }
            Code::AccountingRequest | Code::DisconnectRequest | Code::CoaRequest => {
                let digest = response_authenticator(&bytes, &[0u8; 16], &self.secret);
                bytes[4..20].copy_from_slice(&digest);
            }
            Code::AccessAccept
            | Code::AccessReject
            | Code::AccessChallenge
            | Code::AccountingResponse
            | Code::DisconnectAck
            | Code::DisconnectNak
            | Code::CoaAck
            | Code::CoaNak => {
                let digest = response_authenticator(&bytes, &self.authenticator, &self.secret);
                bytes[4..20].copy_from_slice(&digest);
            }
            code => return Err(Error::UnknownCode(code.into())),
        }

        Ok(bytes.freeze())
    }

    /// The first value of a typed attribute, or `None` when the
    /// attribute is absent or malformed.
    pub fn get<'a, T: Property<'a>>(&'a self) -> Option<T::Inner> {
        self.attributes
            .get(T::kind())
            .and_then(|value| T::decode(value, self).ok())
    }

    /// Every well-formed value of a typed attribute, in wire order.
    pub fn get_all<'a, T: Property<'a>>(&'a self) -> Vec<T::Inner> {
        self.attributes
            .get_all(T::kind())
            .filter_map(|value| T::decode(value, self).ok())
            .collect()
    }

    /// The first value of a typed attribute, surfacing decode failures.
    pub fn lookup<'a, T: Property<'a>>(&'a self) -> Option<Result<T::Inner, Error>> {
        self.attributes
            .get(T::kind())
            .map(|value| T::decode(value, self))
    }

    /// Append a typed attribute.
    pub fn add<'a, T: Property<'a>>(&mut self, value: T::Inner) -> Result<(), Error> {
        let mut buf = BytesMut::new();
        T::encode(value, self, &mut buf)?;
        self.attributes.add(T::kind(), buf.freeze());
        Ok(())
    }

    /// Set a typed attribute, replacing existing values in place.
    pub fn set<'a, T: Property<'a>>(&mut self, value: T::Inner) -> Result<(), Error> {
        let mut buf = BytesMut::new();
        T::encode(value, self, &mut buf)?;
        self.attributes.set(T::kind(), buf.freeze());
        Ok(())
    }

    /// Remove every value of a typed attribute.
    pub fn del<'a, T: Property<'a>>(&mut self) {
        self.attributes.del(T::kind());
    }
}

// MD5(code + id + length + authenticator + attributes + secret), the
// digest of RFC 2865 §3 binding a reply to its request.
fn response_authenticator(bytes: &[u8], authenticator: &[u8; 16], secret: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(&bytes[..4]);
    hasher.update(authenticator);
    hasher.update(&bytes[20..]);
    hasher.update(secret);
    hasher.finalize().into()
}
