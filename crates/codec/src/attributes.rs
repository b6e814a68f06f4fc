use bytes::{BufMut, Bytes, BytesMut};

use crate::{packet::Packet, Error, MAX_ATTRIBUTE_LENGTH};

/// An ordered multi-map of attribute type to value.
///
/// Attribute order is observable on the wire: RFC 2865 §5 requires that
/// multiple instances of the same attribute keep their order, and chains
/// like Proxy-State depend on it.  The container is therefore a plain
/// sequence of (type, value) pairs, never a table keyed by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(u8, Bytes)>);

impl Attributes {
    /// Parse the attribute region of a packet.
    ///
    /// # Unit Test
    ///
    /// ```
    /// use radius_server_codec::{Attributes, Error};
    ///
    /// let attrs = Attributes::parse(&[0x01, 0x06, 0x6e, 0x65, 0x6d, 0x6f]).unwrap();
    /// assert_eq!(attrs.get(1), Some(&b"nemo"[..]));
    ///
    /// assert_eq!(Attributes::parse(&[0x01]), Err(Error::ShortBuffer));
    /// assert_eq!(Attributes::parse(&[0x01, 0x01]), Err(Error::InvalidAttributeLength));
    /// assert_eq!(Attributes::parse(&[0x01, 0xff]), Err(Error::InvalidAttributeLength));
    /// ```
    pub fn parse(mut bytes: &[u8]) -> Result<Self, Error> {
        let mut attributes = Vec::with_capacity(10);

        while !bytes.is_empty() {
            if bytes.len() < 2 {
                return Err(Error::ShortBuffer);
            }

            let length = bytes[1] as usize;
            if length < 2 || length > bytes.len() {
                return Err(Error::InvalidAttributeLength);
            }

            attributes.push((bytes[0], Bytes::copy_from_slice(&bytes[2..length])));
            bytes = &bytes[length..];
        }

        Ok(Self(attributes))
    }

    /// Append a (type, value) pair.
    ///
    /// Over-long values are accepted here and rejected by `wire_size`
    /// when the packet is encoded.
    pub fn add(&mut self, kind: u8, value: impl Into<Bytes>) {
        self.0.push((kind, value.into()));
    }

    /// The first value of the given type.
    pub fn get(&self, kind: u8) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v.as_ref())
    }

    /// Every value of the given type, in insertion order.
    pub fn get_all<'a>(&'a self, kind: u8) -> impl Iterator<Item = &'a [u8]> {
        self.0
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, v)| v.as_ref())
    }

    /// Replace all values of a type with one value, in place.
    ///
    /// The first existing entry keeps its position and takes the new
    /// value; later entries of the type are removed.  Without an existing
    /// entry the pair is appended.  Entries of other types never move.
    pub fn set(&mut self, kind: u8, value: impl Into<Bytes>) {
        match self.0.iter().position(|(k, _)| *k == kind) {
            None => self.0.push((kind, value.into())),
            Some(index) => {
                self.0[index].1 = value.into();

                let mut current = 0;
                self.0.retain(|(k, _)| {
                    let keep = *k != kind || current <= index;
                    current += 1;
                    keep
                });
            }
        }
    }

    /// Remove every value of the given type.
    pub fn del(&mut self, kind: u8) {
        self.0.retain(|(k, _)| *k != kind);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.0.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    // raw access for the vendor framing, which edits envelope payloads
    // in place without disturbing the order contract.
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<(u8, Bytes)> {
        &mut self.0
    }

    /// The encoded size of the attribute region.
    ///
    /// # Unit Test
    ///
    /// ```
    /// use radius_server_codec::{Attributes, Error};
    ///
    /// let mut attrs = Attributes::default();
    /// attrs.add(3, &b"C"[..]);
    /// assert_eq!(attrs.wire_size(), Ok(3));
    ///
    /// attrs.add(1, vec![0u8; 300]);
    /// assert_eq!(attrs.wire_size(), Err(Error::AttributeTooLong));
    /// ```
    pub fn wire_size(&self) -> Result<usize, Error> {
        let mut size = 0;
        for (_, value) in &self.0 {
            if value.len() > MAX_ATTRIBUTE_LENGTH {
                return Err(Error::AttributeTooLong);
            }

            size += 2 + value.len();
        }

        Ok(size)
    }

    /// Write the attribute region in container order.
    ///
    /// Encoding equal insertion sequences yields byte-identical output;
    /// the caller must have validated sizes through `wire_size`.
    pub fn encode_to(&self, buf: &mut BytesMut) {
        for (kind, value) in &self.0 {
            buf.put_u8(*kind);
            buf.put_u8((2 + value.len()) as u8);
            buf.put(value.as_ref());
        }
    }
}

/// A typed radius attribute.
///
/// Implementations project a semantic type over the raw value bytes of
/// one attribute number.  Hidden attributes reach through the packet for
/// the shared secret and the request authenticator, which play the role
/// a transaction token plays in cookie-based protocols.
pub trait Property<'a> {
    /// The decoded representation of the attribute.
    type Inner;

    /// The attribute number.
    fn kind() -> u8;

    /// Write the wire form of `value` to the buffer.
    fn encode(value: Self::Inner, packet: &Packet, buf: &mut BytesMut) -> Result<(), Error>;

    /// Convert raw value bytes to the decoded representation.
    fn decode(value: &'a [u8], packet: &Packet) -> Result<Self::Inner, Error>;
}
