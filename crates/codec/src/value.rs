//! Scalar attribute value codecs.
//!
//! Every RADIUS attribute value is an opaque byte string on the wire;
//! these functions are the projections between those bytes and the
//! semantic types the dictionaries assign (integer, ipaddr, date, ...).
//! Fixed-width decoders fail on any other width, and encoders reject
//! out-of-range input instead of truncating.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{BufMut, BytesMut};

use crate::{Error, MAX_ATTRIBUTE_LENGTH};

pub fn encode_integer(value: u32, buf: &mut BytesMut) {
    buf.put_u32(value);
}

/// # Unit Test
///
/// ```
/// use radius_server_codec::value::decode_integer;
/// use radius_server_codec::Error;
///
/// assert_eq!(decode_integer(&[0x00, 0x00, 0x00, 0x03]), Ok(3));
/// assert_eq!(decode_integer(&[0x00, 0x03]), Err(Error::InvalidAttributeLength));
/// ```
pub fn decode_integer(bytes: &[u8]) -> Result<u32, Error> {
    Ok(u32::from_be_bytes(as_array(bytes)?))
}

pub fn encode_integer64(value: u64, buf: &mut BytesMut) {
    buf.put_u64(value);
}

pub fn decode_integer64(bytes: &[u8]) -> Result<u64, Error> {
    Ok(u64::from_be_bytes(as_array(bytes)?))
}

pub fn encode_short(value: u16, buf: &mut BytesMut) {
    buf.put_u16(value);
}

pub fn decode_short(bytes: &[u8]) -> Result<u16, Error> {
    Ok(u16::from_be_bytes(as_array(bytes)?))
}

pub fn encode_byte(value: u8, buf: &mut BytesMut) {
    buf.put_u8(value);
}

pub fn decode_byte(bytes: &[u8]) -> Result<u8, Error> {
    let [value] = as_array(bytes)?;
    Ok(value)
}

pub fn encode_string(value: &str, buf: &mut BytesMut) -> Result<(), Error> {
    encode_octets(value.as_bytes(), buf)
}

pub fn decode_string(bytes: &[u8]) -> Result<&str, Error> {
    Ok(std::str::from_utf8(bytes)?)
}

pub fn encode_octets(value: &[u8], buf: &mut BytesMut) -> Result<(), Error> {
    if value.len() > MAX_ATTRIBUTE_LENGTH {
        return Err(Error::InvalidValue);
    }

    buf.put(value);
    Ok(())
}

pub fn encode_ipv4(value: Ipv4Addr, buf: &mut BytesMut) {
    buf.put_slice(&value.octets());
}

/// # Unit Test
///
/// ```
/// use std::net::Ipv4Addr;
/// use radius_server_codec::value::decode_ipv4;
///
/// let addr = decode_ipv4(&[0xc0, 0xa8, 0x01, 0x10]).unwrap();
/// assert_eq!(addr, Ipv4Addr::new(192, 168, 1, 16));
/// ```
pub fn decode_ipv4(bytes: &[u8]) -> Result<Ipv4Addr, Error> {
    Ok(Ipv4Addr::from(as_array::<4>(bytes)?))
}

pub fn encode_ipv6(value: Ipv6Addr, buf: &mut BytesMut) {
    buf.put_slice(&value.octets());
}

pub fn decode_ipv6(bytes: &[u8]) -> Result<Ipv6Addr, Error> {
    Ok(Ipv6Addr::from(as_array::<16>(bytes)?))
}

/// Interface-Id: exactly 8 opaque bytes.
pub fn encode_ifid(value: [u8; 8], buf: &mut BytesMut) {
    buf.put_slice(&value);
}

pub fn decode_ifid(bytes: &[u8]) -> Result<[u8; 8], Error> {
    as_array(bytes)
}

/// Encode an IPv6 prefix as two metadata octets followed by the
/// significant address octets.
///
/// The reserved octet is always zero and the unused low bits of the
/// final address octet are cleared, which keeps encoding canonical.
///
/// # Unit Test
///
/// ```
/// use bytes::BytesMut;
/// use radius_server_codec::value::{decode_ipv6_prefix, encode_ipv6_prefix};
///
/// let mut buf = BytesMut::new();
/// encode_ipv6_prefix("2001:db8::".parse().unwrap(), 24, &mut buf).unwrap();
/// assert_eq!(&buf[..], &[0x00, 24, 0x20, 0x01, 0x0d]);
///
/// let (addr, length) = decode_ipv6_prefix(&buf).unwrap();
/// assert_eq!(addr, "2001:d00::".parse::<std::net::Ipv6Addr>().unwrap());
/// assert_eq!(length, 24);
///
/// // bits past the prefix never reach the wire.
/// let mut buf = BytesMut::new();
/// encode_ipv6_prefix("2001:db8::".parse().unwrap(), 20, &mut buf).unwrap();
/// assert_eq!(&buf[..], &[0x00, 20, 0x20, 0x01, 0x00]);
/// ```
pub fn encode_ipv6_prefix(value: Ipv6Addr, length: u8, buf: &mut BytesMut) -> Result<(), Error> {
    if length > 128 {
        return Err(Error::InvalidValue);
    }

    let mut octets = value.octets();
    let size = (length as usize).div_ceil(8);

    // clear the bits past the prefix in the last significant octet.
    if length % 8 != 0 {
        octets[size - 1] &= 0xffu8 << (8 - length % 8);
    }

    buf.put_u8(0);
    buf.put_u8(length);
    buf.put_slice(&octets[..size]);
    Ok(())
}

/// Decode an IPv6 prefix back to a full 128-bit address and its prefix
/// length; omitted trailing octets read as zero.
pub fn decode_ipv6_prefix(bytes: &[u8]) -> Result<(Ipv6Addr, u8), Error> {
    if bytes.len() < 2 || bytes.len() > 18 {
        return Err(Error::InvalidAttributeLength);
    }

    let length = bytes[1];
    if length > 128 || bytes.len() - 2 != (length as usize).div_ceil(8) {
        return Err(Error::InvalidAttributeLength);
    }

    let mut octets = [0u8; 16];
    octets[..bytes.len() - 2].copy_from_slice(&bytes[2..]);
    Ok((Ipv6Addr::from(octets), length))
}

/// Date: seconds since the Unix epoch as a big-endian u32.
pub fn encode_date(value: SystemTime, buf: &mut BytesMut) -> Result<(), Error> {
    let seconds = value
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::InvalidValue)?
        .as_secs();

    buf.put_u32(u32::try_from(seconds).map_err(|_| Error::InvalidValue)?);
    Ok(())
}

pub fn decode_date(bytes: &[u8]) -> Result<SystemTime, Error> {
    let seconds = decode_integer(bytes)?;
    Ok(UNIX_EPOCH + Duration::from_secs(seconds as u64))
}

#[inline]
fn as_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N], Error> {
    bytes.try_into().map_err(|_| Error::InvalidAttributeLength)
}
