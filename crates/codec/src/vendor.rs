//! Vendor-Specific attribute framing (RFC 2865 §5.26).
//!
//! A Vendor-Specific value is a 4-byte vendor id followed by a payload
//! of nested ⟨type, length, value⟩ sub-attributes.  Vendors disagree on
//! the octet widths of the nested type and length fields, so every
//! operation takes a [`VendorFormat`]; the 1/1 default covers the vast
//! majority of dictionaries.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Packet, MAX_ATTRIBUTE_LENGTH, VENDOR_SPECIFIC_TYPE};

/// Octet widths of the nested sub-attribute header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorFormat {
    /// 1, 2 or 4 octets of sub-attribute type.
    pub type_octets: u8,
    /// 0, 1 or 2 octets of sub-attribute length; zero means the single
    /// sub-attribute owns the rest of the payload.
    pub length_octets: u8,
}

impl Default for VendorFormat {
    fn default() -> Self {
        Self {
            type_octets: 1,
            length_octets: 1,
        }
    }
}

/// Append a sub-attribute, reusing a vendor envelope that has room.
pub fn add(
    packet: &mut Packet,
    format: VendorFormat,
    vendor: u32,
    kind: u32,
    value: &[u8],
) -> Result<(), Error> {
    let mut sub = BytesMut::new();
    encode_sub(format, kind, value, &mut sub)?;

    for (attr, payload) in packet.attributes.entries_mut() {
        if *attr != VENDOR_SPECIFIC_TYPE || vendor_id(payload) != Some(vendor) {
            continue;
        }

        if format.length_octets != 0 && payload.len() + sub.len() <= MAX_ATTRIBUTE_LENGTH {
            let mut grown = BytesMut::from(payload.as_ref());
            grown.put_slice(&sub);
            *payload = grown.freeze();
            return Ok(());
        }
    }

    let mut fresh = BytesMut::with_capacity(4 + sub.len());
    fresh.put_u32(vendor);
    fresh.put_slice(&sub);
    packet.attributes.add(VENDOR_SPECIFIC_TYPE, fresh.freeze());
    Ok(())
}

/// The first value of a vendor sub-attribute; malformed envelopes are
/// skipped the way unknown attributes are.
pub fn get(packet: &Packet, format: VendorFormat, vendor: u32, kind: u32) -> Option<Bytes> {
    match lookup(packet, format, vendor, kind) {
        Ok(value) => value,
        Err(_) => None,
    }
}

/// The first value of a vendor sub-attribute, surfacing framing errors
/// inside a matching envelope.
pub fn lookup(
    packet: &Packet,
    format: VendorFormat,
    vendor: u32,
    kind: u32,
) -> Result<Option<Bytes>, Error> {
    for payload in packet.attributes.get_all(VENDOR_SPECIFIC_TYPE) {
        if vendor_id(payload) != Some(vendor) {
            continue;
        }

        for (sub, value) in decode_subs(&payload[4..], format)? {
            if sub == kind {
                return Ok(Some(value));
            }
        }
    }

    Ok(None)
}

/// Replace every occurrence of a vendor sub-attribute with one value,
/// keeping the position of the first; envelopes left empty disappear.
pub fn set(
    packet: &mut Packet,
    format: VendorFormat,
    vendor: u32,
    kind: u32,
    value: &[u8],
) -> Result<(), Error> {
    let mut replaced = false;

    for (attr, payload) in packet.attributes.entries_mut() {
        if *attr != VENDOR_SPECIFIC_TYPE || vendor_id(payload) != Some(vendor) {
            continue;
        }

        let mut subs = decode_subs(&payload[4..], format)?;
        let before = subs.len();
        if !replaced {
            if let Some(index) = subs.iter().position(|(sub, _)| *sub == kind) {
                subs[index].1 = Bytes::copy_from_slice(value);
                let mut current = 0;
                subs.retain(|(sub, _)| {
                    let keep = *sub != kind || current <= index;
                    current += 1;
                    keep
                });
                replaced = true;
            }
        } else {
            subs.retain(|(sub, _)| *sub != kind);
        }

        if subs.len() != before || replaced {
            *payload = encode_payload(format, vendor, &subs)?;
        }
    }

    drop_empty_envelopes(packet);

    if !replaced {
        return add(packet, format, vendor, kind, value);
    }

    Ok(())
}

/// Remove every occurrence of a vendor sub-attribute.
pub fn del(
    packet: &mut Packet,
    format: VendorFormat,
    vendor: u32,
    kind: u32,
) -> Result<(), Error> {
    for (attr, payload) in packet.attributes.entries_mut() {
        if *attr != VENDOR_SPECIFIC_TYPE || vendor_id(payload) != Some(vendor) {
            continue;
        }

        let mut subs = decode_subs(&payload[4..], format)?;
        let before = subs.len();
        subs.retain(|(sub, _)| *sub != kind);

        if subs.len() != before {
            *payload = encode_payload(format, vendor, &subs)?;
        }
    }

    drop_empty_envelopes(packet);
    Ok(())
}

fn vendor_id(payload: &[u8]) -> Option<u32> {
    if payload.len() < 4 {
        return None;
    }

    Some(u32::from_be_bytes([
        payload[0], payload[1], payload[2], payload[3],
    ]))
}

fn drop_empty_envelopes(packet: &mut Packet) {
    packet
        .attributes
        .entries_mut()
        .retain(|(attr, payload)| *attr != VENDOR_SPECIFIC_TYPE || payload.len() > 4);
}

fn decode_subs(mut bytes: &[u8], format: VendorFormat) -> Result<Vec<(u32, Bytes)>, Error> {
    let header = (format.type_octets + format.length_octets) as usize;
    let mut subs = Vec::new();

    while !bytes.is_empty() {
        if bytes.len() < header {
            return Err(Error::ShortBuffer);
        }

        let kind = read_uint(&bytes[..format.type_octets as usize]);
        let length = match format.length_octets {
            0 => bytes.len(),
            _ => read_uint(
                &bytes[format.type_octets as usize..header],
            ) as usize,
        };

        if length < header || length > bytes.len() {
            return Err(Error::InvalidAttributeLength);
        }

        subs.push((kind, Bytes::copy_from_slice(&bytes[header..length])));
        bytes = &bytes[length..];
    }

    Ok(subs)
}

fn encode_payload(
    format: VendorFormat,
    vendor: u32,
    subs: &[(u32, Bytes)],
) -> Result<Bytes, Error> {
    let mut payload = BytesMut::new();
    payload.put_u32(vendor);
    for (kind, value) in subs {
        encode_sub(format, *kind, value, &mut payload)?;
    }

    Ok(payload.freeze())
}

fn encode_sub(
    format: VendorFormat,
    kind: u32,
    value: &[u8],
    buf: &mut BytesMut,
) -> Result<(), Error> {
    let header = (format.type_octets + format.length_octets) as usize;
    let length = header + value.len();

    let fits = match format.length_octets {
        0 => length <= MAX_ATTRIBUTE_LENGTH,
        1 => length <= 0xff,
        _ => length <= 0xffff,
    };

    if !fits {
        return Err(Error::AttributeTooLong);
    }

    write_uint(kind, format.type_octets, buf)?;
    if format.length_octets != 0 {
        write_uint(length as u32, format.length_octets, buf)?;
    }

    buf.put_slice(value);
    Ok(())
}

fn read_uint(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32)
}

fn write_uint(value: u32, octets: u8, buf: &mut BytesMut) -> Result<(), Error> {
    match octets {
        1 => {
            if value > 0xff {
                return Err(Error::InvalidValue);
            }
            buf.put_u8(value as u8);
        }
        2 => {
            if value > 0xffff {
                return Err(Error::InvalidValue);
            }
            buf.put_u16(value as u16);
        }
        4 => buf.put_u32(value),
        _ => return Err(Error::InvalidValue),
    }

    Ok(())
}
