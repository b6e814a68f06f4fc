use anyhow::Result;
use radius_server_codec::{
    crypto::is_authentic_response,
    rfc2865::*,
    rfc2869::MessageAuthenticator,
    Attributes, Code, Error, Packet,
};

use std::net::Ipv4Addr;

mod samples {
    /// RFC 2865 §7.1, secret "xyzzy5461".
    pub const ACCESS_REQUEST_7_1: &[u8] = &[
        0x01, 0x00, 0x00, 0x38, 0x0f, 0x40, 0x3f, 0x94, 0x73, 0x97, 0x80, 0x57, 0xbd, 0x83, 0xd5,
        0xcb, 0x98, 0xf4, 0x22, 0x7a, 0x01, 0x06, 0x6e, 0x65, 0x6d, 0x6f, 0x02, 0x12, 0x0d, 0xbe,
        0x70, 0x8d, 0x93, 0xd4, 0x13, 0xce, 0x31, 0x96, 0xe4, 0x3f, 0x78, 0x2a, 0x0a, 0xee, 0x04,
        0x06, 0xc0, 0xa8, 0x01, 0x10, 0x05, 0x06, 0x00, 0x00, 0x00, 0x03,
    ];

    pub const ACCESS_ACCEPT_7_1: &[u8] = &[
        0x02, 0x00, 0x00, 0x26, 0x86, 0xfe, 0x22, 0x0e, 0x76, 0x24, 0xba, 0x2a, 0x10, 0x05, 0xf6,
        0xbf, 0x9b, 0x55, 0xe0, 0xb2, 0x06, 0x06, 0x00, 0x00, 0x00, 0x01, 0x0f, 0x06, 0x00, 0x00,
        0x00, 0x00, 0x0e, 0x06, 0xc0, 0xa8, 0x01, 0x03,
    ];

    /// RFC 2865 §7.2, secret "xyzzy5461".
    pub const ACCESS_REQUEST_7_2: &[u8] = &[
        0x01, 0x01, 0x00, 0x47, 0x2a, 0xee, 0x86, 0xf0, 0x8d, 0x0d, 0x55, 0x96, 0x9c, 0xa5, 0x97,
        0x8e, 0x0d, 0x33, 0x67, 0xa2, 0x01, 0x08, 0x66, 0x6c, 0x6f, 0x70, 0x73, 0x79, 0x03, 0x13,
        0x16, 0xe9, 0x75, 0x57, 0xc3, 0x16, 0x18, 0x58, 0x95, 0xf2, 0x93, 0xff, 0x63, 0x44, 0x07,
        0x72, 0x75, 0x04, 0x06, 0xc0, 0xa8, 0x01, 0x10, 0x05, 0x06, 0x00, 0x00, 0x00, 0x14, 0x06,
        0x06, 0x00, 0x00, 0x00, 0x02, 0x07, 0x06, 0x00, 0x00, 0x00, 0x01,
    ];

    pub const ACCESS_ACCEPT_7_2: &[u8] = &[
        0x02, 0x01, 0x00, 0x38, 0x15, 0xef, 0xbc, 0x7d, 0xab, 0x26, 0xcf, 0xa3, 0xdc, 0x34, 0xd9,
        0xc0, 0x3c, 0x86, 0x01, 0xa4, 0x06, 0x06, 0x00, 0x00, 0x00, 0x02, 0x07, 0x06, 0x00, 0x00,
        0x00, 0x01, 0x08, 0x06, 0xff, 0xff, 0xff, 0xfe, 0x0a, 0x06, 0x00, 0x00, 0x00, 0x00, 0x0d,
        0x06, 0x00, 0x00, 0x00, 0x01, 0x0c, 0x06, 0x00, 0x00, 0x05, 0xdc,
    ];

    /// RFC 5997 §6.1, secret "xyzzy5461".
    pub const STATUS_SERVER_6_1: &[u8] = &[
        0x0c, 0xda, 0x00, 0x26, 0x8a, 0x54, 0xf4, 0x68, 0x6f, 0xb3, 0x94, 0xc5, 0x28, 0x66, 0xe3,
        0x02, 0x18, 0x5d, 0x06, 0x23, 0x50, 0x12, 0x5a, 0x66, 0x5e, 0x2e, 0x1e, 0x84, 0x11, 0xf3,
        0xe2, 0x43, 0x82, 0x20, 0x97, 0xc8, 0x4f, 0xa3,
    ];
}

const SECRET: &[u8] = b"xyzzy5461";

#[test]
fn test_rfc2865_7_1() -> Result<()> {
    let request = Packet::parse(samples::ACCESS_REQUEST_7_1, SECRET)?;

    assert_eq!(request.code, Code::AccessRequest);
    assert_eq!(request.identifier, 0);
    assert_eq!(request.get::<UserName>(), Some("nemo"));
    assert_eq!(request.get::<UserPassword>(), Some(b"arctangent".to_vec()));
    assert_eq!(
        request.get::<NasIpAddress>(),
        Some(Ipv4Addr::new(192, 168, 1, 16))
    );
    assert_eq!(request.get::<NasPort>(), Some(3));

    assert_eq!(&request.encode()?[..], samples::ACCESS_REQUEST_7_1);

    let mut response = request.response(Code::AccessAccept);
    response.set::<ServiceType>(ServiceType::LoginUser)?;
    response.set::<LoginService>(LoginService::Telnet)?;
    response.set::<LoginIpHost>(Ipv4Addr::new(192, 168, 1, 3))?;

    let wire = response.encode()?;
    assert_eq!(&wire[..], samples::ACCESS_ACCEPT_7_1);
    assert!(is_authentic_response(
        &wire,
        samples::ACCESS_REQUEST_7_1,
        SECRET
    ));

    Ok(())
}

#[test]
fn test_rfc2865_7_2() -> Result<()> {
    let request = Packet::parse(samples::ACCESS_REQUEST_7_2, SECRET)?;

    assert_eq!(request.code, Code::AccessRequest);
    assert_eq!(request.identifier, 1);
    assert_eq!(request.get::<UserName>(), Some("flopsy"));
    assert_eq!(
        request.get::<NasIpAddress>(),
        Some(Ipv4Addr::new(192, 168, 1, 16))
    );
    assert_eq!(request.get::<NasPort>(), Some(20));
    assert_eq!(request.get::<ServiceType>(), Some(ServiceType::FramedUser));
    assert_eq!(
        request.get::<FramedProtocol>(),
        Some(FramedProtocol::Ppp)
    );
    assert!(request.get::<ChapPassword>().is_some());

    assert_eq!(&request.encode()?[..], samples::ACCESS_REQUEST_7_2);

    let response = Packet::parse(samples::ACCESS_ACCEPT_7_2, SECRET)?;
    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(response.identifier, 1);
    assert_eq!(response.get::<ServiceType>(), Some(ServiceType::FramedUser));
    assert_eq!(
        response.get::<FramedProtocol>(),
        Some(FramedProtocol::Ppp)
    );
    assert_eq!(
        response.get::<FramedIpAddress>(),
        Some(Ipv4Addr::new(255, 255, 255, 254))
    );
    assert_eq!(response.get::<FramedRouting>(), Some(FramedRouting::None));
    assert_eq!(
        response.get::<FramedCompression>(),
        Some(FramedCompression::VanJacobsonTcpIp)
    );
    assert_eq!(response.get::<FramedMtu>(), Some(1500));

    Ok(())
}

#[test]
fn test_rfc5997_6_1() -> Result<()> {
    let request = Packet::parse(samples::STATUS_SERVER_6_1, SECRET)?;

    assert_eq!(request.code, Code::StatusServer);
    assert_eq!(request.identifier, 218);
    assert_eq!(
        request.get::<MessageAuthenticator>(),
        Some(
            &[
                0x5au8, 0x66, 0x5e, 0x2e, 0x1e, 0x84, 0x11, 0xf3, 0xe2, 0x43, 0x82, 0x20, 0x97,
                0xc8, 0x4f, 0xa3,
            ][..]
        )
    );

    assert_eq!(&request.encode()?[..], samples::STATUS_SERVER_6_1);

    let response = request.response(Code::AccessAccept);
    assert_eq!(response.identifier, 218);

    let wire = response.encode()?;
    assert!(is_authentic_response(&wire, samples::STATUS_SERVER_6_1, SECRET));

    Ok(())
}

#[test]
fn test_password_round_trips() -> Result<()> {
    let passwords: &[&[u8]] = &[
        b"",
        b"qwerty",
        b"helloworld1231231231231233489hegufudhsgdsfygdf8g",
    ];

    for password in passwords {
        let mut request = Packet::new(Code::AccessRequest, SECRET);
        request.add::<UserPassword>(password.to_vec())?;

        let wire = request.encode()?;
        let parsed = Packet::parse(&wire, SECRET)?;

        assert_eq!(parsed.get::<UserPassword>(), Some(password.to_vec()));
    }

    Ok(())
}

#[test]
fn test_parse_invalid() {
    let cases: &[(&[u8], Error)] = &[
        (&[0x01], Error::ShortBuffer),
        (
            &[
                0x01, 0xff, 0x00, 0x00, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
                0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
            ],
            Error::InvalidPacketLength,
        ),
        (
            &[
                0x01, 0xff, 0xff, 0xff, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
                0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
            ],
            Error::InvalidPacketLength,
        ),
        (
            &[
                0x00, 0xff, 0x00, 0x16, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
                0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00,
            ],
            Error::InvalidPacketLength,
        ),
        (
            &[
                0x01, 0x01, 0x00, 0x16, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
                0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00,
            ],
            Error::InvalidAttributeLength,
        ),
    ];

    for (wire, expected) in cases {
        assert_eq!(Packet::parse(wire, &b"12345"[..]), Err(expected.clone()));
    }
}

#[test]
fn test_long_attribute_fails_encode() {
    let mut packet = Packet::new(Code::AccessRequest, &b"12345"[..]);
    packet.attributes.add(1, vec![b'a'; 1000]);

    assert_eq!(packet.encode(), Err(Error::AttributeTooLong));
}

#[test]
fn test_unknown_code_fails_encode() {
    let packet = Packet::new(Code::Unknown(0x7f), &b"12345"[..]);
    assert_eq!(packet.encode(), Err(Error::UnknownCode(0x7f)));
}

#[test]
fn test_attribute_operations() {
    let mut attrs = Attributes::default();
    attrs.add(1, &b"A"[..]);
    attrs.add(1, &b"A.A"[..]);
    attrs.add(3, &b"C"[..]);

    assert_eq!(attrs.get(1), Some(&b"A"[..]));
    assert_eq!(attrs.get(2), None);
    assert_eq!(attrs.get_all(1).count(), 2);

    attrs.set(1, &b"B"[..]);
    assert_eq!(attrs.get_all(1).count(), 1);
    assert_eq!(attrs.get(1), Some(&b"B"[..]));

    // set keeps the position of the first entry.
    assert_eq!(attrs.iter().next(), Some((1, &b"B"[..])));

    attrs.del(1);
    assert_eq!(attrs.wire_size(), Ok(3));

    let mut buf = bytes::BytesMut::new();
    attrs.encode_to(&mut buf);
    assert_eq!(&buf[..], b"\x03\x03C");
}

#[test]
fn test_encode_deterministic() -> Result<()> {
    let mut base: Option<bytes::Bytes> = None;

    for _ in 0..100 {
        let mut packet = Packet::parse(samples::ACCESS_REQUEST_7_1, SECRET)?;
        packet.attributes.add(83, &b"C"[..]);
        packet.attributes.add(1, &b"A"[..]);
        packet.attributes.add(1, &b"A.A"[..]);

        let wire = packet.encode()?;
        match &base {
            None => base = Some(wire),
            Some(base) => assert_eq!(base, &wire),
        }
    }

    Ok(())
}

#[test]
fn test_response_rejects_bit_flips() -> Result<()> {
    let request = Packet::parse(samples::ACCESS_REQUEST_7_1, SECRET)?;

    let mut response = request.response(Code::AccessAccept);
    response.set::<ServiceType>(ServiceType::LoginUser)?;
    let wire = response.encode()?;

    assert!(is_authentic_response(
        &wire,
        samples::ACCESS_REQUEST_7_1,
        SECRET
    ));

    for index in 0..wire.len() {
        for bit in 0..8 {
            let mut tampered = wire.to_vec();
            tampered[index] ^= 1 << bit;
            assert!(!is_authentic_response(
                &tampered,
                samples::ACCESS_REQUEST_7_1,
                SECRET
            ));
        }
    }

    Ok(())
}

#[test]
fn test_message_authenticator_is_owned_by_the_encoder() -> Result<()> {
    use radius_server_codec::rfc2869::EapMessage;

    let request = Packet::parse(samples::ACCESS_REQUEST_7_1, SECRET)?;

    // an EAP-carrying Access-Accept grows a Message-Authenticator.
    let mut response = request.response(Code::AccessAccept);
    response.add::<EapMessage>(&[0x03, 0x00, 0x00, 0x04])?;

    let wire = response.encode()?;
    let parsed = Packet::parse(&wire, SECRET)?;
    assert_eq!(parsed.get::<MessageAuthenticator>().map(|v| v.len()), Some(16));
    assert!(is_authentic_response(&wire, samples::ACCESS_REQUEST_7_1, SECRET));

    // a caller-populated one is refused.
    let mut manual = request.response(Code::AccessAccept);
    manual.add::<EapMessage>(&[0x03, 0x00, 0x00, 0x04])?;
    manual.attributes.add(80, vec![0u8; 16]);
    assert_eq!(manual.encode(), Err(Error::MessageAuthenticatorPresent));

    Ok(())
}
