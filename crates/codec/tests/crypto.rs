use anyhow::Result;
use radius_server_codec::{
    crypto::{
        decrypt_tunnel_password, decrypt_user_password, encrypt_tunnel_password,
        encrypt_user_password, is_authentic_request,
    },
    rfc2868::{tunnel_password_add, tunnel_password_lookup, tunnel_password_set},
    Code, Error, Packet,
};

#[test]
fn test_user_password_encoded_length() -> Result<()> {
    let cases: &[(&[u8], usize)] = &[
        (b"", 16),
        (b"abc", 16),
        (b"0123456789abcde", 16),
        (b"0123456789abcdef", 16),
        (b"0123456789abcdef0", 16 * 2),
        (b"0123456789abcdef0123456789abcdef0123456789abcdef", 16 * 3),
    ];

    let secret = b"12345";
    let authenticator = *b"0123456789abcdef";

    for (password, length) in cases {
        let hidden = encrypt_user_password(password, secret, &authenticator)?;
        assert_eq!(hidden.len(), *length);
        assert_eq!(
            decrypt_user_password(&hidden, secret, &authenticator)?,
            password.to_vec()
        );
    }

    Ok(())
}

#[test]
fn test_user_password_limits() {
    let secret = b"12345";
    let authenticator = [0u8; 16];

    assert_eq!(
        encrypt_user_password(&[b'a'; 129], secret, &authenticator),
        Err(Error::InvalidPasswordLength)
    );
    assert_eq!(
        encrypt_user_password(b"x", b"", &authenticator),
        Err(Error::MissingSecret)
    );

    // a ciphertext that is not whole blocks never decrypts.
    assert_eq!(
        decrypt_user_password(&[0u8; 17], secret, &authenticator),
        Err(Error::InvalidHiddenLength)
    );
}

#[test]
fn test_tunnel_password_round_trip() -> Result<()> {
    let passwords: &[&[u8]] = &[
        b"",
        b"a",
        b"Hello",
        b"0123456789abcde",
        b"0123456789abcdef",
        b"0123456789abcdef0123456789abcdef0123456789abcdef",
    ];

    let salt = [0x83, 0x45];
    let secret = b"secret";
    let authenticator: [u8; 16] = rand::random();

    for password in passwords {
        let hidden = encrypt_tunnel_password(password, &salt, secret, &authenticator)?;
        assert_eq!((hidden.len() - 2) % 16, 0);

        let (decrypted, decrypted_salt) =
            decrypt_tunnel_password(&hidden, secret, &authenticator)?;
        assert_eq!(decrypted, password.to_vec());
        assert_eq!(decrypted_salt, salt);
    }

    Ok(())
}

#[test]
fn test_tunnel_password_salt_must_set_high_bit() {
    assert_eq!(
        encrypt_tunnel_password(b"x", &[0x03, 0x45], b"secret", &[0u8; 16]),
        Err(Error::InvalidSalt)
    );
}

#[test]
fn test_tunnel_password_attribute_round_trip() -> Result<()> {
    // several rounds to cover the random salt generator.
    for _ in 0..10 {
        let request = Packet::new(Code::AccessRequest, &b"secretly"[..]);

        let mut response = request.response(Code::AccessAccept);
        let password = [0x00, 0x01, 0xde, 0xaf, 0x0b, 0x00, 0x00, 0x07];
        tunnel_password_add(&mut response, 0, &password)?;

        let wire = response.encode()?;
        let response = Packet::parse(&wire, request.secret.clone())?;

        let (tag, decrypted) = tunnel_password_lookup(&response, &request)?.unwrap();
        assert_eq!(tag, 0);
        assert_eq!(decrypted, password.to_vec());
    }

    Ok(())
}

#[test]
fn test_tunnel_password_set_replaces() -> Result<()> {
    let request = Packet::new(Code::AccessRequest, &b"secretly"[..]);

    let mut response = request.response(Code::AccessAccept);
    tunnel_password_add(&mut response, 1, b"first")?;
    tunnel_password_set(&mut response, 2, b"second")?;

    assert_eq!(response.attributes.get_all(69).count(), 1);

    let (tag, decrypted) = tunnel_password_lookup(&response, &request)?.unwrap();
    assert_eq!(tag, 2);
    assert_eq!(decrypted, b"second".to_vec());

    Ok(())
}

#[test]
fn test_accounting_request_authenticity() -> Result<()> {
    let secret = &b"accounting-secret"[..];

    let mut request = Packet::new(Code::AccountingRequest, secret);
    request.attributes.add(44, &b"session-1"[..]);

    let wire = request.encode()?;
    assert!(is_authentic_request(&wire, secret));
    assert!(!is_authentic_request(&wire, b"other"));

    let mut tampered = wire.to_vec();
    tampered[25] ^= 0x01;
    assert!(!is_authentic_request(&tampered, secret));

    // access requests bind through the response instead.
    let access = Packet::new(Code::AccessRequest, secret).encode()?;
    assert!(is_authentic_request(&access, secret));

    // responses are never authentic requests.
    let response = Packet::parse(&wire, secret)?
        .response(Code::AccountingResponse)
        .encode()?;
    assert!(!is_authentic_request(&response, secret));

    Ok(())
}
