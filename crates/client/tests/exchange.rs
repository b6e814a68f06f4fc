use anyhow::Result;
use codec::{Code, Packet};
use radius_client::{Client, Context, Error};
use service::{Handler, HandlerFn, PacketServer, StaticSecretSource};
use tokio::net::UdpSocket;
use tokio::time::{sleep, Duration};

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const SECRET: &[u8] = b"12345";

async fn start_server<H: Handler>(
    handler: H,
) -> Result<(String, Arc<PacketServer<H, StaticSecretSource>>)> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let address = socket.local_addr()?.to_string();

    let server = Arc::new(PacketServer::new(handler, StaticSecretSource::new(SECRET)));
    {
        let server = server.clone();
        tokio::spawn(async move { server.serve(socket).await });
    }

    Ok((address, server))
}

#[tokio::test]
async fn test_exchange_retry() -> Result<()> {
    let attempts = Arc::new(AtomicU32::new(0));
    let handler_attempts = attempts.clone();

    let (address, server) = start_server(HandlerFn::new(move |writer, request| {
        let attempts = handler_attempts.clone();
        async move {
            if attempts.fetch_add(1, Ordering::SeqCst) + 1 == 4 {
                let _ = writer.write(&request.response(Code::AccessAccept)).await;
            }
        }
    }))
    .await?;

    let request = Packet::new(Code::AccessRequest, SECRET);
    let client = Client {
        retry: Duration::from_millis(5),
        ..Client::default()
    };

    let response = client
        .exchange(&Context::background(), &request, &address)
        .await
        .expect("exchange should succeed on the fourth attempt");

    assert_eq!(response.code, Code::AccessAccept);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_exchange_expired_context() -> Result<()> {
    let (address, server) = start_server(HandlerFn::new(|_, _| async {})).await?;

    let request = Packet::new(Code::AccessRequest, SECRET);
    let err = Client::default()
        .exchange(&Context::with_timeout(Duration::ZERO), &request, &address)
        .await
        .expect_err("expired context must fail the exchange");

    assert!(matches!(err, Error::DeadlineExceeded));
    assert!(err.is_timeout());

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_exchange_cancelled() -> Result<()> {
    let (address, server) = start_server(HandlerFn::new(|_, _| async {})).await?;

    let (ctx, canceller) = Context::with_cancel();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let request = Packet::new(Code::AccessRequest, SECRET);
    let client = Client {
        retry: Duration::from_millis(5),
        ..Client::default()
    };

    let err = client
        .exchange(&ctx, &request, &address)
        .await
        .expect_err("cancelled context must fail the exchange");

    assert!(matches!(err, Error::Cancelled));
    assert!(!err.is_timeout());

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_exchange_gives_up_on_garbage() -> Result<()> {
    let (address, server) = start_server(HandlerFn::new(|writer, _| async move {
        // four bytes of not-RADIUS.
        let _ = writer.send(b"AAAA").await;
    }))
    .await?;

    let request = Packet::new(Code::AccessRequest, SECRET);
    let client = Client {
        retry: Duration::from_millis(5),
        max_packet_errors: 2,
    };

    let err = client
        .exchange(&Context::background(), &request, &address)
        .await
        .expect_err("garbage responses must exhaust the error budget");

    assert!(matches!(err, Error::Codec(codec::Error::ShortBuffer)));

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_exchange_rejects_non_authentic_responses() -> Result<()> {
    let (address, server) = start_server(HandlerFn::new(|writer, request| async move {
        let mut response = request.response(Code::AccessAccept);
        response.authenticator = [0u8; 16];
        let _ = writer.write(&response).await;
    }))
    .await?;

    let request = Packet::new(Code::AccessRequest, SECRET);
    let client = Client {
        retry: Duration::from_millis(5),
        max_packet_errors: 2,
    };

    let err = client
        .exchange(&Context::background(), &request, &address)
        .await
        .expect_err("forged responses must exhaust the error budget");

    assert!(matches!(err, Error::NonAuthenticResponse));

    server.shutdown(&Context::background()).await?;
    Ok(())
}

#[tokio::test]
async fn test_parallel_exchanges_are_independent() -> Result<()> {
    let (address, server) = start_server(HandlerFn::new(|writer, request| async move {
        let _ = writer.write(&request.response(Code::AccessAccept)).await;
    }))
    .await?;

    let mut exchanges = Vec::new();
    for _ in 0..8 {
        let request = Packet::new(Code::AccessRequest, SECRET);
        let address = address.clone();
        exchanges.push(tokio::spawn(async move {
            radius_client::exchange(&Context::background(), &request, &address).await
        }));
    }

    for exchange in exchanges {
        let response = exchange.await??;
        assert_eq!(response.code, Code::AccessAccept);
    }

    server.shutdown(&Context::background()).await?;
    Ok(())
}
