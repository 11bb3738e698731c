// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Realtime-channel tests against a bound listener: token authentication, snapshot replay
//! and status broadcasts.

mod common;

use common::spawn_api;
use futures::{SinkExt, Stream, StreamExt};
use kasgate_common::domain::Sompi;
use kasgate_engine::{merchant::NewMerchant, session::NewSession};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};

async fn next_json(
    stream: &mut (impl Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> Value {
    loop {
        let message = timeout(Duration::from_secs(3), stream.next())
            .await
            .expect("message within deadline")
            .expect("stream open")
            .expect("no transport error");

        match message {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_subscription_authentication_and_broadcast() {
    let api = spawn_api().await;

    let merchant = api
        .merchants
        .create_merchant(NewMerchant {
            name: "WS Shop".to_owned(),
            email: None,
            xpub: format!("kpub{}", "F".repeat(104)),
            webhook_url: None,
        })
        .await
        .unwrap();
    let session = api
        .sessions
        .create_session(
            merchant.id,
            NewSession {
                amount: Sompi(1_000_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (ws, _) = connect_async(api.ws_url().as_str()).await.unwrap();
    let (mut sink, mut stream) = ws.split();

    // A wrong token is rejected and leaves the client unregistered.
    sink.send(Message::Text(
        json!({ "type": "subscribe", "sessionId": session.id, "token": "wrong" })
            .to_string()
            .into(),
    ))
    .await
    .unwrap();
    let reply = next_json(&mut stream).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].is_string());

    // Ping round-trips regardless of subscription state.
    sink.send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();
    assert_eq!(next_json(&mut stream).await["type"], "pong");

    // The correct token yields the snapshot with the current visible fields.
    sink.send(Message::Text(
        json!({
            "type": "subscribe",
            "sessionId": session.id,
            "token": session.subscription_token,
        })
        .to_string()
        .into(),
    ))
    .await
    .unwrap();
    let snapshot = next_json(&mut stream).await;
    assert_eq!(snapshot["type"], "session");
    assert_eq!(snapshot["id"], session.id.to_string());
    assert_eq!(snapshot["status"], "pending");
    assert_eq!(snapshot["amountSompi"], "1000000");
    assert!(snapshot.get("subscriptionToken").is_none());

    // A state transition is broadcast to the subscriber.
    api.sessions
        .mark_payment_received(session.id, &"tx-ws".to_owned(), 100)
        .await
        .unwrap();

    let status = next_json(&mut stream).await;
    assert_eq!(status["type"], "status");
    assert_eq!(status["sessionId"], session.id.to_string());
    assert_eq!(status["status"], "confirming");
}

#[tokio::test]
async fn test_unsubscribe_stops_broadcasts() {
    let api = spawn_api().await;

    let merchant = api
        .merchants
        .create_merchant(NewMerchant {
            name: "WS Shop 2".to_owned(),
            email: None,
            xpub: format!("kpub{}", "G".repeat(104)),
            webhook_url: None,
        })
        .await
        .unwrap();
    let session = api
        .sessions
        .create_session(
            merchant.id,
            NewSession {
                amount: Sompi(1_000_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (ws, _) = connect_async(api.ws_url().as_str()).await.unwrap();
    let (mut sink, mut stream) = ws.split();

    sink.send(Message::Text(
        json!({
            "type": "subscribe",
            "sessionId": session.id,
            "token": session.subscription_token,
        })
        .to_string()
        .into(),
    ))
    .await
    .unwrap();
    assert_eq!(next_json(&mut stream).await["type"], "session");

    sink.send(Message::Text(
        json!({ "type": "unsubscribe", "sessionId": session.id })
            .to_string()
            .into(),
    ))
    .await
    .unwrap();
    // Unsubscribe has no acknowledgement; give it a moment to take effect.
    sleep(Duration::from_millis(100)).await;

    api.sessions
        .mark_payment_received(session.id, &"tx-ws2".to_owned(), 100)
        .await
        .unwrap();

    // No status frame may arrive within the window.
    let outcome = timeout(Duration::from_millis(400), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => break text.to_string(),
                Some(Ok(_)) => continue,
                other => panic!("unexpected end of stream {other:?}"),
            }
        }
    })
    .await;
    assert!(outcome.is_err(), "received frame after unsubscribe: {outcome:?}");
}
