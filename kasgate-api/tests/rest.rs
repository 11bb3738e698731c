// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface tests against a bound listener: merchant onboarding, session lifecycle,
//! validation and health.

mod common;

use common::spawn_api;
use serde_json::{Value, json};

#[tokio::test]
async fn test_merchant_and_session_flow() {
    let api = spawn_api().await;
    let client = reqwest::Client::new();

    // Merchant onboarding returns the API key and webhook secret exactly once.
    let created = client
        .post(api.http_url("/api/v1/merchants"))
        .json(&json!({
            "name": "REST Shop",
            "email": "rest@example.com",
            "xpub": format!("kpub{}", "H".repeat(104)),
            "webhookUrl": "https://example.com/hooks/kas",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    let created = created.json::<Value>().await.unwrap();
    let api_key = created["apiKey"].as_str().unwrap().to_owned();
    assert!(api_key.starts_with("kg_live_"));
    assert!(created["webhookSecret"].as_str().unwrap().starts_with("whsec_"));

    // Unauthenticated and wrongly-authenticated requests fail alike.
    let me = client.get(api.http_url("/api/v1/merchants/me")).send().await.unwrap();
    assert_eq!(me.status(), 401);
    let me = client
        .get(api.http_url("/api/v1/merchants/me"))
        .header("X-API-Key", "kg_live_wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 401);

    let me = client
        .get(api.http_url("/api/v1/merchants/me"))
        .header("X-API-Key", &api_key)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    let me = me.json::<Value>().await.unwrap();
    assert_eq!(me["name"], "REST Shop");
    assert_eq!(me["nextAddressIndex"], 0);
    assert!(me.get("apiKey").is_none());

    // Session creation with a valid amount.
    let session = client
        .post(api.http_url("/api/v1/sessions"))
        .header("X-API-Key", &api_key)
        .json(&json!({ "amount": "1.5", "orderId": "ORDER-9" }))
        .send()
        .await
        .unwrap();
    assert_eq!(session.status(), 201);
    let session = session.json::<Value>().await.unwrap();
    let session_id = session["id"].as_str().unwrap().to_owned();
    assert_eq!(session["amount"], "1.5");
    assert_eq!(session["amountSompi"], "150000000");
    assert_eq!(session["status"], "pending");
    assert!(session["subscriptionToken"].as_str().unwrap().len() >= 32);
    let address = session["address"].as_str().unwrap();
    assert_eq!(session["qrCode"], format!("{address}?amount=1.5"));

    // The public status endpoint needs no key and no token.
    let status = client
        .get(api.http_url(&format!("/api/v1/sessions/{session_id}/status")))
        .send()
        .await
        .unwrap();
    assert_eq!(status.status(), 200);
    let status = status.json::<Value>().await.unwrap();
    assert_eq!(status["status"], "pending");
    assert_eq!(status["requiredConfirmations"], 10);

    // The full view never leaks the subscription token.
    let view = client
        .get(api.http_url(&format!("/api/v1/sessions/{session_id}")))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert!(view.get("subscriptionToken").is_none());

    // Cancellation is owner-only and terminal.
    let cancel = client
        .post(api.http_url(&format!("/api/v1/sessions/{session_id}/cancel")))
        .header("X-API-Key", &api_key)
        .send()
        .await
        .unwrap();
    assert_eq!(cancel.status(), 200);
    assert_eq!(cancel.json::<Value>().await.unwrap()["status"], "expired");

    let cancel_again = client
        .post(api.http_url(&format!("/api/v1/sessions/{session_id}/cancel")))
        .header("X-API-Key", &api_key)
        .send()
        .await
        .unwrap();
    assert_eq!(cancel_again.status(), 400);

    // The session list reflects the terminal state.
    let list = client
        .get(api.http_url("/api/v1/merchants/me/sessions?status=expired"))
        .header("X-API-Key", &api_key)
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(list["total"], 1);
    assert_eq!(list["sessions"][0]["id"], session_id);
}

#[tokio::test]
async fn test_validation_rejections() {
    let api = spawn_api().await;
    let client = reqwest::Client::new();

    // Malformed xpub.
    let response = client
        .post(api.http_url("/api/v1/merchants"))
        .json(&json!({ "name": "Bad", "xpub": "nonsense" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_xpub");

    // Webhook URL must be HTTPS.
    let response = client
        .post(api.http_url("/api/v1/merchants"))
        .json(&json!({
            "name": "Bad",
            "xpub": format!("kpub{}", "J".repeat(104)),
            "webhookUrl": "http://insecure.example.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let merchant = client
        .post(api.http_url("/api/v1/merchants"))
        .json(&json!({ "name": "Amounts", "xpub": format!("kpub{}", "K".repeat(104)) }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let api_key = merchant["apiKey"].as_str().unwrap();

    // Below-minimum and malformed amounts.
    for (amount, code) in [
        ("0.00099999", "amount_below_minimum"),
        ("1.123456789", "invalid_amount"),
        ("-1", "invalid_amount"),
    ] {
        let response = client
            .post(api.http_url("/api/v1/sessions"))
            .header("X-API-Key", api_key)
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "amount {amount}");
        let body = response.json::<Value>().await.unwrap();
        assert_eq!(body["error"]["code"], code, "amount {amount}");
    }

    // Sanitized order ID.
    let session = client
        .post(api.http_url("/api/v1/sessions"))
        .header("X-API-Key", api_key)
        .json(&json!({
            "amount": "0.001",
            "orderId": "<script>alert(1)</script>ORDER-7",
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(session["orderId"], "alert(1)ORDER-7");

    // Unknown sessions are 404.
    let response = client
        .get(api.http_url(&format!("/api/v1/sessions/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_health_endpoints() {
    let api = spawn_api().await;
    let client = reqwest::Client::new();

    let health = client.get(api.http_url("/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.json::<Value>().await.unwrap()["status"], "ok");

    let ready = client.get(api.http_url("/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), 200);

    let detailed = client
        .get(api.http_url("/health/detailed"))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(detailed["checks"]["store"], "ok");
    // The null node double never connects; the poll baseline keeps the gateway serviceable.
    assert_eq!(detailed["checks"]["node"], "disconnected");
    assert_eq!(detailed["checks"]["indexer"], "ok");
    assert_eq!(detailed["status"], "ok");
}
