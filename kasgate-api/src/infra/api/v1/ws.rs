// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

use crate::{
    hub::{ClientMessage, Outbound, ServerMessage},
    infra::api::{AppState, v1::sessions::SessionView},
};
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use kasgate_common::domain::Publisher;
use kasgate_engine::domain::{
    deriver::AddressDeriver,
    indexer::LedgerIndexer,
    node::Node,
    storage::Storage,
};
use log::{debug, warn};
use std::sync::atomic::Ordering;
use tokio::task;
use uuid::Uuid;

pub async fn handler<S, D, P, N, I>(
    State(state): State<AppState<S, D, P, N, I>>,
    ws: WebSocketUpgrade,
) -> Response
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket<S, D, P, N, I>(state: AppState<S, D, P, N, I>, socket: WebSocket)
where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let (client_id, mut outbound, alive) = state.hub.register();
    let (mut sink, mut stream) = socket.split();

    // Writer: turns hub frames into socket frames; ends on Close or a dead socket.
    let write_task = task::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            match frame {
                Outbound::Message(message) => {
                    let text =
                        serde_json::to_string(&message).expect("server message serializes");
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Ping => {
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Reader: every inbound frame proves liveness; text frames carry the protocol.
    while let Some(Ok(message)) = stream.next().await {
        alive.store(true, Ordering::Release);

        match message {
            Message::Text(text) => {
                handle_client_message(&state, client_id, text.as_str()).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.hub.remove_client(client_id);
    write_task.abort();
    debug!(client_id:%; "realtime connection closed");
}

async fn handle_client_message<S, D, P, N, I>(
    state: &AppState<S, D, P, N, I>,
    client_id: Uuid,
    text: &str,
) where
    S: Storage,
    D: AddressDeriver,
    P: Publisher,
    N: Node,
    I: LedgerIndexer,
{
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(_) => {
            state.hub.send_to(
                client_id,
                ServerMessage::Error {
                    message: "malformed message".to_owned(),
                },
            );
            return;
        }
    };

    match message {
        ClientMessage::Subscribe { session_id, token } => {
            let authenticated = match state
                .sessions
                .verify_subscription_token(session_id, &token)
                .await
            {
                Ok(authenticated) => authenticated,
                Err(error) => {
                    warn!(session_id:%, error:%; "cannot verify subscription token");
                    false
                }
            };

            if !authenticated {
                state.hub.send_to(
                    client_id,
                    ServerMessage::Error {
                        message: "invalid session or token".to_owned(),
                    },
                );
                return;
            }

            state.hub.subscribe(client_id, session_id);

            // Replay the current state so a (re)subscribing widget is immediately
            // consistent.
            match state.sessions.get_session(session_id).await {
                Ok(session) => {
                    let view = SessionView::new(
                        session,
                        state.network,
                        state.sessions.confirmation_threshold(),
                    );
                    let view = serde_json::to_value(&view).expect("session view serializes");
                    state
                        .hub
                        .send_to(client_id, ServerMessage::Session { session: view });
                }
                Err(error) => {
                    warn!(session_id:%, error:%; "cannot load session for snapshot");
                }
            }
        }

        ClientMessage::Unsubscribe { session_id } => {
            state.hub.unsubscribe(client_id, session_id);
        }

        ClientMessage::Ping => {
            state.hub.send_to(client_id, ServerMessage::Pong);
        }
    }
}
