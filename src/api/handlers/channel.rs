//! Bidirectional location channel endpoint.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use crate::app_state::AppState;
use crate::broadcast::BroadcastEngine;
use crate::domain::Identity;
use crate::protocol::encode_outbound;
use crate::session::{admit, Admission, ChannelSession, CLOSE_UNIDENTIFIED};

#[utoipa::path(
    get,
    path = "/ws",
    params(
        ("type" = String, Query, description = "Role: professional or user"),
        ("professionalId" = Option<i64>, Query, description = "Professional id (type=professional)"),
        ("userId" = Option<i64>, Query, description = "User id (type=user)"),
        ("id" = Option<i64>, Query, description = "Id for either role")
    ),
    responses(
        (status = 101, description = "WebSocket upgrade")
    ),
    tag = "Channel"
)]
/// WebSocket endpoint for live location exchange.
#[instrument(skip(ws, state))]
pub async fn channel_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Response {
    let admission = admit(&params, state.handshake_policy);
    debug!(?admission, "Channel requested");

    ws.on_upgrade(move |socket| async move {
        match admission {
            Admission::Accept(identity) => run_session(socket, identity, state.engine).await,
            Admission::Refuse { reason } => refuse(socket, reason).await,
            Admission::Inert { reason } => idle(socket, reason).await,
        }
    })
}

async fn run_session(mut socket: WebSocket, identity: Identity, engine: BroadcastEngine) {
    let (mut session, mut outbound) = ChannelSession::new(identity, engine);
    session.open().await;

    loop {
        tokio::select! {
            Some(message) = outbound.recv() => {
                let text = match encode_outbound(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(identity = %identity, error = %e, "Dropping unencodable frame");
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    debug!(identity = %identity, "Send failed, closing channel");
                    break;
                }
            }

            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    session.handle_text(&text).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(identity = %identity, "Client closed channel");
                    break;
                }
                // Pings are answered by the transport.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(identity = %identity, error = %e, "Channel transport error");
                    break;
                }
            },
        }
    }

    session.close().await;
}

async fn refuse(mut socket: WebSocket, reason: String) {
    info!(%reason, "Refusing unidentified channel");

    let frame = CloseFrame {
        code: CLOSE_UNIDENTIFIED,
        reason: Cow::Borrowed("unidentified handshake"),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Close frame not delivered");
    }
}

async fn idle(mut socket: WebSocket, reason: String) {
    info!(%reason, "Holding unidentified channel open without registration");

    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
    }

    debug!("Unidentified channel closed");
}
