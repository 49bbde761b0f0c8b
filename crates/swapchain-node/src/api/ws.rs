//! WebSocket endpoints.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use swapchain_flow::{FlowUpdate, LifecycleState};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Message sent on a proposal stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalStreamMessage {
    /// State at the time of connecting.
    Snapshot {
        proposal_id: Uuid,
        #[serde(flatten)]
        state: LifecycleState,
        draft_version: u64,
    },
    /// A lifecycle change.
    Update(FlowUpdate),
    /// Error message.
    Error { message: String },
}

impl ProposalStreamMessage {
    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                warn!("Failed to encode stream message: {}", e);
                None
            }
        }
    }
}

/// Lifecycle stream of one proposal. Closes once the proposal is terminal.
pub async fn proposal_stream(
    ws: WebSocketUpgrade,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_proposal_stream(socket, id, state))
}

async fn handle_proposal_stream(socket: WebSocket, proposal_id: Uuid, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let Some(session) = state.get_session(proposal_id).await else {
        let msg = ProposalStreamMessage::Error {
            message: format!("Proposal {} not found", proposal_id),
        };
        if let Some(msg) = msg.to_message() {
            let _ = sender.send(msg).await;
        }
        let _ = sender.close().await;
        return;
    };

    // Subscribe and read the current state under one lock so no change is missed.
    let (snapshot, updates) = {
        let proposal = session.proposal.read().await;
        let snapshot = ProposalStreamMessage::Snapshot {
            proposal_id,
            state: proposal.state().clone(),
            draft_version: proposal.draft_version(),
        };
        (snapshot, proposal.subscribe())
    };

    let already_terminal = matches!(
        &snapshot,
        ProposalStreamMessage::Snapshot { state, .. } if state.is_terminal()
    );
    let Some(first) = snapshot.to_message() else {
        return;
    };
    if sender.send(first).await.is_err() || already_terminal {
        let _ = sender.close().await;
        return;
    }

    let mut updates = BroadcastStream::new(updates);

    loop {
        tokio::select! {
            update = updates.next() => {
                let update = match update {
                    Some(Ok(update)) => update,
                    Some(Err(e)) => {
                        warn!("Proposal {} stream lagged: {}", proposal_id, e);
                        continue;
                    }
                    None => break,
                };

                let terminal = update.state.is_terminal();
                let Some(msg) = ProposalStreamMessage::Update(update).to_message() else {
                    continue;
                };
                if sender.send(msg).await.is_err() {
                    break;
                }
                if terminal {
                    debug!("Proposal {} finished, closing stream", proposal_id);
                    let _ = sender.close().await;
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }
}
