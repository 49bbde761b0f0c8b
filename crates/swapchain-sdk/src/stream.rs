//! Lifecycle stream of a proposal.

use futures::StreamExt;
use serde::Deserialize;
use swapchain_flow::{FlowUpdate, LifecycleState};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Event received on a proposal stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// State at the time of connecting.
    Snapshot {
        state: LifecycleState,
        draft_version: u64,
    },
    /// A lifecycle change.
    Update(FlowUpdate),
    /// The node reported an error.
    Error { message: String },
}

impl Event {
    /// The state this event reports, if any.
    pub fn state(&self) -> Option<&LifecycleState> {
        match self {
            Event::Snapshot { state, .. } => Some(state),
            Event::Update(update) => Some(&update.state),
            Event::Error { .. } => None,
        }
    }
}

/// WebSocket message from the node.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    Snapshot {
        #[allow(dead_code)]
        proposal_id: Uuid,
        #[serde(flatten)]
        state: LifecycleState,
        draft_version: u64,
    },
    Update(FlowUpdate),
    Error {
        message: String,
    },
}

impl From<WsMessage> for Event {
    fn from(msg: WsMessage) -> Self {
        match msg {
            WsMessage::Snapshot {
                state,
                draft_version,
                ..
            } => Event::Snapshot {
                state,
                draft_version,
            },
            WsMessage::Update(update) => Event::Update(update),
            WsMessage::Error { message } => Event::Error { message },
        }
    }
}

/// Stream of events for a proposal.
pub struct ProposalStream {
    proposal_id: Uuid,
    receiver: tokio::sync::mpsc::Receiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl ProposalStream {
    /// Connect to the stream of a proposal.
    pub async fn connect(ws_url: &str, proposal_id: Uuid) -> ClientResult<Self> {
        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let (tx, rx) = tokio::sync::mpsc::channel(100);

        let handle = tokio::spawn(async move {
            let (_, mut read) = ws_stream.split();

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<WsMessage>(&text) {
                        Ok(ws_msg) => {
                            if tx.send(ws_msg.into()).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring unreadable stream message: {}", e),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
        });

        Ok(Self {
            proposal_id,
            receiver: rx,
            _handle: handle,
        })
    }

    /// Get the proposal ID this stream is for.
    pub fn proposal_id(&self) -> Uuid {
        self.proposal_id
    }

    /// Get the next event. `None` once the node closed the stream.
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Wait for Success or Failure.
    pub async fn outcome(&mut self) -> ClientResult<LifecycleState> {
        while let Some(event) = self.next().await {
            if let Event::Error { message } = &event {
                return Err(ClientError::Connection(message.clone()));
            }
            if let Some(state) = event.state().filter(|s| s.is_terminal()) {
                return Ok(state.clone());
            }
        }
        Err(ClientError::Connection(format!(
            "Stream for proposal {} closed before the swap finished",
            self.proposal_id
        )))
    }
}
