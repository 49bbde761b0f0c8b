//! # Swapchain SDK
//!
//! Client SDK for driving proposals on a Swapchain node.
//!
//! ```no_run
//! use swapchain_sdk::prelude::*;
//!
//! # async fn run() -> ClientResult<()> {
//! let client = SwapchainClient::connect("http://localhost:3000").await?;
//! let proposal = client.create_proposal().await?;
//!
//! client.update_field(proposal.id, DraftField::AmountToSend, "0.5").await?;
//! client.update_field(proposal.id, DraftField::Rate, "20000").await?;
//!
//! let mut stream = client.submit_and_watch(proposal.id).await?;
//! println!("Swap finished: {}", stream.outcome().await?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod stream;

pub use client::{HealthResponse, ProposalResponse, SwapchainClient};
pub use error::{ClientError, ClientResult};
pub use stream::{Event, ProposalStream};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::client::SwapchainClient;
    pub use crate::error::{ClientError, ClientResult};
    pub use crate::stream::{Event, ProposalStream};
    pub use swapchain_core::prelude::*;
    pub use swapchain_flow::LifecycleState;
}
