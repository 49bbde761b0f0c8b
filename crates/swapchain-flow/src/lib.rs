//! # Swapchain Flow
//!
//! The lifecycle of a swap proposal: editing, validation on submit,
//! execution and its outcome.
//!
//! ## States
//!
//! ```text
//! Idle --submit(invalid)--> Error --edit(valid)--> Idle
//! Idle --submit(valid)--> Running --ok--> Success
//!                                 --err--> Failure
//! ```

pub mod controller;
pub mod executor;
pub mod state;
pub mod view;

pub use controller::{FlowUpdate, ProposalController, Submission};
pub use executor::{ExecutionError, SwapExecutor};
pub use state::{FlowEvent, LifecycleState};
pub use view::{Footer, FormFields, ProposalView, Screen};
