//! API handlers.

pub mod health;
pub mod proposal;
pub mod ws;
