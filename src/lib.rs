//! Kanban Board Client
//!
//! - models / store: the local board, owned per session
//! - mirror: optimistic drag prediction
//! - guard: dedup and serialization of persistence calls
//! - commands: backend api over JSON
//! - session: ties them together per gesture

pub mod commands;
pub mod config;
pub mod error;
pub mod guard;
pub mod mirror;
pub mod models;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use commands::{BoardApi, JsonApi, JsonChannel, MoveContainerRequest, MoveItemRequest};
pub use config::{MirrorConfig, ResyncPolicy};
pub use error::ClientError;
pub use mirror::{BoardMirror, DropOutcome, Hover};
pub use session::{BoardSession, SyncOutcome};
pub use store::BoardState;
