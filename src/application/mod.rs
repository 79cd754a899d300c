//! Application layer (use-cases, policies).
//!
//! Pure operations over domain types plus the bulk orchestrator. Nothing in
//! here touches the store; the reducer and runtime call into it.

pub mod bulk;
pub mod filter;
pub mod groups;
pub mod selection;
pub mod topics;
