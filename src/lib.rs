//! Organization administration core for GitHub.
//!
//! Cached repositories and teams per organization, named groups persisted in
//! the user config, checkbox selection, filters, and fail-fast bulk edits,
//! all driven through a single [`store::Store`].

pub mod application;
pub mod domain;
pub mod infra;
pub mod state;
pub mod store;
