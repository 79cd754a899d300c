//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations (config file, `gh` CLI).

pub mod app_config;
pub mod github;
