//! Core module - configuration and server state
//!
//! - [`Config`] - configuration from the environment
//! - [`ServerState`] - shared handles (pool, blob store)

pub mod config;
pub mod state;

pub use config::Config;
pub use state::ServerState;
