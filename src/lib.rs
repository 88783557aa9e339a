//! # Repo Relay
//!
//! A gateway that lets a browser client act on GitHub on behalf of a signed-in
//! user: list public repositories, create a repository, commit uploaded files,
//! and clone a public repository onto the local disk.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use repo_relay::config::ServerConfig;
//! use repo_relay::server::{AppState, create_router};
//!
//! let state = Arc::new(AppState::new(ServerConfig::default())?);
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `repo-relay` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod server;
pub mod store;
pub mod types;
