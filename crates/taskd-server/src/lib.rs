//! # taskd-server
//!
//! Axum HTTP surface for task CRUD.
//!
//! Routes map one-to-one onto [`taskd_store::TaskStore`] operations; the
//! store handle is injected through Axum state rather than held globally.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod server;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, TaskServer};
