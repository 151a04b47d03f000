//! # taskd-store
//!
//! `SQLite` persistence for task records.
//!
//! - **[`connection`]**: `r2d2` connection pool. Every new connection gets
//!   the pragmas and the `tasks` table applied before it is handed out.
//! - **[`repository`]**: stateless SQL functions over a `&Connection`.
//! - **[`store`]**: [`TaskStore`], the handle passed to request handlers.
//!   Each operation checks out one pooled session and releases it on return.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod repository;
pub mod schema;
pub mod store;
pub mod types;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use repository::TaskRepository;
pub use store::TaskStore;
pub use types::{NewTask, Task, TaskUpdate};
