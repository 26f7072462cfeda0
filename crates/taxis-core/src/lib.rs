//! taxis-core library.
//!
//! Related-field items partitioned into groups, each group kept in a total
//! order by an integer `taxis` key. [`store::OrderedItemStore`] holds the
//! ordering rules; persistence is delegated to a [`backend::Backend`]
//! (SQLite in production, in-memory for tests).
//!
//! # Conventions
//!
//! - **Errors**: store reads, moves, and deletes return the backend's own
//!   error type unchanged. Inserts and updates wrap it in
//!   [`store::WriteError`] next to payload rejections. Opening a store uses
//!   [`error::OpenError`]; config loading uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use backend::{Backend, Direction, Slot};
pub use db::sqlite::SqliteBackend;
pub use memory::MemoryBackend;
pub use model::{Column, FieldId, GroupKey, Item, ItemId, NewItem, Taxis};
pub use store::{MoveOutcome, OrderedItemStore, WriteError};
