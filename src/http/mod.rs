//! HTTP API for the org panel
//!
//! JSON routes over the tree builder, the expansion resolver, the roster
//! queries and the chat assistant.

pub mod handler;
pub mod server;

pub use handler::{ApiError, AppState};
pub use server::{router, HttpServer};
