//! HTTP query surface over a loaded posterior table

pub mod handlers;
pub mod server;

pub use handlers::{ApiError, ServerState};
pub use server::{RatingServer, RatingServerConfig};
