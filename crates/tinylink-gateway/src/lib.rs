//! HTTP gateway for the Tinylink shortener.
//!
//! Exposes the shortener over a small JSON API plus the public redirect
//! route, and wires storage, cache and background tasks from CLI settings.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod server;
pub mod state;

pub use app::App;
pub use cli::Cli;
pub use state::AppState;
