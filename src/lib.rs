//! Library surface for the session-sidecar binary, exposed so root-level
//! integration tests can build a router and drive it without spawning a
//! real process.

pub mod collab;
pub mod config;
pub mod error;
pub mod http;
pub mod runtime;

pub use config::Config;
pub use error::SidecarError;
pub use http::{build_router, AppState};
