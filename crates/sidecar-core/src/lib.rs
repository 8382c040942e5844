//! Shared infrastructure for the session-sidecar resilience core.
//!
//! This crate provides the bits common to every component in the
//! admission-and-resilience core (cache, rate limiter, governor,
//! degradation coordinator, admission layer):
//! - an event system for observability
//! - the `ModelPreset` type the governor tunes and the LLM collaborator
//!   call site reads

pub mod events;
pub mod preset;
pub mod shutdown;

pub use events::{EventListener, EventListeners, FnListener, SidecarEvent};
pub use preset::ModelPreset;
pub use shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
