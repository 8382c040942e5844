//! Pluggable hook for forcing memory reclamation.
//!
//! The governor knows *when* to reclaim; it doesn't know *how* on any
//! given allocator. Deployments wire in whatever their allocator
//! supports (jemalloc's purge, a GC hint, or nothing at all).

/// Forces a reclamation cycle and, optionally, returns unused pages to
/// the OS.
pub trait MemoryReclaimer: Send + Sync {
    /// Forces an immediate reclamation cycle.
    fn force_reclaim(&self);

    /// Releases unused memory back to the OS. Only called by the
    /// memory watchdog at critical pressure; the optimization pass's
    /// ordinary reclamation does not require this.
    fn release_unused_os_memory(&self) {}
}

/// A reclaimer that does nothing. Used where no allocator hook is
/// wired in, and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReclaimer;

impl MemoryReclaimer for NoopReclaimer {
    fn force_reclaim(&self) {}
}
