//! The model preset selected by the performance governor and consumed at
//! the LLM collaborator call site.

use std::fmt;

/// Which LLM preset the degradation coordinator's caller should request
/// for the next downstream call.
///
/// Selected by the performance governor on every optimization pass from
/// the current memory pressure and rate-limit headroom; see
/// `sidecar-governor` for the selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelPreset {
    /// Smallest/cheapest model. Chosen under memory or throughput pressure.
    Fast,
    /// Default preset when neither under pressure nor clearly idle.
    Balanced,
    /// Largest/highest-quality model. Chosen only when there is headroom.
    Quality,
}

impl Default for ModelPreset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelPreset::Fast => "fast",
            ModelPreset::Balanced => "balanced",
            ModelPreset::Quality => "quality",
        };
        write!(f, "{s}")
    }
}
