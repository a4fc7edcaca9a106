//! Outcome of a best-effort pipeline stage

/// Value produced by an optional enhancement step
///
/// Stages such as query rewriting may fail without aborting the turn. The
/// caller always gets a usable value and can tell how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement<T> {
    /// The stage ran and produced this value
    Applied(T),
    /// The stage was not needed; the input passes through
    Skipped(T),
    /// The stage failed; `value` is the safe substitute
    Fallback { value: T, reason: String },
}

impl<T> Refinement<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Applied(v) | Self::Skipped(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}
