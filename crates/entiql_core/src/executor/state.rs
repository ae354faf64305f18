use std::fmt;

/// Lifecycle of one query execution.
///
/// Transitions only move forward: `Building` → `Optimized` → `Executing` →
/// `Streaming` → `Closed`. A query may jump straight to `Closed` from any
/// state (closed before it ran, or failed while opening).
///
/// `Building` belongs to the [`Query`](crate::Query) builder itself. A
/// [`ResultStream`](crate::ResultStream) starts at `Optimized`, since its
/// statement is final by the time it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryState {
    /// Stages are still being attached.
    Building,
    /// The statement text and binds are final.
    Optimized,
    /// Resources are being acquired and the statement issued.
    Executing,
    /// Rows are being pulled from the cursor.
    Streaming,
    /// Every resource has been released.
    Closed,
}

impl QueryState {
    /// Moves to `next` if that is forward; returns whether the state changed.
    pub fn advance(&mut self, next: QueryState) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }

    /// Returns true once the query is closed.
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Building => "building",
            Self::Optimized => "optimized",
            Self::Executing => "executing",
            Self::Streaming => "streaming",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
