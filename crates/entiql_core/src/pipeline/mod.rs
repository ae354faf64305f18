//! Query pipelines.
//!
//! A [`Pipeline`] is the ordered list of stages a caller attaches to a query
//! before its first terminal operation. It is handed to the optimizer exactly
//! once; whatever the optimizer cannot push into SQL becomes the
//! [`Residual`] that runs over the fetched entities.

mod filter;
mod residual;

pub use filter::{CustomFn, Filter};
pub(crate) use filter::CompiledFilter;
pub use residual::Residual;
pub(crate) use residual::BoxedItems;
pub(crate) use residual::ResidualStage;

use std::cmp::Ordering;
use std::fmt;

/// Transforms an entity.
pub type MapFn<E> = Box<dyn FnMut(E) -> E + Send>;

/// Observes an entity.
pub type PeekFn<E> = Box<dyn FnMut(&E) + Send>;

/// Orders two entities.
pub type CompareFn<E> = Box<dyn Fn(&E, &E) -> Ordering + Send>;

/// One pipeline stage.
pub enum Stage<E> {
    /// Keeps entities matching the filter.
    Filter(Filter<E>),
    /// Replaces each entity with the closure's result.
    Map(MapFn<E>),
    /// Calls the closure on each entity as it passes.
    Peek(PeekFn<E>),
    /// Stable sort by the comparator.
    Sorted(CompareFn<E>),
    /// Keeps at most this many entities.
    Limit(usize),
    /// Drops this many leading entities.
    Skip(usize),
}

impl<E> Stage<E> {
    /// Returns true if the stage never changes how many entities pass.
    pub fn preserves_cardinality(&self) -> bool {
        match self {
            Self::Map(_) | Self::Peek(_) | Self::Sorted(_) => true,
            Self::Filter(_) | Self::Limit(_) | Self::Skip(_) => false,
        }
    }

    /// Stage name, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::Map(_) => "map",
            Self::Peek(_) => "peek",
            Self::Sorted(_) => "sorted",
            Self::Limit(_) => "limit",
            Self::Skip(_) => "skip",
        }
    }
}

impl<E> fmt::Debug for Stage<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
            Self::Limit(n) => f.debug_tuple("Limit").field(n).finish(),
            Self::Skip(n) => f.debug_tuple("Skip").field(n).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// An ordered sequence of stages.
pub struct Pipeline<E> {
    stages: Vec<Stage<E>>,
}

impl<E> Default for Pipeline<E> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<E> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.stages).finish()
    }
}

impl<E> Pipeline<E> {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    pub fn push(&mut self, stage: Stage<E>) {
        self.stages.push(stage);
    }

    /// Returns the stages in order.
    pub fn stages(&self) -> &[Stage<E>] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if there are no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns true if every stage preserves cardinality.
    pub fn preserves_cardinality(&self) -> bool {
        self.stages.iter().all(Stage::preserves_cardinality)
    }

    pub(crate) fn into_stages(self) -> Vec<Stage<E>> {
        self.stages
    }
}
