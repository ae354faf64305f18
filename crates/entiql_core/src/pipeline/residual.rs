//! Stages that run in memory after the fetch.

use super::{CompareFn, CompiledFilter, MapFn, PeekFn};
use crate::error::CoreResult;
use std::fmt;

/// A boxed residual iterator that can move to another thread.
pub(crate) type BoxedItems<'a, E> = Box<dyn Iterator<Item = CoreResult<E>> + Send + 'a>;

pub(crate) enum ResidualStage<E> {
    Filter(CompiledFilter<E>),
    Map(MapFn<E>),
    Peek(PeekFn<E>),
    Sorted(CompareFn<E>),
    Limit(usize),
    Skip(usize),
}

impl<E> ResidualStage<E> {
    fn preserves_cardinality(&self) -> bool {
        match self {
            Self::Map(_) | Self::Peek(_) | Self::Sorted(_) => true,
            Self::Filter(_) | Self::Limit(_) | Self::Skip(_) => false,
        }
    }

    fn name(&self) -> &'static str {
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

/// The part of a pipeline left after pushdown, in original order.
pub struct Residual<E> {
    stages: Vec<ResidualStage<E>>,
}

impl<E> Default for Residual<E> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<E> fmt::Debug for Residual<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

impl<E: Send + 'static> Residual<E> {
    /// Runs the stages lazily over `source`.
    ///
    /// An error from upstream passes through every stage untouched; `limit`
    /// and `skip` do not count it, and `sorted` yields it in place of the
    /// sorted output.
    pub(crate) fn apply<'a, I>(self, source: I) -> BoxedItems<'a, E>
    where
        I: Iterator<Item = CoreResult<E>> + Send + 'a,
    {
        let mut iter: BoxedItems<'a, E> = Box::new(source);
        for stage in self.stages {
            iter = match stage {
                ResidualStage::Filter(filter) => Box::new(iter.filter(move |item| match item {
                    Ok(entity) => filter.test(entity),
                    Err(_) => true,
                })),
                ResidualStage::Map(mut f) => Box::new(iter.map(move |item| item.map(&mut f))),
                ResidualStage::Peek(mut f) => Box::new(iter.inspect(move |item| {
                    if let Ok(entity) = item {
                        f(entity);
                    }
                })),
                ResidualStage::Sorted(cmp) => sorted(iter, cmp),
                ResidualStage::Limit(n) => limit(iter, n),
                ResidualStage::Skip(n) => {
                    let mut remaining = n;
                    Box::new(iter.filter(move |item| {
                        if item.is_err() || remaining == 0 {
                            return true;
                        }
                        remaining -= 1;
                        false
                    }))
                }
            };
        }
        iter
    }
}

impl<E> Residual<E> {
    pub(crate) fn push(&mut self, stage: ResidualStage<E>) {
        self.stages.push(stage);
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if nothing runs in memory.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns true if no stage changes how many entities pass.
    pub fn preserves_cardinality(&self) -> bool {
        self.stages.iter().all(ResidualStage::preserves_cardinality)
    }

    /// Stage names in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(ResidualStage::name).collect()
    }
}

fn sorted<'a, E: Send + 'static>(
    upstream: BoxedItems<'a, E>,
    cmp: CompareFn<E>,
) -> BoxedItems<'a, E> {
    let mut upstream = Some(upstream);
    let mut buffered = Vec::new().into_iter();
    Box::new(std::iter::from_fn(move || {
        if let Some(items) = upstream.take() {
            let mut all = Vec::new();
            for item in items {
                match item {
                    Ok(entity) => all.push(entity),
                    Err(err) => return Some(Err(err)),
                }
            }
            all.sort_by(|a, b| cmp(a, b));
            buffered = all.into_iter();
        }
        buffered.next().map(Ok)
    }))
}

fn limit<'a, E: Send + 'static>(upstream: BoxedItems<'a, E>, n: usize) -> BoxedItems<'a, E> {
    let mut upstream = upstream;
    let mut remaining = n;
    Box::new(std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let item = upstream.next()?;
        if item.is_ok() {
            remaining -= 1;
        }
        Some(item)
    }))
}
