use std::collections::HashSet;

use burst_model::LogicalIndex;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    error::{CoreError, CoreResult},
    workload::Workload,
};

/// Completion counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Barrier over the successful results of a batch.
///
/// Results are kept in completion order. The counter only grows, never exceeds `total`,
/// and each logical index contributes exactly one result.
#[derive(Debug)]
pub struct ResultAggregator {
    total: usize,
    results: Vec<Value>,
    seen: HashSet<LogicalIndex>,
}

impl ResultAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            results: Vec::with_capacity(total),
            seen: HashSet::with_capacity(total),
        }
    }

    /// Record the successful result of `index`.
    pub fn push(&mut self, index: LogicalIndex, result: Value) -> CoreResult<Progress> {
        if index >= self.total || !self.seen.insert(index) {
            return Err(CoreError::DuplicateResult(index));
        }
        self.results.push(result);
        Ok(self.progress())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.results.len(),
            total: self.total,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.results.len() == self.total
    }

    /// Release the results once all `total` arrived.
    pub fn into_results(self) -> CoreResult<Vec<Value>> {
        if !self.is_complete() {
            return Err(CoreError::Incomplete {
                completed: self.results.len(),
                total: self.total,
            });
        }
        Ok(self.results)
    }

    /// Hand the complete aggregate to the user reduction.
    ///
    /// Reduction failures are surfaced as [`CoreError::Reduction`] and not retried.
    #[instrument(level = "debug", skip_all, fields(total = self.total))]
    pub fn reduce(self, workload: &dyn Workload) -> CoreResult<()> {
        let results = self.into_results()?;
        debug!("running reduction");
        workload.reduce(results).map_err(CoreError::Reduction)
    }
}
