use burst_model::LogicalIndex;
use serde_json::{Map, Value};

/// Error returned by a user reduction.
pub type ReduceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-side half of a work unit.
///
/// The remote entry point lives on the platform; this trait supplies the per-slot arguments and the final reduction.
pub trait Workload: Send + Sync + 'static {
    /// Arguments of the invocation for `index`.
    ///
    /// Must be pure: a retried slot is re-invoked with the arguments computed again from the same index.
    fn args_for_index(&self, _index: LogicalIndex) -> Value {
        Value::Object(Map::new())
    }

    /// Consume all results, in completion order. Called at most once per run.
    fn reduce(&self, results: Vec<Value>) -> Result<(), ReduceError>;
}
