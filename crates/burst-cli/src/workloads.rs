use std::sync::Arc;

use burst_core::{ReduceError, Workload};
use burst_model::LogicalIndex;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::manifest::ManifestError;

pub const MONTE_CARLO_PI: &str = "monte-carlo-pi";
pub const COLLECT: &str = "collect";

const DEFAULT_TOTAL_POINTS: u64 = 100_000;

/// Build the named workload from the manifest parameters.
pub fn resolve(
    name: &str,
    params: &Value,
    num_actions: usize,
) -> Result<Arc<dyn Workload>, ManifestError> {
    match name {
        MONTE_CARLO_PI => Ok(Arc::new(MonteCarloPi::from_params(params, num_actions)?)),
        COLLECT => Ok(Arc::new(Collect::from_params(params)?)),
        other => Err(ManifestError::UnknownWorkload(other.to_string())),
    }
}

/// Estimate of pi out of the per-action `inCircle` counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiEstimate {
    pub in_circle: u64,
    pub points: u64,
    pub pi: f64,
}

/// Random points in the square `[-1, 1]²` are split evenly across the actions; each reports how
/// many fell inside the unit circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloPi {
    points_per_action: u64,
    num_actions: usize,
}

impl MonteCarloPi {
    pub fn from_params(params: &Value, num_actions: usize) -> Result<Self, ManifestError> {
        let total = match params.get("totalPoints") {
            None => DEFAULT_TOTAL_POINTS,
            Some(v) => v.as_u64().ok_or_else(|| ManifestError::Params {
                workload: MONTE_CARLO_PI.into(),
                reason: "totalPoints must be a non-negative integer".into(),
            })?,
        };
        let points_per_action = total / num_actions.max(1) as u64;
        if points_per_action == 0 {
            return Err(ManifestError::Params {
                workload: MONTE_CARLO_PI.into(),
                reason: format!("totalPoints ({total}) must be at least numActions ({num_actions})"),
            });
        }
        Ok(Self {
            points_per_action,
            num_actions,
        })
    }

    pub fn points(&self) -> u64 {
        self.points_per_action * self.num_actions as u64
    }

    pub fn estimate(&self, results: &[Value]) -> Result<PiEstimate, ReduceError> {
        let mut in_circle = 0u64;
        for (i, r) in results.iter().enumerate() {
            let n = r
                .get("inCircle")
                .and_then(Value::as_u64)
                .ok_or_else(|| format!("result {i} has no integer inCircle: {r}"))?;
            in_circle += n;
        }
        let points = self.points();
        if in_circle > points {
            return Err(format!("{in_circle} points in circle out of {points} evaluated").into());
        }
        Ok(PiEstimate {
            in_circle,
            points,
            pi: 4.0 * in_circle as f64 / points as f64,
        })
    }
}

impl Workload for MonteCarloPi {
    fn args_for_index(&self, _index: LogicalIndex) -> Value {
        json!({ "pointsPerAction": self.points_per_action })
    }

    fn reduce(&self, results: Vec<Value>) -> Result<(), ReduceError> {
        for (i, r) in results.iter().enumerate() {
            debug!(action = i + 1, result = %r, "action result");
        }
        let e = self.estimate(&results)?;
        println!("{} out of {} were in the circle", e.in_circle, e.points);
        println!("Computed value of Pi: {}", e.pi);
        Ok(())
    }
}

/// Passes `params` plus the logical index to every action and prints each result as a JSON line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collect {
    params: Map<String, Value>,
}

impl Collect {
    pub fn from_params(params: &Value) -> Result<Self, ManifestError> {
        match params {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self { params: map.clone() }),
            _ => Err(ManifestError::Params {
                workload: COLLECT.into(),
                reason: "params must be an object".into(),
            }),
        }
    }
}

impl Workload for Collect {
    fn args_for_index(&self, index: LogicalIndex) -> Value {
        let mut args = self.params.clone();
        args.insert("index".into(), json!(index));
        Value::Object(args)
    }

    fn reduce(&self, results: Vec<Value>) -> Result<(), ReduceError> {
        for r in results {
            println!("{}", serde_json::to_string(&r)?);
        }
        Ok(())
    }
}
