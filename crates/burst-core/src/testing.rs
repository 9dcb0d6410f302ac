//! Scripted in-memory platform used by the engine tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use burst_model::{ActivationId, LogicalIndex, WorkUnit};
use serde_json::{Value, json};

use crate::platform::{ActivationPoll, InvokeOutcome, Platform, PlatformError};

/// Behaviour of one invocation attempt.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    reject: Option<u16>,
    broken_invoke: bool,
    broken_poll: bool,
    polls: VecDeque<ActivationPoll>,
    then: ActivationPoll,
}

impl Script {
    pub fn succeed(result: Value) -> Self {
        Self::not_ready_then(0, result)
    }

    pub fn not_ready_then(k: usize, result: Value) -> Self {
        Self {
            reject: None,
            broken_invoke: false,
            broken_poll: false,
            polls: std::iter::repeat_n(ActivationPoll::NotReady, k).collect(),
            then: ActivationPoll::Success(result),
        }
    }

    pub fn reject(status: u16) -> Self {
        Self {
            reject: Some(status),
            broken_invoke: false,
            broken_poll: false,
            polls: VecDeque::new(),
            then: ActivationPoll::NotReady,
        }
    }

    pub fn transient() -> Self {
        Self {
            reject: None,
            broken_invoke: false,
            broken_poll: false,
            polls: VecDeque::new(),
            then: ActivationPoll::TransientInternalError("whisk internal error".into()),
        }
    }

    pub fn other(status: &str) -> Self {
        Self {
            reject: None,
            broken_invoke: false,
            broken_poll: false,
            polls: VecDeque::new(),
            then: ActivationPoll::OtherError {
                status: status.into(),
            },
        }
    }

    /// The invoke request itself fails.
    pub fn broken_invoke() -> Self {
        Self {
            broken_invoke: true,
            ..Self::hang()
        }
    }

    /// Accepted, then the first status query fails.
    pub fn broken_poll() -> Self {
        Self::hang().then_broken_poll()
    }

    /// Status queries fail once the scripted answers are used up.
    pub fn then_broken_poll(mut self) -> Self {
        self.broken_poll = true;
        self
    }

    /// Never finishes.
    pub fn hang() -> Self {
        Self {
            reject: None,
            broken_invoke: false,
            broken_poll: false,
            polls: VecDeque::new(),
            then: ActivationPoll::NotReady,
        }
    }
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<LogicalIndex, VecDeque<Script>>,
    activations: HashMap<ActivationId, (LogicalIndex, Script)>,
    invocations: Vec<(LogicalIndex, ActivationId)>,
    registered: HashMap<String, WorkUnit>,
    register_calls: usize,
    register_reject: Option<u16>,
    live_per_index: HashMap<LogicalIndex, usize>,
    max_live_per_index: usize,
    live: usize,
    max_live: usize,
    polls: usize,
    next_id: usize,
}

#[derive(Default)]
pub(crate) struct ScriptedPlatform {
    inner: Mutex<Inner>,
}

impl ScriptedPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the behaviour of the next attempt of `index`.
    ///
    /// Unscripted attempts succeed immediately with the index as result.
    pub fn script(&self, index: LogicalIndex, script: Script) {
        let mut inner = self.inner.lock().unwrap();
        inner.scripts.entry(index).or_default().push_back(script);
    }

    pub fn reject_registration(&self, status: u16) {
        self.inner.lock().unwrap().register_reject = Some(status);
    }

    pub fn invocations(&self) -> Vec<(LogicalIndex, ActivationId)> {
        self.inner.lock().unwrap().invocations.clone()
    }

    pub fn invocations_of(&self, index: LogicalIndex) -> Vec<ActivationId> {
        self.invocations()
            .into_iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, a)| a)
            .collect()
    }

    pub fn registered(&self, name: &str) -> Option<WorkUnit> {
        self.inner.lock().unwrap().registered.get(name).cloned()
    }

    pub fn register_calls(&self) -> usize {
        self.inner.lock().unwrap().register_calls
    }

    pub fn max_live(&self) -> usize {
        self.inner.lock().unwrap().max_live
    }

    pub fn max_live_per_index(&self) -> usize {
        self.inner.lock().unwrap().max_live_per_index
    }

    pub fn polls(&self) -> usize {
        self.inner.lock().unwrap().polls
    }
}

#[async_trait]
impl Platform for ScriptedPlatform {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn register_work(&self, unit: &WorkUnit) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.register_calls += 1;
        if let Some(status) = inner.register_reject {
            return Err(PlatformError::status(status, json!({ "error": "denied" }).to_string()));
        }
        inner.registered.insert(unit.name.clone(), unit.clone());
        Ok(())
    }

    async fn invoke(&self, _action: &str, args: &Value) -> Result<InvokeOutcome, PlatformError> {
        tokio::task::yield_now().await;

        let index = args["index"].as_u64().unwrap_or(0) as LogicalIndex;
        let mut inner = self.inner.lock().unwrap();
        let script = inner
            .scripts
            .get_mut(&index)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Script::succeed(json!(index)));

        if script.broken_invoke {
            return Err(PlatformError::Transport("connection reset by peer".into()));
        }
        if let Some(status) = script.reject {
            return Ok(InvokeOutcome::Rejected {
                status,
                body: "rejected".into(),
            });
        }

        inner.next_id += 1;
        let activation = ActivationId::new(format!("act-{}", inner.next_id));
        inner.activations.insert(activation.clone(), (index, script));
        inner.invocations.push((index, activation.clone()));

        inner.live += 1;
        inner.max_live = inner.max_live.max(inner.live);
        let per_index = {
            let n = inner.live_per_index.entry(index).or_default();
            *n += 1;
            *n
        };
        inner.max_live_per_index = inner.max_live_per_index.max(per_index);

        Ok(InvokeOutcome::Accepted(activation))
    }

    async fn activation_result(&self, id: &ActivationId) -> Result<ActivationPoll, PlatformError> {
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock().unwrap();
        inner.polls += 1;
        let (index, answer) = {
            let (index, script) = inner
                .activations
                .get_mut(id)
                .ok_or_else(|| PlatformError::InvalidResponse(format!("unknown activation {id}")))?;
            if script.broken_poll && script.polls.is_empty() {
                return Err(PlatformError::Transport("connection reset by peer".into()));
            }
            let answer = script.polls.pop_front().unwrap_or_else(|| script.then.clone());
            (*index, answer)
        };

        if answer != ActivationPoll::NotReady {
            inner.live -= 1;
            if let Some(n) = inner.live_per_index.get_mut(&index) {
                *n -= 1;
            }
        }
        Ok(answer)
    }
}
