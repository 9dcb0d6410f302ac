use std::sync::Arc;

use burst_model::RunEvent;
use tracing::trace;

/// Consumer of run progress events.
///
/// Called synchronously from the dispatcher loop: implementations must not block.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &RunEvent);

    fn name(&self) -> &'static str;
}

/// Fan-out of run events to every registered subscriber.
#[derive(Clone, Default)]
pub struct Subscribers {
    list: Vec<Arc<dyn Subscribe>>,
}

impl Subscribers {
    #[inline]
    pub fn new(list: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { list }
    }

    #[inline]
    pub fn register(&mut self, subscriber: Arc<dyn Subscribe>) {
        self.list.push(subscriber);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn emit(&self, event: &RunEvent) {
        for s in &self.list {
            trace!(subscriber = s.name(), kind = event.kind(), "emit");
            s.on_event(event);
        }
    }
}
