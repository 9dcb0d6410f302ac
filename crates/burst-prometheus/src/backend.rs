use burst_core::Subscribe;
use burst_model::RunEvent;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

const NAMESPACE: &str = "burst";

/// Prometheus view of run events, kept in its own [`Registry`].
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    triggered: IntCounter,
    completed: IntCounter,
    retried: IntCounter,
    runs: IntCounterVec,
    run_duration: Histogram,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let triggered = IntCounter::with_opts(
            Opts::new("invocations_triggered_total", "Invocations accepted by the platform")
                .namespace(NAMESPACE),
        )?;
        let completed = IntCounter::with_opts(
            Opts::new("invocations_completed_total", "Logical indices finished successfully")
                .namespace(NAMESPACE),
        )?;
        let retried = IntCounter::with_opts(
            Opts::new("invocations_retried_total", "Re-invocations after transient platform errors")
                .namespace(NAMESPACE),
        )?;
        let runs = IntCounterVec::new(
            Opts::new("runs_total", "Runs by terminal outcome").namespace(NAMESPACE),
            &["outcome"],
        )?;
        let run_duration = Histogram::with_opts(
            HistogramOpts::new("run_duration_seconds", "Wall time of successful runs")
                .namespace(NAMESPACE)
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 900.0, 3600.0]),
        )?;

        registry.register(Box::new(triggered.clone()))?;
        registry.register(Box::new(completed.clone()))?;
        registry.register(Box::new(retried.clone()))?;
        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(run_duration.clone()))?;

        Ok(Self {
            registry,
            triggered,
            completed,
            retried,
            runs,
            run_duration,
        })
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format of every registered metric.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Subscribe for PrometheusMetrics {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::Triggered { .. } => self.triggered.inc(),
            RunEvent::Completed { .. } => self.completed.inc(),
            RunEvent::Retrying { .. } => self.retried.inc(),
            RunEvent::Aborted { .. } => self.runs.with_label_values(&["aborted"]).inc(),
            RunEvent::Finished { elapsed_ms, .. } => {
                self.runs.with_label_values(&["finished"]).inc();
                self.run_duration.observe(*elapsed_ms as f64 / 1000.0);
            }
            RunEvent::Registered { .. } => {}
        }
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}
