// Shared test helpers

#![allow(dead_code)]

use hostpulse::config::ThresholdConfig;
use hostpulse::metric_source::{DriveSpace, MetricSource, RawSample};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn thresholds(cpu: f64, ram: f64, disk: f64) -> ThresholdConfig {
    ThresholdConfig { cpu, ram, disk }
}

pub fn raw_sample(cpu: f64, ram: f64) -> RawSample {
    RawSample {
        cpu_percent: cpu,
        ram_percent: ram,
        file_reads_per_sec: 0.0,
        file_writes_per_sec: 0.0,
        process_count: 0,
        drives: vec![],
    }
}

pub fn drive(name: &str, total: u64, free: u64) -> DriveSpace {
    DriveSpace {
        name: name.into(),
        total,
        free,
    }
}

/// Metric source that replays queued samples, then repeats the last one.
/// `fail_on` makes the n-th call (1-based) return an error.
#[derive(Clone)]
pub struct ScriptedSource {
    samples: Arc<Mutex<VecDeque<RawSample>>>,
    last: Arc<Mutex<Option<RawSample>>>,
    calls: Arc<AtomicUsize>,
    fail_on: Option<usize>,
}

impl ScriptedSource {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self {
            samples: Arc::new(Mutex::new(samples.into())),
            last: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetricSource for ScriptedSource {
    async fn sample(&self) -> anyhow::Result<RawSample> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            anyhow::bail!("scripted failure on call {}", call);
        }
        let next = self.samples.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(sample) = next {
            *last = Some(sample);
        }
        (*last)
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no scripted samples"))
    }
}
