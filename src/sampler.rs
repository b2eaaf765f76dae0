// Background sampler: once per tick pulls metrics, evaluates thresholds and
// publishes the formatted payload. A failed tick ends the loop for good.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

use crate::config::ThresholdConfig;
use crate::metric_source::{MetricSource, RawSample};
use crate::models::{
    DriveUsage, Payload, PayloadFormat, Snapshot, disk_usage_percent, format_data, round2,
};
use crate::output::SharedOutput;
use crate::thresholds::WarningTracker;

pub struct Sampler<S> {
    source: S,
    thresholds: ThresholdConfig,
    tracker: WarningTracker,
    format: PayloadFormat,
    output: SharedOutput,
}

/// Rounds the raw values and drops drives that are not ready.
pub fn snapshot_from(raw: RawSample) -> Snapshot {
    let disks = raw
        .drives
        .into_iter()
        .filter_map(|d| {
            disk_usage_percent(d.total, d.free).map(|usage_percent| DriveUsage {
                name: d.name,
                usage_percent,
            })
        })
        .collect();
    Snapshot {
        cpu: round2(raw.cpu_percent),
        ram: round2(raw.ram_percent),
        file_read: round2(raw.file_reads_per_sec),
        file_write: round2(raw.file_writes_per_sec),
        process: raw.process_count,
        disks,
    }
}

impl<S: MetricSource> Sampler<S> {
    pub fn new(
        source: S,
        thresholds: ThresholdConfig,
        format: PayloadFormat,
        output: SharedOutput,
    ) -> Self {
        Self {
            source,
            thresholds,
            tracker: WarningTracker::new(),
            format,
            output,
        }
    }

    pub fn watermark(&self) -> usize {
        self.tracker.watermark()
    }

    /// One full tick: collect, evaluate, format, publish.
    pub async fn tick(&mut self) -> anyhow::Result<Arc<Payload>> {
        let raw = self.source.sample().await?;
        let snapshot = snapshot_from(raw);
        let warnings = self.tracker.build(&self.thresholds, &snapshot.readings());
        let data = format_data(&snapshot, self.format)?;
        Ok(self.output.publish(Payload::new(data, warnings.render())))
    }
}

/// Spawns the sampling loop. The first tick runs immediately; the stop signal
/// is checked between ticks, so a tick in progress always completes.
pub fn spawn<S: MetricSource>(
    sampler: Sampler<S>,
    period: Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let sampler_span = tracing::span!(
        tracing::Level::DEBUG,
        "sampler",
        period_ms = period.as_millis() as u64
    );
    tokio::spawn(run(sampler, period, shutdown_rx).instrument(sampler_span))
}

async fn run<S: MetricSource>(
    mut sampler: Sampler<S>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticks: u64 = 0;
    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        tokio::select! {
            _ = tick.tick() => {}
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }
        ticks += 1;
        match sampler.tick().await {
            Ok(payload) => {
                tracing::debug!(
                    tick = ticks,
                    watermark = sampler.watermark(),
                    bytes = payload.wire().len(),
                    "Payload published"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    tick = ticks,
                    operation = "sampler_tick",
                    "Sampler tick failed; sampling stopped"
                );
                break;
            }
        }
    }
    tracing::debug!("Sampler shutting down");
}
