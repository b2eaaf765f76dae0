// Threshold evaluation and warning-block height tracking

use crate::config::ThresholdConfig;
use crate::models::{MetricKind, MetricReading, WARNING_LINE_WIDTH, WarningBlock};

/// Outcome of comparing one reading against its limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub safe: bool,
    /// Padded to `WARNING_LINE_WIDTH`; `None` when safe.
    pub warning: Option<String>,
}

impl ThresholdConfig {
    /// Limit a metric kind is compared against. FileRead, FileWrite and Process
    /// reuse the cpu, ram and disk limits in that order.
    pub fn limit_for(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu | MetricKind::FileRead => self.cpu,
            MetricKind::Ram | MetricKind::FileWrite => self.ram,
            MetricKind::Disk | MetricKind::Process => self.disk,
        }
    }

    /// A value equal to the limit is still safe.
    pub fn evaluate(&self, kind: MetricKind, value: f64) -> Verdict {
        if value > self.limit_for(kind) {
            Verdict {
                safe: false,
                warning: Some(warning_message(kind)),
            }
        } else {
            Verdict {
                safe: true,
                warning: None,
            }
        }
    }
}

pub fn warning_message(kind: MetricKind) -> String {
    format!(
        "{:<width$}",
        format!("{} has exceeded the range of safety! Please be cautious.", kind),
        width = WARNING_LINE_WIDTH
    )
}

/// Keeps the warning block height from ever shrinking during a run: each block
/// is padded with blank lines up to the largest unsafe count seen so far.
#[derive(Debug, Default)]
pub struct WarningTracker {
    watermark: usize,
}

impl WarningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watermark(&self) -> usize {
        self.watermark
    }

    pub fn build(
        &mut self,
        thresholds: &ThresholdConfig,
        readings: &[MetricReading],
    ) -> WarningBlock {
        let warnings: Vec<String> = readings
            .iter()
            .filter_map(|r| thresholds.evaluate(r.kind, r.value).warning)
            .collect();
        self.watermark = self.watermark.max(warnings.len());
        WarningBlock::new(warnings, self.watermark)
    }
}
