// Metric kinds, readings and per-tick snapshots

use serde::Serialize;
use serde::ser::Serializer;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cpu,
    Ram,
    FileRead,
    FileWrite,
    Process,
    Disk,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Cpu => "Cpu",
            MetricKind::Ram => "Ram",
            MetricKind::FileRead => "FileRead",
            MetricKind::FileWrite => "FileWrite",
            MetricKind::Process => "Process",
            MetricKind::Disk => "Disk",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One evaluated value. `drive` is set only for `MetricKind::Disk`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub kind: MetricKind,
    pub value: f64,
    pub drive: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriveUsage {
    pub name: String,
    pub usage_percent: f64,
}

/// All readings taken in one tick. Percentages and rates are already rounded
/// to 2 decimal places; `disks` keeps enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    pub cpu: f64,
    pub ram: f64,
    pub file_read: f64,
    pub file_write: f64,
    pub process: u64,
    #[serde(serialize_with = "drives_as_map")]
    pub disks: Vec<DriveUsage>,
}

impl Snapshot {
    /// Readings in evaluation order: Cpu, Ram, FileRead, FileWrite, Process,
    /// then one per drive.
    pub fn readings(&self) -> Vec<MetricReading> {
        let fixed = [
            (MetricKind::Cpu, self.cpu),
            (MetricKind::Ram, self.ram),
            (MetricKind::FileRead, self.file_read),
            (MetricKind::FileWrite, self.file_write),
            (MetricKind::Process, self.process as f64),
        ];
        fixed
            .into_iter()
            .map(|(kind, value)| MetricReading {
                kind,
                value,
                drive: None,
            })
            .chain(self.disks.iter().map(|d| MetricReading {
                kind: MetricKind::Disk,
                value: d.usage_percent,
                drive: Some(d.name.clone()),
            }))
            .collect()
    }
}

fn drives_as_map<S: Serializer>(disks: &[DriveUsage], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(disks.iter().map(|d| (d.name.as_str(), d.usage_percent)))
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Used space as a rounded percentage; `None` for a drive that is not ready
/// (reports no capacity).
pub fn disk_usage_percent(total: u64, free: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(free);
    Some(round2(used as f64 / total as f64 * 100.0))
}
