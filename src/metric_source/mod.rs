// Host metric source: the seam between the sampler and OS counters

mod linux;

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Disks, ProcessesToUpdate, System};
use tracing::instrument;

pub use linux::{IoCounters, parse_diskstats};

/// Total and free space of one drive. A drive that is not ready reports
/// `total == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveSpace {
    pub name: String,
    pub total: u64,
    pub free: u64,
}

/// Unrounded instantaneous values from one pull.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub file_reads_per_sec: f64,
    pub file_writes_per_sec: f64,
    pub process_count: u64,
    /// Enumeration order.
    pub drives: Vec<DriveSpace>,
}

pub trait MetricSource: Send + Sync + 'static {
    fn sample(&self) -> impl Future<Output = anyhow::Result<RawSample>> + Send;
}

/// Reads the local host through `sysinfo`, plus `/proc/diskstats` for file
/// operation rates on Linux.
pub struct SysinfoSource {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    last_io: Arc<Mutex<Option<(IoCounters, Instant)>>>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Baseline so the first tick reports usage since startup.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        let last_io = linux::read_io_counters().map(|c| (c, Instant::now()));
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            last_io: Arc::new(Mutex::new(last_io)),
        }
    }
}

impl MetricSource for SysinfoSource {
    #[instrument(skip(self), fields(source = "sysinfo", operation = "sample"))]
    async fn sample(&self) -> anyhow::Result<RawSample> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let last_io = self.last_io.clone();
        tokio::task::spawn_blocking(move || {
            let drives = {
                let mut disks = disks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
                disks.refresh(true);
                disks
                    .list()
                    .iter()
                    .map(|d| DriveSpace {
                        name: d.mount_point().to_string_lossy().into_owned(),
                        total: d.total_space(),
                        free: d.available_space(),
                    })
                    .collect()
            };

            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_usage();
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);

            let cpu_percent = (sys.global_cpu_usage() as f64).clamp(0.0, 100.0);
            let total = sys.total_memory();
            let ram_percent = if total > 0 {
                sys.used_memory() as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let process_count = sys.processes().len() as u64;

            let (file_reads_per_sec, file_writes_per_sec) = {
                let mut guard = last_io
                    .lock()
                    .map_err(|e| anyhow::anyhow!("io counters lock poisoned: {}", e))?;
                match linux::read_io_counters() {
                    Some(now_counters) => {
                        let now = Instant::now();
                        let rates = guard
                            .as_ref()
                            .map(|(prev, prev_ts)| {
                                now_counters.rates_since(prev, now.duration_since(*prev_ts))
                            })
                            .unwrap_or((0.0, 0.0));
                        *guard = Some((now_counters, now));
                        rates
                    }
                    None => (0.0, 0.0),
                }
            };

            Ok(RawSample {
                cpu_percent,
                ram_percent,
                file_reads_per_sec,
                file_writes_per_sec,
                process_count,
                drives,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}
