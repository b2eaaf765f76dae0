// Linux-specific helpers: completed block I/O operations from /proc/diskstats.

use std::time::Duration;

/// Cumulative completed read/write operations across whole block devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub reads: u64,
    pub writes: u64,
}

impl IoCounters {
    /// Operations per second since `prev`. Counter resets yield 0.
    pub fn rates_since(&self, prev: &IoCounters, elapsed: Duration) -> (f64, f64) {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return (0.0, 0.0);
        }
        (
            self.reads.saturating_sub(prev.reads) as f64 / secs,
            self.writes.saturating_sub(prev.writes) as f64 / secs,
        )
    }
}

/// Sum of completed reads/writes over whole devices. `None` off Linux or when
/// /proc/diskstats is unreadable.
pub(super) fn read_io_counters() -> Option<IoCounters> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        Some(parse_diskstats(&content, |name| {
            std::path::Path::new("/sys/block")
                .join(name.replace('/', "!"))
                .exists()
        }))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Columns: major minor name reads_completed reads_merged sectors_read ms_reading
/// writes_completed ...
pub fn parse_diskstats(content: &str, is_whole_device: impl Fn(&str) -> bool) -> IoCounters {
    let mut counters = IoCounters::default();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let name = fields[2];
        if name.starts_with("loop") || name.starts_with("ram") || !is_whole_device(name) {
            continue;
        }
        if let (Ok(reads), Ok(writes)) = (fields[3].parse::<u64>(), fields[7].parse::<u64>()) {
            counters.reads = counters.reads.saturating_add(reads);
            counters.writes = counters.writes.saturating_add(writes);
        }
    }
    counters
}
