// Domain models: metric readings, snapshots and the wire payload

mod metric;
mod payload;

pub use metric::{DriveUsage, MetricKind, MetricReading, Snapshot, disk_usage_percent, round2};
pub use payload::{
    Payload, PayloadFormat, SECURE_MARKER, WARNING_LINE_WIDTH, WarningBlock, format_data,
};
