// Payload formatting: data block, warning block and the bytes sent on the wire

use bytes::Bytes;
use serde::Deserialize;
use std::fmt::Write as _;

use super::metric::Snapshot;

/// Emitted in place of the warning block while nothing has ever been unsafe.
pub const SECURE_MARKER: &str = "Secure.";

/// Every warning line, including filler, is right-padded to this width.
pub const WARNING_LINE_WIDTH: usize = 65;

const DATA_LINE_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Plain,
    Json,
}

/// Padded warning lines for one tick. Filler lines are blank padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningBlock {
    lines: Vec<String>,
}

impl WarningBlock {
    pub fn new(warnings: Vec<String>, height: usize) -> Self {
        let mut lines: Vec<String> = warnings
            .into_iter()
            .map(|w| pad(&w, WARNING_LINE_WIDTH))
            .collect();
        while lines.len() < height {
            lines.push(" ".repeat(WARNING_LINE_WIDTH));
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return SECURE_MARKER.to_string();
        }
        let mut out = String::with_capacity(self.lines.len() * (WARNING_LINE_WIDTH + 1));
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Latest published output. Immutable once built; `wire` is encoded once and
/// shared by every connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    data: String,
    warnings: String,
    wire: Bytes,
}

impl Payload {
    pub fn new(data: String, warnings: String) -> Self {
        let wire = Bytes::from(format!("{}\n{}", data, warnings));
        Self {
            data,
            warnings,
            wire,
        }
    }

    /// Placeholder served before the first tick completes.
    pub fn empty() -> Self {
        Self::new(String::new(), String::new())
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn warnings(&self) -> &str {
        &self.warnings
    }

    pub fn wire(&self) -> Bytes {
        self.wire.clone()
    }
}

pub fn format_data(snapshot: &Snapshot, format: PayloadFormat) -> anyhow::Result<String> {
    match format {
        PayloadFormat::Plain => Ok(format_plain(snapshot)),
        PayloadFormat::Json => Ok(serde_json::to_string(snapshot)?),
    }
}

fn format_plain(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for disk in &snapshot.disks {
        let _ = writeln!(out, "Usage {}: {}%", disk.name, disk.usage_percent);
    }
    let lines = [
        format!("CPU: {}%", snapshot.cpu),
        format!("RAM: {}%", snapshot.ram),
        format!("File read: {} reqs/s", snapshot.file_read),
        format!("File write: {} reqs/s", snapshot.file_write),
        format!("Process: {} counts", snapshot.process),
    ];
    for line in lines {
        out.push_str(&pad(&line, DATA_LINE_WIDTH));
        out.push('\n');
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}
