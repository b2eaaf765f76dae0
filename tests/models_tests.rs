// Snapshot and payload formatting tests (plain text and JSON)

use hostpulse::models::*;

fn snapshot() -> Snapshot {
    Snapshot {
        cpu: 12.5,
        ram: 40.0,
        file_read: 3.25,
        file_write: 0.0,
        process: 213,
        disks: vec![
            DriveUsage {
                name: "/".into(),
                usage_percent: 75.0,
            },
            DriveUsage {
                name: "/data".into(),
                usage_percent: 12.34,
            },
        ],
    }
}

#[test]
fn test_disk_usage_percent_rounds_to_two_places() {
    assert_eq!(disk_usage_percent(200, 50), Some(75.00));
    assert_eq!(disk_usage_percent(3, 2), Some(33.33));
    assert_eq!(disk_usage_percent(3, 1), Some(66.67));
    assert_eq!(disk_usage_percent(100, 100), Some(0.0));
}

#[test]
fn test_disk_usage_percent_skips_unready_drive() {
    assert_eq!(disk_usage_percent(0, 0), None);
}

#[test]
fn test_round2() {
    assert_eq!(round2(12.345678), 12.35);
    assert_eq!(round2(0.004), 0.0);
    assert_eq!(round2(99.999), 100.0);
}

#[test]
fn test_readings_follow_evaluation_order() {
    let kinds: Vec<MetricKind> = snapshot().readings().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MetricKind::Cpu,
            MetricKind::Ram,
            MetricKind::FileRead,
            MetricKind::FileWrite,
            MetricKind::Process,
            MetricKind::Disk,
            MetricKind::Disk,
        ]
    );
    let readings = snapshot().readings();
    assert_eq!(readings[4].value, 213.0);
    assert_eq!(readings[5].drive.as_deref(), Some("/"));
    assert_eq!(readings[6].drive.as_deref(), Some("/data"));
}

#[test]
fn test_plain_format_lists_drives_then_padded_metrics() {
    let text = format_data(&snapshot(), PayloadFormat::Plain).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Usage /: 75%");
    assert_eq!(lines[1], "Usage /data: 12.34%");
    assert_eq!(lines[2], format!("{:<30}", "CPU: 12.5%"));
    assert_eq!(lines[3], format!("{:<30}", "RAM: 40%"));
    assert_eq!(lines[4], format!("{:<30}", "File read: 3.25 reqs/s"));
    assert_eq!(lines[5], format!("{:<30}", "File write: 0 reqs/s"));
    assert_eq!(lines[6], format!("{:<30}", "Process: 213 counts"));
    assert_eq!(lines.len(), 7);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_json_format_shape() {
    let text = format_data(&snapshot(), PayloadFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["Cpu"], 12.5);
    assert_eq!(json["Ram"], 40.0);
    assert_eq!(json["FileRead"], 3.25);
    assert_eq!(json["FileWrite"], 0.0);
    assert_eq!(json["Process"], 213);
    assert_eq!(json["Disks"]["/"], 75.0);
    assert_eq!(json["Disks"]["/data"], 12.34);
}

#[test]
fn test_json_disks_keep_enumeration_order() {
    let text = format_data(&snapshot(), PayloadFormat::Json).unwrap();
    let root = text.find("\"/\"").unwrap();
    let data = text.find("\"/data\"").unwrap();
    assert!(root < data);
}

#[test]
fn test_payload_wire_joins_blocks_with_newline() {
    let payload = Payload::new("CPU: 1%\n".into(), SECURE_MARKER.into());
    assert_eq!(payload.data(), "CPU: 1%\n");
    assert_eq!(payload.warnings(), SECURE_MARKER);
    assert_eq!(&payload.wire()[..], b"CPU: 1%\n\nSecure.");
}

#[test]
fn test_warning_block_pads_to_height() {
    let block = WarningBlock::new(vec!["Cpu has exceeded".into()], 3);
    assert_eq!(block.height(), 3);
    assert!(block.lines().iter().all(|l| l.len() == WARNING_LINE_WIDTH));
    assert!(block.lines()[0].starts_with("Cpu has exceeded"));
}
