//! Human-readable byte and rate formatting helpers.

use bytesize::ByteSize;

/// Byte count, e.g. "512 B", "1.2 MB".
pub fn fmt_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Transfer rate in bytes per second, e.g. "1.2 MB/s".
pub fn fmt_rate(bytes_per_sec: u64) -> String {
    format!("{}/s", fmt_bytes(bytes_per_sec))
}

/// Format an upload/download pair as "↑ 1.2 MB  ↓ 40 MB".
pub fn fmt_up_down(up: u64, down: u64) -> String {
    format!("↑ {}  ↓ {}", fmt_bytes(up), fmt_bytes(down))
}

/// Compact figure for chart axis labels: "512", "12K", "3.4M", "1.1G".
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_axis(value: u64) -> String {
    let v = value as f64;
    if v >= 1e9 {
        format!("{:.1}G", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.0}K", v / 1e3)
    } else {
        value.to_string()
    }
}
