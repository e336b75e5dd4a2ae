//! Bounded history for the traffic, memory, and connection-count charts.

use std::collections::VecDeque;

/// Samples kept per series.
pub const DEFAULT_CAPACITY: usize = 60;

/// Fixed-capacity FIFO of samples, oldest first.
#[derive(Debug, Clone)]
pub struct Series {
    capacity: usize,
    data: VecDeque<u64>,
}

impl Default for Series {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Series {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            data: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Push to the back, dropping from the front past capacity.
    pub fn append(&mut self, value: u64) {
        self.data.push_back(value);
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<u64> {
        self.data.back().copied()
    }

    /// Contiguous copy, oldest first.
    pub fn to_vec(&self) -> Vec<u64> {
        self.data.iter().copied().collect()
    }
}

/// Nearest-neighbour resample of `values` to exactly `width` points.
///
/// Longer input is decimated with `idx = i * len / width`; shorter input is
/// left-padded with zeros so the newest sample stays at the right edge.
pub fn sample(values: &[u64], width: usize) -> Vec<u64> {
    let len = values.len();
    if width == 0 {
        return Vec::new();
    }
    if len < width {
        let mut out = vec![0; width - len];
        out.extend_from_slice(values);
        return out;
    }
    (0..width)
        .map(|i| values.get(i * len / width).copied().unwrap_or(0))
        .collect()
}

/// Y-axis maximum across every plotted series, never below 1.
pub fn scale_max(series: &[&[u64]]) -> u64 {
    series
        .iter()
        .flat_map(|s| s.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1)
}

// ── ChartData ────────────────────────────────────────────────────────

/// All chart histories, fed by stream events.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub upload: Series,
    pub download: Series,
    pub memory: Series,
    pub connections: Series,
    last_totals: Option<(u64, u64)>,
    traffic_seen: bool,
}

impl ChartData {
    /// A `traffic` push: authoritative per-second speeds.
    pub fn record_traffic(&mut self, up: u64, down: u64) {
        self.traffic_seen = true;
        self.upload.append(up);
        self.download.append(down);
    }

    /// Cumulative totals from a connections snapshot. Until a traffic push
    /// has been seen, speed is the delta from the previous totals, clamped
    /// at zero so a counter reset never yields a negative rate.
    pub fn record_totals(&mut self, upload_total: u64, download_total: u64) {
        if !self.traffic_seen {
            if let Some((prev_up, prev_down)) = self.last_totals {
                self.upload.append(upload_total.saturating_sub(prev_up));
                self.download.append(download_total.saturating_sub(prev_down));
            }
        }
        self.last_totals = Some((upload_total, download_total));
    }

    pub fn record_memory(&mut self, inuse: u64) {
        self.memory.append(inuse);
    }

    pub fn record_connection_count(&mut self, count: usize) {
        self.connections
            .append(u64::try_from(count).unwrap_or(u64::MAX));
    }
}
