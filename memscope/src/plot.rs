use std::collections::VecDeque;

use memscope_traits::{SampleRecord, Subscriber, CHANNEL_COUNT};

/// Bounded time-window series store feeding the chart renderer.
///
/// One monotonic queue per channel: `append` pushes at the back and pops
/// expired entries off the front, so eviction is amortized O(1). Not
/// thread-safe by contract: `append` runs on the same context that renders.
pub struct PlotBuffer {
    window: f64,
    series: Vec<VecDeque<(f64, f32)>>,
}

impl PlotBuffer {
    /// `window_secs` is the maximum time span retained per channel.
    pub fn new(window_secs: f64) -> Self {
        PlotBuffer {
            window: window_secs,
            series: vec![VecDeque::new(); CHANNEL_COUNT],
        }
    }

    /// Appends one record and evicts entries older than the window.
    pub fn append(&mut self, record: &SampleRecord) {
        let horizon = record.timestamp - self.window;
        for (channel, &value) in record.channels.iter().enumerate() {
            let series = &mut self.series[channel];
            series.push_back((record.timestamp, value));
            while series.front().map_or(false, |&(t, _)| t < horizon) {
                series.pop_front();
            }
        }
    }

    /// Read-only view of one channel's windowed `(timestamp, value)` series,
    /// oldest first.
    pub fn series(&self, channel: usize) -> Option<&VecDeque<(f64, f32)>> {
        self.series.get(channel)
    }

    pub fn channels(&self) -> usize {
        self.series.len()
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Empties every channel's series for a new session.
    pub fn clear(&mut self) {
        for series in &mut self.series {
            series.clear();
        }
    }
}

impl Subscriber for PlotBuffer {
    fn on_new_data(&mut self, record: SampleRecord) {
        self.append(&record);
    }

    fn on_port_opened(&mut self) {
        self.clear();
    }
}
