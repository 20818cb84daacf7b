//! Rate-limited publishing of the latest per-output readings.

use defmt_or_log as log;
use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::channels::{ChannelBank, MAX_CHANNELS, output_index};
use crate::messages::{StatusSink, TelemetryEntry};
use crate::units::PollTimer;

pub type TelemetryBatch = Vec<TelemetryEntry, MAX_CHANNELS>;

pub struct TelemetryPublisher {
    timer: PollTimer,
}

impl TelemetryPublisher {
    pub const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            timer: PollTimer::new(interval, now),
        }
    }

    pub fn interval(&self) -> Duration {
        self.timer.interval()
    }

    /// Zero disables publishing.
    pub fn set_interval(&mut self, interval: Duration) {
        self.timer.set_interval(interval);
    }

    /// Starts a new interval from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.timer.reset(now);
    }

    /// Latest sample of every discovered output, in slot order.
    pub fn collect(channels: &ChannelBank) -> TelemetryBatch {
        channels
            .discovered()
            .map(|(num, channel)| {
                let sample = channel.last_sample();
                TelemetryEntry {
                    index: output_index(num),
                    milliamps: sample.milliamps,
                    millivolts: sample.millivolts,
                    milliwatts: sample.milliwatts,
                }
            })
            .collect()
    }

    /// Publishes one batch when the interval has elapsed.
    ///
    /// Returns true when a batch was handed to the sink. The timer restarts
    /// whether or not the sink accepted it.
    pub fn poll<K>(&mut self, now: Instant, channels: &ChannelBank, sink: &mut K) -> bool
    where
        K: StatusSink,
    {
        if !self.timer.fire(now) {
            return false;
        }

        let batch = Self::collect(channels);
        if batch.is_empty() {
            return false;
        }

        log::debug!("Publishing telemetry for {} outputs", batch.len());
        if let Err(e) = sink.publish_telemetry(&batch) {
            log::warn!(
                "Telemetry publish failed: {:?}",
                defmt_or_log::Debug2Format(&e)
            );
        }
        true
    }
}
