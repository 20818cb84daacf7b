use crate::channels::ChannelNum;

/// One reading of a channel's current sensor, in milli-units.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RawSample {
    pub milliamps: f32,
    pub millivolts: f32,
    pub milliwatts: f32,
    /// Over-current flag raised by the sensor itself against its alert limit
    pub over_current: bool,
}

impl RawSample {
    pub const ZERO: Self = Self {
        milliamps: 0.0,
        millivolts: 0.0,
        milliwatts: 0.0,
        over_current: false,
    };

    pub const fn new(milliamps: f32, millivolts: f32, milliwatts: f32) -> Self {
        Self {
            milliamps,
            millivolts,
            milliwatts,
            over_current: false,
        }
    }

    pub const fn with_over_current(mut self, over_current: bool) -> Self {
        self.over_current = over_current;
        self
    }
}

/// Per-channel current/voltage/power sensors on the sensor bus.
///
/// Every call is synchronous and expected to complete well inside one
/// sampling cycle.
pub trait SampleSource {
    type Error: core::fmt::Debug;

    /// Probes a slot at boot, `Ok` when a sensor answers and has been set up.
    fn probe(&mut self, channel: ChannelNum) -> Result<(), Self::Error>;

    fn read(&mut self, channel: ChannelNum) -> Result<RawSample, Self::Error>;

    /// Programs the sensor's own over-current alert threshold.
    fn set_alert_limit(&mut self, channel: ChannelNum, limit_ma: f32) -> Result<(), Self::Error>;
}
