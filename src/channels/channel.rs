use crate::sensors::RawSample;

/// Latched fault classification of an output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertType {
    #[default]
    None,
    OverVoltage,
    UnderVoltage,
    OverCurrent,
    TotalOverCurrent,
}

impl AlertType {
    /// Event name used on the status topic
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertType::None => "none",
            AlertType::OverVoltage => "overVoltage",
            AlertType::UnderVoltage => "underVoltage",
            AlertType::OverCurrent => "overCurrent",
            AlertType::TotalOverCurrent => "overCurrentTotal",
        }
    }

    pub const fn is_alert(&self) -> bool {
        !matches!(self, AlertType::None)
    }
}

/// Protection state of an output as seen by the engine and the display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// No sensor was found at boot
    Unknown,
    Normal,
    /// Switched off by command, no alert latched
    Off,
    Alerted(AlertType),
}

/// Per-output model. Only the engine mutates it.
#[derive(Debug, Clone)]
pub struct Channel {
    discovered: bool,
    current_limit_ma: f32,
    last_alert: AlertType,
    energized: bool,
    last_sample: RawSample,
    has_sample: bool,
}

impl Channel {
    pub(crate) const fn new(current_limit_ma: f32) -> Self {
        Self {
            discovered: false,
            current_limit_ma,
            last_alert: AlertType::None,
            // Normally-closed relays are on while unpowered
            energized: true,
            last_sample: RawSample::ZERO,
            has_sample: false,
        }
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn current_limit_ma(&self) -> f32 {
        self.current_limit_ma
    }

    pub fn last_alert(&self) -> AlertType {
        self.last_alert
    }

    /// Logical output state: true while the output is powered.
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// Last good reading, zero until the sensor first answered.
    pub fn last_sample(&self) -> &RawSample {
        &self.last_sample
    }

    pub fn has_sample(&self) -> bool {
        self.has_sample
    }

    pub fn state(&self) -> ChannelState {
        if !self.discovered {
            ChannelState::Unknown
        } else if self.last_alert.is_alert() {
            ChannelState::Alerted(self.last_alert)
        } else if self.energized {
            ChannelState::Normal
        } else {
            ChannelState::Off
        }
    }

    pub(crate) fn mark_discovered(&mut self) {
        self.discovered = true;
    }

    pub(crate) fn set_current_limit_ma(&mut self, limit_ma: f32) {
        self.current_limit_ma = limit_ma;
    }

    pub(crate) fn latch_alert(&mut self, alert: AlertType) {
        self.last_alert = alert;
    }

    pub(crate) fn clear_alert(&mut self) {
        self.last_alert = AlertType::None;
    }

    pub(crate) fn set_energized(&mut self, energized: bool) {
        self.energized = energized;
    }

    pub(crate) fn record_sample(&mut self, sample: RawSample) {
        self.last_sample = sample;
        self.has_sample = true;
    }
}
