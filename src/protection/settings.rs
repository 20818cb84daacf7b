use embassy_time::Duration;

use crate::units::time;

/// What a manual on/off command does to a latched alert.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManualOverride {
    /// Any on/off command clears the alert, "on" re-energizes right away even
    /// if the fault is still present.
    #[default]
    ClearsAlert,
    /// "on" is refused while alerted, an "off" command acknowledges the alert.
    RequireOffFirst,
}

macro_rules! positive_f32 {
    ($value:expr) => {{
        const _: () = core::assert!($value > 0.0, "Value must be positive");
        $value
    }};
}

pub const DEFAULT_SUPPLY_MV: f32 = positive_f32!(12000.0);
pub const DEFAULT_SUPPLY_TOLERANCE_MV: f32 = positive_f32!(2000.0);
pub const DEFAULT_CHANNEL_LIMIT_MA: f32 = positive_f32!(2000.0);
pub const DEFAULT_TOTAL_LIMIT_MA: f32 = positive_f32!(10000.0);
pub const DEFAULT_SAMPLE_INTERVAL: Duration = time::ms(40);
pub const MIN_SAMPLE_INTERVAL: Duration = time::ms(1);
pub const DEFAULT_TELEMETRY_INTERVAL: Duration = time::s(60);

/// Start-up settings of the protection engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PduSettings {
    /// Expected supply voltage on every output
    pub nominal_supply_mv: f32,
    pub supply_tolerance_mv: f32,
    pub default_channel_limit_ma: f32,
    /// Limit for the sum of all output currents
    pub total_limit_ma: f32,
    /// Clamped to [`MIN_SAMPLE_INTERVAL`], sampling cannot be disabled
    pub sample_interval: Duration,
    /// Zero disables telemetry
    pub telemetry_interval: Duration,
    pub manual_override: ManualOverride,
}

impl PduSettings {
    pub fn min_supply_mv(&self) -> f32 {
        self.nominal_supply_mv - self.supply_tolerance_mv
    }

    pub fn max_supply_mv(&self) -> f32 {
        self.nominal_supply_mv + self.supply_tolerance_mv
    }

    /// Interval the sampling cycle actually runs at.
    pub fn sampling_interval(&self) -> Duration {
        self.sample_interval.max(MIN_SAMPLE_INTERVAL)
    }
}

impl Default for PduSettings {
    fn default() -> Self {
        Self {
            nominal_supply_mv: DEFAULT_SUPPLY_MV,
            supply_tolerance_mv: DEFAULT_SUPPLY_TOLERANCE_MV,
            default_channel_limit_ma: DEFAULT_CHANNEL_LIMIT_MA,
            total_limit_ma: DEFAULT_TOTAL_LIMIT_MA,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            telemetry_interval: DEFAULT_TELEMETRY_INTERVAL,
            manual_override: ManualOverride::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supply_window() {
        let settings = PduSettings::default();
        assert_eq!(settings.min_supply_mv(), 10000.0);
        assert_eq!(settings.max_supply_mv(), 14000.0);
        assert_eq!(settings.sample_interval, Duration::from_millis(40));
        assert_eq!(settings.telemetry_interval, Duration::from_secs(60));
        assert_eq!(settings.manual_override, ManualOverride::ClearsAlert);
    }

    #[test]
    fn test_zero_sample_interval_is_clamped() {
        let settings = PduSettings {
            sample_interval: Duration::from_ticks(0),
            ..PduSettings::default()
        };
        assert_eq!(settings.sampling_interval(), MIN_SAMPLE_INTERVAL);
        assert_eq!(
            PduSettings::default().sampling_interval(),
            DEFAULT_SAMPLE_INTERVAL
        );
    }
}
