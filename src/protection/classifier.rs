use crate::channels::AlertType;
use crate::protection::settings::PduSettings;
use crate::sensors::RawSample;

/// Fault condition of one output for the current cycle.
///
/// The sensor's own over-current flag wins, then the supply voltage window,
/// then the total current against its limit. A non-finite voltage passes the
/// voltage check.
pub fn classify(sample: &RawSample, total_ma: f32, settings: &PduSettings) -> AlertType {
    if sample.over_current {
        return AlertType::OverCurrent;
    }

    let mv = sample.millivolts;
    if mv.is_finite() {
        if mv < settings.min_supply_mv() {
            return AlertType::UnderVoltage;
        }
        if mv > settings.max_supply_mv() {
            return AlertType::OverVoltage;
        }
    }

    if total_ma >= settings.total_limit_ma {
        AlertType::TotalOverCurrent
    } else {
        AlertType::None
    }
}

/// Contribution of a reading to the total current.
pub fn total_contribution(sample: &RawSample) -> f32 {
    if sample.milliamps.is_finite() {
        sample.milliamps
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ma: f32, mv: f32) -> RawSample {
        RawSample::new(ma, mv, ma * mv / 1000.0)
    }

    #[test]
    fn test_normal_reading() {
        let settings = PduSettings::default();
        assert_eq!(
            classify(&sample(500.0, 12000.0), 500.0, &settings),
            AlertType::None
        );
    }

    #[test]
    fn test_voltage_window_is_inclusive() {
        let settings = PduSettings::default();
        assert_eq!(classify(&sample(0.0, 10000.0), 0.0, &settings), AlertType::None);
        assert_eq!(classify(&sample(0.0, 14000.0), 0.0, &settings), AlertType::None);
        assert_eq!(
            classify(&sample(0.0, 9999.0), 0.0, &settings),
            AlertType::UnderVoltage
        );
        assert_eq!(
            classify(&sample(0.0, 14001.0), 0.0, &settings),
            AlertType::OverVoltage
        );
    }

    #[test]
    fn test_hardware_flag_wins() {
        let settings = PduSettings::default();
        let reading = sample(2500.0, 9000.0).with_over_current(true);
        assert_eq!(classify(&reading, 20000.0, &settings), AlertType::OverCurrent);
    }

    #[test]
    fn test_voltage_before_total() {
        let settings = PduSettings::default();
        assert_eq!(
            classify(&sample(100.0, 15000.0), 20000.0, &settings),
            AlertType::OverVoltage
        );
    }

    #[test]
    fn test_total_limit_reached() {
        let settings = PduSettings::default();
        assert_eq!(
            classify(&sample(100.0, 12000.0), 10000.0, &settings),
            AlertType::TotalOverCurrent
        );
        assert_eq!(
            classify(&sample(100.0, 12000.0), 9999.0, &settings),
            AlertType::None
        );
    }

    #[test]
    fn test_non_finite_values() {
        let settings = PduSettings::default();
        assert_eq!(
            classify(&sample(100.0, f32::NAN), 100.0, &settings),
            AlertType::None
        );
        assert_eq!(total_contribution(&sample(f32::NAN, 12000.0)), 0.0);
        assert_eq!(total_contribution(&sample(f32::INFINITY, 12000.0)), 0.0);
        assert_eq!(total_contribution(&sample(250.0, 12000.0)), 250.0);
    }
}
