use defmt_or_log as log;

use crate::channels::{Channel, ChannelNum, output_index};
use crate::relays::relay_driver::{RelayDriver, pin_state_for};

/// The single place where relay outputs are switched.
///
/// Keeps the channel model and the hardware in step and skips writes that
/// would not change anything.
pub struct RelayActuator<R> {
    driver: R,
}

impl<R> RelayActuator<R>
where
    R: RelayDriver,
{
    pub const fn new(driver: R) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &R {
        &self.driver
    }

    /// Drives an output to its current model state without comparing first.
    /// Used once at boot to bring the hardware in line with the model.
    pub(crate) fn sync(&mut self, num: ChannelNum, channel: &Channel) {
        if !channel.is_discovered() {
            return;
        }
        self.write(num, channel.is_energized());
    }

    /// Switches an output on or off.
    ///
    /// Returns `true` when the logical state changed. Undiscovered slots are
    /// never touched. A failed pin write is logged and the model still records
    /// the commanded state, there is no retry.
    pub(crate) fn set_relay(
        &mut self,
        num: ChannelNum,
        channel: &mut Channel,
        energized: bool,
    ) -> bool {
        if !channel.is_discovered() || channel.is_energized() == energized {
            return false;
        }
        self.write(num, energized);
        channel.set_energized(energized);
        true
    }

    fn write(&mut self, num: ChannelNum, energized: bool) {
        if let Err(e) = self.driver.write_level(num, pin_state_for(energized)) {
            log::error!(
                "Relay write failed for output {}: {:?}",
                output_index(num),
                defmt_or_log::Debug2Format(&e)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRelays;
    use embedded_hal::digital::PinState;

    fn discovered_channel() -> Channel {
        let mut channel = Channel::new(2000.0);
        channel.mark_discovered();
        channel
    }

    #[test]
    fn test_switching_off_writes_high_once() {
        let mut actuator = RelayActuator::new(MockRelays::default());
        let mut channel = discovered_channel();

        assert!(actuator.set_relay(4, &mut channel, false));
        assert!(!actuator.set_relay(4, &mut channel, false));

        assert!(!channel.is_energized());
        assert_eq!(actuator.driver().writes(), &[(4, PinState::High)]);
    }

    #[test]
    fn test_undiscovered_output_is_never_written() {
        let mut actuator = RelayActuator::new(MockRelays::default());
        let mut channel = Channel::new(2000.0);

        assert!(!actuator.set_relay(0, &mut channel, false));
        actuator.sync(0, &channel);
        assert!(actuator.driver().writes().is_empty());
    }

    #[test]
    fn test_failed_write_still_records_commanded_state() {
        let mut actuator = RelayActuator::new(MockRelays::failing());
        let mut channel = discovered_channel();

        assert!(actuator.set_relay(2, &mut channel, false));
        assert!(!channel.is_energized());
    }
}
