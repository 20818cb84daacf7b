use embedded_hal::digital::{OutputPin, PinState};

use crate::channels::ChannelNum;

/// Raw access to the relay control lines.
///
/// Implementations only see pin levels. Which level means "output on" is
/// decided by [`pin_state_for`].
pub trait RelayDriver {
    type Error: core::fmt::Debug;

    fn write_level(&mut self, channel: ChannelNum, level: PinState) -> Result<(), Self::Error>;
}

/// Pin level that puts an output into the requested logical state.
///
/// The PDU relays are normally-closed: the output is powered while the coil
/// is released, so LOW is on and HIGH is off.
pub const fn pin_state_for(energized: bool) -> PinState {
    if energized {
        PinState::Low
    } else {
        PinState::High
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RelayPinError<E> {
    NoSuchOutput(ChannelNum),
    Pin(E),
}

/// Relay bank wired directly to GPIO (or I/O expander) output pins, one per slot.
pub struct PinRelays<P, const N: usize> {
    pins: [P; N],
}

impl<P, const N: usize> PinRelays<P, N>
where
    P: OutputPin,
{
    pub const fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P, const N: usize> RelayDriver for PinRelays<P, N>
where
    P: OutputPin,
    P::Error: core::fmt::Debug,
{
    type Error = RelayPinError<P::Error>;

    fn write_level(&mut self, channel: ChannelNum, level: PinState) -> Result<(), Self::Error> {
        let pin = self
            .pins
            .get_mut(channel as usize)
            .ok_or(RelayPinError::NoSuchOutput(channel))?;
        pin.set_state(level).map_err(RelayPinError::Pin)
    }
}
