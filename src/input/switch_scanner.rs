use defmt_or_log as log;
use heapless::Vec;

use crate::channels::{ChannelNum, MAX_CHANNELS, output_index};

/// Consecutive identical scans before a level change is accepted.
pub const DEFAULT_DEBOUNCE_SCANS: u8 = 3;

/// Levels of every switch input, bit `n` for slot `n`.
///
/// Inputs are pulled up, so a set bit means the switch is open.
pub type PortLevels = u16;

const ALL_OPEN: PortLevels = PortLevels::MAX;

const fn bit(channel: ChannelNum) -> PortLevels {
    1 << channel
}

/// Port expander wired to one switch per output slot.
pub trait SwitchInputs {
    type Error: core::fmt::Debug;

    fn read_port(&mut self) -> Result<PortLevels, Self::Error>;
}

/// Debounced change of one switch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchEvent {
    pub channel: ChannelNum,
    /// Closed switches the output on, open switches it off
    pub closed: bool,
}

pub type SwitchEvents = Vec<SwitchEvent, MAX_CHANNELS>;

/// Turns raw port snapshots into debounced switch edges.
///
/// Every switch starts out open, so a switch already closed at boot reports
/// one `closed` edge once it has settled.
#[derive(Debug, Clone)]
pub struct SwitchScanner {
    stable: PortLevels,
    pending: [u8; MAX_CHANNELS],
    debounce_scans: u8,
}

impl SwitchScanner {
    pub const fn new(debounce_scans: u8) -> Self {
        Self {
            stable: ALL_OPEN,
            pending: [0; MAX_CHANNELS],
            debounce_scans,
        }
    }

    pub fn is_closed(&self, channel: ChannelNum) -> bool {
        (channel as usize) < MAX_CHANNELS && self.stable & bit(channel) == 0
    }

    /// Feeds one snapshot, returns the switches whose level settled on a new value.
    pub fn scan(&mut self, levels: PortLevels) -> SwitchEvents {
        let mut events = SwitchEvents::new();
        for channel in 0..MAX_CHANNELS as ChannelNum {
            let mask = bit(channel);
            let pending = &mut self.pending[channel as usize];
            if (levels ^ self.stable) & mask == 0 {
                *pending = 0;
                continue;
            }
            *pending = pending.saturating_add(1);
            if *pending < self.debounce_scans {
                continue;
            }
            *pending = 0;
            self.stable ^= mask;
            let closed = levels & mask == 0;
            log::debug!(
                "Switch {} {}",
                output_index(channel),
                if closed { "closed" } else { "opened" }
            );
            // At most one event per slot, cannot overflow
            events.push(SwitchEvent { channel, closed }).ok();
        }
        events
    }

    /// Reads the port and scans it. A failed read reports no edges.
    pub fn poll<I>(&mut self, inputs: &mut I) -> SwitchEvents
    where
        I: SwitchInputs,
    {
        match inputs.read_port() {
            Ok(levels) => self.scan(levels),
            Err(e) => {
                log::warn!(
                    "Switch port read failed: {:?}",
                    defmt_or_log::Debug2Format(&e)
                );
                SwitchEvents::new()
            }
        }
    }
}

impl Default for SwitchScanner {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_SCANS)
    }
}
