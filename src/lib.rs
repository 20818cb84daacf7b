//! Protection and feedback core of a multi-channel power distribution unit.
//!
//! The crate samples per-channel current, voltage and power, latches alerts,
//! switches the normally-closed output relays off when a channel faults and
//! mirrors every channel as a segmented bar row on a small colour display.
//! Hardware and transport are reached through the [`SampleSource`],
//! [`RelayDriver`], [`SwitchInputs`], [`StatusSink`] and
//! `embedded_graphics::DrawTarget` seams.
#![no_std]

#[cfg(test)]
extern crate std;

pub mod channels;
pub mod error;
pub mod input;
pub mod messages;
pub mod protection;
pub mod relays;
pub mod sensors;
pub mod telemetry;
pub mod ui;
pub mod units;

#[cfg(test)]
mod test_support;

pub use crate::channels::{AlertType, Channel, ChannelBank, ChannelNum, MAX_CHANNELS};
pub use crate::error::PduError;
pub use crate::input::{SwitchEvent, SwitchInputs, SwitchScanner};
pub use crate::messages::{
    CommandAction, CommandBatch, ConfigUpdate, OutputCommand, StatusEvent, StatusSink,
    TelemetryEntry,
};
pub use crate::protection::{
    ManualOverride, PduControl, PduRunner, PduService, PduSettings, PduState,
};
pub use crate::relays::{PinRelays, RelayDriver};
pub use crate::sensors::{RawSample, SampleSource};
