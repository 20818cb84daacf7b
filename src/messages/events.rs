use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::channels::{AlertType, ChannelNum, output_index};
use crate::error::PduError;

/// Longest serialized status event, used for the failover log line.
pub const STATUS_JSON_LEN: usize = 64;

/// Relay or alert notification for one output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusEvent {
    Relay {
        channel: ChannelNum,
        energized: bool,
    },
    Alert {
        channel: ChannelNum,
        alert: AlertType,
    },
}

impl StatusEvent {
    pub const fn relay(channel: ChannelNum, energized: bool) -> Self {
        StatusEvent::Relay { channel, energized }
    }

    pub const fn alert(channel: ChannelNum, alert: AlertType) -> Self {
        StatusEvent::Alert { channel, alert }
    }

    pub const fn channel(&self) -> ChannelNum {
        match self {
            StatusEvent::Relay { channel, .. } | StatusEvent::Alert { channel, .. } => *channel,
        }
    }

    /// 1-based output index as published
    pub const fn index(&self) -> u8 {
        output_index(self.channel())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            StatusEvent::Relay { .. } => "relay",
            StatusEvent::Alert { .. } => "alert",
        }
    }

    pub const fn event(&self) -> &'static str {
        match self {
            StatusEvent::Relay {
                energized: true, ..
            } => "on",
            StatusEvent::Relay {
                energized: false, ..
            } => "off",
            StatusEvent::Alert { alert, .. } => alert.as_str(),
        }
    }

    pub fn to_json(&self) -> Result<heapless::String<STATUS_JSON_LEN>, PduError> {
        serde_json_core::to_string(self).map_err(|_| PduError::Serialization)
    }
}

impl Serialize for StatusEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("StatusEvent", 3)?;
        state.serialize_field("index", &self.index())?;
        state.serialize_field("type", self.kind())?;
        state.serialize_field("event", self.event())?;
        state.end()
    }
}

/// One channel's reading inside a telemetry batch.
#[derive(serde::Serialize, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryEntry {
    pub index: u8,
    #[serde(rename = "mA")]
    pub milliamps: f32,
    #[serde(rename = "mV")]
    pub millivolts: f32,
    #[serde(rename = "mW")]
    pub milliwatts: f32,
}
