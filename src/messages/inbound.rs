use heapless::{String, Vec};
use serde::Deserialize;

use crate::channels::MAX_CHANNELS;
use crate::error::PduError;
use crate::input::SwitchEvent;

pub const CHANNEL_LIMIT_RANGE_MA: core::ops::RangeInclusive<f32> = 1.0..=5000.0;
pub const TOTAL_LIMIT_RANGE_MA: core::ops::RangeInclusive<f32> = 1.0..=15000.0;
pub const TELEMETRY_INTERVAL_RANGE_S: core::ops::RangeInclusive<u32> = 0..=86_400;

/// Per-output entry of a configuration message.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OutputLimit {
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default, alias = "overCurrentLimitMilliamps")]
    pub over_current_limit_milli_amps: Option<f32>,
}

/// Configuration message, every field optional.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub publish_pdu_telemetry_seconds: Option<u32>,
    /// Limit for the sum of all output currents
    #[serde(default, alias = "overCurrentLimitMilliamps")]
    pub over_current_limit_milli_amps: Option<f32>,
    #[serde(default)]
    pub outputs: Vec<OutputLimit, MAX_CHANNELS>,
}

impl ConfigUpdate {
    pub fn from_json(payload: &[u8]) -> Result<Self, PduError> {
        from_json(payload)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandAction {
    On,
    Off,
    /// Report the relay state without switching
    Query,
}

impl CommandAction {
    /// A missing or `null` command is a query.
    pub fn parse(command: Option<&str>) -> Result<Self, PduError> {
        match command {
            None | Some("query") => Ok(CommandAction::Query),
            Some("on") => Ok(CommandAction::On),
            Some("off") => Ok(CommandAction::Off),
            Some(_) => Err(PduError::InvalidCommand),
        }
    }
}

/// Per-output entry of a command message.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OutputCommand {
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub command: Option<String<16>>,
}

impl OutputCommand {
    pub fn action(&self) -> Result<CommandAction, PduError> {
        CommandAction::parse(self.command.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandBatch {
    /// Publish the relay state of every discovered output
    #[serde(default)]
    pub query_outputs: bool,
    #[serde(default)]
    pub outputs: Vec<OutputCommand, MAX_CHANNELS>,
}

impl CommandBatch {
    pub fn from_json(payload: &[u8]) -> Result<Self, PduError> {
        from_json(payload)
    }
}

/// Message waiting in the inbox for the next poll.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Config(ConfigUpdate),
    Command(CommandBatch),
    Switch(SwitchEvent),
}

fn from_json<'de, T>(payload: &'de [u8]) -> Result<T, PduError>
where
    T: Deserialize<'de>,
{
    serde_json_core::from_slice(payload)
        .map(|(value, _)| value)
        .map_err(|_| PduError::Deserialization)
}

pub fn validate_channel_limit(limit_ma: f32) -> Result<f32, PduError> {
    if CHANNEL_LIMIT_RANGE_MA.contains(&limit_ma) {
        Ok(limit_ma)
    } else {
        Err(PduError::OutOfRange(
            "Output current limit must be within 1..=5000 mA",
        ))
    }
}

pub fn validate_total_limit(limit_ma: f32) -> Result<f32, PduError> {
    if TOTAL_LIMIT_RANGE_MA.contains(&limit_ma) {
        Ok(limit_ma)
    } else {
        Err(PduError::OutOfRange(
            "Total current limit must be within 1..=15000 mA",
        ))
    }
}

pub fn validate_telemetry_interval(seconds: u32) -> Result<u32, PduError> {
    if TELEMETRY_INTERVAL_RANGE_S.contains(&seconds) {
        Ok(seconds)
    } else {
        Err(PduError::OutOfRange(
            "Telemetry interval must be within 0..=86400 s",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_update() {
        let json = br#"{
            "publishPduTelemetrySeconds": 30,
            "overCurrentLimitMilliAmps": 9000,
            "outputs": [
                { "index": 1, "overCurrentLimitMilliAmps": 1500.5 },
                { "index": 4, "overCurrentLimitMilliamps": 800 }
            ]
        }"#;
        let config = ConfigUpdate::from_json(json).unwrap();
        assert_eq!(config.publish_pdu_telemetry_seconds, Some(30));
        assert_eq!(config.over_current_limit_milli_amps, Some(9000.0));
        assert_eq!(config.outputs.len(), 2);
        assert_eq!(config.outputs[0].index, Some(1));
        assert_eq!(config.outputs[0].over_current_limit_milli_amps, Some(1500.5));
        assert_eq!(config.outputs[1].over_current_limit_milli_amps, Some(800.0));
    }

    #[test]
    fn test_empty_config_is_valid() {
        assert_eq!(ConfigUpdate::from_json(b"{}").unwrap(), ConfigUpdate::default());
    }

    #[test]
    fn test_parse_command_batch() {
        let json = br#"{"outputs":[
            {"index":2,"command":"off"},
            {"index":3,"command":null},
            {"index":5},
            {"command":"on"},
            {"index":6,"command":"reboot"}
        ]}"#;
        let batch = CommandBatch::from_json(json).unwrap();
        assert!(!batch.query_outputs);

        let actions: std::vec::Vec<_> = batch.outputs.iter().map(|c| c.action()).collect();
        assert_eq!(
            actions,
            [
                Ok(CommandAction::Off),
                Ok(CommandAction::Query),
                Ok(CommandAction::Query),
                Ok(CommandAction::On),
                Err(PduError::InvalidCommand),
            ]
        );
        assert_eq!(batch.outputs[3].index, None);
    }

    #[test]
    fn test_query_outputs_flag() {
        let batch = CommandBatch::from_json(br#"{"queryOutputs":true}"#).unwrap();
        assert!(batch.query_outputs);
        assert!(batch.outputs.is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        assert_eq!(
            CommandBatch::from_json(b"{\"outputs\":"),
            Err(PduError::Deserialization)
        );
    }

    #[test]
    fn test_limit_ranges() {
        assert_eq!(validate_channel_limit(5000.0), Ok(5000.0));
        assert!(validate_channel_limit(0.0).is_err());
        assert!(validate_channel_limit(5000.1).is_err());
        assert!(validate_channel_limit(f32::NAN).is_err());
        assert_eq!(validate_total_limit(15000.0), Ok(15000.0));
        assert!(validate_total_limit(15001.0).is_err());
        assert_eq!(validate_telemetry_interval(0), Ok(0));
        assert!(validate_telemetry_interval(86_401).is_err());
    }
}
