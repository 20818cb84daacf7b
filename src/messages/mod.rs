//! Inbound configuration/command messages and outbound status/telemetry events.

mod events;
mod inbound;
mod sink;

pub use self::events::{STATUS_JSON_LEN, StatusEvent, TelemetryEntry};
pub use self::inbound::{
    CHANNEL_LIMIT_RANGE_MA, CommandAction, CommandBatch, ConfigUpdate, InboundMessage,
    OutputCommand, OutputLimit, TELEMETRY_INTERVAL_RANGE_S, TOTAL_LIMIT_RANGE_MA,
    validate_channel_limit, validate_telemetry_interval, validate_total_limit,
};
pub use self::sink::{StatusSink, publish_or_failover};
