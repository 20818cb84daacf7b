use defmt_or_log as log;

use crate::messages::events::{StatusEvent, TelemetryEntry};

/// Outbound transport for status events and telemetry batches.
///
/// Publishing is best effort: the core never retries and never gates
/// actuation on the result.
pub trait StatusSink {
    type Error: core::fmt::Debug;

    fn publish_status(&mut self, event: &StatusEvent) -> Result<(), Self::Error>;

    fn publish_telemetry(&mut self, batch: &[TelemetryEntry]) -> Result<(), Self::Error>;
}

/// Publishes a status event, logging it as a failover line when the sink refuses it.
pub fn publish_or_failover<K>(sink: &mut K, event: &StatusEvent)
where
    K: StatusSink,
{
    log::info!(
        "Output {} {}: {}",
        event.index(),
        event.kind(),
        event.event()
    );
    if let Err(e) = sink.publish_status(event) {
        log::warn!("Status publish failed: {:?}", defmt_or_log::Debug2Format(&e));
        match event.to_json() {
            Ok(json) => log::info!("[failover] {}", json.as_str()),
            Err(_) => log::error!("[failover] event does not serialize"),
        }
    }
}
