#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PduError {
    /// Output index missing or outside `1..=MAX_CHANNELS`
    InvalidIndex,
    /// Output index refers to a slot with no sensor fitted
    ChannelNotFound,
    InvalidCommand,
    /// A configured value lies outside its accepted range
    OutOfRange(&'static str),
    /// "on" refused while the channel is still alerted
    AlertLatched,
    Deserialization,
    Serialization,
    InboxFull,
}

impl PduError {
    pub fn error_description(&self) -> Option<&'static str> {
        match self {
            PduError::InvalidIndex => Some("Invalid output index"),
            PduError::ChannelNotFound => Some("Invalid index, no current sensor found"),
            PduError::InvalidCommand => Some("Invalid command"),
            PduError::OutOfRange(what) => Some(what),
            PduError::AlertLatched => Some("Output is alerted, switch it off to acknowledge"),
            PduError::Deserialization => Some("Malformed JSON payload"),
            PduError::Serialization => Some("Payload does not fit the output buffer"),
            PduError::InboxFull => Some("Inbound message queue is full"),
        }
    }
}

impl core::fmt::Display for PduError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.error_description().unwrap_or("PDU error"))
    }
}
