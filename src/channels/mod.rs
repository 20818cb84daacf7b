mod bank;
mod channel;

pub use self::bank::{ChannelBank, ChannelNum, MAX_CHANNELS, output_index};
pub use self::channel::{AlertType, Channel, ChannelState};
