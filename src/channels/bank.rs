use crate::channels::channel::Channel;
use crate::error::PduError;

/// Zero-based slot number of an output.
pub type ChannelNum = u8;

/// Number of output slots on the board (one sensor address each).
pub const MAX_CHANNELS: usize = 16;

/// 1-based index used on the wire for a slot.
pub const fn output_index(channel: ChannelNum) -> u8 {
    channel.saturating_add(1)
}

/// Fixed-size, owned collection of every output slot.
#[derive(Debug, Clone)]
pub struct ChannelBank {
    channels: [Channel; MAX_CHANNELS],
}

impl ChannelBank {
    pub fn new(default_limit_ma: f32) -> Self {
        Self {
            channels: core::array::from_fn(|_| Channel::new(default_limit_ma)),
        }
    }

    pub fn get(&self, channel: ChannelNum) -> Option<&Channel> {
        self.channels.get(channel as usize)
    }

    pub(crate) fn get_mut(&mut self, channel: ChannelNum) -> Option<&mut Channel> {
        self.channels.get_mut(channel as usize)
    }

    /// All slots, discovered or not, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelNum, &Channel)> {
        self.channels
            .iter()
            .enumerate()
            .map(|(i, channel)| (i as ChannelNum, channel))
    }

    pub fn discovered(&self) -> impl Iterator<Item = (ChannelNum, &Channel)> {
        self.iter().filter(|(_, channel)| channel.is_discovered())
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered().count()
    }

    /// Validates a 1-based output index received from outside and returns the slot.
    pub fn resolve_output_index(&self, index: Option<i32>) -> Result<ChannelNum, PduError> {
        let index = index.ok_or(PduError::InvalidIndex)?;
        if index < 1 || index > MAX_CHANNELS as i32 {
            return Err(PduError::InvalidIndex);
        }
        let channel = (index - 1) as ChannelNum;
        match self.get(channel) {
            Some(slot) if slot.is_discovered() => Ok(channel),
            _ => Err(PduError::ChannelNotFound),
        }
    }
}
