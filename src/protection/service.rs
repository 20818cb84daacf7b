use defmt_or_log as log;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use embassy_time::{Duration, Instant};
use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};

use crate::channels::{AlertType, ChannelBank, ChannelNum, MAX_CHANNELS, output_index};
use crate::error::PduError;
use crate::input::SwitchEvent;
use crate::messages::{
    CommandAction, CommandBatch, ConfigUpdate, InboundMessage, OutputCommand, StatusEvent,
    StatusSink, publish_or_failover, validate_channel_limit, validate_telemetry_interval,
    validate_total_limit,
};
use crate::protection::classifier::{classify, total_contribution};
use crate::protection::settings::{ManualOverride, PduSettings};
use crate::relays::{RelayActuator, RelayDriver};
use crate::sensors::{RawSample, SampleSource};
use crate::telemetry::TelemetryPublisher;
use crate::ui::MeterPanel;
use crate::units::{PollTimer, TimeExt};

type PduInbox<const INBOX_SIZE: usize> =
    Channel<CriticalSectionRawMutex, InboundMessage, INBOX_SIZE>;

/// Shared storage for the runner/control pair.
pub struct PduState<const INBOX_SIZE: usize> {
    inbox: PduInbox<INBOX_SIZE>,
}

impl<const INBOX_SIZE: usize> PduState<INBOX_SIZE> {
    pub const fn new() -> Self {
        Self {
            inbox: Channel::new(),
        }
    }
}

impl<const INBOX_SIZE: usize> Default for PduState<INBOX_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the hardware seams and runs the sampling and protection cycle.
pub struct PduRunner<'a, Source, Relays, Sink, Display, const INBOX_SIZE: usize> {
    source: Source,
    relays: RelayActuator<Relays>,
    sink: Sink,
    display: Display,
    inbox: Receiver<'a, CriticalSectionRawMutex, InboundMessage, INBOX_SIZE>,
    settings: PduSettings,
    channels: ChannelBank,
    panel: MeterPanel,
    sample_timer: PollTimer,
    telemetry: TelemetryPublisher,
    total_ma: f32,
}

/// Handle for transport callbacks. Messages are applied on the runner's next poll.
#[derive(Clone)]
pub struct PduControl<'a, const INBOX_SIZE: usize> {
    inbox: Sender<'a, CriticalSectionRawMutex, InboundMessage, INBOX_SIZE>,
}

#[derive(Debug, Copy, Clone)]
pub struct PduService(());

impl PduService {
    /// Creates the runner and its control handle
    #[allow(clippy::new_ret_no_self)]
    pub fn new<'a, Source, Relays, Sink, Display, const INBOX_SIZE: usize>(
        source: Source,
        relays: Relays,
        sink: Sink,
        display: Display,
        state: &'a PduState<INBOX_SIZE>,
        settings: PduSettings,
    ) -> (
        PduRunner<'a, Source, Relays, Sink, Display, INBOX_SIZE>,
        PduControl<'a, INBOX_SIZE>,
    )
    where
        Relays: RelayDriver,
    {
        let start = Instant::from_ticks(0);
        if settings.sample_interval != settings.sampling_interval() {
            log::warn!(
                "Sample interval clamped to {} ms",
                settings.sampling_interval().as_millis()
            );
        }
        (
            PduRunner {
                source,
                relays: RelayActuator::new(relays),
                sink,
                display,
                inbox: state.inbox.receiver(),
                channels: ChannelBank::new(settings.default_channel_limit_ma),
                panel: MeterPanel::new(settings.default_channel_limit_ma, settings.total_limit_ma),
                sample_timer: PollTimer::new(settings.sampling_interval(), start),
                telemetry: TelemetryPublisher::new(settings.telemetry_interval, start),
                total_ma: 0.0,
                settings,
            },
            PduControl {
                inbox: state.inbox.sender(),
            },
        )
    }
}

impl<const INBOX_SIZE: usize> PduControl<'_, INBOX_SIZE> {
    pub fn post_config(&self, update: ConfigUpdate) -> Result<(), PduError> {
        self.post(InboundMessage::Config(update))
    }

    pub fn post_command(&self, batch: CommandBatch) -> Result<(), PduError> {
        self.post(InboundMessage::Command(batch))
    }

    /// Queues a debounced front-panel switch change.
    pub fn post_switch(&self, event: SwitchEvent) -> Result<(), PduError> {
        self.post(InboundMessage::Switch(event))
    }

    /// Parses a JSON configuration payload and queues it.
    pub fn post_config_json(&self, payload: &[u8]) -> Result<(), PduError> {
        let update = ConfigUpdate::from_json(payload).inspect_err(|e| {
            log::warn!("Rejected config payload: {}", e);
        })?;
        self.post_config(update)
    }

    /// Parses a JSON command payload and queues it.
    pub fn post_command_json(&self, payload: &[u8]) -> Result<(), PduError> {
        let batch = CommandBatch::from_json(payload).inspect_err(|e| {
            log::warn!("Rejected command payload: {}", e);
        })?;
        self.post_command(batch)
    }

    fn post(&self, message: InboundMessage) -> Result<(), PduError> {
        self.inbox.try_send(message).map_err(|_| {
            log::warn!("PDU inbox full, message dropped");
            PduError::InboxFull
        })
    }
}

impl<Source, Relays, Sink, Display, const INBOX_SIZE: usize>
    PduRunner<'_, Source, Relays, Sink, Display, INBOX_SIZE>
where
    Source: SampleSource,
    Relays: RelayDriver,
    Sink: StatusSink,
    Display: DrawTarget<Color = Rgb565>,
{
    /// Boot scan: probes every slot, programs the sensor alert limit, drives the
    /// relays of discovered outputs on and draws the panel.
    pub fn begin(&mut self, now: Instant) {
        log::info!("Scanning {} output slots", MAX_CHANNELS);
        for num in 0..MAX_CHANNELS as ChannelNum {
            if let Err(e) = self.source.probe(num) {
                log::debug!(
                    "No sensor on output {}: {:?}",
                    output_index(num),
                    defmt_or_log::Debug2Format(&e)
                );
                continue;
            }
            let Some(channel) = self.channels.get_mut(num) else {
                continue;
            };
            channel.mark_discovered();
            if let Err(e) = self.source.set_alert_limit(num, channel.current_limit_ma()) {
                log::warn!(
                    "Failed to set alert limit on output {}: {:?}",
                    output_index(num),
                    defmt_or_log::Debug2Format(&e)
                );
            }
            self.relays.sync(num, channel);
            log::info!("Sensor found on output {}", output_index(num));
        }
        log::info!("{} outputs discovered", self.channels.discovered_count());

        self.panel.begin(&mut self.display, &self.channels);
        self.sample_timer.reset(now);
        self.telemetry.restart(now);
    }

    /// One pass of the outer loop.
    ///
    /// Applies queued messages, runs a sampling cycle when due and publishes
    /// telemetry when due. Returns true when a sampling cycle ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        while let Ok(message) = self.inbox.try_receive() {
            match message {
                InboundMessage::Config(update) => self.apply_config(&update),
                InboundMessage::Command(batch) => self.handle_command(&batch),
                InboundMessage::Switch(event) => {
                    if let Err(e) = self.handle_switch(event) {
                        log::debug!(
                            "Switch {} ignored: {}",
                            output_index(event.channel),
                            e
                        );
                    }
                }
            }
        }

        let sampled = self.sample_timer.fire(now);
        if sampled {
            self.sample_cycle();
        }

        self.telemetry.poll(now, &self.channels, &mut self.sink);
        sampled
    }

    /// Reads every discovered output, then classifies and actuates them
    /// against the same-cycle total.
    pub fn sample_cycle(&mut self) {
        let mut readings: [Option<RawSample>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        let mut total_ma = 0.0;

        for num in 0..MAX_CHANNELS as ChannelNum {
            let Some(channel) = self.channels.get_mut(num) else {
                continue;
            };
            if !channel.is_discovered() {
                continue;
            }
            let sample = match self.source.read(num) {
                Ok(sample) => {
                    channel.record_sample(sample);
                    sample
                }
                Err(e) => {
                    log::warn!(
                        "Sensor read failed on output {}, reusing last sample: {:?}",
                        output_index(num),
                        defmt_or_log::Debug2Format(&e)
                    );
                    *channel.last_sample()
                }
            };
            total_ma += total_contribution(&sample);
            // Nothing to classify until the sensor has answered once
            if channel.has_sample() {
                readings[num as usize] = Some(sample);
            }
        }

        for num in 0..MAX_CHANNELS as ChannelNum {
            if !self.is_discovered(num) {
                continue;
            }
            if let Some(sample) = &readings[num as usize] {
                let alert = classify(sample, total_ma, &self.settings);
                self.raise_alert(num, alert);
            }
            self.redraw(num);
        }

        self.total_ma = total_ma;
        self.panel.show_total(&mut self.display, total_ma);
    }

    fn is_discovered(&self, num: ChannelNum) -> bool {
        self.channels
            .get(num)
            .is_some_and(|channel| channel.is_discovered())
    }

    /// Latches a new alert, switching the output off first if it is on.
    fn raise_alert(&mut self, num: ChannelNum, alert: AlertType) {
        let Some(channel) = self.channels.get_mut(num) else {
            return;
        };
        if !alert.is_alert() || alert == channel.last_alert() {
            return;
        }

        log::warn!("Output {} alert: {}", output_index(num), alert.as_str());
        if self.relays.set_relay(num, channel, false) {
            publish_or_failover(&mut self.sink, &StatusEvent::relay(num, false));
        }
        channel.latch_alert(alert);
        publish_or_failover(&mut self.sink, &StatusEvent::alert(num, alert));
    }

    fn redraw(&mut self, num: ChannelNum) {
        if let Some(channel) = self.channels.get(num) {
            self.panel.show_channel(&mut self.display, num, channel);
        }
    }

    pub fn apply_config(&mut self, update: &ConfigUpdate) {
        if let Some(seconds) = update.publish_pdu_telemetry_seconds {
            match validate_telemetry_interval(seconds) {
                Ok(seconds) => {
                    log::info!("Telemetry interval set to {} s", seconds);
                    self.telemetry.set_interval(seconds.s());
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        if let Some(limit) = update.over_current_limit_milli_amps {
            match validate_total_limit(limit) {
                Ok(limit) => {
                    log::info!("Total current limit set to {} mA", limit);
                    self.settings.total_limit_ma = limit;
                    self.panel.set_total_max(limit);
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        for output in update.outputs.iter() {
            let num = match self.channels.resolve_output_index(output.index) {
                Ok(num) => num,
                Err(e) => {
                    log::warn!("Config for output {:?} ignored: {}", output.index, e);
                    continue;
                }
            };
            if let Some(limit) = output.over_current_limit_milli_amps {
                match validate_channel_limit(limit) {
                    Ok(limit) => self.set_channel_limit(num, limit),
                    Err(e) => log::warn!("{}", e),
                }
            }
        }
    }

    /// Updates the model, the sensor's alert threshold and the bar scale.
    fn set_channel_limit(&mut self, num: ChannelNum, limit_ma: f32) {
        let Some(channel) = self.channels.get_mut(num) else {
            return;
        };
        channel.set_current_limit_ma(limit_ma);
        if let Err(e) = self.source.set_alert_limit(num, limit_ma) {
            log::warn!(
                "Failed to set alert limit on output {}: {:?}",
                output_index(num),
                defmt_or_log::Debug2Format(&e)
            );
        }
        self.panel.set_channel_max(num, limit_ma);
        log::info!(
            "Output {} current limit set to {} mA",
            output_index(num),
            limit_ma
        );
    }

    pub fn handle_command(&mut self, batch: &CommandBatch) {
        if batch.query_outputs {
            self.query_outputs();
        }
        for command in batch.outputs.iter() {
            if let Err(e) = self.execute(command) {
                log::warn!("Command for output {:?} rejected: {}", command.index, e);
            }
        }
    }

    /// Publishes the relay state of every discovered output.
    pub fn query_outputs(&mut self) {
        for (num, channel) in self.channels.discovered() {
            publish_or_failover(
                &mut self.sink,
                &StatusEvent::relay(num, channel.is_energized()),
            );
        }
    }

    /// Applies a single output command.
    pub fn execute(&mut self, command: &OutputCommand) -> Result<(), PduError> {
        let num = self.channels.resolve_output_index(command.index)?;
        match command.action()? {
            CommandAction::Query => {
                let energized = self
                    .channels
                    .get(num)
                    .ok_or(PduError::ChannelNotFound)?
                    .is_energized();
                publish_or_failover(&mut self.sink, &StatusEvent::relay(num, energized));
                Ok(())
            }
            CommandAction::On => self.switch_output(num, true),
            CommandAction::Off => self.switch_output(num, false),
        }
    }

    /// Applies a front-panel switch change, closed switches the output on.
    ///
    /// Switches on slots without a sensor are ignored.
    pub fn handle_switch(&mut self, event: SwitchEvent) -> Result<(), PduError> {
        if !self.is_discovered(event.channel) {
            return Err(PduError::ChannelNotFound);
        }
        self.switch_output(event.channel, event.closed)
    }

    /// Manual on/off shared by commands and switches.
    fn switch_output(&mut self, num: ChannelNum, energized: bool) -> Result<(), PduError> {
        let channel = self
            .channels
            .get_mut(num)
            .ok_or(PduError::ChannelNotFound)?;

        if energized
            && channel.last_alert().is_alert()
            && self.settings.manual_override == ManualOverride::RequireOffFirst
        {
            return Err(PduError::AlertLatched);
        }

        if channel.last_alert().is_alert() {
            log::info!(
                "Output {} alert {} cleared manually",
                output_index(num),
                channel.last_alert().as_str()
            );
        }
        channel.clear_alert();
        self.relays.set_relay(num, channel, energized);
        publish_or_failover(&mut self.sink, &StatusEvent::relay(num, energized));
        self.redraw(num);
        Ok(())
    }

    pub fn channels(&self) -> &ChannelBank {
        &self.channels
    }

    pub fn panel(&self) -> &MeterPanel {
        &self.panel
    }

    pub fn settings(&self) -> &PduSettings {
        &self.settings
    }

    pub fn telemetry_interval(&self) -> Duration {
        self.telemetry.interval()
    }

    /// Total current of the last sampling cycle.
    pub fn total_ma(&self) -> f32 {
        self.total_ma
    }

    pub fn source_mut(&mut self) -> &mut Source {
        &mut self.source
    }

    pub fn relays(&self) -> &Relays {
        self.relays.driver()
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    pub fn display(&self) -> &Display {
        &self.display
    }
}
