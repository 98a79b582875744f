//! Double-buffered acquisition.
//!
//! The converter always owns exactly one buffer it is writing into, while
//! the other one is queued behind it, being drained, or idle:
//!
//! ```text
//!            submit (nothing active)
//!   Idle ─────────────────────────────▶ Active ──complete──▶ Draining
//!     │                                   ▲                     │
//!     │ submit (other active)             │ promote on          │ submit
//!     └────────────▶ Queued ──────────────┘ other's complete    ▼
//!                                                        Queued / Active
//! ```
//!
//! `BufferPair` is only the bookkeeping; the `Converter` implementation
//! moves the hardware in step with it.

use crate::error::Error;

/// One burst worth of raw samples.
pub type SampleBuffer<const N: usize> = [i16; N];

/// Which half of the pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub const fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Owned by software, not handed to the converter.
    Idle,
    /// Handed over; the converter switches to it when the active one ends.
    Queued,
    /// The converter is writing into it.
    Active,
    /// Filled; software is reading it.
    Draining,
}

/// What the converter has to do with a freshly submitted buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Submission {
    /// Nothing was in flight: start converting into it now.
    Started,
    /// Latch it behind the active buffer.
    Queued,
}

/// Outcome of an END event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Completion {
    /// The buffer that just filled up.
    pub drained: Slot,
    /// The queued buffer promoted to active, if there was one.
    pub next: Option<Slot>,
}

/// Two sample buffers and their ownership states.
pub struct BufferPair<const N: usize> {
    buffers: [SampleBuffer<N>; 2],
    states: [SlotState; 2],
    starved: u32,
}

impl<const N: usize> BufferPair<N> {
    pub const fn new() -> Self {
        Self {
            buffers: [[0; N]; 2],
            states: [SlotState::Idle; 2],
            starved: 0,
        }
    }

    pub fn state(&self, slot: Slot) -> SlotState {
        self.states[slot.index()]
    }

    /// The buffer the hardware is currently allowed to write.
    pub fn active(&self) -> Option<Slot> {
        [Slot::A, Slot::B]
            .into_iter()
            .find(|&s| self.state(s) == SlotState::Active)
    }

    pub fn active_count(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == SlotState::Active)
            .count()
    }

    /// Hand `slot` to the converter.
    pub fn submit(&mut self, slot: Slot) -> Result<Submission, Error> {
        match self.state(slot) {
            SlotState::Active | SlotState::Queued => return Err(Error::BufferBusy),
            SlotState::Idle | SlotState::Draining => {}
        }

        if self.active().is_none() {
            self.states[slot.index()] = SlotState::Active;
            Ok(Submission::Started)
        } else {
            self.states[slot.index()] = SlotState::Queued;
            Ok(Submission::Queued)
        }
    }

    /// The active buffer is full: move it to draining and promote the
    /// queued one.
    ///
    /// With nothing queued the converter idles until the next submit and
    /// the bursts in between are lost; that is only counted.
    pub fn complete(&mut self) -> Result<Completion, Error> {
        let drained = self.active().ok_or(Error::NoActiveBuffer)?;
        self.states[drained.index()] = SlotState::Draining;

        let other = drained.other();
        let next = if self.state(other) == SlotState::Queued {
            self.states[other.index()] = SlotState::Active;
            Some(other)
        } else {
            self.starved = self.starved.wrapping_add(1);
            None
        };

        Ok(Completion { drained, next })
    }

    pub fn samples(&self, slot: Slot) -> &SampleBuffer<N> {
        &self.buffers[slot.index()]
    }

    pub fn samples_mut(&mut self, slot: Slot) -> &mut SampleBuffer<N> {
        &mut self.buffers[slot.index()]
    }

    /// Completions that found no buffer queued.
    pub fn starved(&self) -> u32 {
        self.starved
    }
}

impl<const N: usize> Default for BufferPair<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Analog input pin the sensor is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogInput {
    Ain0,
    Ain1,
    Ain2,
    Ain3,
    Ain4,
    Ain5,
    Ain6,
    Ain7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    Gain1_6,
    Gain1_5,
    Gain1_4,
    Gain1_3,
    Gain1_2,
    Gain1,
    Gain2,
    Gain4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reference {
    /// Internal 0.6 V.
    Internal,
    /// VDD / 4.
    Vdd1_4,
}

/// Converter channels that can be scanned on one trigger.
pub const MAX_SCAN_CHANNELS: u8 = 8;

/// Electrical setup of the single-ended sensor channel.
///
/// One trigger converts `samples_per_trigger` times, all from `input`, so a
/// buffer of that length fills on every trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConverterConfig {
    pub input: AnalogInput,
    pub gain: Gain,
    pub reference: Reference,
    pub resolution_bits: u8,
    pub samples_per_trigger: u8,
}

impl ConverterConfig {
    pub fn validate(&self) -> Result<(), Error> {
        match self.resolution_bits {
            8 | 10 | 12 | 14 => {}
            _ => return Err(Error::ConverterConfig),
        }
        if self.samples_per_trigger == 0 || self.samples_per_trigger > MAX_SCAN_CHANNELS {
            return Err(Error::ConverterConfig);
        }
        Ok(())
    }
}

/// The analog-to-digital converter behind the pair.
pub trait Converter {
    /// Apply the channel setup. Sampling is not running yet.
    fn configure(&mut self, config: &ConverterConfig) -> Result<(), Error>;

    /// Point the converter at `buffer`.
    ///
    /// With `start` set nothing is in flight and conversion into `buffer`
    /// begins now. Otherwise `buffer` is latched and used once the active
    /// buffer ends. The converter keeps writing through the buffer's address
    /// after this returns, so the owning `BufferPair` must not move.
    fn submit(&mut self, buffer: &mut [i16], start: bool) -> Result<(), Error>;

    /// Switch to the buffer latched by the last queued `submit`.
    fn start_next(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_submit_starts_second_queues() {
        let mut pair = BufferPair::<5>::new();
        assert_eq!(pair.active_count(), 0);

        assert_eq!(pair.submit(Slot::A), Ok(Submission::Started));
        assert_eq!(pair.submit(Slot::B), Ok(Submission::Queued));
        assert_eq!(pair.active(), Some(Slot::A));
        assert_eq!(pair.state(Slot::B), SlotState::Queued);
        assert_eq!(pair.active_count(), 1);
    }

    #[test]
    fn completion_promotes_queued_buffer() {
        let mut pair = BufferPair::<5>::new();
        pair.submit(Slot::A).unwrap();
        pair.submit(Slot::B).unwrap();

        let done = pair.complete().unwrap();
        assert_eq!(
            done,
            Completion {
                drained: Slot::A,
                next: Some(Slot::B)
            }
        );
        assert_eq!(pair.state(Slot::A), SlotState::Draining);
        assert_eq!(pair.active(), Some(Slot::B));
        assert_eq!(pair.active_count(), 1);
    }

    #[test]
    fn steady_state_alternates_with_exactly_one_active() {
        let mut pair = BufferPair::<5>::new();
        pair.submit(Slot::A).unwrap();
        pair.submit(Slot::B).unwrap();

        let mut expected = Slot::A;
        for _ in 0..10 {
            let done = pair.complete().unwrap();
            assert_eq!(done.drained, expected);
            assert_eq!(pair.active_count(), 1);

            assert_eq!(pair.submit(done.drained), Ok(Submission::Queued));
            assert_eq!(pair.active_count(), 1);
            expected = expected.other();
        }
        assert_eq!(pair.starved(), 0);
    }

    #[test]
    fn resubmitting_an_owned_buffer_is_rejected() {
        let mut pair = BufferPair::<5>::new();
        pair.submit(Slot::A).unwrap();
        assert_eq!(pair.submit(Slot::A), Err(Error::BufferBusy));

        pair.submit(Slot::B).unwrap();
        assert_eq!(pair.submit(Slot::B), Err(Error::BufferBusy));
    }

    #[test]
    fn completion_without_active_buffer_fails() {
        let mut pair = BufferPair::<5>::new();
        assert_eq!(pair.complete(), Err(Error::NoActiveBuffer));
    }

    #[test]
    fn starved_completion_restarts_on_next_submit() {
        let mut pair = BufferPair::<5>::new();
        pair.submit(Slot::A).unwrap();

        let done = pair.complete().unwrap();
        assert_eq!(done.next, None);
        assert_eq!(pair.starved(), 1);
        assert_eq!(pair.active_count(), 0);

        assert_eq!(pair.submit(Slot::A), Ok(Submission::Started));
        assert_eq!(pair.active(), Some(Slot::A));
    }

    #[test]
    fn reference_converter_setup_is_valid() {
        let cfg = crate::config::converter_config();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.samples_per_trigger as usize, crate::config::ADC_SAMPLES);
    }

    #[test]
    fn unsupported_resolution_is_rejected() {
        let mut cfg = crate::config::converter_config();
        cfg.resolution_bits = 16;
        assert_eq!(cfg.validate(), Err(Error::ConverterConfig));
    }

    #[test]
    fn scan_length_must_fit_the_channels() {
        let mut cfg = crate::config::converter_config();
        cfg.samples_per_trigger = 0;
        assert_eq!(cfg.validate(), Err(Error::ConverterConfig));
        cfg.samples_per_trigger = MAX_SCAN_CHANNELS + 1;
        assert_eq!(cfg.validate(), Err(Error::ConverterConfig));
        cfg.samples_per_trigger = MAX_SCAN_CHANNELS;
        assert_eq!(cfg.validate(), Ok(()));
    }
}
