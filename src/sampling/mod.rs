//! Autonomous sampling: the trigger clock, the event route from its compare
//! event to the converter, double-buffered acquisition and aggregation.
//!
//! Nothing in this path runs on the CPU per tick:
//!
//! 1. **Trigger** - a free-running TIMER raises COMPARE[0] every period and
//!    clears itself through a hardware short.
//! 2. **Router** - one PPI channel wires COMPARE[0] to the SAADC SAMPLE task.
//! 3. **Acquisition** - the SAADC writes into one of two buffers and raises
//!    END when it is full.
//! 4. **Aggregation** - the END interrupt derives the reading, re-arms the
//!    drained buffer and publishes the value.

pub mod acquisition;
pub mod aggregator;

use crate::error::Error;

/// Period of the hardware sampling trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerConfig {
    /// Time between two compare events (ms).
    pub period_ms: u32,
    /// Timer clock after the prescaler (Hz).
    pub frequency_hz: u32,
}

impl TriggerConfig {
    /// Compare value producing `period_ms` at `frequency_hz`.
    ///
    /// Fails when the period rounds to zero ticks or does not fit the
    /// 32-bit timer.
    pub fn ticks(&self) -> Result<u32, Error> {
        let ticks = self.period_ms as u64 * self.frequency_hz as u64 / 1000;
        match u32::try_from(ticks) {
            Ok(0) | Err(_) => Err(Error::TriggerPeriod),
            Ok(t) => Ok(t),
        }
    }
}

/// Free-running timer producing the periodic compare event.
pub trait SampleClock {
    /// Program the compare value and the compare-clears-counter short.
    /// The timer must not run yet.
    fn configure(&mut self, ticks: u32) -> Result<(), Error>;

    /// Let the timer run. From here on ticks happen without the CPU.
    fn start(&mut self);
}

/// Hardware channel routing the trigger event to the converter.
pub trait EventRouter {
    /// Allocate a channel and bind the compare event to the sample task.
    fn connect(&mut self) -> Result<(), Error>;

    /// Enable the bound channel.
    fn enable(&mut self) -> Result<(), Error>;
}
