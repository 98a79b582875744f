//! TIMER3 as the sampling trigger and a PPI channel routing its compare
//! event to the SAADC SAMPLE task.

use embassy_nrf::pac;
use embassy_nrf::peripherals::{PPI_CH0, TIMER3};
use embassy_nrf::ppi::{Event, Ppi, Task};
use embassy_nrf::timer::{Frequency, Timer};
use light_beacon::sampling::{EventRouter, SampleClock};
use light_beacon::Error;

/// Free-running TIMER3. CC[0] holds the period; COMPARE[0] clears the
/// counter through the timer's own short.
pub struct TimerClock {
    timer: Timer<'static, TIMER3>,
}

impl TimerClock {
    pub fn new(timer: TIMER3, frequency_hz: u32) -> Result<Self, Error> {
        let frequency = match frequency_hz {
            16_000_000 => Frequency::F16MHz,
            1_000_000 => Frequency::F1MHz,
            125_000 => Frequency::F125kHz,
            62_500 => Frequency::F62500Hz,
            31_250 => Frequency::F31250Hz,
            _ => return Err(Error::TriggerUnavailable),
        };
        let timer = Timer::new(timer);
        timer.set_frequency(frequency);
        Ok(Self { timer })
    }

    pub fn compare_event(&self) -> Event<'static> {
        self.timer.cc(0).event_compare()
    }
}

impl SampleClock for TimerClock {
    fn configure(&mut self, ticks: u32) -> Result<(), Error> {
        self.timer.stop();
        self.timer.clear();
        let cc = self.timer.cc(0);
        cc.write(ticks);
        cc.short_compare_clear();
        Ok(())
    }

    fn start(&mut self) {
        self.timer.start();
    }
}

/// PPI channel from TIMER3 COMPARE[0] to SAADC SAMPLE.
///
/// The channel pool is a single statically assigned channel; once it is
/// taken a second `connect` reports exhaustion.
pub struct PpiRouter {
    spare: Option<PPI_CH0>,
    compare: Event<'static>,
    link: Option<Ppi<'static, PPI_CH0, 1, 1>>,
}

impl PpiRouter {
    pub fn new(channel: PPI_CH0, compare: Event<'static>) -> Self {
        Self {
            spare: Some(channel),
            compare,
            link: None,
        }
    }
}

impl EventRouter for PpiRouter {
    fn connect(&mut self) -> Result<(), Error> {
        let channel = self.spare.take().ok_or(Error::RouterExhausted)?;
        let sample = Task::from_reg(pac::SAADC.tasks_sample());
        self.link = Some(Ppi::new_one_to_one(channel, self.compare, sample));
        Ok(())
    }

    fn enable(&mut self) -> Result<(), Error> {
        self.link.as_mut().ok_or(Error::RouterBind)?.enable();
        Ok(())
    }
}
