//! SAADC driven directly through its registers.
//!
//! The Embassy `Saadc` driver samples on request from a task; here SAMPLE is
//! triggered by PPI and buffers are swapped from the END interrupt, so the
//! peripheral is programmed by hand. The sensor pin is scanned on several
//! channels so each trigger fills one buffer. RESULT.PTR is double-buffered in
//! hardware: it is latched on START, after which the next buffer's address
//! can already be written.

use core::cell::RefCell;

use embassy_nrf::interrupt::typelevel::{self, Binding, Handler, Interrupt};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::pac;
use embassy_nrf::pac::saadc::vals;
use embassy_nrf::peripherals::SAADC;
use embassy_nrf::{Peripheral, PeripheralRef};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use light_beacon::config::ADC_SAMPLES;
use light_beacon::pipeline::{Fault, FaultSite};
use light_beacon::sampling::acquisition::{
    AnalogInput, Converter, ConverterConfig, Gain, Reference, MAX_SCAN_CHANNELS,
};
use light_beacon::sampling::aggregator::{SamplePath, SampleStats};
use light_beacon::{Error, ReadingSignal};

pub type Sampler = SamplePath<SaadcConverter, ADC_SAMPLES>;

struct Attached {
    path: &'static mut Sampler,
    readings: &'static ReadingSignal,
    stats: &'static SampleStats,
}

static ATTACHED: Mutex<CriticalSectionRawMutex, RefCell<Option<Attached>>> =
    Mutex::new(RefCell::new(None));

/// Hand the armed sample path to the END interrupt and unmask it.
///
/// END events raised since `arm` stay pending and are served right away.
pub fn attach(
    path: &'static mut Sampler,
    readings: &'static ReadingSignal,
    stats: &'static SampleStats,
) {
    ATTACHED.lock(|cell| {
        cell.replace(Some(Attached {
            path,
            readings,
            stats,
        }));
    });
    typelevel::SAADC::set_priority(Priority::P3);
    unsafe { typelevel::SAADC::enable() };
}

/// END interrupt: one filled buffer per call.
pub struct DoneHandler;

impl Handler<typelevel::SAADC> for DoneHandler {
    unsafe fn on_interrupt() {
        let r = pac::SAADC;
        if r.events_end().read() == 0 {
            return;
        }
        r.events_end().write_value(0);

        ATTACHED.lock(|cell| {
            if let Some(attached) = cell.borrow_mut().as_mut() {
                if let Err(e) = attached.path.on_buffer_done(attached.readings) {
                    crate::fatal(Fault::new(FaultSite::BufferDone, e));
                }
                attached.path.report(attached.stats);
            }
        });
    }
}

pub struct SaadcConverter {
    _saadc: PeripheralRef<'static, SAADC>,
}

impl SaadcConverter {
    pub fn new(
        saadc: impl Peripheral<P = SAADC> + 'static,
        _irq: impl Binding<typelevel::SAADC, DoneHandler> + 'static,
    ) -> Self {
        Self {
            _saadc: saadc.into_ref(),
        }
    }
}

impl Converter for SaadcConverter {
    fn configure(&mut self, config: &ConverterConfig) -> Result<(), Error> {
        let resolution = match config.resolution_bits {
            8 => vals::Val::_8BIT,
            10 => vals::Val::_10BIT,
            12 => vals::Val::_12BIT,
            14 => vals::Val::_14BIT,
            _ => return Err(Error::ConverterConfig),
        };

        let r = pac::SAADC;
        r.enable().write(|w| w.set_enable(true));
        r.resolution().write(|w| w.set_val(resolution));
        // Scan mode: every enabled channel samples the same pin, so one
        // SAMPLE task converts a whole buffer and raises one END.
        for n in 0..MAX_SCAN_CHANNELS as usize {
            let ch = r.ch(n);
            if n < config.samples_per_trigger as usize {
                ch.config().write(|w| {
                    w.set_refsel(refsel(config.reference));
                    w.set_gain(gain(config.gain));
                    w.set_tacq(vals::Tacq::_10US);
                    w.set_mode(vals::ConfigMode::SE);
                });
                ch.pselp().write(|w| w.set_pselp(psel(config.input)));
            } else {
                ch.pselp().write(|w| w.set_pselp(vals::Psel::NC));
            }
            ch.pseln().write(|w| w.set_pseln(vals::Psel::NC));
        }

        r.events_started().write_value(0);
        r.events_end().write_value(0);
        r.intenset().write(|w| w.set_end(true));
        Ok(())
    }

    fn submit(&mut self, buffer: &mut [i16], start: bool) -> Result<(), Error> {
        let r = pac::SAADC;
        r.result().ptr().write_value(buffer.as_mut_ptr() as u32);
        r.result().maxcnt().write(|w| w.set_maxcnt(buffer.len() as _));
        if start {
            self.start_next();
        }
        Ok(())
    }

    fn start_next(&mut self) {
        let r = pac::SAADC;
        r.tasks_start().write_value(1);
        // STARTED follows START within a few cycles; RESULT.PTR is free after it.
        while r.events_started().read() == 0 {}
        r.events_started().write_value(0);
    }
}

fn psel(input: AnalogInput) -> vals::Psel {
    match input {
        AnalogInput::Ain0 => vals::Psel::ANALOG_INPUT0,
        AnalogInput::Ain1 => vals::Psel::ANALOG_INPUT1,
        AnalogInput::Ain2 => vals::Psel::ANALOG_INPUT2,
        AnalogInput::Ain3 => vals::Psel::ANALOG_INPUT3,
        AnalogInput::Ain4 => vals::Psel::ANALOG_INPUT4,
        AnalogInput::Ain5 => vals::Psel::ANALOG_INPUT5,
        AnalogInput::Ain6 => vals::Psel::ANALOG_INPUT6,
        AnalogInput::Ain7 => vals::Psel::ANALOG_INPUT7,
    }
}

fn gain(gain: Gain) -> vals::Gain {
    match gain {
        Gain::Gain1_6 => vals::Gain::GAIN1_6,
        Gain::Gain1_5 => vals::Gain::GAIN1_5,
        Gain::Gain1_4 => vals::Gain::GAIN1_4,
        Gain::Gain1_3 => vals::Gain::GAIN1_3,
        Gain::Gain1_2 => vals::Gain::GAIN1_2,
        Gain::Gain1 => vals::Gain::GAIN1,
        Gain::Gain2 => vals::Gain::GAIN2,
        Gain::Gain4 => vals::Gain::GAIN4,
    }
}

fn refsel(reference: Reference) -> vals::Refsel {
    match reference {
        Reference::Internal => vals::Refsel::INTERNAL,
        Reference::Vdd1_4 => vals::Refsel::VDD1_4,
    }
}
