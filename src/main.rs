//! light-beacon firmware for the nRF52840-DK with SoftDevice S140.
//!
//! TIMER3 fires every 400 ms and, through PPI, triggers one SAADC scan of
//! five conversions on AIN0. Each filled buffer yields one light reading, which
//! the broadcast task writes into a non-connectable advertisement under
//! company 0x0059. The CPU sleeps in between.

#![no_std]
#![no_main]

mod hw;

use cortex_m::peripheral::SCB;
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::{bind_interrupts, interrupt};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

use light_beacon::ble::broadcast::BroadcastController;
use light_beacon::config;
use light_beacon::pipeline::{self, Fault, FaultSite, Setup};
use light_beacon::sampling::aggregator::{SamplePath, SampleStats};
use light_beacon::ReadingSignal;

use crate::hw::radio::SdRadio;
use crate::hw::saadc::{SaadcConverter, Sampler};
use crate::hw::trigger::{PpiRouter, TimerClock};

use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SAADC => hw::saadc::DoneHandler;
});

/// Latest reading, published by the SAADC interrupt.
static READINGS: ReadingSignal = ReadingSignal::new();
static STATS: SampleStats = SampleStats::new();

static TRIGGER: StaticCell<TimerClock> = StaticCell::new();
static ROUTER: StaticCell<PpiRouter> = StaticCell::new();
static SAMPLER: StaticCell<Sampler> = StaticCell::new();
// The SoftDevice reads advertising data in place, so the payload buffers
// must never move.
static BROADCAST: StaticCell<BroadcastController<SdRadio>> = StaticCell::new();

/// Log the fault and reset. There is no recovery path.
pub fn fatal(fault: Fault) -> ! {
    error!("fatal: {} during {}", fault.error, fault.site);
    SCB::sys_reset()
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn broadcast_task(broadcast: &'static mut BroadcastController<SdRadio>) -> ! {
    let fault = pipeline::run_broadcast(&READINGS, &STATS, broadcast).await;
    fatal(fault)
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // P0, P1 and P4 belong to the SoftDevice.
    let mut c = embassy_nrf::config::Config::default();
    c.gpiote_interrupt_priority = interrupt::Priority::P2;
    c.time_interrupt_priority = interrupt::Priority::P2;
    c.dcdc.reg1 = true;
    let p = embassy_nrf::init(c);

    let led = Output::new(p.P0_13, Level::High, OutputDrive::Standard);

    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 0,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    };
    let sd: &'static Softdevice = Softdevice::enable(&sd_config);
    spawner.must_spawn(softdevice_task(sd));

    let trigger = match TimerClock::new(p.TIMER3, config::TRIGGER_FREQUENCY_HZ) {
        Ok(t) => TRIGGER.init(t),
        Err(e) => fatal(Fault::new(FaultSite::TriggerConfigure, e)),
    };
    let router = ROUTER.init(PpiRouter::new(p.PPI_CH0, trigger.compare_event()));
    let sampler = SAMPLER.init(SamplePath::new(SaadcConverter::new(p.SAADC, Irqs)));
    let broadcast = BROADCAST.init(BroadcastController::new(
        SdRadio::new(sd),
        config::beacon_identity(),
        config::adv_params(),
    ));

    let setup = Setup {
        trigger: config::trigger_config(),
        converter: config::converter_config(),
    };
    if let Err(fault) = pipeline::bring_up(&setup, trigger, router, sampler, broadcast) {
        fatal(fault);
    }

    let handle = broadcast.set().handle();
    hw::saadc::attach(sampler, &READINGS, &STATS);
    spawner.must_spawn(broadcast_task(broadcast));
    spawner.must_spawn(hw::led::advertising_indication(led));

    info!("light-beacon started, advertising set {}", handle.0);
}
