//! Bring-up sequencing and the broadcast worker.
//!
//! Every failure here is fatal: there is no degraded mode in which a stale
//! payload could be told apart from a fresh one. Errors are tagged with the
//! step that produced them and handed to the caller, which resets the
//! device.

use crate::ble::broadcast::BroadcastController;
use crate::ble::Radio;
use crate::error::Error;
use crate::reading::{LightReading, ReadingSignal};
use crate::sampling::acquisition::{Converter, ConverterConfig};
use crate::sampling::aggregator::{SamplePath, SampleStats};
use crate::sampling::{EventRouter, SampleClock, TriggerConfig};

/// Where a fatal error happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultSite {
    AdvertisingRegister,
    TriggerConfigure,
    RouterConnect,
    ConverterArm,
    RouterEnable,
    AdvertisingStart,
    BufferDone,
    PayloadUpdate,
}

/// A fatal error and the step that raised it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    pub site: FaultSite,
    pub error: Error,
}

impl Fault {
    pub const fn new(site: FaultSite, error: Error) -> Self {
        Self { site, error }
    }
}

trait AtSite<T> {
    fn at(self, site: FaultSite) -> Result<T, Fault>;
}

impl<T> AtSite<T> for Result<T, Error> {
    fn at(self, site: FaultSite) -> Result<T, Fault> {
        self.map_err(|error| Fault::new(site, error))
    }
}

/// Static configuration for `bring_up`.
pub struct Setup {
    pub trigger: TriggerConfig,
    pub converter: ConverterConfig,
}

/// Bring the sampling and broadcast pipeline up, in order.
///
/// The trigger only starts after the route and both buffers are in place,
/// and advertising only starts after the trigger runs. On failure nothing
/// after the failing step has been touched.
pub fn bring_up<T, E, C, R, const N: usize>(
    setup: &Setup,
    trigger: &mut T,
    router: &mut E,
    sampler: &mut SamplePath<C, N>,
    broadcast: &mut BroadcastController<R>,
) -> Result<(), Fault>
where
    T: SampleClock,
    E: EventRouter,
    C: Converter,
    R: Radio,
{
    broadcast
        .register(LightReading::default())
        .at(FaultSite::AdvertisingRegister)?;

    let ticks = setup.trigger.ticks().at(FaultSite::TriggerConfigure)?;
    trigger.configure(ticks).at(FaultSite::TriggerConfigure)?;

    router.connect().at(FaultSite::RouterConnect)?;

    sampler.arm(&setup.converter).at(FaultSite::ConverterArm)?;

    router.enable().at(FaultSite::RouterEnable)?;

    trigger.start();
    #[cfg(feature = "defmt")]
    defmt::info!("sampling every {} ms ({} ticks)", setup.trigger.period_ms, ticks);

    broadcast.start().at(FaultSite::AdvertisingStart)?;

    Ok(())
}

/// Apply every published reading to the advertising set.
///
/// Runs for the life of the device; only returns when an update fails.
/// `stats` is only read for the periodic diagnostic line.
pub async fn run_broadcast<R: Radio>(
    readings: &ReadingSignal,
    stats: &SampleStats,
    broadcast: &mut BroadcastController<R>,
) -> Fault {
    loop {
        let reading = readings.wait().await;
        if let Err(error) = broadcast.update(reading) {
            return Fault::new(FaultSite::PayloadUpdate, error);
        }
        #[cfg(feature = "defmt")]
        if broadcast.updates() % crate::config::LOG_EVERY_UPDATES == 0 {
            defmt::info!(
                "light {} ({} updates, {} buffers, {} starved)",
                reading.0,
                broadcast.updates(),
                stats.events(),
                stats.starved()
            );
        }
        #[cfg(not(feature = "defmt"))]
        let _ = stats;
    }
}
