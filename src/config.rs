//! Application-wide constants and compile-time configuration.
//!
//! Timing, converter and advertising parameters live here so they can be
//! tuned in one place. The typed configuration values the rest of the crate
//! consumes are built from these constants.

use crate::ble::{AdvKind, AdvParams, BeaconIdentity, FilterPolicy};
use crate::sampling::acquisition::{AnalogInput, ConverterConfig, Gain, Reference};
use crate::sampling::TriggerConfig;

// Beacon identity

/// Bluetooth SIG company identifier carried in the manufacturer data.
pub const COMPANY_IDENTIFIER: u16 = 0x0059;

/// Beacon-type discriminator placed ahead of the reading.
pub const BEACON_TYPE: [u8; 3] = [0x29, 0x39, 0x01];

// Advertising

/// Advertising interval (ms).
pub const ADV_INTERVAL_MS: u32 = 100;

/// SoftDevice connection configuration tag used when starting advertising.
pub const BLE_CONN_CFG_TAG: u8 = 1;

/// Largest advertising data the legacy PDU can carry.
pub const ADV_SET_DATA_SIZE_MAX: usize = 31;

// Sampling

/// Period between hardware-triggered conversions (ms).
pub const SAMPLE_PERIOD_MS: u32 = 400;

/// Trigger timer clock (Hz). 31.25 kHz is the slowest TIMER prescaler.
pub const TRIGGER_FREQUENCY_HZ: u32 = 31_250;

/// Raw samples per acquisition buffer, all taken on one trigger.
pub const ADC_SAMPLES: usize = 5;

/// Converter resolution (bits).
pub const ADC_RESOLUTION_BITS: u8 = 12;

// Indication

/// Advertising indication LED on time (ms).
pub const LED_ON_MS: u64 = 100;

/// Advertising indication LED off time (ms).
pub const LED_OFF_MS: u64 = 900;

/// Broadcast updates between two diagnostic log lines.
pub const LOG_EVERY_UPDATES: u32 = 16;

/// Who this beacon says it is.
pub const fn beacon_identity() -> BeaconIdentity {
    BeaconIdentity {
        company_id: COMPANY_IDENTIFIER,
        beacon_type: BEACON_TYPE,
    }
}

/// Advertising parameters registered with the advertising set.
pub const fn adv_params() -> AdvParams {
    AdvParams {
        kind: AdvKind::NonconnectableNonscannableUndirected,
        filter_policy: FilterPolicy::Any,
        interval: AdvParams::interval_from_ms(ADV_INTERVAL_MS),
        duration: 0,
    }
}

pub const fn trigger_config() -> TriggerConfig {
    TriggerConfig {
        period_ms: SAMPLE_PERIOD_MS,
        frequency_hz: TRIGGER_FREQUENCY_HZ,
    }
}

/// Light sensor wiring: AIN0, single-ended, scanned `ADC_SAMPLES` times
/// per trigger.
pub const fn converter_config() -> ConverterConfig {
    ConverterConfig {
        input: AnalogInput::Ain0,
        gain: Gain::Gain1_6,
        reference: Reference::Vdd1_4,
        resolution_bits: ADC_RESOLUTION_BITS,
        samples_per_trigger: ADC_SAMPLES as u8,
    }
}
