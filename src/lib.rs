//! Hardware-independent core of the light-beacon firmware.
//!
//! Everything here builds and tests on the host: payload encoding, the
//! double-buffer bookkeeping, aggregation, the broadcast controller and the
//! bring-up sequence. The hardware sits behind the `SampleClock`,
//! `EventRouter`, `Converter` and `Radio` traits, implemented for the
//! nRF52840 in the firmware binary (`src/main.rs`, `src/hw/`).
//!
//! Usage: `cargo test`
//!
//! The firmware itself: `cargo build --release --features embedded
//! --target thumbv7em-none-eabihf`.

#![cfg_attr(not(test), no_std)]

pub mod ble;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reading;
pub mod sampling;

pub use error::{BleError, Error};
pub use reading::{LightReading, ReadingSignal};
