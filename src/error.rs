//! Unified error type for light-beacon.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Sampling
    /// The trigger period does not map onto a usable compare value.
    TriggerPeriod,

    /// The trigger timer could not be claimed or configured.
    TriggerUnavailable,

    /// Every event-router channel is already allocated.
    RouterExhausted,

    /// The router channel exists but could not be bound or enabled.
    RouterBind,

    /// The converter rejected its configuration.
    ConverterConfig,

    /// A buffer was submitted while it is still owned by the hardware.
    BufferBusy,

    /// A completion arrived with no buffer in flight.
    NoActiveBuffer,

    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// The advertising set was used before it was registered.
    NotRegistered,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GAP raw error code from the SoftDevice.
    Raw(u32),
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
