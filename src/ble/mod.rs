//! Bluetooth Low Energy broadcast subsystem.
//!
//! The beacon never accepts connections. It drives one legacy advertising
//! set on the Nordic SoftDevice S140:
//!
//! 1. **Payload** - encodes flags plus manufacturer-specific data carrying
//!    the latest light reading.
//! 2. **Broadcast controller** - registers the set, starts it, and swaps in
//!    a fresh payload on every reading while advertising keeps running.
//! 3. **Advertisement parser** - the scanner-side view of the same bytes.

pub mod adv_parser;
pub mod broadcast;
pub mod payload;

use crate::error::Error;

/// Identifies this beacon's manufacturer data to scanners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeaconIdentity {
    /// Bluetooth SIG company identifier.
    pub company_id: u16,
    /// Discriminator placed ahead of the reading.
    pub beacon_type: [u8; 3],
}

/// Advertising PDU type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvKind {
    NonconnectableNonscannableUndirected,
}

/// Which scanners may see the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterPolicy {
    Any,
}

/// Parameters of the advertising set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvParams {
    pub kind: AdvKind,
    pub filter_policy: FilterPolicy,
    /// Advertising interval in 0.625 ms units.
    pub interval: u32,
    /// Advertising duration in 10 ms units; 0 advertises until stopped.
    pub duration: u16,
}

impl AdvParams {
    /// Convert milliseconds to 0.625 ms radio units.
    pub const fn interval_from_ms(ms: u32) -> u32 {
        ms * 1000 / 625
    }
}

/// Handle of a registered advertising set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvHandle(pub u8);

impl AdvHandle {
    /// Asks the stack to allocate a new set.
    pub const NOT_SET: Self = Self(0xFF);
}

/// The radio stack's advertising-set API.
pub trait Radio {
    /// Register or update an advertising set.
    ///
    /// With `handle == AdvHandle::NOT_SET` the stack allocates a set and
    /// writes its handle back. `params` is `None` when only the data is
    /// replaced on a running set; the stack swaps it atomically. `data` must
    /// stay valid and unmodified until the next call replaces it.
    fn configure(
        &mut self,
        handle: &mut AdvHandle,
        data: &[u8],
        params: Option<&AdvParams>,
    ) -> Result<(), Error>;

    /// Start advertising a configured set.
    fn start(&mut self, handle: AdvHandle) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_ms_is_160_units() {
        assert_eq!(AdvParams::interval_from_ms(100), 160);
        assert_eq!(crate::config::adv_params().interval, 160);
    }

    #[test]
    fn shipped_params_advertise_forever() {
        let params = crate::config::adv_params();
        assert_eq!(params.duration, 0);
        assert_eq!(params.kind, AdvKind::NonconnectableNonscannableUndirected);
        assert_eq!(params.filter_policy, FilterPolicy::Any);
    }
}
