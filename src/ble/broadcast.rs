//! Broadcast controller - owns the advertising set and keeps its payload
//! in step with the latest reading.
//!
//! The SoftDevice reads advertising data straight from application memory
//! and requires a different buffer when data changes on a running set, so
//! the set keeps two payload buffers and only ever encodes into the one the
//! stack is not using.

use heapless::Vec;

use crate::ble::{payload, AdvHandle, AdvParams, BeaconIdentity, Radio};
use crate::config::ADV_SET_DATA_SIZE_MAX;
use crate::error::Error;
use crate::reading::LightReading;

type PayloadBuf = Vec<u8, ADV_SET_DATA_SIZE_MAX>;

/// Registered advertising configuration: handle, parameters, payloads.
pub struct AdvertisingSet {
    handle: AdvHandle,
    params: AdvParams,
    payloads: [PayloadBuf; 2],
    live: usize,
    registered: bool,
}

impl AdvertisingSet {
    pub const fn new(params: AdvParams) -> Self {
        Self {
            handle: AdvHandle::NOT_SET,
            params,
            payloads: [Vec::new(), Vec::new()],
            live: 0,
            registered: false,
        }
    }

    pub fn handle(&self) -> AdvHandle {
        self.handle
    }

    /// The bytes the stack is currently advertising.
    pub fn payload(&self) -> &[u8] {
        &self.payloads[self.live]
    }
}

/// Single owner of the advertising set. All radio calls go through here.
pub struct BroadcastController<R: Radio> {
    radio: R,
    identity: BeaconIdentity,
    set: AdvertisingSet,
    updates: u32,
}

impl<R: Radio> BroadcastController<R> {
    pub const fn new(radio: R, identity: BeaconIdentity, params: AdvParams) -> Self {
        Self {
            radio,
            identity,
            set: AdvertisingSet::new(params),
            updates: 0,
        }
    }

    /// Encode `initial` and register the set with its parameters.
    pub fn register(&mut self, initial: LightReading) -> Result<(), Error> {
        let slot = self.set.live;
        payload::encode(&self.identity, initial, &mut self.set.payloads[slot])?;
        self.radio.configure(
            &mut self.set.handle,
            &self.set.payloads[slot],
            Some(&self.set.params),
        )?;
        self.set.registered = true;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), Error> {
        if !self.set.registered {
            return Err(Error::NotRegistered);
        }
        self.radio.start(self.set.handle)
    }

    /// Replace the payload of the running set with one carrying `reading`.
    ///
    /// The live buffer is left untouched until the stack accepts the new one.
    pub fn update(&mut self, reading: LightReading) -> Result<(), Error> {
        if !self.set.registered {
            return Err(Error::NotRegistered);
        }
        let staged = self.set.live ^ 1;
        payload::encode(&self.identity, reading, &mut self.set.payloads[staged])?;
        self.radio
            .configure(&mut self.set.handle, &self.set.payloads[staged], None)?;
        self.set.live = staged;
        self.updates = self.updates.wrapping_add(1);
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        self.set.payload()
    }

    pub fn set(&self) -> &AdvertisingSet {
        &self.set
    }

    /// Successful payload updates (diagnostic).
    pub fn updates(&self) -> u32 {
        self.updates
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{adv_params, beacon_identity};

    /// Records the data pointer of every configure call.
    #[derive(Default)]
    struct PtrRadio {
        configured: std::vec::Vec<(*const u8, bool)>,
        started: bool,
    }

    impl Radio for PtrRadio {
        fn configure(
            &mut self,
            handle: &mut AdvHandle,
            data: &[u8],
            params: Option<&AdvParams>,
        ) -> Result<(), Error> {
            if *handle == AdvHandle::NOT_SET {
                *handle = AdvHandle(0);
            }
            self.configured.push((data.as_ptr(), params.is_some()));
            Ok(())
        }

        fn start(&mut self, _handle: AdvHandle) -> Result<(), Error> {
            self.started = true;
            Ok(())
        }
    }

    #[test]
    fn register_assigns_handle_and_passes_params() {
        let mut ctl = BroadcastController::new(PtrRadio::default(), beacon_identity(), adv_params());
        ctl.register(LightReading(0)).unwrap();
        assert_eq!(ctl.set().handle(), AdvHandle(0));
        assert!(ctl.radio().configured[0].1);
    }

    #[test]
    fn updates_alternate_buffers() {
        let mut ctl = BroadcastController::new(PtrRadio::default(), beacon_identity(), adv_params());
        ctl.register(LightReading(0)).unwrap();
        ctl.update(LightReading(1)).unwrap();
        ctl.update(LightReading(2)).unwrap();

        let calls = &ctl.radio().configured;
        assert_ne!(calls[0].0, calls[1].0);
        assert_ne!(calls[1].0, calls[2].0);
        assert_eq!(calls[0].0, calls[2].0);
        assert!(!calls[1].1 && !calls[2].1);
        assert_eq!(ctl.updates(), 2);
    }

    #[test]
    fn update_before_register_is_rejected() {
        let mut ctl = BroadcastController::new(PtrRadio::default(), beacon_identity(), adv_params());
        assert_eq!(ctl.update(LightReading(1)), Err(Error::NotRegistered));
        assert_eq!(ctl.start(), Err(Error::NotRegistered));
        assert!(!ctl.radio().started);
    }
}
