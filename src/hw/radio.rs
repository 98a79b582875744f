//! Advertising set on the SoftDevice through the raw GAP API.
//!
//! `nrf_softdevice::ble::peripheral::advertise` owns its data for one
//! advertising run; the beacon instead keeps one set running forever and
//! swaps its data in place, which only `sd_ble_gap_adv_set_configure`
//! offers.

use core::{mem, ptr};

use light_beacon::ble::{AdvHandle, AdvKind, AdvParams, FilterPolicy, Radio};
use light_beacon::config::BLE_CONN_CFG_TAG;
use light_beacon::{BleError, Error};
use nrf_softdevice::{raw, Softdevice};

pub struct SdRadio {
    _sd: &'static Softdevice,
}

impl SdRadio {
    /// Requires an enabled SoftDevice; holding the reference proves it.
    pub fn new(sd: &'static Softdevice) -> Self {
        Self { _sd: sd }
    }
}

impl Radio for SdRadio {
    fn configure(
        &mut self,
        handle: &mut AdvHandle,
        data: &[u8],
        params: Option<&AdvParams>,
    ) -> Result<(), Error> {
        let adv_data = raw::ble_gap_adv_data_t {
            adv_data: raw::ble_data_t {
                p_data: data.as_ptr() as *mut u8,
                len: data.len() as u16,
            },
            scan_rsp_data: raw::ble_data_t {
                p_data: ptr::null_mut(),
                len: 0,
            },
        };
        let params = params.map(raw_params);
        let p_params = params
            .as_ref()
            .map_or(ptr::null(), |p| p as *const raw::ble_gap_adv_params_t);

        let ret = unsafe { raw::sd_ble_gap_adv_set_configure(&mut handle.0, &adv_data, p_params) };
        check(ret)
    }

    fn start(&mut self, handle: AdvHandle) -> Result<(), Error> {
        let ret = unsafe { raw::sd_ble_gap_adv_start(handle.0, BLE_CONN_CFG_TAG) };
        check(ret)
    }
}

fn raw_params(params: &AdvParams) -> raw::ble_gap_adv_params_t {
    let mut out: raw::ble_gap_adv_params_t = unsafe { mem::zeroed() };
    out.properties.type_ = match params.kind {
        AdvKind::NonconnectableNonscannableUndirected => {
            raw::BLE_GAP_ADV_TYPE_NONCONNECTABLE_NONSCANNABLE_UNDIRECTED as u8
        }
    };
    out.p_peer_addr = ptr::null();
    out.filter_policy = match params.filter_policy {
        FilterPolicy::Any => raw::BLE_GAP_ADV_FP_ANY as u8,
    };
    out.interval = params.interval;
    out.duration = params.duration;
    out.primary_phy = raw::BLE_GAP_PHY_1MBPS as u8;
    out
}

fn check(ret: u32) -> Result<(), Error> {
    if ret == raw::NRF_SUCCESS {
        Ok(())
    } else {
        Err(BleError::Raw(ret).into())
    }
}
