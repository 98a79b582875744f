//! Advertising payload encoder.
//!
//! Layout (12 bytes, legacy advertising data):
//! ```text
//! 02 01 06                  Flags: LE General Discoverable, BR/EDR not supported
//! 08 FF                     Manufacturer Specific Data, 7 bytes follow
//!       59 00               company identifier (little-endian, per the AD format)
//!       29 39 01            beacon-type discriminator
//!       HI LO               light reading (big-endian)
//! ```

use heapless::Vec;

use crate::ble::BeaconIdentity;
use crate::config::ADV_SET_DATA_SIZE_MAX;
use crate::error::Error;
use crate::reading::LightReading;

/// AD type: Flags.
pub const AD_TYPE_FLAGS: u8 = 0x01;
/// AD type: Manufacturer Specific Data.
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

pub const LE_GENERAL_DISCOVERABLE: u8 = 0x02;
pub const BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Bytes after the company identifier: discriminator + reading.
pub const MANUFACTURER_PAYLOAD_LEN: usize = 3 + 2;

/// Total encoded length; fixed because every field is fixed-size.
pub const ADV_PAYLOAD_LEN: usize = (2 + 1) + (2 + 2 + MANUFACTURER_PAYLOAD_LEN);

const _: () = assert!(ADV_PAYLOAD_LEN <= ADV_SET_DATA_SIZE_MAX);

/// Discriminator followed by the big-endian reading.
pub fn manufacturer_payload(
    identity: &BeaconIdentity,
    reading: LightReading,
) -> [u8; MANUFACTURER_PAYLOAD_LEN] {
    let [hi, lo] = reading.to_be_bytes();
    let [t0, t1, t2] = identity.beacon_type;
    [t0, t1, t2, hi, lo]
}

/// Encode the full advertising data into `out`, replacing its contents.
///
/// Returns the encoded length. Fails with `BufferOverflow` when `out`
/// (or the legacy PDU) cannot hold it; out is left empty then.
pub fn encode<const CAP: usize>(
    identity: &BeaconIdentity,
    reading: LightReading,
    out: &mut Vec<u8, CAP>,
) -> Result<usize, Error> {
    out.clear();
    let manufacturer = manufacturer_payload(identity, reading);
    let company = identity.company_id.to_le_bytes();

    let written = push_ad(
        out,
        AD_TYPE_FLAGS,
        &[&[LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED]],
    )
    .and_then(|_| push_ad(out, AD_TYPE_MANUFACTURER_DATA, &[&company, &manufacturer]));

    if written.is_err() || out.len() > ADV_SET_DATA_SIZE_MAX {
        out.clear();
        return Err(Error::BufferOverflow);
    }
    Ok(out.len())
}

/// Append one AD structure: length, type, then the concatenated parts.
fn push_ad<const CAP: usize>(
    out: &mut Vec<u8, CAP>,
    ad_type: u8,
    parts: &[&[u8]],
) -> Result<(), Error> {
    let body: usize = parts.iter().map(|p| p.len()).sum();
    let len = u8::try_from(body + 1).map_err(|_| Error::BufferOverflow)?;

    out.push(len).map_err(|_| Error::BufferOverflow)?;
    out.push(ad_type).map_err(|_| Error::BufferOverflow)?;
    for part in parts {
        out.extend_from_slice(part)
            .map_err(|_| Error::BufferOverflow)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::beacon_identity;

    #[test]
    fn reference_layout() {
        let mut out: Vec<u8, ADV_SET_DATA_SIZE_MAX> = Vec::new();
        let len = encode(&beacon_identity(), LightReading(0x04D2), &mut out).unwrap();
        assert_eq!(len, ADV_PAYLOAD_LEN);
        assert_eq!(
            out.as_slice(),
            &[0x02, 0x01, 0x06, 0x08, 0xFF, 0x59, 0x00, 0x29, 0x39, 0x01, 0x04, 0xD2]
        );
    }

    #[test]
    fn length_does_not_depend_on_reading() {
        let mut out: Vec<u8, ADV_SET_DATA_SIZE_MAX> = Vec::new();
        for r in [0u16, 1, 255, 256, 4095, u16::MAX] {
            assert_eq!(
                encode(&beacon_identity(), LightReading(r), &mut out),
                Ok(ADV_PAYLOAD_LEN)
            );
        }
    }

    #[test]
    fn reading_is_the_big_endian_tail() {
        let mut out: Vec<u8, ADV_SET_DATA_SIZE_MAX> = Vec::new();
        encode(&beacon_identity(), LightReading(20), &mut out).unwrap();
        assert_eq!(&out[out.len() - 2..], &[0x00, 0x14]);
    }

    #[test]
    fn small_buffer_overflows_and_is_left_empty() {
        let mut out: Vec<u8, 8> = Vec::new();
        assert_eq!(
            encode(&beacon_identity(), LightReading(1), &mut out),
            Err(Error::BufferOverflow)
        );
        assert!(out.is_empty());
    }

    #[test]
    fn previous_contents_are_replaced() {
        let mut out: Vec<u8, ADV_SET_DATA_SIZE_MAX> = Vec::new();
        out.extend_from_slice(&[0xAA; 20]).unwrap();
        encode(&beacon_identity(), LightReading(7), &mut out).unwrap();
        assert_eq!(out.len(), ADV_PAYLOAD_LEN);
        assert_eq!(out[0], 0x02);
    }

    #[test]
    fn manufacturer_payload_carries_discriminator_then_reading() {
        assert_eq!(
            manufacturer_payload(&beacon_identity(), LightReading(0x0102)),
            [0x29, 0x39, 0x01, 0x01, 0x02]
        );
    }
}
