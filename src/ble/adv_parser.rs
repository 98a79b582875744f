use crate::ble::payload::{AD_TYPE_MANUFACTURER_DATA, MANUFACTURER_PAYLOAD_LEN};
use crate::ble::BeaconIdentity;
use crate::reading::LightReading;

/// Find the first manufacturer-specific AD structure in advertisement data.
///
/// Returns the company identifier and the bytes after it.
pub fn manufacturer_data(data: &[u8]) -> Option<(u16, &[u8])> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        let ad_type = data[i + 1];
        if ad_type == AD_TYPE_MANUFACTURER_DATA && len >= 3 {
            let body = &data[i + 2..i + 1 + len];
            let company = u16::from_le_bytes([body[0], body[1]]);
            return Some((company, &body[2..]));
        }
        i += len + 1;
    }
    None
}

/// Extract the light reading from a beacon advertisement matching `identity`.
pub fn parse_light_reading(data: &[u8], identity: &BeaconIdentity) -> Option<LightReading> {
    let (company, payload) = manufacturer_data(data)?;
    if company != identity.company_id || payload.len() != MANUFACTURER_PAYLOAD_LEN {
        return None;
    }
    if payload[..3] != identity.beacon_type {
        return None;
    }
    Some(LightReading::from_be_bytes([payload[3], payload[4]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::beacon_identity;

    #[test]
    fn finds_manufacturer_data_after_flags() {
        let ad_data = [
            0x02, 0x01, 0x06, // Flags
            0x08, 0xFF, 0x59, 0x00, 0x29, 0x39, 0x01, 0x04, 0xD2,
        ];
        let (company, payload) = manufacturer_data(&ad_data).unwrap();
        assert_eq!(company, 0x0059);
        assert_eq!(payload, &[0x29, 0x39, 0x01, 0x04, 0xD2]);
        assert_eq!(
            parse_light_reading(&ad_data, &beacon_identity()),
            Some(LightReading(1234))
        );
    }

    #[test]
    fn no_manufacturer_data() {
        let ad_data = [0x02, 0x01, 0x06];
        assert_eq!(manufacturer_data(&ad_data), None);
    }

    #[test]
    fn foreign_company_is_ignored() {
        let ad_data = [0x08, 0xFF, 0x4C, 0x00, 0x29, 0x39, 0x01, 0x00, 0x10];
        assert_eq!(parse_light_reading(&ad_data, &beacon_identity()), None);
    }

    #[test]
    fn foreign_discriminator_is_ignored() {
        let ad_data = [0x08, 0xFF, 0x59, 0x00, 0x02, 0x15, 0x01, 0x00, 0x10];
        assert_eq!(parse_light_reading(&ad_data, &beacon_identity()), None);
    }

    #[test]
    fn malformed_lengths() {
        // len=0 stops parsing
        assert_eq!(manufacturer_data(&[0x00]), None);
        // length runs past the end
        assert_eq!(manufacturer_data(&[0x09, 0xFF, 0x59, 0x00]), None);
        // manufacturer structure too short for a company id
        assert_eq!(manufacturer_data(&[0x02, 0xFF, 0x59, 0x00]), None);
        assert_eq!(manufacturer_data(&[]), None);
    }

    #[test]
    fn truncated_payload_is_not_a_reading() {
        let ad_data = [0x07, 0xFF, 0x59, 0x00, 0x29, 0x39, 0x01, 0x04];
        assert_eq!(parse_light_reading(&ad_data, &beacon_identity()), None);
    }
}
