//! ThinkGear payload checksum

/// Compute the checksum of a frame payload: low 8 bits of the byte sum, inverted
pub fn compute_checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    !sum
}

/// Check a received checksum byte against the payload
/// Returns Ok(()) if valid, Err(computed) otherwise
pub fn check_checksum(payload: &[u8], received: u8) -> Result<(), u8> {
    let computed = compute_checksum(payload);
    if computed == received {
        Ok(())
    } else {
        Err(computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        assert_eq!(compute_checksum(&[]), 0xFF);
    }

    #[test]
    fn test_known_payloads() {
        // attention = 50
        assert_eq!(compute_checksum(&[0x04, 0x32]), 0xC9);
        // poor signal, attention, meditation
        let payload = hex::decode("0200043205280000").unwrap();
        assert_eq!(compute_checksum(&payload), !0x65u8);
    }

    #[test]
    fn test_sum_wraps() {
        // 0xFF + 0x02 = 0x101, low byte 0x01
        assert_eq!(compute_checksum(&[0xFF, 0x02]), 0xFE);
    }

    #[test]
    fn test_check_is_pure() {
        let payload = hex::decode("80020113").unwrap();
        let a = compute_checksum(&payload);
        let b = compute_checksum(&payload);
        assert_eq!(a, b);
        assert_eq!(check_checksum(&payload, a), Ok(()));
        assert_eq!(check_checksum(&payload, a ^ 0x01), Err(a));
    }
}
