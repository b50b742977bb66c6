//! X.25 checksum (CRC-16/MCRF4XX) used by every frame
//!
//! The checksum covers the header bytes after the magic marker and the
//! payload, then folds in one per-message "extra" byte derived from the
//! message definition. A receiver without the right extra byte for a
//! message id cannot validate that message.

use super::messages::MessageKind;

/// Initial accumulator value.
pub const CRC_SEED: u16 = 0xFFFF;

/// Fold one byte into the running checksum.
#[inline]
pub fn accumulate(crc: u16, byte: u8) -> u16 {
    let mut tmp = byte ^ (crc & 0xFF) as u8;
    tmp ^= tmp << 4;
    let tmp = u16::from(tmp);
    (crc >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4)
}

/// Checksum of `bytes` starting from [`CRC_SEED`].
pub fn compute(bytes: &[u8]) -> u16 {
    bytes.iter().fold(CRC_SEED, |crc, &b| accumulate(crc, b))
}

/// Extra checksum byte for a message id, 0 for ids this link does not know.
pub fn crc_extra(message_id: u32) -> u8 {
    MessageKind::from_id(message_id).map_or(0, MessageKind::crc_extra)
}

/// Full frame checksum: `compute(covered)` with the extra byte folded in.
pub fn frame_checksum(covered: &[u8], message_id: u32) -> u16 {
    accumulate(compute(covered), crc_extra(message_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mcrf4xx_check_value() {
        // Standard CRC catalogue check input
        assert_eq!(compute(b"123456789"), 0x6F91);
    }

    #[test]
    fn test_empty_input_is_seed() {
        assert_eq!(compute(&[]), CRC_SEED);
    }

    #[test]
    fn test_compute_is_incremental() {
        let data = [0x09, 0x00, 0x00, 0x01, 0x01, 0x00, 0xAA, 0x55];
        let (head, tail) = data.split_at(3);
        let partial = compute(head);
        let resumed = tail.iter().fold(partial, |crc, &b| accumulate(crc, b));
        assert_eq!(resumed, compute(&data));
    }

    #[test]
    fn test_known_extra_bytes() {
        assert_eq!(crc_extra(0), 50);
        assert_eq!(crc_extra(11), 89);
        assert_eq!(crc_extra(21), 159);
        assert_eq!(crc_extra(22), 220);
        assert_eq!(crc_extra(76), 152);
        assert_eq!(crc_extra(30), 39);
        assert_eq!(crc_extra(253), 83);
    }

    #[test]
    fn test_unknown_id_uses_zero_extra() {
        assert_eq!(crc_extra(9_999), 0);
        let covered = [1u8, 2, 3];
        assert_eq!(frame_checksum(&covered, 9_999), accumulate(compute(&covered), 0));
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let mut data = [0x1C, 0x00, 0x00, 0x07, 0x01, 0x01, 0x1E, 0x00, 0x00];
        let original = frame_checksum(&data, 30);
        data[4] ^= 0x10;
        assert_ne!(frame_checksum(&data, 30), original);
    }
}
