use crate::common::cursor::WriteCursor;
use crate::error::InternalError;

/// precomputes the CRC table as a constant!
const CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

pub(crate) const CRC_LENGTH: usize = 2;

/// Compute the CRC-16/Modbus (reflected polynomial 0xA001, initial value 0xFFFF) of a byte span
pub fn compute(bytes: &[u8]) -> u16 {
    CRC.checksum(bytes)
}

/// Check a received CRC against the one computed over `bytes`
pub fn verify(bytes: &[u8], received: u16) -> bool {
    compute(bytes) == received
}

/// CRC carried by the two trailing bytes of a frame, low byte first
pub(crate) fn read_trailing(frame: &[u8]) -> Option<u16> {
    match frame {
        [.., low, high] => Some(u16::from_le_bytes([*low, *high])),
        _ => None,
    }
}

pub(crate) fn append(cursor: &mut WriteCursor, crc: u16) -> Result<(), InternalError> {
    cursor.write_u16_le(crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// bit-wise form of the algorithm the table is derived from
    fn reference(bytes: &[u8]) -> u16 {
        let mut crc: u16 = 0xFFFF;
        for byte in bytes {
            crc ^= *byte as u16;
            for _ in 0..8 {
                if crc & 0x0001 != 0 {
                    crc = (crc >> 1) ^ 0xA001;
                } else {
                    crc >>= 1;
                }
            }
        }
        crc
    }

    fn corpus() -> Vec<Vec<u8>> {
        vec![
            vec![0x00],
            vec![0xFF],
            b"123456789".to_vec(),
            vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x01],
            vec![0x2A, 0x01, 0x00, 0x10, 0x00, 0x13],
            vec![0x11, 0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01],
            (0..=255).collect(),
            vec![0x55; 64],
        ]
    }

    #[test]
    fn empty_input_yields_initial_value() {
        assert_eq!(compute(&[]), 0xFFFF);
    }

    #[test]
    fn matches_known_check_values() {
        assert_eq!(compute(b"123456789"), 0x4B37);
        // 01 03 00 00 00 01 84 0A
        assert_eq!(compute(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x01]), 0x0A84);
        // 2A 01 00 10 00 13 7A 19
        assert_eq!(compute(&[0x2A, 0x01, 0x00, 0x10, 0x00, 0x13]), 0x197A);
    }

    #[test]
    fn table_agrees_with_bitwise_algorithm() {
        for bytes in corpus() {
            assert_eq!(compute(&bytes), reference(&bytes), "input: {bytes:02X?}");
        }
    }

    #[test]
    fn verifies_its_own_output() {
        for bytes in corpus() {
            assert!(verify(&bytes, compute(&bytes)));
            assert!(!verify(&bytes, compute(&bytes) ^ 0x0001));
        }
    }

    #[test]
    fn any_single_bit_flip_changes_the_crc() {
        for bytes in corpus() {
            let crc = compute(&bytes);
            for index in 0..bytes.len() {
                for bit in 0..8 {
                    let mut corrupted = bytes.clone();
                    corrupted[index] ^= 1 << bit;
                    assert_ne!(compute(&corrupted), crc);
                }
            }
        }
    }

    #[test]
    fn appends_low_byte_first() {
        let mut buffer = [0u8; 2];
        let mut cursor = WriteCursor::new(&mut buffer);
        append(&mut cursor, 0x0A84).unwrap();
        assert_eq!(buffer, [0x84, 0x0A]);
        assert_eq!(read_trailing(&[0x01, 0x84, 0x0A]), Some(0x0A84));
        assert_eq!(read_trailing(&[0x01]), None);
    }
}
