pub(crate) fn num_bytes_for_bits(count: u16) -> usize {
    (count as usize + 7) / 8
}

/// pack bits LSB-first, padding bits of the final byte are zero
pub(crate) fn pack_bits(values: &[bool]) -> impl Iterator<Item = u8> + '_ {
    values.chunks(8).map(|chunk| {
        chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, value)| if *value { acc | (1 << bit) } else { acc })
    })
}

/// unpack `count` bits LSB-first
pub(crate) fn unpack_bits(bytes: &[u8], count: u16) -> Vec<bool> {
    (0..count as usize)
        .map(|i| match bytes.get(i / 8) {
            Some(byte) => (byte & (1 << (i % 8))) != 0,
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculates_number_of_bytes_needed_for_count_of_packed_bits() {
        assert_eq!(num_bytes_for_bits(7), 1);
        assert_eq!(num_bytes_for_bits(8), 1);
        assert_eq!(num_bytes_for_bits(9), 2);
        assert_eq!(num_bytes_for_bits(15), 2);
        assert_eq!(num_bytes_for_bits(16), 2);
        assert_eq!(num_bytes_for_bits(17), 3);
        assert_eq!(num_bytes_for_bits(0xFFFF), 8192); // ensure that it's free from overflow
    }

    #[test]
    fn packs_low_address_into_low_bit() {
        let packed: Vec<u8> = pack_bits(&[true, false, true]).collect();
        assert_eq!(packed, vec![0b0000_0101]);
    }

    #[test]
    fn pads_final_byte_with_zeros() {
        let values = [
            true, false, true, true, false, false, false, false, true, true,
        ];
        let packed: Vec<u8> = pack_bits(&values).collect();
        assert_eq!(packed, vec![0b0000_1101, 0b0000_0011]);
    }

    #[test]
    fn unpacks_only_the_requested_count() {
        assert_eq!(
            unpack_bits(&[0b1111_0101], 3),
            vec![true, false, true]
        );
        assert_eq!(
            unpack_bits(&[0xCD, 0x01], 10),
            vec![true, false, true, true, false, false, true, true, true, false]
        );
    }
}
