use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

/// expands every byte into 8 bits, most significant bit first
///
/// ## Example of usage
/// ```rust
/// use aurora_stego::media::bits::pack;
///
/// assert_eq!(
///     pack(b"A"),
///     vec![false, true, false, false, false, false, false, true]
/// );
/// ```
pub fn pack(bytes: &[u8]) -> Vec<bool> {
    let mut reader = BitReader::endian(Cursor::new(bytes), BigEndian);
    let mut bits = Vec::with_capacity(bytes.len() << 3);
    while let Ok(bit) = reader.read_bit() {
        bits.push(bit);
    }

    bits
}

/// folds groups of 8 bits back into bytes, an incomplete trailing group is ignored
pub fn unpack(bits: &[bool]) -> std::io::Result<Vec<u8>> {
    let whole = bits.len() - bits.len() % 8;
    let mut writer = BitWriter::endian(Vec::with_capacity(whole >> 3), BigEndian);
    for bit in &bits[..whole] {
        writer.write_bit(*bit)?;
    }

    Ok(writer.into_writer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_pack_most_significant_bit_first() {
        let bits = pack(&[0b1000_0001, 0b0110_0000]);

        assert_eq!(bits.len(), 16);
        assert!(bits[0], "1st bit not correct");
        assert!(!bits[1], "2nd bit not correct");
        assert!(bits[7], "8th bit not correct");
        assert!(bits[9], "10th bit not correct");
        assert!(bits[10], "11th bit not correct");
        assert!(!bits[15], "16th bit not correct");
    }

    #[test]
    fn should_unpack_what_was_packed() {
        let data = b"415552524152deadbeef{}".to_vec();

        assert_eq!(unpack(&pack(&data)).unwrap(), data);
    }

    #[test]
    fn should_ignore_an_incomplete_trailing_byte() {
        let mut bits = pack(&[0xAB]);
        bits.extend([true, true, true]);

        assert_eq!(unpack(&bits).unwrap(), vec![0xAB]);
    }

    #[test]
    fn should_handle_empty_input() {
        assert!(pack(&[]).is_empty());
        assert!(unpack(&[]).unwrap().is_empty());
    }
}
