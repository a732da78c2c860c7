use crate::client::requests::{log_indexed, Request};
use crate::common::bits::{num_bytes_for_bits, unpack_bits};
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::constants::limits;
use crate::decode::AppDecodeLevel;
use crate::error::{AduParseError, InvalidRequest, RequestError};
use crate::serial::frame::constants::ADU_OVERHEAD;
use crate::types::AddressRange;

use scursor::ReadCursor;

/// Read coils or discrete inputs
pub(crate) struct ReadBits {
    function: FunctionCode,
    range: AddressRange,
}

impl ReadBits {
    pub(crate) fn coils(range: AddressRange) -> Self {
        Self {
            function: FunctionCode::ReadCoils,
            range,
        }
    }

    pub(crate) fn discrete_inputs(range: AddressRange) -> Self {
        Self {
            function: FunctionCode::ReadDiscreteInputs,
            range,
        }
    }

    fn byte_count(&self) -> usize {
        num_bytes_for_bits(self.range.count)
    }
}

impl Serialize for ReadBits {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(self.range.start)?;
        cursor.write_u16_be(self.range.count)?;
        Ok(())
    }
}

impl Loggable for ReadBits {
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "{}", self.range)?;
        }
        Ok(())
    }
}

impl Request for ReadBits {
    type Response = Vec<bool>;

    fn function(&self) -> FunctionCode {
        self.function
    }

    fn validate(&self) -> Result<(), InvalidRequest> {
        self.range.limited_count(limits::MAX_READ_COILS_COUNT)?;
        Ok(())
    }

    fn response_length(&self) -> usize {
        // byte count + packed bits
        ADU_OVERHEAD + 1 + self.byte_count()
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<Vec<bool>, RequestError> {
        let byte_count = cursor.read_u8()? as usize;
        if byte_count != self.byte_count() {
            return Err(
                AduParseError::RequestByteCountMismatch(self.byte_count(), byte_count).into(),
            );
        }
        let bytes = cursor.read_bytes(byte_count)?;
        cursor.expect_empty()?;
        Ok(unpack_bits(bytes, self.range.count))
    }

    fn log_response(
        &self,
        response: &Vec<bool>,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "{}", self.range)?;
        }
        if level.data_values() {
            log_indexed(f, self.range.start, response)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u16, count: u16) -> AddressRange {
        AddressRange::try_from(start, count).unwrap()
    }

    fn serialize(request: &ReadBits) -> Vec<u8> {
        let mut buffer = [0u8; 4];
        let mut cursor = WriteCursor::new(&mut buffer);
        request.serialize(&mut cursor).unwrap();
        buffer.to_vec()
    }

    #[test]
    fn serializes_start_and_count_big_endian() {
        assert_eq!(
            serialize(&ReadBits::coils(range(0x0013, 0x0025))),
            vec![0x00, 0x13, 0x00, 0x25]
        );
        assert_eq!(
            ReadBits::discrete_inputs(range(0, 1)).function(),
            FunctionCode::ReadDiscreteInputs
        );
    }

    #[test]
    fn response_length_rounds_up_to_whole_bytes() {
        assert_eq!(ReadBits::coils(range(0, 1)).response_length(), 6);
        assert_eq!(ReadBits::coils(range(0, 8)).response_length(), 6);
        assert_eq!(ReadBits::coils(range(0, 10)).response_length(), 7);
        assert_eq!(ReadBits::coils(range(0, 2000)).response_length(), 255);
    }

    #[test]
    fn count_is_limited_to_2000() {
        assert_eq!(ReadBits::coils(range(0, 2000)).validate(), Ok(()));
        assert_eq!(
            ReadBits::discrete_inputs(range(0, 2001)).validate(),
            Err(InvalidRequest::CountTooBigForType(2001, 2000))
        );
    }

    #[test]
    fn unpacks_bits_lsb_first() {
        let request = ReadBits::coils(range(0x0013, 10));
        let values = request
            .parse_response(ReadCursor::new(&[0x02, 0x0D, 0x03]))
            .unwrap();
        assert_eq!(
            values,
            vec![true, false, true, true, false, false, false, false, true, true]
        );
    }

    #[test]
    fn decoding_is_repeatable() {
        let request = ReadBits::discrete_inputs(range(0, 12));
        let data = [0x02, 0xA5, 0x0F];
        assert_eq!(
            request.parse_response(ReadCursor::new(&data)),
            request.parse_response(ReadCursor::new(&data))
        );
    }

    #[test]
    fn rejects_wrong_byte_count() {
        let request = ReadBits::coils(range(0, 10));
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x01, 0x0D])),
            Err(RequestError::BadResponse(
                AduParseError::RequestByteCountMismatch(2, 1)
            ))
        );
    }

    #[test]
    fn rejects_trailing_bytes() {
        let request = ReadBits::coils(range(0, 3));
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x01, 0x05, 0xFF])),
            Err(RequestError::BadResponse(AduParseError::TrailingBytes(1)))
        );
    }
}
