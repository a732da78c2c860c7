use crate::client::requests::{log_indexed, Request};
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::constants::limits;
use crate::decode::AppDecodeLevel;
use crate::error::{AduParseError, InvalidRequest, RequestError};
use crate::serial::frame::constants::ADU_OVERHEAD;
use crate::types::{AddressRange, Indexed};

use scursor::ReadCursor;

/// Read holding or input registers
pub(crate) struct ReadRegisters {
    function: FunctionCode,
    range: AddressRange,
}

/// Read exactly one holding register
pub(crate) struct ReadHoldingRegister {
    address: u16,
}

impl ReadRegisters {
    pub(crate) fn holding(range: AddressRange) -> Self {
        Self {
            function: FunctionCode::ReadHoldingRegisters,
            range,
        }
    }

    pub(crate) fn input(range: AddressRange) -> Self {
        Self {
            function: FunctionCode::ReadInputRegisters,
            range,
        }
    }
}

impl ReadHoldingRegister {
    pub(crate) fn new(address: u16) -> Self {
        Self { address }
    }
}

fn parse_registers(cursor: &mut ReadCursor, count: u16) -> Result<Vec<u16>, RequestError> {
    let expected = 2 * count as usize;
    let byte_count = cursor.read_u8()? as usize;
    if byte_count != expected {
        return Err(AduParseError::RequestByteCountMismatch(expected, byte_count).into());
    }
    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        values.push(cursor.read_u16_be()?);
    }
    cursor.expect_empty()?;
    Ok(values)
}

impl Serialize for ReadRegisters {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(self.range.start)?;
        cursor.write_u16_be(self.range.count)?;
        Ok(())
    }
}

impl Loggable for ReadRegisters {
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "{}", self.range)?;
        }
        Ok(())
    }
}

impl Request for ReadRegisters {
    type Response = Vec<u16>;

    fn function(&self) -> FunctionCode {
        self.function
    }

    fn validate(&self) -> Result<(), InvalidRequest> {
        self.range.limited_count(limits::MAX_READ_REGISTERS_COUNT)?;
        Ok(())
    }

    fn response_length(&self) -> usize {
        ADU_OVERHEAD + 1 + 2 * self.range.count as usize
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<Vec<u16>, RequestError> {
        parse_registers(&mut cursor, self.range.count)
    }

    fn log_response(
        &self,
        response: &Vec<u16>,
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

impl Serialize for ReadHoldingRegister {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(self.address)?;
        cursor.write_u16_be(1)?;
        Ok(())
    }
}

impl Loggable for ReadHoldingRegister {
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "address: {:#06X}", self.address)?;
        }
        Ok(())
    }
}

impl Request for ReadHoldingRegister {
    type Response = u16;

    fn function(&self) -> FunctionCode {
        FunctionCode::ReadHoldingRegisters
    }

    fn response_length(&self) -> usize {
        // byte count + one register
        ADU_OVERHEAD + 1 + 2
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<u16, RequestError> {
        let values = parse_registers(&mut cursor, 1)?;
        values
            .first()
            .copied()
            .ok_or_else(|| AduParseError::InsufficientBytes.into())
    }

    fn log_response(
        &self,
        response: &u16,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_values() {
            write!(f, "{}", Indexed::new(self.address, *response))?;
        } else if level.data_headers() {
            write!(f, "address: {:#06X}", self.address)?;
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

    #[test]
    fn serializes_single_register_read_with_count_of_one() {
        let mut buffer = [0u8; 4];
        let mut cursor = WriteCursor::new(&mut buffer);
        ReadHoldingRegister::new(0x006B)
            .serialize(&mut cursor)
            .unwrap();
        assert_eq!(buffer, [0x00, 0x6B, 0x00, 0x01]);
    }

    #[test]
    fn response_lengths() {
        assert_eq!(ReadHoldingRegister::new(0).response_length(), 7);
        assert_eq!(ReadRegisters::input(range(0, 1)).response_length(), 7);
        assert_eq!(ReadRegisters::input(range(0, 3)).response_length(), 11);
        assert_eq!(ReadRegisters::holding(range(0, 125)).response_length(), 255);
    }

    #[test]
    fn count_is_limited_to_125() {
        assert_eq!(ReadRegisters::holding(range(0, 125)).validate(), Ok(()));
        assert_eq!(
            ReadRegisters::input(range(0, 126)).validate(),
            Err(InvalidRequest::CountTooBigForType(126, 125))
        );
    }

    #[test]
    fn registers_are_big_endian() {
        let request = ReadRegisters::input(range(8, 2));
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x04, 0x00, 0x0A, 0x01, 0x02])),
            Ok(vec![0x000A, 0x0102])
        );
        assert_eq!(
            ReadHoldingRegister::new(0x6B).parse_response(ReadCursor::new(&[0x02, 0x02, 0x2B])),
            Ok(0x022B)
        );
    }

    #[test]
    fn rejects_byte_count_that_does_not_match_request() {
        let request = ReadRegisters::holding(range(0, 2));
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x02, 0x00, 0x0A])),
            Err(RequestError::BadResponse(
                AduParseError::RequestByteCountMismatch(4, 2)
            ))
        );
    }

    #[test]
    fn rejects_truncated_register_data() {
        let request = ReadRegisters::holding(range(0, 2));
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x04, 0x00, 0x0A, 0x01])),
            Err(RequestError::BadResponse(AduParseError::InsufficientBytes))
        );
    }
}
