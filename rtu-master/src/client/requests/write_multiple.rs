use crate::client::requests::{log_indexed, Request};
use crate::common::bits::{num_bytes_for_bits, pack_bits};
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::constants::limits;
use crate::decode::AppDecodeLevel;
use crate::error::{AduParseError, InternalError, InvalidRequest, RequestError};
use crate::serial::frame::constants::ADU_OVERHEAD;
use crate::types::{AddressRange, WriteMultiple};

use scursor::ReadCursor;

pub(crate) trait MultipleWriteOperation: Copy + Send + Sync {
    const FUNCTION: FunctionCode;
    const MAX_COUNT: u16;

    fn byte_count(count: u16) -> usize;
    fn serialize_values(values: &[Self], cursor: &mut WriteCursor) -> Result<(), RequestError>;
    fn log_values(start: u16, values: &[Self], f: &mut std::fmt::Formatter) -> std::fmt::Result;
}

/// Write a block of coils or registers, the slave echoes start and count
pub(crate) struct MultipleWrite<T> {
    request: WriteMultiple<T>,
}

impl<T> MultipleWrite<T>
where
    T: MultipleWriteOperation,
{
    pub(crate) fn new(request: WriteMultiple<T>) -> Self {
        Self { request }
    }
}

impl<T> Serialize for MultipleWrite<T>
where
    T: MultipleWriteOperation,
{
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        let range = self.request.range;
        let byte_count = T::byte_count(range.count);
        let byte_count =
            u8::try_from(byte_count).map_err(|_| InternalError::BadByteCount(byte_count))?;
        cursor.write_u16_be(range.start)?;
        cursor.write_u16_be(range.count)?;
        cursor.write_u8(byte_count)?;
        T::serialize_values(&self.request.values, cursor)
    }
}

impl<T> Loggable for MultipleWrite<T>
where
    T: MultipleWriteOperation,
{
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "{}", self.request.range)?;
        }
        if level.data_values() {
            T::log_values(self.request.range.start, &self.request.values, f)?;
        }
        Ok(())
    }
}

impl<T> Request for MultipleWrite<T>
where
    T: MultipleWriteOperation,
{
    type Response = AddressRange;

    fn function(&self) -> FunctionCode {
        T::FUNCTION
    }

    fn validate(&self) -> Result<(), InvalidRequest> {
        self.request.range.limited_count(T::MAX_COUNT)?;
        Ok(())
    }

    fn response_length(&self) -> usize {
        // start + count
        ADU_OVERHEAD + 4
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<AddressRange, RequestError> {
        let start = cursor.read_u16_be()?;
        let count = cursor.read_u16_be()?;
        cursor.expect_empty()?;
        let range = self.request.range;
        if start != range.start || count != range.count {
            return Err(AduParseError::ReplyEchoMismatch.into());
        }
        Ok(range)
    }

    fn log_response(
        &self,
        response: &AddressRange,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "{response}")?;
        }
        Ok(())
    }
}

impl MultipleWriteOperation for bool {
    const FUNCTION: FunctionCode = FunctionCode::WriteMultipleCoils;
    const MAX_COUNT: u16 = limits::MAX_WRITE_COILS_COUNT;

    fn byte_count(count: u16) -> usize {
        num_bytes_for_bits(count)
    }

    fn serialize_values(values: &[Self], cursor: &mut WriteCursor) -> Result<(), RequestError> {
        for byte in pack_bits(values) {
            cursor.write_u8(byte)?;
        }
        Ok(())
    }

    fn log_values(start: u16, values: &[Self], f: &mut std::fmt::Formatter) -> std::fmt::Result {
        log_indexed(f, start, values)
    }
}

impl MultipleWriteOperation for u16 {
    const FUNCTION: FunctionCode = FunctionCode::WriteMultipleRegisters;
    const MAX_COUNT: u16 = limits::MAX_WRITE_REGISTERS_COUNT;

    fn byte_count(count: u16) -> usize {
        2 * count as usize
    }

    fn serialize_values(values: &[Self], cursor: &mut WriteCursor) -> Result<(), RequestError> {
        for value in values {
            cursor.write_u16_be(*value)?;
        }
        Ok(())
    }

    fn log_values(start: u16, values: &[Self], f: &mut std::fmt::Formatter) -> std::fmt::Result {
        log_indexed(f, start, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize<T: MultipleWriteOperation>(request: &MultipleWrite<T>) -> Vec<u8> {
        let mut buffer = [0u8; 256];
        let mut cursor = WriteCursor::new(&mut buffer);
        request.serialize(&mut cursor).unwrap();
        cursor.written().to_vec()
    }

    #[test]
    fn packs_coils_lsb_first_with_zero_padding() {
        let values = vec![
            true, false, true, true, false, false, true, true, true, false,
        ];
        let request = MultipleWrite::new(WriteMultiple::from(0x0013, values).unwrap());
        assert_eq!(
            serialize(&request),
            vec![0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01]
        );
    }

    #[test]
    fn writes_registers_big_endian() {
        let request = MultipleWrite::new(WriteMultiple::from(0x0001, vec![0x000Au16, 0x0102]).unwrap());
        assert_eq!(
            serialize(&request),
            vec![0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]
        );
    }

    #[test]
    fn counts_are_limited_per_type() {
        let coils = MultipleWrite::new(WriteMultiple::from(0, vec![true; 1968]).unwrap());
        assert_eq!(coils.validate(), Ok(()));
        assert_eq!(serialize(&coils).len(), 5 + 246);

        let coils = MultipleWrite::new(WriteMultiple::from(0, vec![true; 1969]).unwrap());
        assert_eq!(
            coils.validate(),
            Err(InvalidRequest::CountTooBigForType(1969, 1968))
        );

        let registers = MultipleWrite::new(WriteMultiple::from(0, vec![0u16; 124]).unwrap());
        assert_eq!(
            registers.validate(),
            Err(InvalidRequest::CountTooBigForType(124, 123))
        );
    }

    #[test]
    fn echo_must_match_start_and_count() {
        let request = MultipleWrite::new(WriteMultiple::from(0x0001, vec![1u16, 2]).unwrap());
        assert_eq!(request.response_length(), 8);
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x00, 0x01, 0x00, 0x02])),
            Ok(AddressRange::try_from(1, 2).unwrap())
        );
        assert_eq!(
            request.parse_response(ReadCursor::new(&[0x00, 0x01, 0x00, 0x03])),
            Err(RequestError::BadResponse(AduParseError::ReplyEchoMismatch))
        );
    }
}
