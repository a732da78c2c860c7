use crate::client::requests::Request;
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::decode::AppDecodeLevel;
use crate::error::RequestError;
use crate::serial::frame::constants::ADU_OVERHEAD;

use scursor::ReadCursor;

/// Read the eight exception status outputs of the slave, the request has no data
pub(crate) struct ReadExceptionStatus;

impl Serialize for ReadExceptionStatus {
    fn serialize(&self, _cursor: &mut WriteCursor) -> Result<(), RequestError> {
        Ok(())
    }
}

impl Loggable for ReadExceptionStatus {
    fn log(&self, _level: AppDecodeLevel, _f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Ok(())
    }
}

impl Request for ReadExceptionStatus {
    type Response = u8;

    fn function(&self) -> FunctionCode {
        FunctionCode::ReadExceptionStatus
    }

    fn response_length(&self) -> usize {
        ADU_OVERHEAD + 1
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<u8, RequestError> {
        let status = cursor.read_u8()?;
        cursor.expect_empty()?;
        Ok(status)
    }

    fn log_response(
        &self,
        response: &u8,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_values() {
            write!(f, "status: {response:#010b}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AduParseError;

    #[test]
    fn status_is_the_single_data_byte() {
        assert_eq!(ReadExceptionStatus.response_length(), 5);
        assert_eq!(
            ReadExceptionStatus.parse_response(ReadCursor::new(&[0x6D])),
            Ok(0x6D)
        );
        assert_eq!(
            ReadExceptionStatus.parse_response(ReadCursor::new(&[])),
            Err(RequestError::BadResponse(AduParseError::InsufficientBytes))
        );
    }
}
