use crate::client::requests::Request;
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::constants::{diagnostics, limits};
use crate::decode::AppDecodeLevel;
use crate::error::{AduParseError, InvalidRequest, RequestError};
use crate::serial::frame::constants::ADU_OVERHEAD;

use scursor::ReadCursor;

/// Diagnostics "return query data": the slave sends the data back unchanged
pub(crate) struct DiagnosticsEcho {
    data: Vec<u8>,
}

impl DiagnosticsEcho {
    pub(crate) fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl Serialize for DiagnosticsEcho {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(diagnostics::RETURN_QUERY_DATA)?;
        cursor.write_bytes(&self.data)?;
        Ok(())
    }
}

impl Loggable for DiagnosticsEcho {
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "data len: {}", self.data.len())?;
        }
        if level.data_values() {
            write!(f, " {:02X?}", self.data)?;
        }
        Ok(())
    }
}

impl Request for DiagnosticsEcho {
    type Response = Vec<u8>;

    fn function(&self) -> FunctionCode {
        FunctionCode::DiagnosticsEcho
    }

    fn validate(&self) -> Result<(), InvalidRequest> {
        if self.data.len() > limits::MAX_DIAGNOSTIC_DATA {
            return Err(InvalidRequest::DataTooLong(
                self.data.len(),
                limits::MAX_DIAGNOSTIC_DATA,
            ));
        }
        Ok(())
    }

    fn response_length(&self) -> usize {
        // sub-function + echoed data
        ADU_OVERHEAD + 2 + self.data.len()
    }

    /// the echoed data is returned as is, comparing it with the request is up to the caller
    fn parse_response(&self, mut cursor: ReadCursor) -> Result<Vec<u8>, RequestError> {
        let sub_function = cursor.read_u16_be()?;
        if sub_function != diagnostics::RETURN_QUERY_DATA {
            return Err(AduParseError::UnexpectedSubFunction(sub_function).into());
        }
        let data = cursor.read_bytes(cursor.remaining())?;
        Ok(data.to_vec())
    }

    fn log_response(
        &self,
        response: &Vec<u8>,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_headers() {
            write!(f, "data len: {}", response.len())?;
        }
        if level.data_values() {
            write!(f, " {response:02X?}")?;
        }
        Ok(())
    }
}
