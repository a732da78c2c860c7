use std::fmt::Display;

use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::decode::AppDecodeLevel;
use crate::error::{InvalidRequest, RequestError};
use crate::types::Indexed;

use scursor::ReadCursor;

pub(crate) mod diagnostics;
pub(crate) mod read_bits;
pub(crate) mod read_exception_status;
pub(crate) mod read_registers;
pub(crate) mod write_multiple;
pub(crate) mod write_single;

/// Everything the executor needs to know about one kind of request
pub(crate) trait Request: Serialize + Loggable + Send + Sync {
    type Response: Send;

    fn function(&self) -> FunctionCode;

    /// Checked before anything is written to the transport
    fn validate(&self) -> Result<(), InvalidRequest> {
        Ok(())
    }

    /// Size of the complete response ADU, unit id and CRC included
    fn response_length(&self) -> usize;

    /// Decode the function specific data of a response that passed frame validation
    fn parse_response(&self, cursor: ReadCursor) -> Result<Self::Response, RequestError>;

    fn log_response(
        &self,
        response: &Self::Response,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result;
}

pub(crate) struct ResponseDisplay<'a, R: Request> {
    request: &'a R,
    response: &'a R::Response,
    level: AppDecodeLevel,
}

impl<'a, R: Request> ResponseDisplay<'a, R> {
    pub(crate) fn new(request: &'a R, response: &'a R::Response, level: AppDecodeLevel) -> Self {
        Self {
            request,
            response,
            level,
        }
    }
}

impl<R: Request> Display for ResponseDisplay<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.request.log_response(self.response, self.level, f)
    }
}

/// one `idx: value` line per value, addresses counting up from `start`
pub(crate) fn log_indexed<T>(
    f: &mut std::fmt::Formatter,
    start: u16,
    values: &[T],
) -> std::fmt::Result
where
    T: Copy,
    Indexed<T>: Display,
{
    let mut index = start;
    for value in values {
        write!(f, "\n{}", Indexed::new(index, *value))?;
        index = index.wrapping_add(1);
    }
    Ok(())
}
