use std::fmt::Display;

use crate::client::requests::Request;
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::{Loggable, Serialize};
use crate::decode::AppDecodeLevel;
use crate::error::{AduParseError, RequestError};
use crate::serial::frame::constants::ADU_OVERHEAD;
use crate::types::{coil_from_u16, coil_to_u16, Indexed};

use scursor::ReadCursor;

pub(crate) trait SingleWriteOperation: Sized + PartialEq + Copy + Send + Sync {
    const FUNCTION: FunctionCode;

    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError>;
    fn parse(cursor: &mut ReadCursor) -> Result<Self, RequestError>;
}

/// Write a single coil or register, the slave echoes the request
pub(crate) struct SingleWrite<T>
where
    T: SingleWriteOperation,
{
    request: T,
}

impl<T> SingleWrite<T>
where
    T: SingleWriteOperation,
{
    pub(crate) fn new(request: T) -> Self {
        Self { request }
    }
}

impl<T> Serialize for SingleWrite<T>
where
    T: SingleWriteOperation,
{
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        self.request.serialize(cursor)
    }
}

impl<T> Loggable for SingleWrite<T>
where
    T: SingleWriteOperation + Display,
{
    fn log(&self, level: AppDecodeLevel, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if level.data_values() {
            write!(f, "{}", self.request)?;
        }
        Ok(())
    }
}

impl<T> Request for SingleWrite<T>
where
    T: SingleWriteOperation + Display,
{
    type Response = T;

    fn function(&self) -> FunctionCode {
        T::FUNCTION
    }

    fn response_length(&self) -> usize {
        // address + value
        ADU_OVERHEAD + 4
    }

    fn parse_response(&self, mut cursor: ReadCursor) -> Result<T, RequestError> {
        let response = T::parse(&mut cursor)?;
        cursor.expect_empty()?;
        if self.request != response {
            return Err(AduParseError::ReplyEchoMismatch.into());
        }
        Ok(response)
    }

    fn log_response(
        &self,
        response: &T,
        level: AppDecodeLevel,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        if level.data_values() {
            write!(f, "{response}")?;
        }
        Ok(())
    }
}

impl SingleWriteOperation for Indexed<bool> {
    const FUNCTION: FunctionCode = FunctionCode::WriteSingleCoil;

    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(self.index)?;
        cursor.write_u16_be(coil_to_u16(self.value))?;
        Ok(())
    }

    fn parse(cursor: &mut ReadCursor) -> Result<Self, RequestError> {
        Ok(Indexed::new(
            cursor.read_u16_be()?,
            coil_from_u16(cursor.read_u16_be()?)?,
        ))
    }
}

impl SingleWriteOperation for Indexed<u16> {
    const FUNCTION: FunctionCode = FunctionCode::WriteSingleRegister;

    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), RequestError> {
        cursor.write_u16_be(self.index)?;
        cursor.write_u16_be(self.value)?;
        Ok(())
    }

    fn parse(cursor: &mut ReadCursor) -> Result<Self, RequestError> {
        Ok(Indexed::new(cursor.read_u16_be()?, cursor.read_u16_be()?))
    }
}
