use crate::common::crc;
use crate::common::cursor::WriteCursor;
use crate::common::function::FunctionCode;
use crate::common::traits::Serialize;
use crate::decode::FrameDecodeLevel;
use crate::error::{AduParseError, RequestError};
use crate::types::UnitId;

use scursor::ReadCursor;

pub(crate) mod constants {
    pub(crate) const HEADER_LENGTH: usize = 1;
    pub(crate) const FUNCTION_CODE_LENGTH: usize = 1;
    pub(crate) const CRC_LENGTH: usize = crate::common::crc::CRC_LENGTH;
    /// maximum size of a serial line ADU
    pub(crate) const MAX_FRAME_LENGTH: usize = 256;
    /// unit id, function | 0x80, exception code, crc
    pub(crate) const EXCEPTION_FRAME_LENGTH: usize =
        HEADER_LENGTH + FUNCTION_CODE_LENGTH + 1 + CRC_LENGTH;
    /// fixed overhead of every ADU around the function specific data
    pub(crate) const ADU_OVERHEAD: usize = HEADER_LENGTH + FUNCTION_CODE_LENGTH + CRC_LENGTH;
}

/// Write `unit id | function | payload | crc` into the cursor
///
/// The CRC covers every byte written by this call before it and is appended low byte first.
pub(crate) fn format_rtu_adu(
    cursor: &mut WriteCursor,
    unit_id: UnitId,
    function: FunctionCode,
    msg: &dyn Serialize,
    decode_level: FrameDecodeLevel,
) -> Result<u16, RequestError> {
    let start_frame = cursor.position();
    cursor.write_u8(unit_id.value)?;
    cursor.write_u8(function.get_value())?;
    msg.serialize(cursor)?;
    let end_pdu = cursor.position();

    let crc = crc::compute(cursor.written().get(start_frame..).unwrap_or_default());
    crc::append(cursor, crc)?;

    if decode_level.enabled() {
        if let Some(payload) = cursor
            .written()
            .get(start_frame + constants::HEADER_LENGTH..end_pdu)
        {
            tracing::info!(
                "RTU TX - {}",
                RtuDisplay::new(decode_level, unit_id, payload, crc)
            );
        }
    }

    Ok(crc)
}

/// Validate a complete response frame and return a cursor over the function specific data
///
/// Checks run in a fixed order: CRC, unit id, then the function code. A reply carrying
/// `function | 0x80` is turned into [`RequestError::Exception`].
pub(crate) fn parse_response<'a>(
    frame: &'a [u8],
    unit_id: UnitId,
    function: FunctionCode,
    decode_level: FrameDecodeLevel,
) -> Result<ReadCursor<'a>, RequestError> {
    if frame.len() < constants::ADU_OVERHEAD {
        return Err(AduParseError::InsufficientBytes.into());
    }

    let (body, _) = frame.split_at(frame.len() - constants::CRC_LENGTH);
    let received_crc = crc::read_trailing(frame).ok_or(AduParseError::InsufficientBytes)?;
    let expected_crc = crc::compute(body);

    if received_crc != expected_crc {
        return Err(RequestError::ChecksumMismatch {
            received: received_crc,
            expected: expected_crc,
        });
    }

    let mut cursor = ReadCursor::new(body);
    let received_unit_id = cursor.read_u8()?;
    if received_unit_id != unit_id.value {
        return Err(AduParseError::UnexpectedUnitId(unit_id.value, received_unit_id).into());
    }

    if decode_level.enabled() {
        if let Some(payload) = body.get(constants::HEADER_LENGTH..) {
            tracing::info!(
                "RTU RX - {}",
                RtuDisplay::new(decode_level, unit_id, payload, received_crc)
            );
        }
    }

    let function_code = cursor.read_u8()?;
    if function_code == function.get_value() {
        return Ok(cursor);
    }

    if function_code == function.as_error() {
        let exception = cursor.read_u8()?;
        cursor.expect_empty()?;
        return Err(RequestError::Exception(exception.into()));
    }

    Err(AduParseError::UnknownResponseFunction(
        function_code,
        function.get_value(),
        function.as_error(),
    )
    .into())
}

pub(crate) struct RtuDisplay<'a> {
    level: FrameDecodeLevel,
    unit_id: UnitId,
    payload: &'a [u8],
    crc: u16,
}

impl<'a> RtuDisplay<'a> {
    pub(crate) fn new(
        level: FrameDecodeLevel,
        unit_id: UnitId,
        payload: &'a [u8],
        crc: u16,
    ) -> Self {
        RtuDisplay {
            level,
            unit_id,
            payload,
            crc,
        }
    }
}

impl std::fmt::Display for RtuDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "unit: {} crc: {:#06X} (payload len = {})",
            self.unit_id,
            self.crc,
            self.payload.len(),
        )?;
        if self.level.payload_enabled() {
            crate::common::phys::format_bytes(f, self.payload)?;
        }
        Ok(())
    }
}
