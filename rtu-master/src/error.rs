use crate::exception::ExceptionCode;

/// Top level error type for a Modbus RTU transaction
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The byte channel could not be used (open/write/read failure)
    Transport(TransportError),
    /// The expected number of bytes was not received within the response timeout
    ResponseTimeout,
    /// The byte stream ended before the expected number of bytes was received
    InvalidResponseLength {
        /// number of bytes the response should have occupied
        expected: usize,
        /// number of bytes actually received
        actual: usize,
    },
    /// CRC verification of the response failed, the response was discarded
    ChecksumMismatch {
        /// CRC carried in the two trailing bytes of the response
        received: u16,
        /// CRC computed over the rest of the response
        expected: u16,
    },
    /// The slave replied with a Modbus exception
    Exception(ExceptionCode),
    /// Request parameters were invalid, nothing was transmitted
    BadRequest(InvalidRequest),
    /// The response passed the CRC check but was malformed
    BadResponse(AduParseError),
    /// An internal error occurred while serializing a request
    Internal(InternalError),
}

impl std::error::Error for RequestError {}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RequestError::Transport(err) => write!(f, "transport error: {err}"),
            RequestError::ResponseTimeout => {
                f.write_str("timeout occurred before receiving a response from the slave")
            }
            RequestError::InvalidResponseLength { expected, actual } => write!(
                f,
                "response length ({actual}) does not match the expected length ({expected})"
            ),
            RequestError::ChecksumMismatch { received, expected } => write!(
                f,
                "received CRC {received:#06X} does not match the computed CRC {expected:#06X}"
            ),
            RequestError::Exception(ex) => write!(f, "Modbus exception: {ex}"),
            RequestError::BadRequest(err) => write!(f, "{err}"),
            RequestError::BadResponse(err) => write!(f, "{err}"),
            RequestError::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        RequestError::Transport(err)
    }
}

impl From<std::io::Error> for RequestError {
    fn from(err: std::io::Error) -> Self {
        RequestError::Transport(TransportError::Io(err.kind()))
    }
}

impl From<tokio::time::error::Elapsed> for RequestError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        RequestError::ResponseTimeout
    }
}

impl From<ExceptionCode> for RequestError {
    fn from(ex: ExceptionCode) -> Self {
        RequestError::Exception(ex)
    }
}

impl From<InvalidRequest> for RequestError {
    fn from(err: InvalidRequest) -> Self {
        RequestError::BadRequest(err)
    }
}

impl From<InvalidRange> for RequestError {
    fn from(err: InvalidRange) -> Self {
        RequestError::BadRequest(InvalidRequest::BadRange(err))
    }
}

impl From<AduParseError> for RequestError {
    fn from(err: AduParseError) -> Self {
        RequestError::BadResponse(err)
    }
}

impl From<scursor::ReadError> for AduParseError {
    fn from(_: scursor::ReadError) -> Self {
        AduParseError::InsufficientBytes
    }
}

impl From<scursor::TrailingBytes> for AduParseError {
    fn from(x: scursor::TrailingBytes) -> Self {
        AduParseError::TrailingBytes(x.count.get())
    }
}

impl From<scursor::ReadError> for RequestError {
    fn from(err: scursor::ReadError) -> Self {
        RequestError::BadResponse(err.into())
    }
}

impl From<scursor::TrailingBytes> for RequestError {
    fn from(err: scursor::TrailingBytes) -> Self {
        RequestError::BadResponse(err.into())
    }
}

impl From<InternalError> for RequestError {
    fn from(err: InternalError) -> Self {
        RequestError::Internal(err)
    }
}

/// Failures of the byte channel itself
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport is not open (never opened, closed, or reset by a cancelled transaction)
    NotOpen,
    /// Opening the transport failed
    Open(std::io::ErrorKind),
    /// A read or write on the open transport failed
    Io(std::io::ErrorKind),
}

impl std::error::Error for TransportError {}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TransportError::NotOpen => f.write_str("transport is not open"),
            TransportError::Open(kind) => write!(f, "unable to open transport: {kind}"),
            TransportError::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

/// Errors that result because of bad request parameters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    /// Request contained an invalid range
    BadRange(InvalidRange),
    /// Count is too big to fit in a u16
    CountTooBigForU16(usize),
    /// Count too big for specific request
    CountTooBigForType(u16, u16),
    /// Diagnostic payload is larger than a frame can carry
    DataTooLong(usize, usize),
}

impl std::error::Error for InvalidRequest {}

impl std::fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InvalidRequest::BadRange(err) => write!(f, "{err}"),
            InvalidRequest::CountTooBigForU16(count) => write!(
                f,
                "the requested count of objects exceeds the maximum value of u16: {count}"
            ),
            InvalidRequest::CountTooBigForType(count, max) => write!(
                f,
                "the request count of {count} exceeds maximum allowed count of {max} for this type"
            ),
            InvalidRequest::DataTooLong(len, max) => write!(
                f,
                "diagnostic data of {len} bytes exceeds the maximum of {max} bytes"
            ),
        }
    }
}

impl From<InvalidRange> for InvalidRequest {
    fn from(x: InvalidRange) -> Self {
        InvalidRequest::BadRange(x)
    }
}

/// Errors that can be produced when validating start/count
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidRange {
    /// Count of zero not allowed
    CountOfZero,
    /// Address in range overflows u16
    AddressOverflow(u16, u16),
}

impl std::error::Error for InvalidRange {}

impl std::fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InvalidRange::CountOfZero => f.write_str("range contains count == 0"),
            InvalidRange::AddressOverflow(start, count) => write!(
                f,
                "start == {start} and count = {count} would overflow the representation of u16"
            ),
        }
    }
}

/// Errors that occur while parsing a response that passed the CRC check
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AduParseError {
    /// Response is too short to be valid
    InsufficientBytes,
    /// Byte count doesn't match what is expected based on request
    RequestByteCountMismatch(usize, usize),
    /// Response contains extra trailing bytes
    TrailingBytes(usize),
    /// A parameter expected to be echoed in the reply did not match
    ReplyEchoMismatch,
    /// The response came from a different unit id than the one addressed
    UnexpectedUnitId(u8, u8),
    /// An unknown response function code was received
    UnknownResponseFunction(u8, u8, u8),
    /// Bad value for the coil state
    UnknownCoilState(u16),
    /// Diagnostic reply carried a different sub-function
    UnexpectedSubFunction(u16),
}

impl std::error::Error for AduParseError {}

impl std::fmt::Display for AduParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AduParseError::InsufficientBytes => f.write_str("response is too short to be valid"),
            AduParseError::RequestByteCountMismatch(request, response) => write!(
                f,
                "byte count ({response}) doesn't match what is expected based on request ({request})"
            ),
            AduParseError::TrailingBytes(remaining) => {
                write!(f, "response contains {remaining} extra trailing bytes")
            }
            AduParseError::ReplyEchoMismatch => {
                f.write_str("a parameter expected to be echoed in the reply did not match")
            }
            AduParseError::UnexpectedUnitId(expected, actual) => write!(
                f,
                "response from unit id {actual:#04X} while addressing unit id {expected:#04X}"
            ),
            AduParseError::UnknownResponseFunction(actual, expected, error) => write!(
                f,
                "received unknown response function code: {actual}. Expected {expected} or {error}"
            ),
            AduParseError::UnknownCoilState(value) => write!(
                f,
                "received coil state with unspecified value: {value:#06X}"
            ),
            AduParseError::UnexpectedSubFunction(value) => write!(
                f,
                "diagnostic reply carried sub-function {value:#06X} instead of return query data"
            ),
        }
    }
}

/// Errors that should only occur if there is a logic error in the library
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// Insufficient space for write operation
    InsufficientWriteSpace(usize, usize), // written vs remaining space
    /// Attempted to read more bytes than present
    InsufficientBytesForRead(usize, usize), // requested vs remaining
    /// Byte count would exceed maximum allowed size in the ADU of u8
    BadByteCount(usize),
}

impl std::error::Error for InternalError {}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InternalError::InsufficientWriteSpace(written, remaining) => write!(
                f,
                "attempted to write {written} bytes with {remaining} bytes remaining"
            ),
            InternalError::InsufficientBytesForRead(requested, remaining) => write!(
                f,
                "attempted to read {requested} bytes with only {remaining} remaining"
            ),
            InternalError::BadByteCount(size) => write!(
                f,
                "Byte count of in ADU {size} exceeds maximum size of u8"
            ),
        }
    }
}
