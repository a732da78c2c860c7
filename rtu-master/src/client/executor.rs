use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::Instrument;

use crate::client::requests::{Request, ResponseDisplay};
use crate::client::ClientConfig;
use crate::common::cursor::WriteCursor;
use crate::common::phys::PhysLayer;
use crate::common::traits::LoggableDisplay;
use crate::decode::DecodeLevel;
use crate::error::{InternalError, RequestError, TransportError};
use crate::serial::frame::constants::{EXCEPTION_FRAME_LENGTH, MAX_FRAME_LENGTH};
use crate::serial::frame::{format_rtu_adu, parse_response};
use crate::transport::Transport;
use crate::types::RequestParam;

/// Where a transaction stood when it ended
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Sending,
    AwaitingSettle,
    Reading,
    Validating,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Sending => "sending",
            Phase::AwaitingSettle => "awaiting settle",
            Phase::Reading => "reading",
            Phase::Validating => "validating",
        };
        f.write_str(name)
    }
}

/// Transport and the stream opened from it, guarded together
struct Channel {
    transport: Box<dyn Transport>,
    phys: Option<PhysLayer>,
    /// the last transaction failed in a way that can leave reply bytes on the line
    resync: bool,
}

/// Runs one request/response exchange at a time over a transport
pub(crate) struct Executor {
    channel: Mutex<Channel>,
    settle_delay: Duration,
    decode: DecodeLevel,
}

impl Executor {
    pub(crate) fn new(transport: Box<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            channel: Mutex::new(Channel {
                transport,
                phys: None,
                resync: false,
            }),
            settle_delay: config.settle_delay,
            decode: config.decode,
        }
    }

    pub(crate) async fn open(&self) -> Result<(), RequestError> {
        let mut channel = self.channel.lock().await;
        if channel.phys.is_some() {
            return Ok(());
        }
        let stream = channel.transport.open()?;
        channel.phys = Some(PhysLayer::new(stream));
        channel.resync = false;
        tracing::info!("{} open", channel.transport.describe());
        Ok(())
    }

    pub(crate) async fn close(&self) {
        let mut channel = self.channel.lock().await;
        if channel.phys.take().is_some() {
            channel.transport.close();
            tracing::info!("{} closed", channel.transport.describe());
        }
    }

    pub(crate) async fn is_open(&self) -> bool {
        self.channel.lock().await.phys.is_some()
    }

    /// Validate, frame, send and decode one request
    ///
    /// Callers queue on the channel lock, so transactions never interleave on the wire.
    pub(crate) async fn execute<R: Request>(
        &self,
        param: RequestParam,
        request: &R,
    ) -> Result<R::Response, RequestError> {
        let function = request.function();
        self.run(param, request)
            .instrument(tracing::info_span!("Transaction", unit = %param.id, function = %function))
            .await
    }

    async fn run<R: Request>(
        &self,
        param: RequestParam,
        request: &R,
    ) -> Result<R::Response, RequestError> {
        if let Err(err) = request.validate() {
            tracing::warn!("invalid request: {}", err);
            return Err(err.into());
        }

        let mut buffer = [0u8; MAX_FRAME_LENGTH];
        let mut cursor = WriteCursor::new(&mut buffer);
        format_rtu_adu(
            &mut cursor,
            param.id,
            request.function(),
            request,
            self.decode.frame,
        )?;

        if self.decode.app.enabled() {
            tracing::info!(
                "PDU TX - {} {}",
                request.function(),
                LoggableDisplay::new(request, self.decode.app)
            );
        }

        let mut channel = self.channel.lock().await;

        // taken for the duration of the transaction, a cancelled transaction drops it
        let mut phys = match channel.phys.take() {
            Some(phys) => phys,
            None => {
                tracing::warn!("{}", TransportError::NotOpen);
                return Err(TransportError::NotOpen.into());
            }
        };

        let quiet = if channel.resync {
            self.settle_delay + param.response_timeout
        } else {
            Duration::ZERO
        };

        let mut phase = Phase::Idle;
        let result = match self.discard_stale(&mut phys, quiet).await {
            Ok(()) => {
                self.transact(&mut phys, cursor.written(), param, request, &mut phase)
                    .await
            }
            Err(err) => Err(err),
        };
        channel.phys = Some(phys);
        channel.resync = matches!(
            result,
            Err(RequestError::ResponseTimeout
                | RequestError::ChecksumMismatch { .. }
                | RequestError::InvalidResponseLength { .. }
                | RequestError::BadResponse(_))
        );

        if let Err(err) = &result {
            tracing::warn!("request failed while {}: {}", phase, err);
        }

        result
    }

    /// Drop whatever a previous transaction left unread
    ///
    /// After a failed transaction the line is watched for `quiet`, which also drops a reply
    /// that arrived after its timeout.
    async fn discard_stale(
        &self,
        phys: &mut PhysLayer,
        quiet: Duration,
    ) -> Result<(), RequestError> {
        let count = phys.discard_input(quiet, self.decode.physical).await?;
        if count > 0 {
            tracing::warn!("discarded {} stale bytes before the request", count);
        }
        Ok(())
    }

    async fn transact<R: Request>(
        &self,
        phys: &mut PhysLayer,
        frame: &[u8],
        param: RequestParam,
        request: &R,
        phase: &mut Phase,
    ) -> Result<R::Response, RequestError> {
        *phase = Phase::Sending;
        phys.write(frame, self.decode.physical).await?;

        *phase = Phase::AwaitingSettle;
        tokio::time::sleep(self.settle_delay).await;

        *phase = Phase::Reading;
        let expected = request.response_length();
        let mut buffer = [0u8; MAX_FRAME_LENGTH];
        let response = buffer
            .get_mut(..expected)
            .ok_or(InternalError::BadByteCount(expected))?;
        let length = self
            .read_response(phys, response, param.response_timeout)
            .await?;

        *phase = Phase::Validating;
        let frame = response.get(..length).unwrap_or_default();
        let cursor = parse_response(frame, param.id, request.function(), self.decode.frame)?;
        let value = request.parse_response(cursor)?;

        if self.decode.app.enabled() {
            tracing::info!(
                "PDU RX - {} {}",
                request.function(),
                ResponseDisplay::new(request, &value, self.decode.app)
            );
        }

        Ok(value)
    }

    /// Read `buffer.len()` bytes, stopping early only for an exception reply
    ///
    /// The header of every response fits in the size of an exception frame, so that much
    /// is read first. If the function code carries the exception bit the frame is complete.
    async fn read_response(
        &self,
        phys: &mut PhysLayer,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, RequestError> {
        let deadline = Instant::now() + timeout;
        let expected = buffer.len();
        let (head, tail) = buffer.split_at_mut(EXCEPTION_FRAME_LENGTH.min(expected));

        phys.read_exact(head, timeout, self.decode.physical).await?;

        let is_exception = matches!(head.get(1), Some(function) if function & 0x80 != 0);
        if is_exception || tail.is_empty() {
            return Ok(head.len());
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        phys.read_exact(tail, remaining, self.decode.physical)
            .await?;
        Ok(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::requests::read_bits::ReadBits;
    use crate::client::requests::read_registers::ReadHoldingRegister;
    use crate::client::requests::write_single::SingleWrite;
    use crate::error::AduParseError;
    use crate::exception::ExceptionCode;
    use crate::transport::StreamTransport;
    use crate::types::{AddressRange, Indexed, UnitId};

    fn param() -> RequestParam {
        RequestParam::new(UnitId::new(0x2A), Duration::from_secs(1))
    }

    async fn executor(mock: tokio_test::io::Mock) -> Executor {
        let executor = Executor::new(
            Box::new(StreamTransport::new(mock)),
            ClientConfig::default(),
        );
        executor.open().await.unwrap();
        executor
    }

    #[tokio::test(start_paused = true)]
    async fn reads_coils_from_known_frames() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x01, 0x00, 0x10, 0x00, 0x13, 0x7A, 0x19])
            .wait(Duration::from_millis(100))
            .read(&[0x2A, 0x01, 0x03, 0xCD, 0x6B, 0x05, 0x44, 0x99])
            .build();
        let executor = executor(mock).await;

        let request = ReadBits::coils(AddressRange::try_from(0x10, 0x13).unwrap());
        let values = executor.execute(param(), &request).await.unwrap();

        assert_eq!(values.len(), 0x13);
        // 0xCD = 1100_1101
        assert_eq!(&values[..8], &[true, false, true, true, false, false, true, true]);
        // 0x05 = 0000_0101, only three bits are requested from the last byte
        assert_eq!(&values[16..], &[true, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_settle_delay_before_reading() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x06, 0x00, 0x10, 0x12, 0x34, 0x83, 0x63])
            .read(&[0x2A, 0x06, 0x00, 0x10, 0x12, 0x34, 0x83, 0x63])
            .build();
        let executor = executor(mock).await;

        let start = Instant::now();
        let echo = executor
            .execute(param(), &SingleWrite::new(Indexed::new(0x10, 0x1234u16)))
            .await
            .unwrap();
        assert_eq!(echo, Indexed::new(0x10, 0x1234));
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_the_response_is_short() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x03, 0x00, 0x10, 0x00, 0x01, 0x83, 0xD4])
            .read(&[0x2A, 0x03, 0x02, 0x00, 0x00])
            .wait(Duration::from_secs(2))
            .build();
        let executor = executor(mock).await;

        let result = executor
            .execute(param(), &ReadHoldingRegister::new(0x10))
            .await;
        assert_eq!(result, Err(RequestError::ResponseTimeout));
        // a timeout is not a transport failure
        assert!(executor.is_open().await);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_is_discarded_before_the_next_request() {
        let request = [0x2A, 0x03, 0x00, 0x10, 0x00, 0x01, 0x83, 0xD4];
        let mock = tokio_test::io::Builder::new()
            .write(&request)
            .wait(Duration::from_millis(1500))
            .read(&response_frame(&[0x2A, 0x03, 0x02, 0x11, 0x11]))
            .write(&request)
            .read(&response_frame(&[0x2A, 0x03, 0x02, 0x22, 0x22]))
            .build();
        let executor = executor(mock).await;

        assert_eq!(
            executor
                .execute(param(), &ReadHoldingRegister::new(0x10))
                .await,
            Err(RequestError::ResponseTimeout)
        );
        assert_eq!(
            executor
                .execute(param(), &ReadHoldingRegister::new(0x10))
                .await,
            Ok(0x2222)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stops_reading_at_an_exception_frame() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x01, 0x00, 0x10, 0x00, 0x13, 0x7A, 0x19])
            .read(&exception_frame(0x2A, 0x81, 0x02))
            .build();
        let executor = executor(mock).await;

        let request = ReadBits::coils(AddressRange::try_from(0x10, 0x13).unwrap());
        assert_eq!(
            executor.execute(param(), &request).await,
            Err(RequestError::Exception(ExceptionCode::IllegalDataAddress))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn corrupted_response_is_a_checksum_mismatch() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x01, 0x00, 0x10, 0x00, 0x13, 0x7A, 0x19])
            .read(&[0x2A, 0x01, 0x03, 0xCD, 0x6B, 0x05, 0x44, 0x98])
            .build();
        let executor = executor(mock).await;

        let request = ReadBits::coils(AddressRange::try_from(0x10, 0x13).unwrap());
        assert!(matches!(
            executor.execute(param(), &request).await,
            Err(RequestError::ChecksumMismatch {
                received: 0x9844,
                expected: 0x9944
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_requests_are_never_written() {
        // the mock fails the test if anything is written to it
        let executor = executor(tokio_test::io::Builder::new().build()).await;

        let request = ReadBits::coils(AddressRange::try_from(0, 2001).unwrap());
        assert!(matches!(
            executor.execute(param(), &request).await,
            Err(RequestError::BadRequest(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn fails_when_not_open() {
        let (stream, _other) = tokio::io::duplex(64);
        let executor = Executor::new(
            Box::new(StreamTransport::new(stream)),
            ClientConfig::default(),
        );

        let result = executor
            .execute(param(), &ReadHoldingRegister::new(0))
            .await;
        assert_eq!(
            result,
            Err(RequestError::Transport(TransportError::NotOpen))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reply_from_other_unit_is_rejected() {
        let mock = tokio_test::io::Builder::new()
            .write(&[0x2A, 0x03, 0x00, 0x10, 0x00, 0x01, 0x83, 0xD4])
            .read(&response_frame(&[0x01, 0x03, 0x02, 0x12, 0x34]))
            .build();
        let executor = executor(mock).await;

        assert_eq!(
            executor
                .execute(param(), &ReadHoldingRegister::new(0x10))
                .await,
            Err(RequestError::BadResponse(AduParseError::UnexpectedUnitId(
                0x2A, 0x01
            )))
        );
    }

    fn exception_frame(unit: u8, function: u8, code: u8) -> Vec<u8> {
        response_frame(&[unit, function, code])
    }

    fn response_frame(body: &[u8]) -> Vec<u8> {
        let mut frame = body.to_vec();
        frame.extend_from_slice(&crate::common::crc::compute(body).to_le_bytes());
        frame
    }
}
