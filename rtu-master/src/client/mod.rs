use std::sync::Arc;
use std::time::Duration;

use crate::client::executor::Executor;
use crate::client::requests::diagnostics::DiagnosticsEcho;
use crate::client::requests::read_bits::ReadBits;
use crate::client::requests::read_exception_status::ReadExceptionStatus;
use crate::client::requests::read_registers::{ReadHoldingRegister, ReadRegisters};
use crate::client::requests::write_multiple::MultipleWrite;
use crate::client::requests::write_single::SingleWrite;
use crate::decode::DecodeLevel;
use crate::error::RequestError;
use crate::transport::Transport;
use crate::types::{AddressRange, Indexed, RequestParam, WriteMultiple};

mod executor;
pub(crate) mod requests;
mod sync;

pub use sync::SyncClient;

/// Default pause between writing a request and reading the response
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Settings shared by every transaction of a client
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Fixed wait between the end of the write and the start of the read
    pub settle_delay: Duration,
    /// Decode level applied to all traffic
    pub decode: DecodeLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            decode: DecodeLevel::default(),
        }
    }
}

impl ClientConfig {
    /// Change the settle delay
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Change the decode level
    pub fn with_decode(mut self, decode: DecodeLevel) -> Self {
        self.decode = decode;
        self
    }
}

/// Asynchronous Modbus RTU master
///
/// Clones share the same transport. Requests issued concurrently, from any clone or from a
/// [`SyncClient`] built on top of it, are executed one after the other in the order they
/// acquire the channel.
///
/// Every method validates its arguments before anything is written and returns
/// [`RequestError::BadRequest`] without touching the transport when they are out of range.
#[derive(Clone)]
pub struct RtuClient {
    executor: Arc<Executor>,
}

impl std::fmt::Debug for RtuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("RtuClient")
    }
}

impl RtuClient {
    /// Create a client over a transport. The transport is not opened until [`RtuClient::open`].
    pub fn new(transport: Box<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            executor: Arc::new(Executor::new(transport, config)),
        }
    }

    /// Create a client for a serial port, the port is not opened yet
    #[cfg(feature = "serial")]
    pub fn serial(path: &str, settings: crate::serial::SerialSettings, config: ClientConfig) -> Self {
        Self::new(
            Box::new(crate::serial::SerialTransport::new(path, settings)),
            config,
        )
    }

    /// Open the transport. Does nothing if it is already open.
    pub async fn open(&self) -> Result<(), RequestError> {
        self.executor.open().await
    }

    /// Close the transport, waiting for a transaction in progress to finish first
    pub async fn close(&self) {
        self.executor.close().await
    }

    /// True if the transport is open
    pub async fn is_open(&self) -> bool {
        self.executor.is_open().await
    }

    /// Read coils (0x01)
    pub async fn read_coils(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<bool>, RequestError> {
        self.executor.execute(param, &ReadBits::coils(range)).await
    }

    /// Read discrete inputs (0x02)
    pub async fn read_discrete_inputs(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<bool>, RequestError> {
        self.executor
            .execute(param, &ReadBits::discrete_inputs(range))
            .await
    }

    /// Read one holding register (0x03 with a count of 1)
    pub async fn read_holding_register(
        &self,
        param: RequestParam,
        address: u16,
    ) -> Result<u16, RequestError> {
        self.executor
            .execute(param, &ReadHoldingRegister::new(address))
            .await
    }

    /// Read holding registers (0x03)
    pub async fn read_holding_registers(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<u16>, RequestError> {
        self.executor
            .execute(param, &ReadRegisters::holding(range))
            .await
    }

    /// Read input registers (0x04)
    pub async fn read_input_registers(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<u16>, RequestError> {
        self.executor
            .execute(param, &ReadRegisters::input(range))
            .await
    }

    /// Write a single coil (0x05), returns the echo from the slave
    pub async fn write_single_coil(
        &self,
        param: RequestParam,
        value: Indexed<bool>,
    ) -> Result<Indexed<bool>, RequestError> {
        self.executor.execute(param, &SingleWrite::new(value)).await
    }

    /// Write a single register (0x06), returns the echo from the slave
    pub async fn write_single_register(
        &self,
        param: RequestParam,
        value: Indexed<u16>,
    ) -> Result<Indexed<u16>, RequestError> {
        self.executor.execute(param, &SingleWrite::new(value)).await
    }

    /// Write multiple coils (0x0F), returns the range echoed by the slave
    pub async fn write_multiple_coils(
        &self,
        param: RequestParam,
        values: WriteMultiple<bool>,
    ) -> Result<AddressRange, RequestError> {
        self.executor
            .execute(param, &MultipleWrite::new(values))
            .await
    }

    /// Write multiple registers (0x10), returns the range echoed by the slave
    pub async fn write_multiple_registers(
        &self,
        param: RequestParam,
        values: WriteMultiple<u16>,
    ) -> Result<AddressRange, RequestError> {
        self.executor
            .execute(param, &MultipleWrite::new(values))
            .await
    }

    /// Read exception status (0x07)
    pub async fn read_exception_status(&self, param: RequestParam) -> Result<u8, RequestError> {
        self.executor.execute(param, &ReadExceptionStatus).await
    }

    /// Diagnostics "return query data" (0x08 / 0x0000)
    ///
    /// Returns the data echoed by the slave without comparing it to `data`.
    pub async fn diagnostics_echo(
        &self,
        param: RequestParam,
        data: &[u8],
    ) -> Result<Vec<u8>, RequestError> {
        self.executor
            .execute(param, &DiagnosticsEcho::new(data))
            .await
    }
}
