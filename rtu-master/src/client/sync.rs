use tokio::runtime::Handle;

use crate::client::RtuClient;
use crate::error::RequestError;
use crate::types::{AddressRange, Indexed, RequestParam, WriteMultiple};

/// A wrapper around [`RtuClient`] that exposes a blocking API
///
/// Each call drives the async method to completion on the runtime the handle points to,
/// so blocking and async callers of the same client share its transaction ordering.
///
/// The runtime must be a multi-threaded one, and the methods must not be called from within
/// an async context.
#[derive(Clone, Debug)]
pub struct SyncClient {
    inner: RtuClient,
    runtime: Handle,
}

impl SyncClient {
    /// create a blocking client from an [`RtuClient`] and a handle to the runtime driving it
    pub fn new(inner: RtuClient, runtime: Handle) -> Self {
        Self { inner, runtime }
    }

    /// the async client this one wraps
    pub fn inner(&self) -> &RtuClient {
        &self.inner
    }

    /// see [`RtuClient::open`]
    pub fn open(&self) -> Result<(), RequestError> {
        self.runtime.block_on(self.inner.open())
    }

    /// see [`RtuClient::close`]
    pub fn close(&self) {
        self.runtime.block_on(self.inner.close())
    }

    /// see [`RtuClient::is_open`]
    pub fn is_open(&self) -> bool {
        self.runtime.block_on(self.inner.is_open())
    }

    /// see [`RtuClient::read_coils`]
    pub fn read_coils(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<bool>, RequestError> {
        self.runtime.block_on(self.inner.read_coils(param, range))
    }

    /// see [`RtuClient::read_discrete_inputs`]
    pub fn read_discrete_inputs(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<bool>, RequestError> {
        self.runtime
            .block_on(self.inner.read_discrete_inputs(param, range))
    }

    /// see [`RtuClient::read_holding_register`]
    pub fn read_holding_register(
        &self,
        param: RequestParam,
        address: u16,
    ) -> Result<u16, RequestError> {
        self.runtime
            .block_on(self.inner.read_holding_register(param, address))
    }

    /// see [`RtuClient::read_holding_registers`]
    pub fn read_holding_registers(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<u16>, RequestError> {
        self.runtime
            .block_on(self.inner.read_holding_registers(param, range))
    }

    /// see [`RtuClient::read_input_registers`]
    pub fn read_input_registers(
        &self,
        param: RequestParam,
        range: AddressRange,
    ) -> Result<Vec<u16>, RequestError> {
        self.runtime
            .block_on(self.inner.read_input_registers(param, range))
    }

    /// see [`RtuClient::write_single_coil`]
    pub fn write_single_coil(
        &self,
        param: RequestParam,
        value: Indexed<bool>,
    ) -> Result<Indexed<bool>, RequestError> {
        self.runtime
            .block_on(self.inner.write_single_coil(param, value))
    }

    /// see [`RtuClient::write_single_register`]
    pub fn write_single_register(
        &self,
        param: RequestParam,
        value: Indexed<u16>,
    ) -> Result<Indexed<u16>, RequestError> {
        self.runtime
            .block_on(self.inner.write_single_register(param, value))
    }

    /// see [`RtuClient::write_multiple_coils`]
    pub fn write_multiple_coils(
        &self,
        param: RequestParam,
        values: WriteMultiple<bool>,
    ) -> Result<AddressRange, RequestError> {
        self.runtime
            .block_on(self.inner.write_multiple_coils(param, values))
    }

    /// see [`RtuClient::write_multiple_registers`]
    pub fn write_multiple_registers(
        &self,
        param: RequestParam,
        values: WriteMultiple<u16>,
    ) -> Result<AddressRange, RequestError> {
        self.runtime
            .block_on(self.inner.write_multiple_registers(param, values))
    }

    /// see [`RtuClient::read_exception_status`]
    pub fn read_exception_status(&self, param: RequestParam) -> Result<u8, RequestError> {
        self.runtime.block_on(self.inner.read_exception_status(param))
    }

    /// see [`RtuClient::diagnostics_echo`]
    pub fn diagnostics_echo(
        &self,
        param: RequestParam,
        data: &[u8],
    ) -> Result<Vec<u8>, RequestError> {
        self.runtime
            .block_on(self.inner.diagnostics_echo(param, data))
    }
}
