//! A [Modbus](http://modbus.org/) RTU master using [Tokio](https://docs.rs/tokio) and Rust's
//! `async/await` syntax, with a blocking wrapper for code that does not run inside a runtime.
//!
//! # Features
//!
//! * Panic-free parsing
//! * Every request is validated before anything is written to the line
//! * Responses are checked in a fixed order: CRC first, then unit id, then function code
//! * One transaction at a time per client, whether callers are async tasks or blocking threads
//! * Pluggable transport: a serial port through `tokio-serial` (feature `serial`, on by default)
//!   or any `AsyncRead + AsyncWrite` stream
//!
//! # Transaction model
//!
//! A request is framed as `unit id | function | data | CRC-16` (CRC low byte first) and
//! written to the transport. The master then waits a fixed settle delay and reads exactly the
//! number of bytes the response to that request occupies, under a per-request timeout. There
//! is no inter-character timing, no retry and no pipelining.
//!
//! # Supported Functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil
//! * Write Single Register
//! * Read Exception Status
//! * Diagnostics (return query data)
//! * Write Multiple Coils
//! * Write Multiple Registers
//!
//! # Example
//!
//! Poll some coils every three seconds
//!
//! ```no_run
//! use rtu_master::prelude::*;
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RtuClient::serial(
//!         "/dev/ttyUSB0",
//!         SerialSettings::default(),
//!         ClientConfig::default(),
//!     );
//!     client.open().await?;
//!
//!     let param = RequestParam::new(UnitId::new(0x01), Duration::from_secs(1));
//!
//!     loop {
//!         match client
//!             .read_coils(param, AddressRange::try_from(0, 5)?)
//!             .await
//!         {
//!             Ok(values) => {
//!                 for (index, value) in values.iter().enumerate() {
//!                     println!("index: {index} value: {value}")
//!                 }
//!             }
//!             Err(err) => println!("Error: {err}"),
//!         }
//!
//!         tokio::time::sleep(Duration::from_secs(3)).await
//!     }
//! }
//! ```

/// prelude that can be used to include all of the API types
pub mod prelude;

/// async and blocking client API
pub mod client;
/// public constant values related to the Modbus specification
pub mod constants;
/// serial port transport and settings
pub mod serial;

mod common;
mod decode;
mod error;
mod exception;
mod transport;
mod types;

pub use crate::common::crc;
pub use crate::common::function::FunctionCode;
pub use crate::decode::*;
pub use crate::error::*;
pub use crate::exception::*;
pub use crate::transport::*;
pub use crate::types::*;
