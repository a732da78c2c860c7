pub use crate::client::{ClientConfig, RtuClient, SyncClient};
pub use crate::decode::*;
pub use crate::error::*;
pub use crate::exception::ExceptionCode;
#[cfg(feature = "serial")]
pub use crate::serial::*;
pub use crate::transport::*;
pub use crate::types::*;
