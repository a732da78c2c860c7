pub(crate) mod frame;

#[cfg(feature = "serial")]
mod port;

#[cfg(feature = "serial")]
pub use port::*;
