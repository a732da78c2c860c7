pub(crate) mod bits;
pub mod crc;
pub(crate) mod cursor;
pub(crate) mod function;
pub(crate) mod phys;
pub(crate) mod traits;
