use std::time::Duration;

use crate::error::{AduParseError, InvalidRange, InvalidRequest};

/// Modbus unit identifier, just a type-safe wrapper around `u8`
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnitId {
    /// underlying raw value
    pub value: u8,
}

/// Start and count tuple used when making various requests
/// Cannot be constructed with invalid start/count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address of the range
    pub start: u16,
    /// Count of elements in the range
    pub count: u16,
}

/// Value and its address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Indexed<T> {
    /// Address of the value
    pub index: u16,
    /// Associated value
    pub value: T,
}

/// Collection of values and starting address
///
/// Used when making write multiple coil/register requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMultiple<T> {
    /// starting address and count of the values
    pub(crate) range: AddressRange,
    /// vector of values
    pub(crate) values: Vec<T>,
}

/// Parameters common to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParam {
    /// Unit id of the addressed slave
    pub id: UnitId,
    /// How long to wait for the full response once the read is issued
    pub response_timeout: Duration,
}

impl RequestParam {
    /// Create a new `RequestParam` from both of its fields
    pub fn new(id: UnitId, response_timeout: Duration) -> Self {
        Self {
            id,
            response_timeout,
        }
    }
}

impl<T> WriteMultiple<T> {
    /// Create a new collection of values starting at the given address
    pub fn from(start: u16, values: Vec<T>) -> Result<Self, InvalidRequest> {
        let count = match u16::try_from(values.len()) {
            Ok(x) => x,
            Err(_) => return Err(InvalidRequest::CountTooBigForU16(values.len())),
        };
        let range = AddressRange::try_from(start, count)?;
        Ok(Self { range, values })
    }

    /// starting address and count of the values
    pub fn range(&self) -> AddressRange {
        self.range
    }

    /// the values to write
    pub fn values(&self) -> &[T] {
        self.values.as_slice()
    }
}

impl AddressRange {
    /// Create a new address range
    pub fn try_from(start: u16, count: u16) -> Result<Self, InvalidRange> {
        if count == 0 {
            return Err(InvalidRange::CountOfZero);
        }

        let max_start = u16::MAX - (count - 1);

        if start > max_start {
            return Err(InvalidRange::AddressOverflow(start, count));
        }

        Ok(Self { start, count })
    }

    pub(crate) fn limited_count(self, limit: u16) -> Result<Self, InvalidRequest> {
        if self.count > limit {
            return Err(InvalidRequest::CountTooBigForType(self.count, limit));
        }
        Ok(self)
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "start: {:#06X} qty: {}", self.start, self.count)
    }
}

impl<T> Indexed<T> {
    /// Create a new indexed value
    pub fn new(index: u16, value: T) -> Self {
        Indexed { index, value }
    }
}

impl<T> From<(u16, T)> for Indexed<T> {
    fn from(tuple: (u16, T)) -> Self {
        let (index, value) = tuple;
        Self::new(index, value)
    }
}

impl std::fmt::Display for Indexed<bool> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {}", self.index, self.value as i32)
    }
}

impl std::fmt::Display for Indexed<u16> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx: {:#06X} value: {:#06X}", self.index, self.value)
    }
}

impl UnitId {
    /// Create a new UnitId
    pub fn new(value: u8) -> Self {
        Self { value }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04X}", self.value)
    }
}

pub(crate) fn coil_from_u16(value: u16) -> Result<bool, AduParseError> {
    match value {
        crate::constants::coil::ON => Ok(true),
        crate::constants::coil::OFF => Ok(false),
        _ => Err(AduParseError::UnknownCoilState(value)),
    }
}

pub(crate) fn coil_to_u16(value: bool) -> u16 {
    if value {
        crate::constants::coil::ON
    } else {
        crate::constants::coil::OFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_start_max_count_of_one_is_allowed() {
        AddressRange::try_from(u16::MAX, 1).unwrap();
    }

    #[test]
    fn address_maximum_range_is_ok() {
        AddressRange::try_from(0, 0xFFFF).unwrap();
    }

    #[test]
    fn address_count_zero_fails_validation() {
        assert_eq!(AddressRange::try_from(0, 0), Err(InvalidRange::CountOfZero));
    }

    #[test]
    fn start_max_count_of_two_overflows() {
        assert_eq!(
            AddressRange::try_from(u16::MAX, 2),
            Err(InvalidRange::AddressOverflow(u16::MAX, 2))
        );
    }

    #[test]
    fn limits_count_per_request_type() {
        let range = AddressRange::try_from(0, 126).unwrap();
        assert_eq!(
            range.limited_count(125),
            Err(InvalidRequest::CountTooBigForType(126, 125))
        );
        assert_eq!(range.limited_count(126), Ok(range));
    }

    #[test]
    fn write_multiple_derives_range_from_values() {
        let write = WriteMultiple::from(7, vec![true, false, true]).unwrap();
        assert_eq!(write.range(), AddressRange::try_from(7, 3).unwrap());
        assert_eq!(write.values(), &[true, false, true]);
    }

    #[test]
    fn write_multiple_rejects_empty_and_overflowing_values() {
        assert_eq!(
            WriteMultiple::<u16>::from(0, Vec::new()),
            Err(InvalidRequest::BadRange(InvalidRange::CountOfZero))
        );
        assert_eq!(
            WriteMultiple::from(u16::MAX, vec![1u16, 2]),
            Err(InvalidRequest::BadRange(InvalidRange::AddressOverflow(
                u16::MAX,
                2
            )))
        );
    }

    #[test]
    fn coil_conversions() {
        assert_eq!(coil_to_u16(true), 0xFF00);
        assert_eq!(coil_to_u16(false), 0x0000);
        assert_eq!(coil_from_u16(0xFF00), Ok(true));
        assert_eq!(coil_from_u16(0x0000), Ok(false));
        assert_eq!(
            coil_from_u16(0x00FF),
            Err(AduParseError::UnknownCoilState(0x00FF))
        );
    }
}
