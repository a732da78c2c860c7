use std::fmt::{Display, Formatter};

mod constants {
    pub(crate) const READ_COILS: u8 = 1;
    pub(crate) const READ_DISCRETE_INPUTS: u8 = 2;
    pub(crate) const READ_HOLDING_REGISTERS: u8 = 3;
    pub(crate) const READ_INPUT_REGISTERS: u8 = 4;
    pub(crate) const WRITE_SINGLE_COIL: u8 = 5;
    pub(crate) const WRITE_SINGLE_REGISTER: u8 = 6;
    pub(crate) const READ_EXCEPTION_STATUS: u8 = 7;
    pub(crate) const DIAGNOSTICS: u8 = 8;
    pub(crate) const WRITE_MULTIPLE_COILS: u8 = 15;
    pub(crate) const WRITE_MULTIPLE_REGISTERS: u8 = 16;
}

/// Function codes supported by the master
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionCode {
    /// Read coils (0x01)
    ReadCoils = constants::READ_COILS,
    /// Read discrete inputs (0x02)
    ReadDiscreteInputs = constants::READ_DISCRETE_INPUTS,
    /// Read holding registers (0x03)
    ReadHoldingRegisters = constants::READ_HOLDING_REGISTERS,
    /// Read input registers (0x04)
    ReadInputRegisters = constants::READ_INPUT_REGISTERS,
    /// Write single coil (0x05)
    WriteSingleCoil = constants::WRITE_SINGLE_COIL,
    /// Write single register (0x06)
    WriteSingleRegister = constants::WRITE_SINGLE_REGISTER,
    /// Read exception status (0x07)
    ReadExceptionStatus = constants::READ_EXCEPTION_STATUS,
    /// Diagnostics (0x08), only the "return query data" sub-function is used
    DiagnosticsEcho = constants::DIAGNOSTICS,
    /// Write multiple coils (0x0F)
    WriteMultipleCoils = constants::WRITE_MULTIPLE_COILS,
    /// Write multiple registers (0x10)
    WriteMultipleRegisters = constants::WRITE_MULTIPLE_REGISTERS,
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            FunctionCode::ReadCoils => write!(f, "READ COILS ({:#04X})", self.get_value()),
            FunctionCode::ReadDiscreteInputs => {
                write!(f, "READ DISCRETE INPUTS ({:#04X})", self.get_value())
            }
            FunctionCode::ReadHoldingRegisters => {
                write!(f, "READ HOLDING REGISTERS ({:#04X})", self.get_value())
            }
            FunctionCode::ReadInputRegisters => {
                write!(f, "READ INPUT REGISTERS ({:#04X})", self.get_value())
            }
            FunctionCode::WriteSingleCoil => {
                write!(f, "WRITE SINGLE COIL ({:#04X})", self.get_value())
            }
            FunctionCode::WriteSingleRegister => {
                write!(f, "WRITE SINGLE REGISTER ({:#04X})", self.get_value())
            }
            FunctionCode::ReadExceptionStatus => {
                write!(f, "READ EXCEPTION STATUS ({:#04X})", self.get_value())
            }
            FunctionCode::DiagnosticsEcho => {
                write!(f, "DIAGNOSTICS ECHO ({:#04X})", self.get_value())
            }
            FunctionCode::WriteMultipleCoils => {
                write!(f, "WRITE MULTIPLE COILS ({:#04X})", self.get_value())
            }
            FunctionCode::WriteMultipleRegisters => {
                write!(f, "WRITE MULTIPLE REGISTERS ({:#04X})", self.get_value())
            }
        }
    }
}

impl FunctionCode {
    /// raw value of the function code
    pub const fn get_value(self) -> u8 {
        self as u8
    }

    /// function code a slave replies with when returning an exception
    pub const fn as_error(self) -> u8 {
        self.get_value() | 0x80
    }

    /// look up a function code by its raw value
    pub fn get(value: u8) -> Option<Self> {
        match value {
            constants::READ_COILS => Some(FunctionCode::ReadCoils),
            constants::READ_DISCRETE_INPUTS => Some(FunctionCode::ReadDiscreteInputs),
            constants::READ_HOLDING_REGISTERS => Some(FunctionCode::ReadHoldingRegisters),
            constants::READ_INPUT_REGISTERS => Some(FunctionCode::ReadInputRegisters),
            constants::WRITE_SINGLE_COIL => Some(FunctionCode::WriteSingleCoil),
            constants::WRITE_SINGLE_REGISTER => Some(FunctionCode::WriteSingleRegister),
            constants::READ_EXCEPTION_STATUS => Some(FunctionCode::ReadExceptionStatus),
            constants::DIAGNOSTICS => Some(FunctionCode::DiagnosticsEcho),
            constants::WRITE_MULTIPLE_COILS => Some(FunctionCode::WriteMultipleCoils),
            constants::WRITE_MULTIPLE_REGISTERS => Some(FunctionCode::WriteMultipleRegisters),
            _ => None,
        }
    }
}
