use tokio_serial::{ClearBuffer, SerialPort, SerialStream};

use crate::error::TransportError;
use crate::transport::{PhysStream, Transport};

/// Number of bits per character
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataBits {
    /// 5 bits per character
    Five,
    /// 6 bits per character
    Six,
    /// 7 bits per character
    Seven,
    /// 8 bits per character
    Eight,
}

/// Flow control modes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowControl {
    /// No flow control
    None,
    /// Flow control using XON/XOFF bytes
    Software,
    /// Flow control using RTS/CTS signals
    Hardware,
}

/// Parity checking modes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit
    None,
    /// Parity bit sets odd number of 1 bits
    Odd,
    /// Parity bit sets even number of 1 bits
    Even,
}

/// Number of stop bits
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit
    One,
    /// Two stop bits
    Two,
}

/// Serial port settings
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SerialSettings {
    /// Baud rate of the port
    pub baud_rate: u32,
    /// Number of data bits
    pub data_bits: DataBits,
    /// Types of flow control
    pub flow_control: FlowControl,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Parity setting
    pub parity: Parity,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(from: DataBits) -> Self {
        match from {
            DataBits::Five => tokio_serial::DataBits::Five,
            DataBits::Six => tokio_serial::DataBits::Six,
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(from: FlowControl) -> Self {
        match from {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Software => tokio_serial::FlowControl::Software,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

impl From<Parity> for tokio_serial::Parity {
    fn from(from: Parity) -> Self {
        match from {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(from: StopBits) -> Self {
        match from {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// [`Transport`] that opens a serial port by path
#[derive(Clone, Debug)]
pub struct SerialTransport {
    path: String,
    settings: SerialSettings,
}

impl SerialTransport {
    /// Create a transport for the port at `path`, e.g. `/dev/ttyUSB0` or `COM3`
    ///
    /// The port is not touched until the client is opened.
    pub fn new(path: &str, settings: SerialSettings) -> Self {
        Self {
            path: path.to_string(),
            settings,
        }
    }

    fn open_port(&self) -> Result<SerialStream, tokio_serial::Error> {
        let builder = tokio_serial::new(self.path.as_str(), self.settings.baud_rate)
            .data_bits(self.settings.data_bits.into())
            .flow_control(self.settings.flow_control.into())
            .stop_bits(self.settings.stop_bits.into())
            .parity(self.settings.parity.into());
        let port = SerialStream::open(&builder)?;
        // bytes received before the port was opened belong to nobody
        port.clear(ClearBuffer::Input)?;
        Ok(port)
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<Box<dyn PhysStream>, TransportError> {
        match self.open_port() {
            Ok(port) => Ok(Box::new(port)),
            Err(err) => {
                tracing::warn!("unable to open serial port {}: {}", self.path, err);
                let err: std::io::Error = err.into();
                Err(TransportError::Open(err.kind()))
            }
        }
    }

    fn describe(&self) -> String {
        format!("serial port {}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_9600_8n1() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.flow_control, FlowControl::None);
    }

    #[test]
    fn missing_port_fails_to_open() {
        let mut transport = SerialTransport::new(
            "/dev/this-port-does-not-exist",
            SerialSettings::default(),
        );
        assert!(matches!(transport.open(), Err(TransportError::Open(_))));
    }
}
