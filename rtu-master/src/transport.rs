use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::TransportError;

/// A bidirectional byte stream the master can exchange frames over
///
/// Blanket implemented for every `AsyncRead + AsyncWrite + Send + Unpin` type, so a
/// serial port, a `tokio::io::DuplexStream` or a TCP tunnel to a serial gateway all qualify.
pub trait PhysStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> PhysStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// Source of the byte stream used by a client
///
/// The client calls [`Transport::open`] when the user opens it and drops the returned
/// stream when the user closes it or when a transaction is cancelled part way through.
pub trait Transport: Send + 'static {
    /// Open the underlying channel and return a stream to it
    fn open(&mut self) -> Result<Box<dyn PhysStream>, TransportError>;

    /// Called after the stream returned by `open` has been dropped
    fn close(&mut self) {}

    /// Short description used in log messages
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

/// Adapts an already constructed stream to the [`Transport`] interface
///
/// The stream can only be opened once. Re-opening after a close fails with
/// [`TransportError::Open`] and a kind of `NotConnected`.
pub struct StreamTransport<S> {
    stream: Option<S>,
}

impl<S> StreamTransport<S>
where
    S: PhysStream + 'static,
{
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: PhysStream + 'static,
{
    fn open(&mut self) -> Result<Box<dyn PhysStream>, TransportError> {
        match self.stream.take() {
            Some(stream) => Ok(Box::new(stream)),
            None => Err(TransportError::Open(std::io::ErrorKind::NotConnected)),
        }
    }

    fn describe(&self) -> String {
        "stream".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_transport_opens_only_once() {
        let (stream, _other) = tokio::io::duplex(16);
        let mut transport = StreamTransport::new(stream);
        assert!(transport.open().is_ok());
        assert_eq!(
            transport.open().err(),
            Some(TransportError::Open(std::io::ErrorKind::NotConnected))
        );
    }
}
