use std::fmt::Write;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::decode::PhysDecodeLevel;
use crate::error::RequestError;
use crate::transport::PhysStream;

/// An open byte channel with the two operations a transaction needs
pub(crate) struct PhysLayer {
    stream: Box<dyn PhysStream>,
}

impl std::fmt::Debug for PhysLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("PhysLayer")
    }
}

impl PhysLayer {
    pub(crate) fn new(stream: Box<dyn PhysStream>) -> Self {
        Self { stream }
    }

    pub(crate) async fn write(
        &mut self,
        data: &[u8],
        decode_level: PhysDecodeLevel,
    ) -> Result<(), RequestError> {
        if decode_level.enabled() {
            tracing::info!("PHYS TX - {}", PhysDisplay::new(decode_level, data));
        }

        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Fill `buffer` completely or fail
    ///
    /// The timeout bounds the whole read, not each chunk of it
    pub(crate) async fn read_exact(
        &mut self,
        buffer: &mut [u8],
        timeout: Duration,
        decode_level: PhysDecodeLevel,
    ) -> Result<(), RequestError> {
        let expected = buffer.len();
        let mut count = 0;

        let result = tokio::time::timeout(timeout, async {
            while count < expected {
                let length = self.stream.read(&mut buffer[count..]).await?;
                if length == 0 {
                    return Err(RequestError::InvalidResponseLength {
                        expected,
                        actual: count,
                    });
                }
                count += length;
            }
            Ok::<(), RequestError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => {
                if decode_level.enabled() {
                    tracing::info!("PHYS RX - {}", PhysDisplay::new(decode_level, buffer));
                }
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                if count > 0 {
                    tracing::debug!(
                        "received {} of {} expected bytes before the timeout",
                        count,
                        expected
                    );
                }
                Err(RequestError::ResponseTimeout)
            }
        }
    }

    /// Read and drop input until nothing arrives for `quiet`, returns the number of bytes dropped
    ///
    /// A `quiet` of zero only drops bytes that are already buffered.
    pub(crate) async fn discard_input(
        &mut self,
        quiet: Duration,
        decode_level: PhysDecodeLevel,
    ) -> Result<usize, RequestError> {
        let mut buffer = [0u8; 256];
        let mut discarded = 0;
        loop {
            match tokio::time::timeout(quiet, self.stream.read(&mut buffer)).await {
                Ok(Ok(0)) | Err(_) => break,
                Ok(Ok(count)) => {
                    if decode_level.enabled() {
                        tracing::info!(
                            "PHYS RX (discarded) - {}",
                            PhysDisplay::new(decode_level, &buffer[..count])
                        );
                    }
                    discarded += count;
                }
                Ok(Err(err)) => return Err(err.into()),
            }
        }
        Ok(discarded)
    }
}

pub(crate) struct PhysDisplay<'a> {
    level: PhysDecodeLevel,
    data: &'a [u8],
}

impl<'a> PhysDisplay<'a> {
    pub(crate) fn new(level: PhysDecodeLevel, data: &'a [u8]) -> Self {
        PhysDisplay { level, data }
    }
}

impl std::fmt::Display for PhysDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} bytes", self.data.len())?;
        if self.level.data_enabled() {
            format_bytes(f, self.data)?;
        }
        Ok(())
    }
}

const BYTES_PER_DECODE_LINE: usize = 18;

pub(crate) fn format_bytes(f: &mut std::fmt::Formatter, bytes: &[u8]) -> std::fmt::Result {
    for chunk in bytes.chunks(BYTES_PER_DECODE_LINE) {
        writeln!(f)?;
        let mut first = true;
        for byte in chunk {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            write!(f, "{byte:02X?}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(mock: tokio_test::io::Mock) -> PhysLayer {
        PhysLayer::new(Box::new(mock))
    }

    #[tokio::test]
    async fn read_exact_collects_fragmented_reads() {
        let mock = tokio_test::io::Builder::new()
            .read(&[0x01, 0x02])
            .read(&[0x03])
            .read(&[0x04, 0x05])
            .build();
        let mut phys = layer(mock);
        let mut buffer = [0u8; 5];
        phys.read_exact(&mut buffer, Duration::from_secs(1), PhysDecodeLevel::Nothing)
            .await
            .unwrap();
        assert_eq!(buffer, [0x01, 0x02, 0x03, 0x04, 0x05]);
    }

    #[tokio::test]
    async fn end_of_stream_is_a_short_read() {
        let mock = tokio_test::io::Builder::new().read(&[0x01, 0x02]).build();
        let mut phys = layer(mock);
        let mut buffer = [0u8; 5];
        let result = phys
            .read_exact(&mut buffer, Duration::from_secs(1), PhysDecodeLevel::Nothing)
            .await;
        assert_eq!(
            result,
            Err(RequestError::InvalidResponseLength {
                expected: 5,
                actual: 2
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn missing_bytes_time_out() {
        let mock = tokio_test::io::Builder::new()
            .read(&[0x01])
            .wait(Duration::from_secs(5))
            .build();
        let mut phys = layer(mock);
        let mut buffer = [0u8; 2];
        let result = phys
            .read_exact(&mut buffer, Duration::from_secs(1), PhysDecodeLevel::Nothing)
            .await;
        assert_eq!(result, Err(RequestError::ResponseTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn discards_input_until_the_line_is_quiet() {
        let mock = tokio_test::io::Builder::new()
            .read(&[0x11, 0x03])
            .wait(Duration::from_millis(200))
            .read(&[0x02, 0x11, 0x11, 0xAA, 0xBB])
            .build();
        let mut phys = layer(mock);
        let discarded = phys
            .discard_input(Duration::from_millis(300), PhysDecodeLevel::Data)
            .await
            .unwrap();
        assert_eq!(discarded, 7);
    }

    #[tokio::test]
    async fn write_errors_are_transport_errors() {
        let mock = tokio_test::io::Builder::new()
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "line gone",
            ))
            .build();
        let mut phys = layer(mock);
        let result = phys.write(&[0x01, 0x02], PhysDecodeLevel::Nothing).await;
        assert_eq!(
            result,
            Err(RequestError::Transport(
                crate::error::TransportError::Io(std::io::ErrorKind::BrokenPipe)
            ))
        );
    }
}
