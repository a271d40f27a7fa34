use crate::core::communication::{frame_message, split_lines, Communicator, TransportKind};
use crate::domain::{
    config::SerialConfig,
    error::{LabComError, LabComResult},
};
use serialport::SerialPort;
use std::io::{Read, Write};
use tracing::{debug, info};

/// Read chunk size used when draining available response bytes.
const READ_CHUNK: usize = 256;

/// Serial realization of the [`Communicator`] contract.
///
/// Construction only stores the configuration; the port handle is created
/// on [`open`](Communicator::open) and owned exclusively until
/// [`close`](Communicator::close).
pub struct SerialCommunicator {
    config: SerialConfig,
    terminator: String,
    handle: Option<Box<dyn SerialPort>>,
}

impl SerialCommunicator {
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            terminator: "\n".to_string(),
            handle: None,
        }
    }

    /// Stored transport configuration.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn handle_mut(&mut self) -> LabComResult<&mut Box<dyn SerialPort>> {
        self.handle.as_mut().ok_or(LabComError::NotConnected)
    }

    // Test seam: adopt an already-open handle in place of a real port.
    #[cfg(test)]
    fn with_handle(config: SerialConfig, handle: Box<dyn SerialPort>) -> Self {
        Self {
            config,
            terminator: "\n".to_string(),
            handle: Some(handle),
        }
    }
}

impl Communicator for SerialCommunicator {
    fn transport_kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    fn terminator(&self) -> &str {
        &self.terminator
    }

    fn set_terminator(&mut self, term: &str) {
        self.terminator = term.to_string();
    }

    fn open(&mut self) -> LabComResult<()> {
        if self.handle.is_some() {
            debug!("Serial port {} already open", self.config.port);
            return Ok(());
        }

        let handle = serialport::new(&self.config.port, self.config.baud_rate)
            .data_bits(self.config.data_bits.into())
            .parity(self.config.parity.into())
            .stop_bits(self.config.stop_bits.into())
            .flow_control(self.config.flow_control.into())
            .timeout(self.config.timeout)
            .open()?;

        info!(
            "Serial port {} opened at {} baud",
            self.config.port, self.config.baud_rate
        );
        self.handle = Some(handle);
        Ok(())
    }

    fn close(&mut self) -> LabComResult<()> {
        let handle = self.handle.take().ok_or(LabComError::NotConnected)?;
        drop(handle);
        info!("Serial port {} closed", self.config.port);
        Ok(())
    }

    fn send(&mut self, msg: &str) -> LabComResult<()> {
        let framed = frame_message(msg, &self.terminator);
        let handle = self.handle_mut()?;
        handle.write_all(&framed)?;
        handle.flush()?;
        debug!("Sent {} bytes over serial", framed.len());
        Ok(())
    }

    fn recv(&mut self, byte_count: usize) -> LabComResult<Vec<u8>> {
        let handle = self.handle_mut()?;
        let mut buffer = vec![0u8; byte_count];
        match handle.read(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                debug!("Received {} bytes over serial", n);
                Ok(buffer)
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                // Timeout is the transport's partial-read signal, not a fault.
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_lines(&mut self) -> LabComResult<Vec<Vec<u8>>> {
        let handle = self.handle_mut()?;
        let mut accumulated = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match handle.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => accumulated.extend_from_slice(&chunk[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    break
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!("Drained {} response bytes over serial", accumulated.len());
        Ok(split_lines(&accumulated, self.terminator.as_bytes()))
    }
}
