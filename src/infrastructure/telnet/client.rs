use crate::core::communication::{frame_message, split_lines, Communicator, TransportKind};
use crate::domain::{
    config::TelnetConfig,
    error::{LabComError, LabComResult},
};
use crate::infrastructure::telnet::session::TelnetSession;
use tracing::{debug, info};

/// Telnet realization of the [`Communicator`] contract.
///
/// Construction only stores the configuration; the session is established
/// on [`open`](Communicator::open) and owned exclusively until
/// [`close`](Communicator::close).
pub struct TelnetCommunicator {
    config: TelnetConfig,
    terminator: String,
    session: Option<TelnetSession>,
}

impl TelnetCommunicator {
    pub fn new(config: TelnetConfig) -> Self {
        Self {
            config,
            terminator: "\n".to_string(),
            session: None,
        }
    }

    /// Stored transport configuration.
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }

    fn session_mut(&mut self) -> LabComResult<&mut TelnetSession> {
        self.session.as_mut().ok_or(LabComError::NotConnected)
    }
}

impl Communicator for TelnetCommunicator {
    fn transport_kind(&self) -> TransportKind {
        TransportKind::Telnet
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn terminator(&self) -> &str {
        &self.terminator
    }

    fn set_terminator(&mut self, term: &str) {
        self.terminator = term.to_string();
    }

    fn open(&mut self) -> LabComResult<()> {
        if self.session.is_some() {
            debug!(
                "Telnet session to {}:{} already open",
                self.config.host, self.config.port
            );
            return Ok(());
        }
        let session =
            TelnetSession::connect(&self.config.host, self.config.port, self.config.timeout)?;
        self.session = Some(session);
        Ok(())
    }

    fn close(&mut self) -> LabComResult<()> {
        let session = self.session.take().ok_or(LabComError::NotConnected)?;
        session.close()?;
        info!(
            "Telnet session to {}:{} closed",
            self.config.host, self.config.port
        );
        Ok(())
    }

    fn send(&mut self, msg: &str) -> LabComResult<()> {
        let framed = frame_message(msg, &self.terminator);
        self.session_mut()?.write_all(&framed)
    }

    fn recv(&mut self, byte_count: usize) -> LabComResult<Vec<u8>> {
        self.session_mut()?.read_bytes(byte_count)
    }

    fn read_lines(&mut self) -> LabComResult<Vec<Vec<u8>>> {
        let terminator = self.terminator.clone();
        let buf = self.session_mut()?.read_until(terminator.as_bytes())?;
        Ok(split_lines(&buf, terminator.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn test_config(port: u16) -> TelnetConfig {
        TelnetConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_open_fails_gracefully() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut comm = TelnetCommunicator::new(test_config(port));
        assert!(comm.open().is_err());
        assert!(!comm.is_connected());
    }

    #[test]
    fn test_operations_require_open() {
        let mut comm = TelnetCommunicator::new(test_config(9));
        assert!(matches!(comm.close(), Err(LabComError::NotConnected)));
        assert!(matches!(comm.send("X"), Err(LabComError::NotConnected)));
        assert!(matches!(comm.recv(16), Err(LabComError::NotConnected)));
        assert!(matches!(comm.read_lines(), Err(LabComError::NotConnected)));
    }

    #[test]
    fn test_lifecycle_and_idempotent_open() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            // One accept only: a second real connect attempt would hang the
            // client, so a no-op second open proves idempotence.
            listener.accept().unwrap().0
        });

        let mut comm = TelnetCommunicator::new(test_config(port));
        assert!(!comm.is_connected());
        comm.open().unwrap();
        assert!(comm.is_connected());
        comm.open().unwrap();
        assert!(comm.is_connected());
        comm.close().unwrap();
        assert!(!comm.is_connected());

        drop(server.join().unwrap());
    }

    #[test]
    fn test_query_single_line() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = vec![0u8; 64];
            let n = socket.read(&mut buf).unwrap();
            buf.truncate(n);
            socket.write_all(b"MODEL-42\n").unwrap();
            buf
        });

        let mut comm = TelnetCommunicator::new(test_config(port));
        comm.open().unwrap();
        let lines = comm.query("*IDN?").unwrap();
        assert_eq!(lines, vec![b"MODEL-42".to_vec()]);
        comm.close().unwrap();

        let received = server.join().unwrap();
        assert_eq!(received, b"*IDN?\n");
    }

    #[test]
    fn test_read_lines_timeout_yields_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || listener.accept().unwrap().0);

        let mut comm = TelnetCommunicator::new(test_config(port));
        comm.open().unwrap();
        assert!(comm.read_lines().unwrap().is_empty());

        drop(server.join().unwrap());
    }

    #[test]
    fn test_read_lines_unterminated_partial() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"PART").unwrap();
            socket
        });

        let mut comm = TelnetCommunicator::new(test_config(port));
        comm.open().unwrap();
        let lines = comm.read_lines().unwrap();
        assert_eq!(lines, vec![b"PART".to_vec()]);

        drop(server.join().unwrap());
    }

    #[test]
    fn test_recv_bounded() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"0123456789").unwrap();
            socket
        });

        let mut comm = TelnetCommunicator::new(test_config(port));
        comm.open().unwrap();
        let first = comm.recv(4).unwrap();
        assert_eq!(first, b"0123");
        let rest = comm.recv(1024).unwrap();
        assert_eq!(rest, b"456789");

        drop(server.join().unwrap());
    }
}
