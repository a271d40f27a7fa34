use crate::domain::error::{LabComError, LabComResult};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// Telnet command bytes (RFC 854)
const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const READ_CHUNK: usize = 4096;

/// Blocking telnet session over a TCP stream.
///
/// Handles the telnet command layer so callers only ever see payload
/// bytes: outbound 0xFF is doubled, inbound option negotiation is refused
/// (`DO`/`DONT` answered with `WONT`, `WILL`/`WONT` with `DONT`), other
/// command sequences are stripped from the data stream.
pub struct TelnetSession {
    stream: TcpStream,
    timeout: Duration,
    // raw bytes ending in an incomplete command sequence
    pending: Vec<u8>,
    // payload bytes decoded but not yet handed to the caller
    decoded: Vec<u8>,
}

impl TelnetSession {
    /// Connect to `host:port`, installing `timeout` as both the connect
    /// and the read timeout.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> LabComResult<Self> {
        let mut last_err: Option<std::io::Error> = None;
        let mut connected = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    connected = Some(stream);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let stream = match connected {
            Some(stream) => stream,
            None => {
                return Err(match last_err {
                    Some(e) => e.into(),
                    None => LabComError::Config {
                        message: format!("no address resolved for {}:{}", host, port),
                    },
                })
            }
        };

        stream.set_read_timeout(Some(timeout))?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }
        info!("Telnet session established to {}:{}", host, port);

        Ok(Self {
            stream,
            timeout,
            pending: Vec::new(),
            decoded: Vec::new(),
        })
    }

    /// Write payload bytes, doubling any literal 0xFF per the telnet
    /// escaping rule.
    pub fn write_all(&mut self, data: &[u8]) -> LabComResult<()> {
        let mut escaped = Vec::with_capacity(data.len());
        for &byte in data {
            escaped.push(byte);
            if byte == IAC {
                escaped.push(IAC);
            }
        }
        self.stream.write_all(&escaped)?;
        self.stream.flush()?;
        debug!("Sent {} bytes over telnet", escaped.len());
        Ok(())
    }

    /// Read until `pattern` appears in the decoded data or the configured
    /// timeout elapses.
    ///
    /// Returns everything up to and including the first occurrence of
    /// `pattern`; later bytes stay buffered for the next read. On timeout
    /// (or peer close) the whole accumulated buffer is returned, possibly
    /// empty. An empty pattern reads until the timeout.
    pub fn read_until(&mut self, pattern: &[u8]) -> LabComResult<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if !pattern.is_empty() {
                if let Some(pos) = find(&self.decoded, pattern) {
                    let out = self.decoded.drain(..pos + pattern.len()).collect();
                    self.stream.set_read_timeout(Some(self.timeout))?;
                    return Ok(out);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.stream.set_read_timeout(Some(deadline - now))?;

            let mut chunk = [0u8; READ_CHUNK];
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!("Telnet peer closed the connection");
                    break;
                }
                Ok(n) => self.decode_inbound(&chunk[..n])?,
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    break
                }
                Err(e) => {
                    self.stream.set_read_timeout(Some(self.timeout))?;
                    return Err(e.into());
                }
            }
        }
        self.stream.set_read_timeout(Some(self.timeout))?;
        Ok(std::mem::take(&mut self.decoded))
    }

    /// Read up to `byte_count` decoded bytes within one timeout window.
    ///
    /// Returns whatever was available, possibly empty, never more than
    /// requested.
    pub fn read_bytes(&mut self, byte_count: usize) -> LabComResult<Vec<u8>> {
        if self.decoded.len() < byte_count {
            let mut chunk = [0u8; READ_CHUNK];
            match self.stream.read(&mut chunk) {
                Ok(0) => debug!("Telnet peer closed the connection"),
                Ok(n) => self.decode_inbound(&chunk[..n])?,
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(e.into()),
            }
        }
        let take = byte_count.min(self.decoded.len());
        Ok(self.decoded.drain(..take).collect())
    }

    /// Shut down the session.
    pub fn close(self) -> LabComResult<()> {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            warn!("Failed to shutdown telnet stream: {}", e);
        }
        Ok(())
    }

    // Fold a raw chunk into the decoded buffer, answering option
    // negotiation along the way. An incomplete trailing command sequence
    // is kept until the next chunk arrives.
    fn decode_inbound(&mut self, chunk: &[u8]) -> LabComResult<()> {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(chunk);

        let mut i = 0;
        while i < buf.len() {
            let byte = buf[i];
            if byte != IAC {
                self.decoded.push(byte);
                i += 1;
                continue;
            }
            if i + 1 >= buf.len() {
                self.pending = buf[i..].to_vec();
                return Ok(());
            }
            match buf[i + 1] {
                IAC => {
                    self.decoded.push(IAC);
                    i += 2;
                }
                cmd @ (DO | DONT | WILL | WONT) => {
                    if i + 2 >= buf.len() {
                        self.pending = buf[i..].to_vec();
                        return Ok(());
                    }
                    let option = buf[i + 2];
                    let refusal = if cmd == DO || cmd == DONT { WONT } else { DONT };
                    debug!("Refusing telnet option {} (command {})", option, cmd);
                    self.stream.write_all(&[IAC, refusal, option])?;
                    i += 3;
                }
                SB => {
                    // Skip subnegotiation data through IAC SE.
                    match find(&buf[i + 2..], &[IAC, SE]) {
                        Some(end) => i += 2 + end + 2,
                        None => {
                            self.pending = buf[i..].to_vec();
                            return Ok(());
                        }
                    }
                }
                _ => {
                    // Two-byte command with no payload meaning here.
                    i += 2;
                }
            }
        }
        Ok(())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
