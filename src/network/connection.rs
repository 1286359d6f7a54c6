use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use crate::http::HttpRequest;

/// Connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Waiting for a complete request
    Reading,
    /// Response queued, draining it to the socket
    Writing,
    /// Done, remove on next sweep
    Closing,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("peer closed the connection")]
    Closed,

    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

/// One accepted client socket and its buffers
#[derive(Debug)]
pub struct ClientConnection {
    pub stream: TcpStream,
    pub state: ConnState,
    pub read_buffer: Vec<u8>,
    write_buffer: Vec<u8>,
    bytes_written: usize,
    last_activity: Instant,
    pub keep_alive: bool,
    pub requests_handled: u32,
}

impl ClientConnection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            state: ConnState::Reading,
            read_buffer: Vec::with_capacity(4096),
            write_buffer: Vec::new(),
            bytes_written: 0,
            last_activity: Instant::now(),
            keep_alive: true,
            requests_handled: 0,
        }
    }

    /// One non-blocking read into the request buffer.
    /// `Ok(0)` means nothing was available yet.
    pub fn try_read(&mut self) -> Result<usize, ConnectionError> {
        let mut chunk = [0u8; 4096];

        match self.stream.read(&mut chunk) {
            Ok(0) => Err(ConnectionError::Closed),
            Ok(n) => {
                self.read_buffer.extend_from_slice(&chunk[..n]);
                self.last_activity = Instant::now();
                Ok(n)
            }
            Err(e) if is_retryable(&e) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// One non-blocking write. `Ok(true)` once the whole response is out.
    pub fn try_write(&mut self) -> Result<bool, ConnectionError> {
        if self.bytes_written >= self.write_buffer.len() {
            return Ok(true);
        }

        match self.stream.write(&self.write_buffer[self.bytes_written..]) {
            Ok(n) => {
                self.bytes_written += n;
                self.last_activity = Instant::now();
                Ok(self.bytes_written >= self.write_buffer.len())
            }
            Err(e) if is_retryable(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Take the next complete request off the front of the read buffer,
    /// leaving any pipelined bytes after it in place.
    pub fn next_request(&mut self) -> Option<HttpRequest> {
        let (request, used) = HttpRequest::parse_with_len(&self.read_buffer)?;
        self.read_buffer.drain(..used);
        Some(request)
    }

    pub fn queue_response(&mut self, data: Vec<u8>) {
        self.write_buffer = data;
        self.bytes_written = 0;
        self.state = ConnState::Writing;
    }

    /// Keep-alive: get ready for the next request on the same socket.
    /// Already buffered bytes of a following request are kept.
    pub fn reset_for_next_request(&mut self) {
        self.write_buffer.clear();
        self.bytes_written = 0;
        self.state = ConnState::Reading;
        self.requests_handled += 1;
    }

    pub fn is_idle(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

fn is_retryable(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}
