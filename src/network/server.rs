use std::collections::HashMap;
use std::io;
use std::net::TcpListener;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::connection::{ClientConnection, ConnState};
use super::poller::{Epoll, Interest, create_listener};
use crate::handlers::Handler;
use crate::http::{HttpRequest, HttpResponse};

/// Maximum idle time before closing connection
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// How often to sweep for idle connections (milliseconds)
const SWEEP_INTERVAL_MS: i32 = 1000;

/// Maximum requests per keep-alive connection
const MAX_REQUESTS_PER_CONN: u32 = 100;

/// Requests whose head grows past this without completing are rejected
const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub struct Server {
    addresses: Vec<String>,
    handler: Box<dyn Handler>,
}

impl Server {
    pub fn new(addresses: Vec<String>, handler: Box<dyn Handler>) -> Self {
        Self { addresses, handler }
    }

    /// Bind every configured address and serve forever. Addresses that
    /// fail to bind are logged; at least one has to succeed.
    pub fn run(&self) -> io::Result<()> {
        let mut listeners = Vec::new();
        for addr in &self.addresses {
            match create_listener(addr) {
                Ok(listener) => {
                    info!(%addr, "listening");
                    listeners.push(listener);
                }
                Err(e) => error!(%addr, error = %e, "failed to bind"),
            }
        }

        if listeners.is_empty() {
            return Err(io::Error::new(io::ErrorKind::AddrNotAvailable, "no listeners created"));
        }

        self.serve(listeners)
    }

    /// Event loop over already bound, non-blocking listeners.
    pub fn serve(&self, listeners: Vec<TcpListener>) -> io::Result<()> {
        let poller = Epoll::create()?;
        for listener in &listeners {
            poller.register(listener.as_raw_fd(), Interest::Read)?;
        }

        let mut clients: HashMap<RawFd, ClientConnection> = HashMap::new();
        info!("ready to accept connections");

        loop {
            for event in poller.poll(SWEEP_INTERVAL_MS)? {
                if let Some(listener) = listeners.iter().find(|l| l.as_raw_fd() == event.fd) {
                    accept_connections(listener, &poller, &mut clients)?;
                    continue;
                }

                let Some(client) = clients.get_mut(&event.fd) else {
                    continue;
                };

                if event.broken {
                    client.state = ConnState::Closing;
                    continue;
                }

                let before = client.state;
                if event.readable && client.state == ConnState::Reading {
                    self.on_readable(client);
                }
                if event.writable && client.state == ConnState::Writing {
                    on_writable(client);
                    // a pipelined request may already be buffered
                    if client.state == ConnState::Reading && !client.read_buffer.is_empty() {
                        self.process_buffered(client);
                    }
                }

                if client.state != before && client.state != ConnState::Closing {
                    let interest = match client.state {
                        ConnState::Writing => Interest::Write,
                        _ => Interest::Read,
                    };
                    if let Err(e) = poller.modify(event.fd, interest) {
                        warn!(error = %e, "epoll modify failed");
                        client.state = ConnState::Closing;
                    }
                }
            }

            sweep_connections(&poller, &mut clients);
        }
    }

    fn on_readable(&self, client: &mut ClientConnection) {
        match client.try_read() {
            Ok(0) => {}
            Ok(_) => self.process_buffered(client),
            Err(e) => {
                debug!(error = %e, "closing connection");
                client.state = ConnState::Closing;
            }
        }
    }

    fn process_buffered(&self, client: &mut ClientConnection) {
        if let Some(request) = client.next_request() {
            self.respond(client, &request);
        } else if client.read_buffer.len() > MAX_REQUEST_BYTES {
            warn!(bytes = client.read_buffer.len(), "request too large, rejecting");
            client.keep_alive = false;
            let mut response = HttpResponse::bad_request();
            response.set_header("Connection", "close");
            client.queue_response(response.to_bytes(false));
        }
    }

    fn respond(&self, client: &mut ClientConnection, request: &HttpRequest) {
        info!(
            method = %request.method,
            uri = %request.target(),
            version = %request.version,
            "request"
        );

        client.keep_alive = request
            .header("Connection")
            .map(|v| !v.eq_ignore_ascii_case("close"))
            .unwrap_or(true)
            && client.requests_handled + 1 < MAX_REQUESTS_PER_CONN;

        let mut response = match self.handler.handle(request) {
            Ok(response) => response,
            Err(e) => {
                error!(uri = %request.target(), error = %e, "handler failed");
                let mut response = HttpResponse::internal_error();
                response.set_header("Content-Type", "text/html; charset=utf-8");
                response.set_body("<h1>500 - Internal Server Error</h1>");
                response
            }
        };

        debug!(status = response.status_code, bytes = response.body.len(), "response");

        if client.keep_alive {
            response.set_header("Connection", "keep-alive");
            response.set_header("Keep-Alive", "timeout=30, max=100");
        } else {
            response.set_header("Connection", "close");
        }

        client.queue_response(response.to_bytes(request.is_head()));
    }
}

fn on_writable(client: &mut ClientConnection) {
    match client.try_write() {
        Ok(true) if client.keep_alive => client.reset_for_next_request(),
        Ok(true) => client.state = ConnState::Closing,
        Ok(false) => {}
        Err(e) => {
            debug!(error = %e, "write failed");
            client.state = ConnState::Closing;
        }
    }
}

fn accept_connections(
    listener: &TcpListener,
    poller: &Epoll,
    clients: &mut HashMap<RawFd, ClientConnection>,
) -> io::Result<()> {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                stream.set_nonblocking(true)?;
                let fd = stream.as_raw_fd();

                if let Err(e) = poller.register(fd, Interest::Read) {
                    warn!(%addr, error = %e, "failed to register client");
                    continue;
                }

                debug!(%addr, "accepted connection");
                clients.insert(fd, ClientConnection::new(stream));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                warn!(error = %e, "accept failed");
                break;
            }
        }
    }
    Ok(())
}

/// Drop closed and idle connections
fn sweep_connections(poller: &Epoll, clients: &mut HashMap<RawFd, ClientConnection>) {
    let stale: Vec<RawFd> = clients
        .iter()
        .filter(|(_, conn)| conn.state == ConnState::Closing || conn.is_idle(IDLE_TIMEOUT))
        .map(|(fd, _)| *fd)
        .collect();

    for fd in stale {
        if let Some(conn) = clients.remove(&fd) {
            let _ = poller.unregister(fd);
            let _ = conn.stream.shutdown(std::net::Shutdown::Both);
            if conn.state != ConnState::Closing {
                debug!("connection timed out");
            }
        }
    }
}
