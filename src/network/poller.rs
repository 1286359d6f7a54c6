use std::io;
use std::net::TcpListener;
use std::os::unix::io::RawFd;

/// Readiness reported for one descriptor
#[derive(Debug, Clone, Copy)]
pub struct SocketEvent {
    pub fd: RawFd,
    pub readable: bool,
    pub writable: bool,
    /// Error or hang-up
    pub broken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Read,
    Write,
}

impl Interest {
    fn mask(self) -> u32 {
        let base = match self {
            Interest::Read => libc::EPOLLIN,
            Interest::Write => libc::EPOLLOUT,
        };
        (base | libc::EPOLLERR | libc::EPOLLHUP) as u32
    }
}

/// Owned epoll instance
#[derive(Debug)]
pub struct Epoll {
    epoll_fd: RawFd,
}

impl Epoll {
    const MAX_EVENTS: usize = 128;

    pub fn create() -> io::Result<Self> {
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { epoll_fd: fd })
    }

    pub fn register(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_ADD, fd, Some(interest))
    }

    pub fn modify(&self, fd: RawFd, interest: Interest) -> io::Result<()> {
        self.ctl(libc::EPOLL_CTL_MOD, fd, Some(interest))
    }

    /// ENOENT is ignored: the fd may already be gone.
    pub fn unregister(&self, fd: RawFd) -> io::Result<()> {
        match self.ctl(libc::EPOLL_CTL_DEL, fd, None) {
            Err(e) if e.raw_os_error() == Some(libc::ENOENT) => Ok(()),
            other => other,
        }
    }

    fn ctl(&self, op: libc::c_int, fd: RawFd, interest: Option<Interest>) -> io::Result<()> {
        let mut ev = libc::epoll_event {
            events: interest.map(Interest::mask).unwrap_or(0),
            u64: fd as u64,
        };
        let ptr = if interest.is_some() { &mut ev as *mut _ } else { std::ptr::null_mut() };

        if unsafe { libc::epoll_ctl(self.epoll_fd, op, fd, ptr) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Wait up to `timeout_ms` (-1 blocks). EINTR yields no events.
    pub fn poll(&self, timeout_ms: i32) -> io::Result<Vec<SocketEvent>> {
        let mut raw = vec![libc::epoll_event { events: 0, u64: 0 }; Self::MAX_EVENTS];

        let count = unsafe {
            libc::epoll_wait(self.epoll_fd, raw.as_mut_ptr(), raw.len() as i32, timeout_ms)
        };
        if count < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        Ok(raw[..count as usize]
            .iter()
            .map(|ev| {
                let flags = ev.events;
                SocketEvent {
                    fd: ev.u64 as RawFd,
                    readable: flags & libc::EPOLLIN as u32 != 0,
                    writable: flags & libc::EPOLLOUT as u32 != 0,
                    broken: flags & (libc::EPOLLERR | libc::EPOLLHUP) as u32 != 0,
                }
            })
            .collect())
    }
}

impl Drop for Epoll {
    fn drop(&mut self) {
        unsafe { libc::close(self.epoll_fd) };
    }
}

/// Bind a non-blocking TCP listener
pub fn create_listener(address: &str) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(address)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}
