//! Wrapper around may_minihttp's HTTP server.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};

/// Header-count bounds the transport can be instantiated with. The
/// header buffer is a const-generic array, so a configured limit is
/// rounded up to the next bound.
const HEADER_BOUNDS: [usize; 4] = [8, 16, 32, 64];

pub(crate) fn header_bound(max_headers: usize) -> usize {
    HEADER_BOUNDS
        .into_iter()
        .find(|bound| max_headers <= *bound)
        .unwrap_or(64)
}

/// Typed interface for starting and managing the underlying server.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// [`ServerHandle::wait_ready_for`] with a 250ms timeout, enough for
    /// local test servers.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_for(Duration::from_millis(250))
    }

    /// Poll the bound address until the server accepts connections.
    ///
    /// # Errors
    ///
    /// `TimedOut` if no connection succeeds within `timeout`.
    pub fn wait_ready_for(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"));
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop the server and wait for the accept coroutine to finish.
    pub fn stop(self) {
        // SAFETY: cancelling the accept coroutine is the intended shutdown
        // path; the handle is valid for the lifetime of self.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the server coroutine finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start the server on the given address, sizing the per-request
    /// header buffer from `max_headers`.
    ///
    /// # Errors
    ///
    /// Fails if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A, max_headers: usize) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = match header_bound(max_headers) {
            8 => HttpServerWithHeaders::<_, 8>(self.0).start(addr)?,
            16 => HttpServerWithHeaders::<_, 16>(self.0).start(addr)?,
            32 => HttpServerWithHeaders::<_, 32>(self.0).start(addr)?,
            _ => HttpServerWithHeaders::<_, 64>(self.0).start(addr)?,
        };
        Ok(ServerHandle { addr, handle })
    }
}
