//! Async TCP server using Tokio.
//!
//! Accepts TCP connections and serves exactly one HTTP/1.1 request on each:
//! read the request, resolve its route, run the handler, write the response,
//! close. Every accepted connection gets its own task, so a slow client never
//! holds up the accept loop.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::Router;
use crate::http::request::DEFAULT_BODY_TIMEOUT;
use crate::http::{ContentEncoding, Request, RequestError, Response};

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Per-connection limits.
///
/// Only the body timeout is on by default ([`DEFAULT_BODY_TIMEOUT`]); the
/// whole-request timeout and the connection cap are opt-in.
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Deadline for reading a whole request (line, headers and body). A
    /// connection that misses it gets `408 Request Timeout`.
    pub read_timeout: Option<Duration>,
    /// Time a declared body has to arrive in full. A body still short after
    /// it is `IncompleteBody` and gets `400 Bad Request`.
    pub body_timeout: Duration,
    /// Maximum number of connections handled at once. At the cap, the accept
    /// loop waits until a connection finishes.
    pub max_connections: Option<NonZeroUsize>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            read_timeout: None,
            body_timeout: DEFAULT_BODY_TIMEOUT,
            max_connections: None,
        }
    }
}

/// The lilhttp HTTP server.
///
/// # Examples
///
/// ```rust,no_run
/// use lilhttp::server::Server;
/// use lilhttp::{Response, Router};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut router = Router::new();
///     router.register("/", |_req| async { Response::ok() });
///
///     let server = Server::bind("127.0.0.1:4221").await?;
///     server.run(router).await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    options: ServerOptions,
}

impl Server {
    /// Binds the server to the given TCP address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            options: ServerOptions::default(),
        })
    }

    /// Replaces the per-connection limits.
    #[must_use]
    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts accepting connections and dispatching their requests through `router`.
    ///
    /// The route table is frozen from here on and shared read-only by every
    /// connection task. Accept failures are logged and the loop keeps going;
    /// this method runs until the process is terminated.
    ///
    /// # Errors
    ///
    /// Currently never returns an error; the signature leaves room for
    /// listener failures that should stop the server.
    pub async fn run(self, router: Router) -> Result<(), ServerError> {
        let router = Arc::new(router);
        let limiter = self
            .options
            .max_connections
            .map(|max| Arc::new(Semaphore::new(max.get())));
        let options = self.options;

        info!(address = %self.local_addr, routes = router.len(), "lilhttp listening");

        loop {
            let permit = match &limiter {
                Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    // Only a closed semaphore fails, and this one is never closed.
                    Err(_) => break,
                },
                None => None,
            };

            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            let router = Arc::clone(&router);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, router, options).await {
                    warn!(peer = %peer_addr, error = %e, "connection closed with error");
                }
                drop(permit);
            });
        }

        Ok(())
    }
}

/// Serves the single request of one connection.
///
/// The stream is dropped on return, which closes the connection whether or
/// not a response was written.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    router: Arc<Router>,
    options: ServerOptions,
) -> Result<(), std::io::Error> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let read = Request::read_with_body_timeout(&mut reader, options.body_timeout);
    let parsed = match options.read_timeout {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(peer = %peer_addr, "request read timed out, sending 408");
                let response = Response::request_timeout();
                return send(&mut writer, response, ContentEncoding::Identity).await;
            }
        },
        None => read.await,
    };

    let request = match parsed {
        Ok(request) => request,
        Err(RequestError::ConnectionClosed) => {
            debug!(peer = %peer_addr, "connection closed by peer before a request");
            return Ok(());
        }
        Err(e) => {
            warn!(peer = %peer_addr, error = %e, "bad request, sending 400");
            return send(&mut writer, Response::bad_request(), ContentEncoding::Identity).await;
        }
    };

    let encoding = ContentEncoding::for_request(&request);

    debug!(
        peer = %peer_addr,
        method = %request.method(),
        path = %request.path(),
        "dispatching request"
    );

    let response = match router.resolve(request.path()) {
        Some(handler) => handler(request).await,
        None => {
            debug!(peer = %peer_addr, path = %request.path(), "no route, sending 404");
            Response::not_found()
        }
    };

    send(&mut writer, response, encoding).await
}

/// Serializes `response`, writes it and shuts down the write side.
///
/// A serialization (compression) failure returns before anything is written,
/// so the client sees the connection close without a response.
async fn send<W>(
    writer: &mut W,
    response: Response,
    encoding: ContentEncoding,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let bytes = response.into_bytes(encoding)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    writer.shutdown().await
}
