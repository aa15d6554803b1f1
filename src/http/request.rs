//! HTTP/1.1 request parsing from a buffered async byte stream.
//!
//! The parser is line oriented: one request line, header lines up to the
//! first blank line, then exactly `Content-Length` body bytes. Chunked
//! transfer coding is not understood; without `Content-Length` the body is
//! empty whatever the method.
//!
//! Reads are bounded: the request line and headers together may not exceed
//! [`MAX_HEAD_SIZE`], and a declared body must arrive within the body timeout
//! ([`DEFAULT_BODY_TIMEOUT`] unless overridden).

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::warn;

use super::{Headers, Method};

/// Upper bound on the body buffer reserved up front; a larger declared
/// `Content-Length` grows the buffer as bytes actually arrive.
const INITIAL_BODY_CAPACITY: usize = 64 * 1024;

/// Maximum size of the request line plus all header lines, terminators included.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Time a declared body is given to arrive before the request fails with
/// [`RequestError::IncompleteBody`].
pub const DEFAULT_BODY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while reading an HTTP/1.1 request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a request line was received")]
    ConnectionClosed,

    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed Content-Length value: {value:?}")]
    MalformedContentLength { value: String },

    #[error("request line and headers exceed {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("body ended after {received} of {expected} declared bytes")]
    IncompleteBody { expected: usize, received: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully read HTTP/1.1 request.
///
/// Built once per connection by [`Request::read_from`] and immutable
/// afterwards.
///
/// # Examples
///
/// ```
/// use lilhttp::http::Request;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let raw = b"POST /files/a.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
/// let request = Request::read_from(&mut &raw[..]).await.unwrap();
///
/// assert_eq!(request.method().as_str(), "POST");
/// assert_eq!(request.path(), "/files/a.txt");
/// assert_eq!(request.version(), "HTTP/1.1");
/// assert_eq!(&request.body()[..], b"hello");
/// # }
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    version: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Reads one request from `reader`, allowing [`DEFAULT_BODY_TIMEOUT`]
    /// for the body.
    ///
    /// Header lines without a `": "` separator are logged and skipped; they
    /// never fail the request.
    ///
    /// # Errors
    ///
    /// - [`RequestError::ConnectionClosed`]: the stream ended before any byte arrived.
    /// - [`RequestError::MalformedRequestLine`]: fewer than three tokens, a
    ///   path not starting with `/`, or a line that is not UTF-8.
    /// - [`RequestError::MalformedContentLength`]: `Content-Length` is not a
    ///   non-negative integer.
    /// - [`RequestError::HeadTooLarge`]: the request line and headers run
    ///   past [`MAX_HEAD_SIZE`].
    /// - [`RequestError::IncompleteBody`]: the stream ended, or stalled for
    ///   the body timeout, before the declared body length was read.
    /// - [`RequestError::Io`]: the underlying read failed.
    pub async fn read_from<R>(reader: &mut R) -> Result<Self, RequestError>
    where
        R: AsyncBufRead + Unpin,
    {
        Self::read_with_body_timeout(reader, DEFAULT_BODY_TIMEOUT).await
    }

    /// Like [`Request::read_from`], with an explicit deadline for the body.
    pub async fn read_with_body_timeout<R>(
        reader: &mut R,
        body_timeout: Duration,
    ) -> Result<Self, RequestError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut remaining = MAX_HEAD_SIZE;
        let mut line = Vec::with_capacity(256);
        if read_line(reader, &mut line, &mut remaining).await? == 0 {
            return Err(RequestError::ConnectionClosed);
        }
        let (method, path, version) = parse_request_line(trim_line_ending(&line))?;

        let mut headers = Headers::new();
        loop {
            if read_line(reader, &mut line, &mut remaining).await? == 0 {
                break;
            }
            let text = trim_line_ending(&line);
            if text.is_empty() {
                break;
            }
            match parse_header_line(text) {
                Some((name, value)) => headers.insert(name, value),
                None => warn!(
                    line = %String::from_utf8_lossy(text),
                    "skipping malformed header line"
                ),
            }
        }

        let body = match headers.get("Content-Length") {
            Some(raw) if !raw.is_empty() => {
                let expected: usize =
                    raw.parse()
                        .map_err(|_| RequestError::MalformedContentLength {
                            value: raw.to_owned(),
                        })?;
                read_body(reader, expected, body_timeout).await?
            }
            _ => Bytes::new(),
        };

        Ok(Self {
            method,
            path,
            version,
            headers,
            body,
        })
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request target exactly as received. Always starts with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the protocol token, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_request_line(line: &[u8]) -> Result<(Method, String, String), RequestError> {
    let malformed = || RequestError::MalformedRequestLine {
        line: String::from_utf8_lossy(line).into_owned(),
    };

    let text = std::str::from_utf8(line).map_err(|_| malformed())?;
    let mut tokens = text.split_ascii_whitespace();
    let (Some(method), Some(path), Some(version)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(malformed());
    };
    if !path.starts_with('/') {
        return Err(malformed());
    }

    let Ok(method) = method.parse::<Method>();
    Ok((method, path.to_owned(), version.to_owned()))
}

// Splits `Name: value` on the first `": "`. The value is trimmed, the name is not.
fn parse_header_line(line: &[u8]) -> Option<(&str, &str)> {
    let text = std::str::from_utf8(line).ok()?;
    let (name, value) = text.split_once(": ")?;
    Some((name, value.trim()))
}

// Reads one line into `line` (cleared first), charging it against the head
// budget in `remaining`. Returns 0 at EOF.
async fn read_line<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    remaining: &mut usize,
) -> Result<usize, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let too_large = RequestError::HeadTooLarge {
        limit: MAX_HEAD_SIZE,
    };
    if *remaining == 0 {
        return Err(too_large);
    }

    line.clear();
    let read = (&mut *reader)
        .take(*remaining as u64)
        .read_until(b'\n', line)
        .await?;
    if read == *remaining && !line.ends_with(b"\n") {
        return Err(too_large);
    }
    *remaining -= read;
    Ok(read)
}

async fn read_body<R>(
    reader: &mut R,
    expected: usize,
    body_timeout: Duration,
) -> Result<Bytes, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut body = Vec::with_capacity(expected.min(INITIAL_BODY_CAPACITY));
    let outcome = tokio::time::timeout(
        body_timeout,
        reader.take(expected as u64).read_to_end(&mut body),
    )
    .await;
    let received = match outcome {
        Ok(read) => read?,
        Err(_) => {
            warn!(expected, received = body.len(), "request body stalled");
            body.len()
        }
    };
    if received < expected {
        return Err(RequestError::IncompleteBody { expected, received });
    }
    Ok(Bytes::from(body))
}
