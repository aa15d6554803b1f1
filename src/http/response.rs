//! HTTP/1.1 response values and their wire serialization.
//!
//! A handler returns exactly one [`Response`]; the server serializes it with
//! [`Response::into_bytes`], writes it and closes the connection. Because the
//! value is moved into the serializer, a response cannot be sent twice.

use std::io;

use bytes::{BufMut, BytesMut};

use super::{ContentEncoding, StatusCode};

const TEXT_PLAIN: &str = "text/plain";
const OCTET_STREAM: &str = "application/octet-stream";

/// An HTTP/1.1 response, ready to be serialized and sent.
///
/// # Examples
///
/// ```
/// use lilhttp::http::{ContentEncoding, Response};
///
/// let bytes = Response::text("abc").into_bytes(ContentEncoding::Identity).unwrap();
/// assert_eq!(
///     &bytes[..],
///     b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status, no content type and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// `200 OK` with an empty body.
    pub fn ok() -> Self {
        Self::new(StatusCode::Ok)
    }

    /// `201 Created` with an empty body.
    pub fn created() -> Self {
        Self::new(StatusCode::Created)
    }

    /// `404 Not Found` with an empty body.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    /// `400 Bad Request` with an empty body.
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest)
    }

    /// `408 Request Timeout` with an empty body.
    pub fn request_timeout() -> Self {
        Self::new(StatusCode::RequestTimeout)
    }

    /// `200 OK`, `text/plain`, body = the UTF-8 bytes of `content`.
    pub fn text(content: impl Into<String>) -> Self {
        Self::ok()
            .with_content_type(TEXT_PLAIN)
            .body_bytes(content.into().into_bytes())
    }

    /// `200 OK`, `application/octet-stream`, body = `contents` verbatim.
    pub fn file(contents: impl Into<Vec<u8>>) -> Self {
        Self::ok().with_content_type(OCTET_STREAM).body_bytes(contents)
    }

    /// Sets the `Content-Type` header value.
    #[must_use]
    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sets the response body from raw bytes.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the `Content-Type`, if one was set.
    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    /// Returns the unencoded body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response into HTTP/1.1 wire format.
    ///
    /// Layout, in order:
    /// - `HTTP/1.1 <code> <reason>`
    /// - `Content-Type` if set
    /// - `Content-Encoding: gzip` if `encoding` is gzip and the body is non-empty
    /// - `Content-Length` of the transmitted (possibly compressed) body, only
    ///   when that body is non-empty
    /// - blank line, then the body bytes
    ///
    /// Empty bodies are never compressed.
    ///
    /// # Errors
    ///
    /// Returns the codec's error if compressing the body fails.
    pub fn into_bytes(self, encoding: ContentEncoding) -> io::Result<BytesMut> {
        // `/` must stay header-only even when gzip is negotiated.
        let encoding = if self.body.is_empty() {
            ContentEncoding::Identity
        } else {
            encoding
        };
        let body = match encoding {
            ContentEncoding::Identity => self.body,
            coding => coding.encode(&self.body)?,
        };

        let mut buf = BytesMut::with_capacity(128 + body.len());

        // Status line
        buf.put(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        if let Some(content_type) = self.content_type {
            buf.put(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        if let Some(coding) = encoding.as_header_value() {
            buf.put(format!("Content-Encoding: {coding}\r\n").as_bytes());
        }
        if !body.is_empty() {
            buf.put(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        }

        // Header/body separator
        buf.put(&b"\r\n"[..]);

        buf.put(body.as_slice());

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    fn to_string(response: Response, encoding: ContentEncoding) -> String {
        String::from_utf8(response.into_bytes(encoding).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn ok_has_no_content_length() {
        let s = to_string(Response::ok(), ContentEncoding::Identity);
        assert_eq!(s, "HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn created_and_not_found_are_header_only() {
        assert_eq!(
            to_string(Response::created(), ContentEncoding::Identity),
            "HTTP/1.1 201 Created\r\n\r\n"
        );
        assert_eq!(
            to_string(Response::not_found(), ContentEncoding::Identity),
            "HTTP/1.1 404 Not Found\r\n\r\n"
        );
    }

    #[test]
    fn text_response_wire_format() {
        let s = to_string(Response::text("hello"), ContentEncoding::Identity);
        assert_eq!(
            s,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let s = to_string(Response::text("héllo"), ContentEncoding::Identity);
        assert!(s.contains("Content-Length: 6\r\n"));
    }

    #[test]
    fn file_response_is_octet_stream() {
        let bytes = Response::file(vec![0u8, 159, 146, 150])
            .into_bytes(ContentEncoding::Identity)
            .unwrap();
        let head = b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 4\r\n\r\n";
        assert_eq!(&bytes[..head.len()], &head[..]);
        assert_eq!(&bytes[head.len()..], &[0u8, 159, 146, 150]);
    }

    #[test]
    fn empty_text_omits_content_length() {
        let s = to_string(Response::text(""), ContentEncoding::Identity);
        assert_eq!(s, "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n");
    }

    #[test]
    fn gzip_length_is_compressed_length() {
        let bytes = Response::text("abc")
            .into_bytes(ContentEncoding::Gzip)
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let header_end = text.find("\r\n\r\n").unwrap() + 4;
        let body = &bytes[header_end..];

        assert!(text.starts_with(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Encoding: gzip\r\n"
        ));
        assert!(text.contains(&format!("Content-Length: {}\r\n", body.len())));

        let mut decoded = String::new();
        GzDecoder::new(body).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "abc");
    }

    #[test]
    fn gzip_skips_empty_body() {
        let s = to_string(Response::ok(), ContentEncoding::Gzip);
        assert_eq!(s, "HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = Response::text("x").into_bytes(ContentEncoding::Gzip).unwrap();
        let b = Response::text("x").into_bytes(ContentEncoding::Gzip).unwrap();
        assert_eq!(a, b);
    }
}
