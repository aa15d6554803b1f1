//! Response content coding: `Accept-Encoding` negotiation and gzip.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::Request;

/// The content coding applied to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncoding {
    /// Body is sent as-is.
    #[default]
    Identity,
    /// Body is gzip-compressed and `Content-Encoding: gzip` is sent.
    Gzip,
}

impl ContentEncoding {
    /// Chooses the coding for a response from the client's `Accept-Encoding`
    /// value.
    ///
    /// gzip is selected iff the value is exactly `gzip` or contains the
    /// substring `gzip,`. Quality values are not parsed, so `deflate, gzip`
    /// and `gzip;q=1.0` both stay [`ContentEncoding::Identity`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lilhttp::http::ContentEncoding;
    ///
    /// assert_eq!(ContentEncoding::negotiate(Some("gzip")), ContentEncoding::Gzip);
    /// assert_eq!(ContentEncoding::negotiate(Some("gzip, br")), ContentEncoding::Gzip);
    /// assert_eq!(ContentEncoding::negotiate(Some("br, gzip")), ContentEncoding::Identity);
    /// assert_eq!(ContentEncoding::negotiate(None), ContentEncoding::Identity);
    /// ```
    pub fn negotiate(accept_encoding: Option<&str>) -> Self {
        match accept_encoding {
            Some(value) if value == "gzip" || value.contains("gzip,") => Self::Gzip,
            _ => Self::Identity,
        }
    }

    /// Negotiates against the `Accept-Encoding` header of `request`.
    pub fn for_request(request: &Request) -> Self {
        Self::negotiate(request.headers().get("Accept-Encoding"))
    }

    /// The `Content-Encoding` token, or `None` for identity.
    pub fn as_header_value(self) -> Option<&'static str> {
        match self {
            Self::Identity => None,
            Self::Gzip => Some("gzip"),
        }
    }

    /// Encodes `body` with this coding.
    pub fn encode(self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Identity => Ok(body.to_vec()),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(
                    Vec::with_capacity(body.len() / 2 + 32),
                    Compression::default(),
                );
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}
