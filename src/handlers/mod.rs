//! Application endpoints and the route table that wires them up.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{Request, Response, Router};

pub mod files;

pub use files::Files;

/// `/`: always `200 OK` with no body.
pub async fn root(_request: Request) -> Response {
    Response::ok()
}

/// `/echo/<text>`: responds with `<text>` as `text/plain`.
///
/// `/echo` without a trailing `/` has nothing to echo and gets `404`.
pub async fn echo(request: Request) -> Response {
    match request.path().strip_prefix("/echo/") {
        Some(text) => Response::text(text),
        None => Response::not_found(),
    }
}

/// `/user-agent`: responds with the `User-Agent` header, or an empty body.
pub async fn user_agent(request: Request) -> Response {
    Response::text(request.headers().get("User-Agent").unwrap_or_default())
}

/// Builds the server's route table.
///
/// `directory` is the base directory for `/files/*`; `None` makes that route
/// answer `404` to everything.
pub fn routes(directory: Option<PathBuf>) -> Router {
    let files = Arc::new(Files::new(directory));

    let mut router = Router::new();
    router.register("/", root);
    router.register("/echo", echo);
    router.register("/user-agent", user_agent);
    router.register("/files", move |request: Request| {
        let files = Arc::clone(&files);
        async move { files.handle(request).await }
    });
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    async fn request(raw: &str) -> Request {
        Request::read_from(&mut raw.as_bytes()).await.unwrap()
    }

    #[tokio::test]
    async fn root_is_empty_ok() {
        let res = root(request("GET / HTTP/1.1\r\n\r\n").await).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert!(res.body().is_empty());
        assert_eq!(res.content_type(), None);
    }

    #[tokio::test]
    async fn echo_returns_remainder() {
        let res = echo(request("GET /echo/abc/def HTTP/1.1\r\n\r\n").await).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.content_type(), Some("text/plain"));
        assert_eq!(res.body(), b"abc/def");
    }

    #[tokio::test]
    async fn echo_without_text_is_not_found() {
        let res = echo(request("GET /echo HTTP/1.1\r\n\r\n").await).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn echo_with_trailing_slash_is_empty_text() {
        let res = echo(request("GET /echo/ HTTP/1.1\r\n\r\n").await).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn user_agent_is_echoed() {
        let req = request("GET /user-agent HTTP/1.1\r\nUser-Agent: foo/1.0\r\n\r\n").await;
        let res = user_agent(req).await;
        assert_eq!(res.body(), b"foo/1.0");
    }

    #[tokio::test]
    async fn missing_user_agent_is_empty() {
        let res = user_agent(request("GET /user-agent HTTP/1.1\r\n\r\n").await).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert!(res.body().is_empty());
    }

    #[test]
    fn route_table_has_every_endpoint() {
        let router = routes(None);
        assert_eq!(router.len(), 4);
        for path in ["/", "/echo/x", "/user-agent", "/files/a.txt"] {
            assert!(router.resolve(path).is_some(), "{path} should resolve");
        }
        assert!(router.resolve("/nope").is_none());
    }
}
