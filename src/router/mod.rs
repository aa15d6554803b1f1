//! First-segment request routing.
//!
//! [`Router`] maps the first segment of a request path to a handler. Only that
//! segment is considered, so a handler registered at `/files` receives
//! `/files`, `/files/a.txt` and `/files/a/b.txt` alike:
//!
//! | Path               | Route key     |
//! |--------------------|---------------|
//! | `/`                | `/`           |
//! | `/echo/abc`        | `/echo`       |
//! | `/user-agent`      | `/user-agent` |
//! | `//files/a.txt`    | `/files`      |
//!
//! The table is built once before the server starts and is only read
//! afterwards, so it is shared across connection tasks behind an `Arc`.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response};

/// Type-erased, heap-allocated async handler that consumes a [`Request`] and returns
/// the single [`Response`] sent for it.
///
/// In practice you never construct this type directly; use [`Router::register`].
pub type Handler =
    Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Request) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait automatically via the blanket impl
/// below.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given request, boxing the returned future.
    fn call(&self, request: Request) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin((self)(request))
    }
}

/// Returns the route key of `path`: `/` followed by its first non-empty
/// segment, or `/` when the path has no segments.
///
/// # Examples
///
/// ```
/// use lilhttp::router::route_key;
///
/// assert_eq!(route_key("/"), "/");
/// assert_eq!(route_key("/echo/abc"), "/echo");
/// assert_eq!(route_key("/user-agent"), "/user-agent");
/// ```
pub fn route_key(path: &str) -> String {
    match path.split('/').find(|segment| !segment.is_empty()) {
        Some(segment) => format!("/{segment}"),
        None => "/".to_owned(),
    }
}

/// Prefix router keyed by the first path segment.
///
/// Registering the same key twice keeps the last handler.
///
/// # Examples
///
/// ```rust
/// use lilhttp::{Response, Router};
///
/// let mut router = Router::new();
/// router.register("/", |_req| async { Response::ok() });
/// router.register("/echo", |_req| async { Response::text("hi") });
///
/// assert!(router.resolve("/").is_some());
/// assert!(router.resolve("/echo/hi").is_some());
/// assert!(router.resolve("/nope").is_none());
/// ```
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new, empty `Router` with no registered routes.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register `handler` for every path whose first segment matches `prefix`.
    ///
    /// `prefix` is normalized with [`route_key`], so `"/files"`, `"files"` and
    /// `"/files/"` name the same route.
    pub fn register(&mut self, prefix: &str, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |req| handler.call(req));
        self.routes.insert(route_key(prefix), handler);
    }

    /// Look up the handler for `path`.
    ///
    /// Returns `None` on a miss; answering with `404 Not Found` is up to the
    /// caller.
    pub fn resolve(&self, path: &str) -> Option<&Handler> {
        self.routes.get(&route_key(path))
    }

    /// Return the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    async fn make_request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        Request::read_from(&mut raw.as_bytes()).await.unwrap()
    }

    async fn dispatch(router: &Router, path: &str) -> Option<Response> {
        let handler = router.resolve(path)?;
        Some(handler(make_request("GET", path).await).await)
    }

    // ── route_key ─────────────────────────────────────────────────────────────

    #[test]
    fn route_key_root() {
        assert_eq!(route_key("/"), "/");
        assert_eq!(route_key(""), "/");
        assert_eq!(route_key("//"), "/");
    }

    #[test]
    fn route_key_takes_first_segment_only() {
        assert_eq!(route_key("/files/a/b.txt"), "/files");
        assert_eq!(route_key("/echo/"), "/echo");
    }

    #[test]
    fn route_key_skips_empty_segments() {
        assert_eq!(route_key("//echo/abc"), "/echo");
    }

    #[test]
    fn route_key_normalizes_prefixes() {
        assert_eq!(route_key("files"), "/files");
        assert_eq!(route_key("/files/"), "/files");
    }

    // ── Router ────────────────────────────────────────────────────────────────

    #[test]
    fn router_starts_empty() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
        assert!(Router::default().is_empty());
    }

    #[test]
    fn equivalent_prefixes_share_one_route() {
        let mut router = Router::new();
        router.register("/files", |_req| async { Response::ok() });
        router.register("files/", |_req| async { Response::created() });
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn unregistered_prefix_resolves_to_none() {
        let mut router = Router::new();
        router.register("/echo", |_req| async { Response::ok() });
        assert!(router.resolve("/nope").is_none());
        assert!(router.resolve("/").is_none());
    }

    #[test]
    fn prefix_match_is_exact_segment() {
        let mut router = Router::new();
        router.register("/echo", |_req| async { Response::ok() });
        assert!(router.resolve("/echoes").is_none());
        assert!(router.resolve("/ech").is_none());
    }

    #[tokio::test]
    async fn root_resolves_to_root_handler() {
        let mut router = Router::new();
        router.register("/", |_req| async { Response::ok() });
        router.register("/echo", |_req| async { Response::not_found() });

        let res = dispatch(&router, "/").await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn nested_path_reaches_prefix_handler() {
        let mut router = Router::new();
        router.register("/echo", |req: Request| async move {
            Response::text(req.path().to_owned())
        });

        let res = dispatch(&router, "/echo/a/b").await.unwrap();
        assert_eq!(res.body(), b"/echo/a/b");
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut router = Router::new();
        router.register("/path", |_req| async { Response::ok() });
        router.register("/path", |_req| async { Response::created() });

        let res = dispatch(&router, "/path").await.unwrap();
        assert_eq!(res.status(), StatusCode::Created);
    }
}
