//! # lilhttp
//!
//! A small HTTP/1.1 server: one request per connection, routing on the first
//! path segment, and gzip-compressed responses for clients that ask for them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lilhttp::server::Server;
//! use lilhttp::{Request, Response, Router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.register("/hello", |_req: Request| async { Response::text("Hello, World!") });
//!
//!     let server = Server::bind("127.0.0.1:4221").await?;
//!     server.run(router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::Config;
pub use http::{ContentEncoding, Headers, Method, Request, Response, StatusCode};
pub use router::Router;
pub use server::{Server, ServerError, ServerOptions};
