//! Command-line configuration.
//!
//! Every flag can also come from the environment:
//!
//! ```bash
//! lilhttp --directory /tmp/files --port 4221
//! LILHTTP_DIRECTORY=/tmp/files LILHTTP_READ_TIMEOUT_MS=5000 lilhttp
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::server::ServerOptions;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "lilhttp", version, about = "Small HTTP/1.1 server with gzip responses")]
pub struct Config {
    /// Directory served and written by `/files/<name>`. Without it that route always answers 404.
    #[arg(long, env = "LILHTTP_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Host/IP to listen on.
    #[arg(long, default_value = "0.0.0.0", env = "LILHTTP_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 4221, env = "LILHTTP_PORT")]
    pub port: u16,

    /// Give up on a request that is not fully read after this many milliseconds (408).
    #[arg(long = "read-timeout-ms", env = "LILHTTP_READ_TIMEOUT_MS")]
    pub read_timeout_ms: Option<u64>,

    /// Give up on a declared body that has not fully arrived after this many milliseconds (400).
    #[arg(long = "body-timeout-ms", default_value_t = 5000, env = "LILHTTP_BODY_TIMEOUT_MS")]
    pub body_timeout_ms: u64,

    /// Maximum number of connections handled at once.
    #[arg(long = "max-connections", env = "LILHTTP_MAX_CONNECTIONS")]
    pub max_connections: Option<NonZeroUsize>,
}

impl Config {
    /// `host:port` as passed to [`Server::bind`](crate::server::Server::bind).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
            body_timeout: Duration::from_millis(self.body_timeout_ms),
            max_connections: self.max_connections,
        }
    }
}
