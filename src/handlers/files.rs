//! `/files/<name>`: read and store whole files under a base directory.
//!
//! Every failure (no directory configured, missing file, permission denied,
//! unusable name) is answered with `404 Not Found`; clients cannot tell them
//! apart. File contents are held in memory in full.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::http::Method;
use crate::{Request, Response};

const PREFIX: &str = "/files/";

/// Handler for the files route, holding its base directory.
#[derive(Debug, Clone, Default)]
pub struct Files {
    directory: Option<PathBuf>,
}

impl Files {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    /// `GET` reads the file, `POST` creates or truncates it with the request
    /// body. Other methods get `404`.
    pub async fn handle(&self, request: Request) -> Response {
        let Some(path) = self.file_path(request.path()) else {
            return Response::not_found();
        };

        match request.method() {
            Method::Get => read(&path).await,
            Method::Post => store(&path, request.body()).await,
            other => {
                debug!(method = %other, "unsupported method on files route");
                Response::not_found()
            }
        }
    }

    /// Maps a request path to a location under the base directory.
    ///
    /// Names made only of normal components are accepted, nested ones
    /// included. `..`, absolute names and an empty name are rejected.
    fn file_path(&self, request_path: &str) -> Option<PathBuf> {
        let directory = self.directory.as_ref()?;
        let name = request_path.strip_prefix(PREFIX)?;
        if name.is_empty() {
            return None;
        }

        let relative = Path::new(name);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            warn!(name, "rejecting file name outside the base directory");
            return None;
        }
        Some(directory.join(relative))
    }
}

async fn read(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(contents) => Response::file(contents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "file read failed");
            Response::not_found()
        }
    }
}

async fn store(path: &Path, body: &[u8]) -> Response {
    match tokio::fs::write(path, body).await {
        Ok(()) => {
            debug!(path = %path.display(), bytes = body.len(), "file stored");
            Response::created()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "file store failed");
            Response::not_found()
        }
    }
}
