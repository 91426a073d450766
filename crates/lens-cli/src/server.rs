//! `tiny_http` transport for the [`Api`].
//!
//! `recv` blocks, so the accept loop runs in `spawn_blocking` and polls the
//! shutdown token between `recv_timeout` calls. The accept thread only hands
//! requests off: bodies are read on the blocking pool, requests are handled on
//! the runtime, and the response write goes back to the blocking pool.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tiny_http::{Header, Request, Response, Server};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::api::{Api, ApiResponse};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Serve until `shutdown` is cancelled.
pub async fn serve(api: Arc<Api>, bind: &str, shutdown: CancellationToken) -> anyhow::Result<()> {
    let server =
        Server::http(bind).map_err(|e| anyhow::anyhow!("failed to bind {bind}: {e}"))?;
    tracing::info!(%bind, "listening");
    eprintln!("lens: serving on http://{bind}");

    let runtime = Handle::current();
    tokio::task::spawn_blocking(move || accept_loop(&server, &api, &runtime, &shutdown))
        .await
        .context("server thread panicked")?
}

fn accept_loop(
    server: &Server,
    api: &Arc<Api>,
    runtime: &Handle,
    shutdown: &CancellationToken,
) -> anyhow::Result<()> {
    while !shutdown.is_cancelled() {
        let request = match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => return Err(e).context("failed to receive request"),
        };
        let api = Arc::clone(api);
        runtime.spawn(async move {
            let read = tokio::task::spawn_blocking(move || {
                let mut request = request;
                let declared = request.body_length();
                let body = read_body(request.as_reader(), declared, MAX_BODY_BYTES);
                (request, body)
            })
            .await;
            let Ok((request, body)) = read else {
                tracing::error!("request body reader panicked");
                return;
            };
            let method = request.method().clone();
            let url = request.url().to_string();
            let response = match body {
                Ok(body) => api.handle(&method, &url, &body).await,
                Err(error) => ApiResponse::error(error.status(), error.to_string()),
            };
            tracing::info!(%method, %url, status = response.status, "request");
            tokio::task::spawn_blocking(move || respond(request, &response));
        });
    }
    tracing::info!("server stopped");
    Ok(())
}

/// Largest request body accepted. Only summary updates carry a body.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Read(String),
}

impl BodyError {
    const fn status(&self) -> u16 {
        match self {
            Self::TooLarge { .. } => 413,
            Self::Read(_) => 400,
        }
    }
}

/// Read at most `limit` bytes as UTF-8. A declared length over the limit is
/// rejected before reading.
fn read_body(
    reader: impl Read,
    declared: Option<usize>,
    limit: usize,
) -> Result<String, BodyError> {
    if declared.is_some_and(|len| len > limit) {
        return Err(BodyError::TooLarge { limit });
    }
    let mut bytes = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(cap)
        .read_to_end(&mut bytes)
        .map_err(|e| BodyError::Read(e.to_string()))?;
    if bytes.len() > limit {
        return Err(BodyError::TooLarge { limit });
    }
    String::from_utf8(bytes).map_err(|e| BodyError::Read(e.to_string()))
}

fn respond(request: Request, response: &ApiResponse) {
    let mut reply =
        Response::from_string(response.body.to_string()).with_status_code(response.status);
    if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
        reply = reply.with_header(header);
    }
    if let Err(e) = request.respond(reply) {
        tracing::warn!(error = %e, "failed to write response");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_body_within_limit() {
        let body = read_body(Cursor::new(r#"{"summary": "ok"}"#), Some(17), 64).unwrap();
        assert_eq!(body, r#"{"summary": "ok"}"#);
    }

    #[test]
    fn declared_length_over_limit_is_rejected_unread() {
        let err = read_body(Cursor::new(""), Some(65), 64).unwrap_err();
        assert_eq!(err, BodyError::TooLarge { limit: 64 });
        assert_eq!(err.status(), 413);
    }

    #[test]
    fn undeclared_oversized_body_is_rejected() {
        let err = read_body(Cursor::new(vec![b'a'; 65]), None, 64).unwrap_err();
        assert_eq!(err.status(), 413);
        assert_eq!(read_body(Cursor::new(vec![b'a'; 64]), None, 64).unwrap().len(), 64);
    }

    #[test]
    fn invalid_utf8_is_a_bad_request() {
        let err = read_body(Cursor::new(vec![0xff, 0xfe]), None, 64).unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
