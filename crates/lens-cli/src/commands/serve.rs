use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::Api;
use crate::cli::root_commands::ServeArgs;
use crate::context::AppContext;
use crate::server;

/// Serve the HTTP API until Ctrl-C.
pub async fn handle(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| ctx.config.server.bind.clone());
    if ctx.analyzer().is_none() {
        tracing::warn!("analyzer is not configured; stage and run endpoints will answer 503");
    }

    let shutdown = CancellationToken::new();
    let api = Arc::new(Api::from_context(ctx, shutdown.clone()));

    let signal = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
                shutdown.cancel();
            }
        })
    };

    let result = server::serve(api, &bind, shutdown).await;
    signal.abort();
    result
}
