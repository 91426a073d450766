use tokio_util::sync::CancellationToken;

use lens_pipeline::RunError;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::RunProgress;

/// Run the full stage sequence. Ctrl-C stops the run before the next stage;
/// the stage in flight still finishes and is stored.
pub async fn handle(args: &RunArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let coordinator = ctx.coordinator()?;
    let cancel = CancellationToken::new();

    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after the current stage");
                cancel.cancel();
            }
        })
    };

    let progress = RunProgress::new();
    let result = coordinator.run(&args.class_id, &cancel, &progress).await;
    watcher.abort();

    match result {
        Ok(report) => output(&report, flags.format),
        Err(RunError::StageFailed {
            stage,
            report,
            source,
            ..
        }) => {
            output(&*report, flags.format)?;
            Err(anyhow::Error::new(source)
                .context(format!("stage {stage} failed; remaining stages were not run")))
        }
        Err(error) => Err(error.into()),
    }
}
