use anyhow::{Context, bail};

use lens_core::ids::SessionId;
use lens_pipeline::WriteGuard;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StageArgs;
use crate::context::AppContext;
use crate::output::output;

/// Run one stage directly. Unlike a full run, a write-guard denial is an error here.
pub async fn handle(args: &StageArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if let lens_pipeline::GuardDecision::Deny { reason } = ctx.guard.check(&args.class_id, args.stage)
    {
        bail!("{reason}");
    }

    let executor = ctx.executor()?;
    let session = args.session.as_deref().and_then(SessionId::parse);
    let stored = executor
        .execute(&args.class_id, args.stage, session.as_ref())
        .await
        .with_context(|| format!("stage {} failed for class {}", args.stage, args.class_id))?;
    output(&stored, flags.format)
}
