use lens_core::ids::SessionId;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResolveArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(args: &ResolveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = args.session.as_deref().and_then(SessionId::parse);
    let resolved = ctx
        .resolver()
        .resolve(&args.class_id, args.stage, session.as_ref())
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no {} result exists for class {}",
                args.stage,
                args.class_id
            )
        })?;

    if resolved.is_fallback(session.as_ref()) {
        tracing::warn!(
            result_id = %resolved.result.id,
            "session has no {} result; showing the newest one instead",
            args.stage
        );
    }
    output(&resolved, flags.format)
}
