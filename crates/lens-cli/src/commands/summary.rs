use crate::cli::GlobalFlags;
use crate::cli::root_commands::SummaryArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(args: &SummaryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = if args.clear {
        None
    } else {
        args.text.as_deref()
    };
    let updated = ctx
        .store
        .update_summary(&args.result_id, summary)
        .await?
        .ok_or_else(|| anyhow::anyhow!("result '{}' not found", args.result_id))?;
    output(&updated, flags.format)
}
