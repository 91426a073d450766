use lens_core::entities::ResultListing;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::context::AppContext;
use crate::output::output;

pub async fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let listing = ctx
        .store
        .list_by_class(&args.class_id, args.group_by_session)
        .await?;
    let limit = args.limit.unwrap_or(ctx.config.general.default_limit);
    output(&truncate(listing, limit), flags.format)
}

/// Keep the newest `limit` rows or groups; 0 keeps everything.
fn truncate(listing: ResultListing, limit: u32) -> ResultListing {
    let Ok(limit) = usize::try_from(limit) else {
        return listing;
    };
    if limit == 0 {
        return listing;
    }
    match listing {
        ResultListing::Flat(mut rows) => {
            rows.truncate(limit);
            ResultListing::Flat(rows)
        }
        ResultListing::Grouped(mut groups) => {
            groups.truncate(limit);
            ResultListing::Grouped(groups)
        }
    }
}
