use serde::Serialize;

use lens_core::ids::SessionId;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{DeleteArgs, DeleteTarget};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DeleteResponse {
    class_id: String,
    deleted: u64,
}

pub async fn handle(args: &DeleteArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let target = args
        .target()
        .ok_or_else(|| anyhow::anyhow!("pass one of --result, --session or --all"))?;

    let deleted = match target {
        DeleteTarget::Result(id) => {
            let found = ctx
                .store
                .get_result(&id)
                .await?
                .filter(|r| r.class_id == args.class_id);
            if found.is_none() {
                anyhow::bail!("result '{id}' not found in class {}", args.class_id);
            }
            u64::from(ctx.store.delete_result(&id).await?)
        }
        DeleteTarget::Session(raw) => {
            let session = SessionId::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("session id must not be blank"))?;
            ctx.store.delete_session(&args.class_id, &session).await?
        }
        DeleteTarget::All => ctx.store.delete_all_for_class(&args.class_id).await?,
    };

    output(
        &DeleteResponse {
            class_id: args.class_id.clone(),
            deleted,
        },
        flags.format,
    )
}
