use serde::Serialize;

use lens_core::entities::AnalysisResult;
use lens_core::result_data::ResultData;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ResultDetailResponse {
    #[serde(flatten)]
    result: AnalysisResult,
    data: ResultData,
}

pub async fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = ctx
        .store
        .get_result(&args.result_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("result '{}' not found", args.result_id))?;
    let data = ResultData::interpret(&result.result_data);
    output(&ResultDetailResponse { result, data }, flags.format)
}
