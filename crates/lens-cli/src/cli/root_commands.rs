use clap::{Args, Subcommand};
use lens_core::enums::StageType;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run every analysis stage for a class under a new session.
    Run(RunArgs),
    /// Run a single stage.
    Stage(StageArgs),
    /// List stored results for a class.
    List(ListArgs),
    /// Show the result to display for a stage, falling back to the newest.
    Resolve(ResolveArgs),
    /// Show one result by ID.
    Show(ShowArgs),
    /// Delete one result, one session, or everything for a class.
    Delete(DeleteArgs),
    /// Set or clear the summary annotation on a result.
    Summary(SummaryArgs),
    /// Serve the HTTP API.
    Serve(ServeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    pub class_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct StageArgs {
    pub class_id: String,
    /// overview, or students-1 .. students-8
    pub stage: StageType,
    /// Session to store the result under (omit for a sessionless result)
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    pub class_id: String,
    /// Cluster results by the run that produced them
    #[arg(long, short = 'g')]
    pub group_by_session: bool,
    /// Max rows (or groups) to print; defaults to general.default_limit, 0 for all
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct ResolveArgs {
    pub class_id: String,
    pub stage: StageType,
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub result_id: String,
}

#[derive(Clone, Debug, Args)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["result", "session", "all"])
))]
pub struct DeleteArgs {
    pub class_id: String,
    /// Delete one result
    #[arg(long)]
    pub result: Option<String>,
    /// Delete every result of one session
    #[arg(long)]
    pub session: Option<String>,
    /// Delete every result for the class
    #[arg(long)]
    pub all: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    Result(String),
    Session(String),
    All,
}

impl DeleteArgs {
    #[must_use]
    pub fn target(&self) -> Option<DeleteTarget> {
        if let Some(id) = &self.result {
            Some(DeleteTarget::Result(id.clone()))
        } else if let Some(session) = &self.session {
            Some(DeleteTarget::Session(session.clone()))
        } else if self.all {
            Some(DeleteTarget::All)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct SummaryArgs {
    pub result_id: String,
    /// New summary text; omit with --clear to remove it
    #[arg(required_unless_present = "clear")]
    pub text: Option<String>,
    #[arg(long, conflicts_with = "text")]
    pub clear: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (defaults to server.bind from config)
    #[arg(long)]
    pub bind: Option<String>,
}
