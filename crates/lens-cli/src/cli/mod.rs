use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `lens` binary.
#[derive(Debug, Parser)]
#[command(
    name = "lens",
    version,
    about = "Classlens - staged class analysis runs and results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to the nearest directory containing .lens)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use lens_core::enums::StageType;

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::root_commands::DeleteTarget;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_on_either_side() {
        let cli = Cli::try_parse_from(["lens", "--format", "table", "run", "cls-7a", "--verbose"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Run(ref args) if args.class_id == "cls-7a"));
    }

    #[test]
    fn stage_parses_stage_name_and_session() {
        let cli = Cli::try_parse_from(["lens", "stage", "cls-7a", "students-3", "--session", "ses-1"])
            .expect("cli should parse");
        let Commands::Stage(args) = cli.command else {
            panic!("expected stage command");
        };
        assert_eq!(args.stage, StageType::Students3);
        assert_eq!(args.session.as_deref(), Some("ses-1"));
    }

    #[test]
    fn stage_rejects_unknown_stage() {
        assert!(Cli::try_parse_from(["lens", "stage", "cls-7a", "students-9"]).is_err());
    }

    #[test]
    fn delete_requires_exactly_one_target() {
        assert!(Cli::try_parse_from(["lens", "delete", "cls-7a"]).is_err());
        assert!(
            Cli::try_parse_from(["lens", "delete", "cls-7a", "--all", "--session", "ses-1"])
                .is_err()
        );

        let cli = Cli::try_parse_from(["lens", "delete", "cls-7a", "--session", "ses-1"])
            .expect("cli should parse");
        let Commands::Delete(args) = cli.command else {
            panic!("expected delete command");
        };
        assert_eq!(args.target(), Some(DeleteTarget::Session("ses-1".to_string())));
    }

    #[test]
    fn list_defaults_to_flat() {
        let cli = Cli::try_parse_from(["lens", "list", "cls-7a"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::List(ref args) if !args.group_by_session));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["lens", "--format", "xml", "list", "cls-7a"]).is_err());
    }
}
