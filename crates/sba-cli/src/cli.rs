use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sba_core::AnalyzerRoute;

#[derive(Parser, Debug)]
#[command(
    name = "sba",
    version,
    about = "Statistical and AI-generated strategy analyses for small-business datasets"
)]
pub(crate) struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) log_json: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run one analysis and print the result envelope
    Analyze(AnalyzeArgs),
    /// Only run the dataset checks
    Validate(ValidateArgs),
    /// List supported analysis kinds
    Kinds,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AnalyzeArgs {
    /// Uploaded tabular file
    #[arg(long)]
    pub(crate) dataset: PathBuf,

    /// Analysis kind (see `sba kinds`)
    #[arg(long)]
    pub(crate) kind: String,

    /// Force an analyzer instead of the kind's default
    #[arg(long, value_enum)]
    pub(crate) route: Option<RouteArg>,

    /// TOML configuration file
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Directory for analyzer artifacts
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Analyzer time budget in milliseconds
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,

    /// Field delimiter declared for the dataset
    #[arg(long, default_value_t = ',')]
    pub(crate) delimiter: char,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ValidateArgs {
    /// Uploaded tabular file
    #[arg(long)]
    pub(crate) dataset: PathBuf,

    /// Field delimiter declared for the dataset
    #[arg(long, default_value_t = ',')]
    pub(crate) delimiter: char,

    /// Bytes inspected for the delimiter
    #[arg(long, default_value_t = sba_dataset::DEFAULT_PROBE_BYTES)]
    pub(crate) probe_bytes: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteArg {
    Statistical,
    Narrative,
}

impl From<RouteArg> for AnalyzerRoute {
    fn from(route: RouteArg) -> Self {
        match route {
            RouteArg::Statistical => Self::Statistical,
            RouteArg::Narrative => Self::Narrative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze() {
        let cli = Cli::try_parse_from([
            "sba",
            "analyze",
            "--dataset",
            "sales.csv",
            "--kind",
            "positioning_matrix",
            "--route",
            "narrative",
            "--timeout-ms",
            "5000",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.dataset, PathBuf::from("sales.csv"));
        assert_eq!(args.route, Some(RouteArg::Narrative));
        assert_eq!(args.timeout_ms, Some(5000));
        assert_eq!(args.delimiter, ',');
        assert!(!cli.log_json);
    }

    #[test]
    fn log_json_is_global() {
        let cli = Cli::try_parse_from(["sba", "kinds", "--log-json"]).unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Kinds));
    }

    #[test]
    fn kind_is_required() {
        assert!(Cli::try_parse_from(["sba", "analyze", "--dataset", "x.csv"]).is_err());
    }
}
