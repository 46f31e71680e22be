use crate::calc::{run_average, run_required};
use crate::server;
use clap::{Args, Parser, Subcommand};
use grade_sim::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Grade Simulator",
    about = "Compute weighted averages and required scores, or run the simulation API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the weighted average of a fully graded scheme
    Average(EvaluationArgs),
    /// Print the score needed on the one ungraded evaluation
    Required(RequiredArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct EvaluationArgs {
    /// Evaluation as `score:weight`; use `_:weight` for an ungraded one. Repeatable.
    #[arg(long = "eval", value_name = "SCORE:WEIGHT", conflicts_with = "csv")]
    pub(crate) evals: Vec<String>,
    /// CSV file with `label`, `score` and `weight` columns
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RequiredArgs {
    #[command(flatten)]
    pub(crate) evaluations: EvaluationArgs,
    /// Passing threshold (defaults to GRADES_PASSING_THRESHOLD or 10.5)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Treat negative scores as ungraded
    #[arg(long)]
    pub(crate) negative_sentinel: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Average(args) => run_average(args),
        Command::Required(args) => run_required(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["grade-sim-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn required_collects_repeated_evals() {
        let cli = Cli::try_parse_from([
            "grade-sim-api",
            "required",
            "--eval",
            "12:0.3",
            "--eval",
            "_:0.7",
            "--threshold",
            "11",
            "--negative-sentinel",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Required(args)) => {
                assert_eq!(args.evaluations.evals, vec!["12:0.3", "_:0.7"]);
                assert_eq!(args.threshold, Some(11.0));
                assert!(args.negative_sentinel);
            }
            other => panic!("expected required command, got {other:?}"),
        }
    }

    #[test]
    fn eval_and_csv_are_exclusive() {
        let parsed = Cli::try_parse_from([
            "grade-sim-api",
            "average",
            "--eval",
            "12:1",
            "--csv",
            "grades.csv",
        ]);
        assert!(parsed.is_err());
    }
}
