use crate::cli::{EvaluationArgs, RequiredArgs};
use grade_sim::config::AppConfig;
use grade_sim::error::AppError;
use grade_sim::grading::input::{format_score, parse_evaluations, parse_pair, read_csv};
use grade_sim::grading::{
    Average, EvaluationSet, GradeEngine, MissingScorePolicy, RawEvaluation, RequiredScore,
};
use std::fs::File;
use std::io::BufReader;

pub(crate) fn run_average(args: EvaluationArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = GradeEngine::new(config.simulations.grading);
    let evaluations = load_evaluations(&args, MissingScorePolicy::BlankOnly)?;

    let average = engine.average(&evaluations)?;
    println!("{}", render_average(&evaluations, &average));
    Ok(())
}

pub(crate) fn run_required(args: RequiredArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = GradeEngine::new(config.simulations.grading);
    let policy = if args.negative_sentinel {
        MissingScorePolicy::NegativeSentinel
    } else {
        MissingScorePolicy::BlankOnly
    };
    let evaluations = load_evaluations(&args.evaluations, policy)?;

    let required = engine.required_score(&evaluations, args.threshold)?;
    println!("{}", render_required(&evaluations, &required));
    Ok(())
}

fn load_evaluations(
    args: &EvaluationArgs,
    policy: MissingScorePolicy,
) -> Result<EvaluationSet, AppError> {
    let rows = match &args.csv {
        Some(path) => read_csv(BufReader::new(File::open(path)?))?,
        None => args
            .evals
            .iter()
            .map(|raw| parse_pair(raw))
            .collect::<Result<Vec<RawEvaluation>, _>>()?,
    };

    Ok(parse_evaluations(&rows, policy)?)
}

fn render_table(evaluations: &EvaluationSet) -> String {
    let header = format!("{:<4} {:<16} {:>7} {:>7}", "#", "label", "score", "weight");
    let mut lines = vec![header];
    for (index, item) in evaluations.iter().enumerate() {
        let score = if item.is_pending() {
            "-".to_string()
        } else {
            format_score(item.score)
        };
        lines.push(format!(
            "{:<4} {:<16} {:>7} {:>7.2}",
            index + 1,
            item.label.as_deref().unwrap_or(""),
            score,
            item.weight
        ));
    }
    lines.join("\n")
}

fn render_average(evaluations: &EvaluationSet, average: &Average) -> String {
    format!(
        "{}\n\nweighted average: {}",
        render_table(evaluations),
        format_score(Some(average.display()))
    )
}

fn render_required(evaluations: &EvaluationSet, required: &RequiredScore) -> String {
    format!(
        "{}\n\nrequired score: {} ({})\n{}",
        render_table(evaluations),
        format_score(Some(required.display())),
        required.verdict().label(),
        required.message()
    )
}
