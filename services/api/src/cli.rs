use crate::loader::{load_policy, seed_stores, BatchArgs};
use crate::server;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use report_card::config::AppConfig;
use report_card::error::AppError;
use report_card::grading::parse_score;
use report_card::reports::{render_plain_text, ReportCardService, StudentId, StudentReport};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Report Card Engine",
    about = "Grade score sheets and print end of term report cards",
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
    /// Classify a single score against a grading policy
    Classify(ClassifyArgs),
    /// Print report cards for every student on a score sheet
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) batch: BatchArgs,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Grading policy document (JSON)
    #[arg(long)]
    policy: PathBuf,
    /// Raw score as entered, e.g. "77", "79.5", "abs"
    score: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    batch: BatchArgs,
    /// Only print the card for this student id
    #[arg(long)]
    student: Option<String>,
    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,
    /// Report date printed on the card (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    today: Option<NaiveDate>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Report(args) => run_report(args),
    }
}

fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let engine = AppConfig::load()?.grading.engine()?;
    let policy = load_policy(&args.policy)?;

    let classification = engine.classify(parse_score(&args.score), policy.bands());
    let view = classification.view();
    println!("Policy: {} ({})", policy.name, policy.id.0);
    println!("Score: {}", args.score.trim());
    println!("Grade: {}", view.grade);
    println!("Points: {}", view.points);
    println!("Comment: {}", view.comment);
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        batch,
        student,
        json,
        today,
    } = args;
    if batch.scores.is_none() {
        return Err(AppError::InvalidRequest(
            "--scores is required to print report cards".to_string(),
        ));
    }

    let config = AppConfig::load()?;
    let engine = config.grading.engine()?;
    let stores = seed_stores(&batch)?;
    let service = ReportCardService::new(
        Arc::new(stores.scores),
        Arc::new(stores.policies),
        Arc::new(stores.roster),
        Arc::new(engine),
    )
    .with_default_school_name(config.grading.school_name.clone());

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let batch_id = batch.batch_id();
    let reports = match student {
        Some(student) => vec![service.student_report(&batch_id, &StudentId(student), today)?],
        None => service.batch_reports(&batch_id, today)?,
    };

    if json {
        let payload = serde_json::to_string_pretty(&reports).map_err(std::io::Error::from)?;
        println!("{payload}");
    } else {
        print_cards(&reports);
    }
    Ok(())
}

fn print_cards(reports: &[StudentReport]) {
    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            println!("{}", "-".repeat(72));
        }
        print!("{}", render_plain_text(report));
    }
}
