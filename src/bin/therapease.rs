//! TherapEase CLI - Command-line interface for TherapEase
//!
//! Commands:
//! - suggest: Suggest an activity for one set of answers
//! - batch: Suggest activities for many submissions (NDJSON or JSON array)
//! - validate: Check submissions against the category tables and ranges
//! - doctor: Diagnose model and environment
//! - categories: Print the category tables

use clap::{builder::PossibleValuesParser, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use therapease::categories::{ALL_TABLES, ENERGY, MOOD, STRESS, SUGGESTED_ACTIVITY};
use therapease::model::ForestModel;
use therapease::render::{render_error, render_text, sleep_quality_meter, time_available_line};
use therapease::types::{
    SuggestionRecord, WellnessInput, DEFAULT_SLEEP_HOURS, DEFAULT_TIME_AVAILABLE,
    SLEEP_HOURS_RANGE, TIME_AVAILABLE_RANGE,
};
use therapease::{ActivityAdvisor, SuggestError, PRODUCER_NAME, THERAPEASE_VERSION};

const DEFAULT_MODEL_PATH: &str = "models/therapease_model.json";

/// TherapEase - Mental wellness activity suggestions
#[derive(Parser)]
#[command(name = "therapease")]
#[command(version = THERAPEASE_VERSION)]
#[command(about = "Find a wellness activity that fits your current state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest an activity for one set of answers
    Suggest {
        /// Model artifact path
        #[arg(long, env = "THERAPEASE_MODEL", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Current mood
        #[arg(long, value_parser = PossibleValuesParser::new(MOOD.classes().iter().copied()))]
        mood: String,

        /// Current energy level
        #[arg(long, value_parser = PossibleValuesParser::new(ENERGY.classes().iter().copied()))]
        energy: String,

        /// Current stress level
        #[arg(long, value_parser = PossibleValuesParser::new(STRESS.classes().iter().copied()))]
        stress: String,

        /// Hours of sleep last night
        #[arg(
            long,
            default_value_t = DEFAULT_SLEEP_HOURS,
            value_parser = clap::value_parser!(u32).range(
                *SLEEP_HOURS_RANGE.start() as i64..=*SLEEP_HOURS_RANGE.end() as i64
            )
        )]
        sleep_hours: u32,

        /// Minutes available for the activity
        #[arg(
            long,
            default_value_t = DEFAULT_TIME_AVAILABLE,
            value_parser = clap::value_parser!(u32).range(
                *TIME_AVAILABLE_RANGE.start() as i64..=*TIME_AVAILABLE_RANGE.end() as i64
            )
        )]
        time_available: u32,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Suggest activities for many submissions
    Batch {
        /// Model artifact path
        #[arg(long, env = "THERAPEASE_MODEL", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Check submissions against the category tables and input ranges
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose model and environment
    Doctor {
        /// Model artifact path
        #[arg(long, env = "THERAPEASE_MODEL", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the category tables
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one submission per line)
    Ndjson,
    /// JSON array of submissions
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable result block
    Text,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TherapeaseCliError> {
    match cli.command {
        Commands::Suggest {
            model,
            mood,
            energy,
            stress,
            sleep_hours,
            time_available,
            output_format,
        } => {
            let input = WellnessInput::new(mood, energy, stress, sleep_hours, time_available);
            cmd_suggest(&model, &input, &output_format)
        }

        Commands::Batch {
            model,
            input,
            output,
            input_format,
            output_format,
        } => cmd_batch(&model, &input, &output, input_format, &output_format),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { model, json } => cmd_doctor(&model, json),

        Commands::Categories { json } => cmd_categories(json),
    }
}

fn cmd_suggest(
    model: &Path,
    input: &WellnessInput,
    output_format: &OutputFormat,
) -> Result<(), TherapeaseCliError> {
    let advisor = ActivityAdvisor::from_model_path(model)?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", sleep_quality_meter(input.sleep_hours));
            println!("{}", time_available_line(input.time_available));
            println!();

            // Every pipeline failure is shown the same way
            match advisor.suggest(input) {
                Ok(suggestion) => {
                    print!("{}", render_text(&suggestion));
                    Ok(())
                }
                Err(e) => {
                    println!("{}", render_error(&e));
                    Err(TherapeaseCliError::Suggest(e))
                }
            }
        }
        format => {
            let record = advisor.suggest_record(input)?;
            print!("{}", format_output(&[record], format)?);
            Ok(())
        }
    }
}

fn cmd_batch(
    model: &Path,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: &OutputFormat,
) -> Result<(), TherapeaseCliError> {
    let submissions = read_submissions(input, input_format)?;

    if submissions.is_empty() {
        return Err(TherapeaseCliError::NoSubmissions);
    }

    let advisor = ActivityAdvisor::from_model_path(model)?;

    let mut records: Vec<SuggestionRecord> = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        records.push(advisor.suggest_record(submission)?);
    }

    log::debug!("Produced {} suggestions", records.len());

    let output_data = format_output(&records, output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), TherapeaseCliError> {
    let submissions = read_submissions(input, input_format)?;

    let errors: Vec<ValidationErrorDetail> = submissions
        .iter()
        .enumerate()
        .filter_map(|(index, submission)| {
            submission.validate().err().map(|e| ValidationErrorDetail {
                index,
                error: e.to_string(),
            })
        })
        .collect();

    let report = ValidationReport {
        total_submissions: submissions.len(),
        valid_submissions: submissions.len() - errors.len(),
        invalid_submissions: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total submissions:   {}", report.total_submissions);
        println!("Valid submissions:   {}", report.valid_submissions);
        println!("Invalid submissions: {}", report.invalid_submissions);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Submission {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_submissions > 0 {
        Err(TherapeaseCliError::ValidationFailed(report.invalid_submissions))
    } else {
        Ok(())
    }
}

fn cmd_doctor(model: &Path, json: bool) -> Result<(), TherapeaseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "therapease_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("TherapEase version {}", THERAPEASE_VERSION),
    });

    let table_summary: Vec<String> = ALL_TABLES
        .iter()
        .map(|table| format!("{}={}", table.name(), table.len()))
        .collect();
    checks.push(DoctorCheck {
        name: "category_tables".to_string(),
        status: CheckStatus::Ok,
        message: table_summary.join(", "),
    });

    if model.exists() {
        match ForestModel::load(model) {
            Ok(forest) => {
                let unknown_classes = forest
                    .classes
                    .iter()
                    .filter(|c| !(0..SUGGESTED_ACTIVITY.len() as i64).contains(*c))
                    .count();

                checks.push(DoctorCheck {
                    name: "model".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Model valid ({} trees, {} classes)",
                        forest.trees.len(),
                        forest.classes.len()
                    ),
                });

                if unknown_classes > 0 {
                    checks.push(DoctorCheck {
                        name: "model_classes".to_string(),
                        status: CheckStatus::Warning,
                        message: format!(
                            "{} model classes fall outside the activity table and will wrap",
                            unknown_classes
                        ),
                    });
                }
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "model".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                });
            }
        }
    } else {
        checks.push(DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: format!("Model file {} does not exist", model.display()),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: THERAPEASE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("TherapEase Doctor Report");
        println!("========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TherapeaseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_categories(json: bool) -> Result<(), TherapeaseCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ALL_TABLES)?);
        return Ok(());
    }

    for table in ALL_TABLES {
        println!("{}:", table.name());
        for (code, label) in table.classes().iter().enumerate() {
            println!("  {code}  {label}");
        }
        println!();
    }

    println!(
        "SleepHours: {}..={} (default {})",
        SLEEP_HOURS_RANGE.start(),
        SLEEP_HOURS_RANGE.end(),
        DEFAULT_SLEEP_HOURS
    );
    println!(
        "TimeAvailable: {}..={} (default {})",
        TIME_AVAILABLE_RANGE.start(),
        TIME_AVAILABLE_RANGE.end(),
        DEFAULT_TIME_AVAILABLE
    );

    Ok(())
}

// Helper functions

fn read_submissions(
    input: &Path,
    input_format: InputFormat,
) -> Result<Vec<WellnessInput>, TherapeaseCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    match input_format {
        InputFormat::Ndjson => input_data
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_no, line)| {
                serde_json::from_str(line.trim()).map_err(|e| {
                    TherapeaseCliError::ParseError(format!("line {}: {}", line_no + 1, e))
                })
            })
            .collect(),
        InputFormat::Json => Ok(serde_json::from_str(&input_data)?),
    }
}

fn format_output(
    records: &[SuggestionRecord],
    format: &OutputFormat,
) -> Result<String, TherapeaseCliError> {
    match format {
        OutputFormat::Text => Ok(records
            .iter()
            .map(|record| render_text(&record.suggestion))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)? + "\n"),
    }
}

// Error types

#[derive(Debug)]
enum TherapeaseCliError {
    Io(io::Error),
    Suggest(SuggestError),
    Json(serde_json::Error),
    NoSubmissions,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for TherapeaseCliError {
    fn from(e: io::Error) -> Self {
        TherapeaseCliError::Io(e)
    }
}

impl From<SuggestError> for TherapeaseCliError {
    fn from(e: SuggestError) -> Self {
        TherapeaseCliError::Suggest(e)
    }
}

impl From<serde_json::Error> for TherapeaseCliError {
    fn from(e: serde_json::Error) -> Self {
        TherapeaseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TherapeaseCliError> for CliError {
    fn from(e: TherapeaseCliError) -> Self {
        match e {
            TherapeaseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TherapeaseCliError::Suggest(SuggestError::ModelLoad(msg)) => CliError {
                code: "MODEL_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'therapease doctor' to check the model file".to_string()),
            },
            TherapeaseCliError::Suggest(e) => CliError {
                code: "SUGGEST_ERROR".to_string(),
                message: render_error(&e),
                hint: Some("Run 'therapease categories' for accepted values".to_string()),
            },
            TherapeaseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TherapeaseCliError::NoSubmissions => CliError {
                code: "NO_SUBMISSIONS".to_string(),
                message: "No submissions found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TherapeaseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} submissions failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            TherapeaseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            TherapeaseCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_submissions: usize,
    valid_submissions: usize,
    invalid_submissions: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
