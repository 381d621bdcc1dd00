mod atomic;
mod commands;
mod logging;
mod settings;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fixtura_core::{FieldMap, Value};
use fixtura_generate::{FactoryError, LocaleKey, OutputFormat, configure};
use fixtura_plan::{PlanError, ValidationReport};
use thiserror::Error;

use commands::{BuildRequest, parse_override};
use settings::load_settings;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("plan failed validation with {} error(s)", .0.errors.len())]
    Validation(ValidationReport),
    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "fixtura", version, about = "Fixtura record factory CLI")]
struct Cli {
    /// Settings file; defaults to ./fixtura.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append JSON logs to this file instead of printing to stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build records for one model of a plan.
    Build(BuildArgs),
    /// Validate a plan and print the report.
    Validate(ValidateArgs),
    /// Print or write the plan JSON Schema.
    Schema(SchemaArgs),
    /// List generator, provider and locale ids.
    Generators,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Plan document (.json or .toml).
    plan: PathBuf,
    /// Model to build.
    #[arg(long)]
    model: String,
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Seed for every model, replacing plan seeds.
    #[arg(long)]
    seed: Option<u64>,
    /// Locale for every model, replacing plan locales.
    #[arg(long, value_parser = parse_locale)]
    locale: Option<LocaleKey>,
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,
    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Field override as field=json. Repeatable.
    #[arg(long = "set", value_name = "FIELD=JSON", value_parser = parse_override)]
    overrides: Vec<(String, Value)>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    plan: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_locale(raw: &str) -> Result<LocaleKey, String> {
    raw.parse().map_err(|err: FactoryError| err.to_string())
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse().map_err(|err: FactoryError| err.to_string())
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let (settings, settings_path) = load_settings(cli.config.as_deref())?;
    logging::init_logging(&settings.log_filter, cli.log_file.as_deref())?;
    if let Some(path) = &settings_path {
        tracing::debug!(path = %path.display(), "settings loaded");
    }
    configure(settings.factory)?;

    match cli.command {
        Command::Build(args) => {
            let request = BuildRequest {
                plan: args.plan,
                model: args.model,
                count: args.count,
                seed: args.seed,
                locale: args.locale,
                format: args.format.unwrap_or(settings.format),
                out: args.out,
                overrides: args.overrides.into_iter().collect::<FieldMap>(),
            };
            commands::run_build(request)
        }
        Command::Validate(args) => commands::run_validate(&args.plan),
        Command::Schema(args) => commands::run_schema(args.out.as_deref()),
        Command::Generators => commands::run_generators(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from([
            "fixtura",
            "build",
            "plans/examples/people.plan.json",
            "--model",
            "Member",
            "--count",
            "3",
            "--locale",
            "pt-BR",
            "--format",
            "csv",
            "--set",
            "age=30",
            "--set",
            "handle=\"m-1\"",
            "--log-file",
            "fixtura.log",
        ])
        .expect("parse");

        assert_eq!(cli.log_file, Some(PathBuf::from("fixtura.log")));
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.model, "Member");
        assert_eq!(args.count, 3);
        assert_eq!(args.locale, Some(LocaleKey::PtBr));
        assert_eq!(args.format, Some(OutputFormat::Csv));
        assert_eq!(
            args.overrides,
            vec![
                ("age".to_string(), Value::Int(30)),
                ("handle".to_string(), Value::from("m-1")),
            ]
        );
    }

    #[test]
    fn unknown_locale_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "fixtura", "build", "plan.json", "--model", "A", "--locale", "fr_FR",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn validation_error_counts_issues() {
        let err = CliError::Validation(ValidationReport::default());
        assert_eq!(err.to_string(), "plan failed validation with 0 error(s)");
    }
}
