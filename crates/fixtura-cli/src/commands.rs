use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use fixtura_core::{FieldMap, Value, from_json};
use fixtura_generate::{
    CompileOptions, FakeOp, GENERATOR_IDS, LocaleKey, OutputFormat, PlanRegistry, vocabulary,
    write_records,
};
use fixtura_plan::{
    ValidatedPlan, ValidationReport, load_plan_value, plan_json_schema, plan_json_schema_value,
    validate_plan,
};

use crate::CliError;
use crate::atomic::write_bytes_atomic;

/// Everything `fixtura build` needs once flags and settings are merged.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub plan: PathBuf,
    pub model: String,
    pub count: usize,
    pub seed: Option<u64>,
    pub locale: Option<LocaleKey>,
    pub format: OutputFormat,
    pub out: Option<PathBuf>,
    pub overrides: FieldMap,
}

/// Parses a `field=value` override. The value is read as JSON and falls back
/// to plain text when it is not valid JSON.
pub fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("override '{raw}' has an empty field name"));
    }
    let value = match serde_json::from_str(value) {
        Ok(json) => from_json(json),
        Err(_) => Value::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

pub fn load_validated_plan(path: &Path) -> Result<ValidatedPlan, CliError> {
    let plan_json = load_plan_value(path)?;
    let plan_schema = plan_json_schema_value()?;
    let validated =
        validate_plan(&plan_json, &plan_schema, &vocabulary()).map_err(CliError::Validation)?;
    for issue in &validated.warnings {
        warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }
    Ok(validated)
}

pub fn run_build(request: BuildRequest) -> Result<(), CliError> {
    let validated = load_validated_plan(&request.plan)?;
    let options = CompileOptions {
        seed: request.seed,
        locale: request.locale,
    };
    let registry = PlanRegistry::compile(&validated.plan, options)?;
    let model = registry.model(&request.model)?;

    let (records, report) = model.build_batch_reported(request.count, &request.overrides)?;

    let written = match &request.out {
        Some(path) => {
            let mut buffer = Vec::new();
            let written = write_records(&mut buffer, &records, request.format)?;
            write_bytes_atomic(path, &buffer)?;
            written
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let written = write_records(&mut handle, &records, request.format)?;
            handle.flush()?;
            written
        }
    };

    let destination = request
        .out
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!(
        model = %report.model,
        records = report.records,
        format = %request.format,
        bytes = written,
        out = %destination,
        "records written"
    );
    Ok(())
}

pub fn run_validate(plan: &Path) -> Result<(), CliError> {
    let result = load_validated_plan(plan);
    let report = match &result {
        Ok(validated) => Some(ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings.clone(),
        }),
        Err(CliError::Validation(report)) => Some(report.clone()),
        Err(_) => None,
    };
    if let Some(report) = report {
        print_json(&report)?;
    }

    let validated = result?;
    info!(
        plan = %plan.display(),
        models = validated.plan.models.len(),
        warnings = validated.warnings.len(),
        "plan is valid"
    );
    Ok(())
}

pub fn run_schema(out: Option<&Path>) -> Result<(), CliError> {
    let schema = plan_json_schema();
    match out {
        Some(path) => {
            let mut encoded = serde_json::to_vec_pretty(&schema)?;
            encoded.push(b'\n');
            write_bytes_atomic(path, &encoded)?;
            info!(path = %path.display(), "plan schema written");
        }
        None => print_json(&schema)?,
    }
    Ok(())
}

pub fn run_generators() -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_section(&mut out, "generators", GENERATOR_IDS)?;
    write_section(&mut out, "providers", FakeOp::ALL_IDS)?;
    write_section(&mut out, "locales", LocaleKey::SPELLINGS)?;
    debug!(
        generators = GENERATOR_IDS.len(),
        providers = FakeOp::ALL_IDS.len(),
        "catalog listed"
    );
    Ok(())
}

fn write_section<W: Write>(out: &mut W, title: &str, ids: &[&str]) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    for id in ids {
        writeln!(out, "  {id}")?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
