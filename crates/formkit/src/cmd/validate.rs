use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use form_spec::validate;
use serde::Serialize;
use tracing::debug;

use super::{load_specs, model_for};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Spec file: one input spec object or an array of them
    #[arg(value_name = "spec.json")]
    pub spec: PathBuf,
    /// Model field inputs may bind to (repeatable); any field when omitted
    #[arg(long = "allow", value_name = "FIELD")]
    pub allow: Vec<String>,
    /// Print the report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub input: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn run(args: &ValidateArgs) -> Result<()> {
    let report = check(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if !report.is_ok() {
        bail!("{} input spec(s) failed validation", report.errors.len());
    }
    Ok(())
}

pub fn check(args: &ValidateArgs) -> Result<ValidationReport> {
    let specs = load_specs(&args.spec)?;
    let model = model_for(&args.allow);
    let mut report = ValidationReport {
        checked: specs.len(),
        ..ValidationReport::default()
    };
    for (input, spec) in specs.iter().enumerate() {
        match validate(spec, Some(&model)) {
            Ok(diagnostics) => {
                debug!(input, diagnostics = diagnostics.len(), "validated input spec");
                report
                    .warnings
                    .extend(diagnostics.iter().map(|diagnostic| Finding {
                        input,
                        message: diagnostic.to_string(),
                    }));
            }
            Err(err) => report.errors.push(Finding {
                input,
                message: err.to_string(),
            }),
        }
    }
    Ok(report)
}

fn print_report(report: &ValidationReport) {
    for finding in &report.errors {
        println!("error[input #{}]: {}", finding.input, finding.message);
    }
    for finding in &report.warnings {
        println!("warning[input #{}]: {}", finding.input, finding.message);
    }
    println!(
        "checked {} input spec(s): {} error(s), {} warning(s)",
        report.checked,
        report.errors.len(),
        report.warnings.len()
    );
}
