use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{Form, FormConfig, ResolvedInput};
use tracing::info;

use super::{load_specs, model_for};

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Spec file: one input spec object or an array of them
    #[arg(value_name = "spec.json")]
    pub spec: PathBuf,
    /// Form config (TOML, or JSON for a .json extension)
    #[arg(long = "config", value_name = "form.toml")]
    pub config: Option<PathBuf>,
    /// Force every input into read-only mode
    #[arg(long = "read-only", default_value_t = false)]
    pub read_only: bool,
    /// Start inputs in read mode
    #[arg(long = "read-mode", default_value_t = false)]
    pub read_mode: bool,
    /// Model field inputs may bind to (repeatable); any field when omitted
    #[arg(long = "allow", value_name = "FIELD")]
    pub allow: Vec<String>,
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let resolved = resolve_file(args)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

pub fn resolve_file(args: &ResolveArgs) -> Result<Vec<ResolvedInput>> {
    let mut config = match &args.config {
        Some(path) => FormConfig::load(path)
            .with_context(|| format!("failed to load form config {}", path.display()))?,
        None => FormConfig::default(),
    };
    config.read_only |= args.read_only;
    config.read_mode |= args.read_mode;
    for diagnostic in config.diagnostics() {
        eprintln!("warning[config]: {diagnostic}");
    }

    let specs = load_specs(&args.spec)?;
    let form = Form::new(model_for(&args.allow).shared(), config);
    let mut resolved = Vec::new();
    for (index, spec) in specs.iter().enumerate() {
        let inputs = form
            .prepare(spec)
            .with_context(|| format!("input #{index} cannot be rendered"))?;
        resolved.extend(inputs);
    }
    info!(specs = specs.len(), inputs = resolved.len(), "resolved form inputs");
    Ok(resolved)
}
