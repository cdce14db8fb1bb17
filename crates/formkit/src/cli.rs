use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{self, allow_list::AllowListArgs, resolve::ResolveArgs, validate::ValidateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "formkit",
    about = "Checks and resolves declarative form input specs",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate input specs and report diagnostics
    Validate(ValidateArgs),
    /// Validate, then print the resolved inputs as JSON
    Resolve(ResolveArgs),
    /// List the recognized option keys by category
    AllowList(AllowListArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Validate(args) => cmd::validate::run(&args),
        Commands::Resolve(args) => cmd::resolve::run(&args),
        Commands::AllowList(args) => cmd::allow_list::run(&args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
