mod report;

use anyhow::{Context, Result};
use argmatch::{CommandSet, CommandSetDecl, RootCommand};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::Report;

/// Exit status when a required parameter has no value.
const EXIT_MISSING_REQUIRED: i32 = 2;

#[derive(Parser)]
#[command(name = "argmatch")]
#[command(version, about = "Match command-line tokens against a parameter declaration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match tokens against a declaration and print the resolved values
    Match(MatchArgs),

    /// Print the help text generated from a declaration
    Usage(UsageArgs),
}

#[derive(Parser)]
struct MatchArgs {
    /// JSON parameter declaration
    #[arg(short, long, value_name = "FILE")]
    decl: PathBuf,

    /// JSON object of config values (strings) used as config defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// .env file loaded into the environment before matching
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Tokens to match; put them after `--`
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// JSON parameter declaration
    #[arg(short, long, value_name = "FILE")]
    decl: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Match(args) => match_command(args),
        Commands::Usage(args) => usage_command(args),
    }
}

fn load_decl(path: &Path) -> Result<CommandSet> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read declaration `{}`", path.display()))?;
    let decl: CommandSetDecl = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse declaration `{}`", path.display()))?;
    CommandSet::from_decl(&decl)
        .with_context(|| format!("invalid declaration `{}`", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<BTreeMap<String, String>> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config `{}`", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("config `{}` must be a JSON object of strings", path.display()))
}

fn match_command(args: MatchArgs) -> Result<()> {
    tracing::debug!("executing match command");

    if let Some(env_file) = &args.env_file {
        dotenvy::from_path(env_file)
            .with_context(|| format!("failed to load env file `{}`", env_file.display()))?;
    }

    let set = load_decl(&args.decl)?;
    let config = load_config(args.config.as_deref())?;

    let mut root = RootCommand::new(set).with_config(config);
    let program = root.command_set().name().to_string();
    let report = root
        .run_with(std::iter::once(program).chain(args.tokens))
        .clone();

    let out = Report::collect(root.command_set(), &report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", out.render());
    }

    if let Err(err) = root.command_set().check_required() {
        eprintln!("error: {err}");
        std::process::exit(EXIT_MISSING_REQUIRED);
    }

    Ok(())
}

fn usage_command(args: UsageArgs) -> Result<()> {
    let set = load_decl(&args.decl)?;
    print!("{}", set.help());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
