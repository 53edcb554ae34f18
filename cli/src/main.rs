use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use form_extract_core::{Extractor, FormValues, RuleBook, RuleFile, RuleSet};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "form-extract")]
#[command(about = "Check URL-encoded form input against extraction rules")]
struct Cli {
    /// Log every field decision to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract typed values from a query string and print them as JSON.
    Check(CheckArgs),
    /// Validate one or more rule files.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Rule set file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    rules: PathBuf,
    /// Treat the rules file as a rule book and use this form.
    #[arg(long)]
    form: Option<String>,
    /// URL-encoded input, e.g. "name=Ada&age=36".
    #[arg(long, conflicts_with = "input")]
    query: Option<String>,
    /// File holding the URL-encoded input (default: stdin).
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Rule sets or rule books to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let extractor = match &args.form {
        Some(form) => RuleBook::load(&args.rules)
            .and_then(|book| book.extractor(form))
            .map_err(|err| format!("error: '{}': {err}", args.rules.display()))?,
        None => RuleSet::load(&args.rules)
            .map(Extractor::new)
            .map_err(|err| format!("error: '{}': {err}", args.rules.display()))?,
    };

    let query = read_query(&args)?;
    let input = FormValues::from_query(query.trim_end_matches(['\r', '\n']));
    tracing::debug!(submitted = input.len(), declared = extractor.rules().len(), "checking input");
    let output = extractor
        .extract(&input)
        .map_err(|err| format!("error[{}]: {err}", err.kind()))?;

    let raw = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("error: failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn read_query(args: &CheckArgs) -> Result<String, String> {
    if let Some(query) = &args.query {
        return Ok(query.clone());
    }
    if let Some(path) = &args.input {
        return fs::read_to_string(path)
            .map_err(|err| format!("error: failed to read '{}': {err}", path.display()));
    }
    let mut query = String::new();
    std::io::stdin()
        .read_to_string(&mut query)
        .map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(query)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    for path in &args.files {
        let file =
            RuleFile::load(path).map_err(|err| format!("error: '{}': {err}", path.display()))?;
        let summary = match file {
            RuleFile::Book(book) => {
                let fields: usize = book.forms.values().map(RuleSet::len).sum();
                format!("{} form(s), {fields} field(s)", book.forms.len())
            }
            RuleFile::Rules(rules) => format!("{} field(s)", rules.len()),
        };
        println!("{}: {summary}", path.display());
    }
    println!("Validated {} rule file(s).", args.files.len());
    Ok(())
}
