use std::path::PathBuf;

use argline_config::RulesConfig;
use argline_core::{
    ConsoleOutputFormatter, Parser as ArgParser, Rule, RuleKind, RulesOutputFormatter,
};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for a parsed argument table.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum TableFormat {
    /// Re-serialized command line.
    Line,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argline", disable_help_subcommand = true)]
#[command(about = "Parse command-line tokens against declarative argument rules")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens and print the resulting key/value table.
    Parse(ParseArgs),
    /// Render the help screen for a rule file.
    Help(HelpArgs),
    /// Validate a rule file.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Rule file (YAML or JSON).
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Prefix marking a token as a key (overrides the rule file).
    #[arg(long)]
    prefix: Option<String>,
    /// Output format.
    #[arg(long, default_value = "line")]
    format: TableFormat,
    /// Tokens to parse; pass them after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Rule file (YAML or JSON).
    #[arg(long)]
    rules: PathBuf,
    /// Program name shown on the usage line.
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Rule file (YAML or JSON).
    #[arg(long)]
    rules: PathBuf,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Help(args) => run_help(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RulesConfig, String> {
    match path {
        Some(path) => RulesConfig::load(path)
            .map_err(|err| format!("Failed to load rules '{}': {err}", path.display())),
        None => Ok(RulesConfig::default()),
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut config = load_config(args.rules.as_ref())?;
    if let Some(prefix) = args.prefix {
        config.leading_pattern = prefix;
    }
    debug!(tokens = args.tokens.len(), "parsing tokens");

    let parser = config.parser(&args.tokens).map_err(|err| err.to_string())?;
    if parser.is_help() {
        let mut formatter = ConsoleOutputFormatter::from_parser(&parser);
        if let Some(program) = &config.program {
            formatter = formatter.with_program_name(program.as_str());
        }
        return formatter
            .print()
            .map_err(|err| format!("Failed to write help: {err}"));
    }

    println!("{}", format_table(&parser, args.format)?);
    Ok(())
}

fn format_table(parser: &ArgParser, format: TableFormat) -> Result<String, String> {
    let table = || -> serde_json::Map<String, serde_json::Value> {
        parser
            .arguments()
            .map(|(key, value)| {
                let value = value.map_or(serde_json::Value::Null, Into::into);
                (key.to_string(), value)
            })
            .collect()
    };

    match format {
        TableFormat::Line => Ok(parser.to_string()),
        TableFormat::Json => serde_json::to_string_pretty(&table())
            .map_err(|e| format!("JSON serialization failed: {e}")),
        TableFormat::Yaml => {
            serde_yaml::to_string(&table()).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let mut config = load_config(Some(&args.rules))?;
    if args.program.is_some() {
        config.program = args.program;
    }
    let help = config.help_text().map_err(|err| err.to_string())?;
    print!("{help}");
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = load_config(Some(&args.rules))?;
    let rules = config
        .rule_set()
        .map_err(|err| format!("Invalid rules '{}': {err}", args.rules.display()))?;

    for rule in &rules {
        let keys = rule
            .keys()
            .iter()
            .map(|key| format!("{}{key}", config.leading_pattern))
            .collect::<Vec<_>>()
            .join(", ");
        match rule.default_value() {
            Some(default) => println!("{:<8} {keys} (default: {default})", kind_label(rule)),
            None => println!("{:<8} {keys}", kind_label(rule)),
        }
    }
    println!("{} rule(s) OK", rules.len());
    Ok(())
}

fn kind_label(rule: &Rule) -> &'static str {
    match rule.kind() {
        RuleKind::Required => "required",
        RuleKind::Optional => "optional",
        RuleKind::Help => "help",
    }
}
