// bin/wot_cli.rs - Web of Trust CLI
//
//! Web of Trust Command Line Interface
//!
//! # Usage
//!
//! ```bash
//! # Apply a scenario file and print every result
//! wot-cli run scenario.json
//!
//! # Same, as JSON, with bounded path search
//! wot-cli --format json --max-depth 6 --max-paths 32 run scenario.json
//!
//! # Build a web interactively
//! wot-cli shell
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use wot_engine::config::WotConfig;
use wot_engine::observability::{MetricsConfig, MetricsHandle, init_metrics, init_tracing};
use wot_engine::trust::{
    AssertionOutcome, Scenario, ScenarioReport, TrustVerdict, ValidityLevel, ValidityMap,
    WebOfTrust,
};

/// Web of Trust CLI
#[derive(Parser, Debug)]
#[command(name = "wot-cli")]
#[command(author = "SavageS")]
#[command(version)]
#[command(about = "Viewer-relative web of trust - register, vouch, and check trust")]
#[command(long_about = None)]
struct Args {
    /// Config file path (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Longest path, in hops, reported as evidence
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Most paths reported per query
    #[arg(long, global = true)]
    max_paths: Option<usize>,

    /// Print Prometheus metrics when the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a JSON scenario of entities, assertions and queries
    Run {
        /// Scenario file
        file: PathBuf,
    },

    /// Interactive shell
    Shell,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_tracing(config.logging.tracing_config()).context("Failed to initialize logging")?;

    let metrics = if args.metrics {
        let handle =
            init_metrics(MetricsConfig::default()).context("Failed to install metrics recorder")?;
        Some(handle)
    } else {
        None
    };

    let web = WebOfTrust::new(config.trust.clone());
    info!(
        max_depth = ?config.trust.path_limits.max_depth,
        max_paths = ?config.trust.path_limits.max_paths,
        cache = config.trust.cache_validity_maps,
        "Web of trust ready"
    );

    match &args.command {
        Commands::Run { file } => cmd_run(&web, file, args.format)?,
        Commands::Shell => cmd_shell(&web, args.format)?,
    }

    if let Some(handle) = metrics {
        print_metrics(&handle);
    }

    Ok(())
}

/// Layer command-line overrides on top of file and environment config
fn load_config(args: &Args) -> Result<WotConfig> {
    let mut config =
        WotConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
        config.logging.filter = None;
    }
    if let Some(depth) = args.max_depth {
        config.trust.path_limits.max_depth = Some(depth);
    }
    if let Some(paths) = args.max_paths {
        config.trust.path_limits.max_paths = Some(paths);
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// Command Handlers
// =============================================================================

fn cmd_run(web: &WebOfTrust, file: &Path, format: OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read scenario file: {:?}", file))?;
    let scenario = Scenario::from_json(&text)
        .with_context(|| format!("Invalid scenario file: {:?}", file))?;

    let report = scenario.apply(web);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn cmd_shell(web: &WebOfTrust, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Text {
        println!("{}", "Web of Trust Shell".bold().cyan());
        println!("Type 'help' for commands, 'quit' to exit.\n");
    }

    let stdin = std::io::stdin();
    let mut input = String::new();

    loop {
        if format == OutputFormat::Text {
            print!("{} ", "wot>".green().bold());
            std::io::Write::flush(&mut std::io::stdout())?;
        }

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let command = match ShellCommand::parse(&input) {
            Ok(command) => command,
            Err(usage) => {
                println!("{} {}", "Error:".red(), usage);
                continue;
            }
        };

        match command {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => print_help(),
            ShellCommand::Add(names) => {
                for name in names {
                    let success = web.register_entity(&name);
                    match format {
                        OutputFormat::Json => print_json(&serde_json::json!({
                            "name": name,
                            "success": success,
                        }))?,
                        OutputFormat::Text if success => {
                            println!("  {} registered {}", "✓".green().bold(), name)
                        }
                        OutputFormat::Text => {
                            println!("  {} {} already registered", "✗".red().bold(), name)
                        }
                    }
                }
            }
            ShellCommand::Sign {
                signer,
                target,
                level,
            } => {
                let outcome = web.assert_trust(&signer, &target, &level);
                match format {
                    OutputFormat::Json => print_json(&outcome)?,
                    OutputFormat::Text => print_outcome(&outcome),
                }
            }
            ShellCommand::Check { viewer, target } => {
                let verdict = web.check_trust(&viewer, &target);
                match format {
                    OutputFormat::Json => print_json(&verdict)?,
                    OutputFormat::Text => print_verdict(&viewer, &target, &verdict),
                }
            }
            ShellCommand::Map(viewer) => {
                if !web.contains(&viewer) {
                    println!("{} Unknown entity: {}", "Error:".red(), viewer);
                    continue;
                }
                let map = web.validity_map(&viewer);
                match format {
                    OutputFormat::Json => print_json(&*map)?,
                    OutputFormat::Text => print_map(&map),
                }
            }
            ShellCommand::List => {
                let entities = web.entities();
                match format {
                    OutputFormat::Json => print_json(&entities)?,
                    OutputFormat::Text => {
                        println!("{}", "Entities".bold().cyan());
                        println!("{}", "─".repeat(40));
                        if entities.is_empty() {
                            println!("  (none)");
                        }
                        for name in entities {
                            println!("  {}", name);
                        }
                    }
                }
            }
            ShellCommand::Stats => {
                let stats = web.stats();
                match format {
                    OutputFormat::Json => print_json(&stats)?,
                    OutputFormat::Text => {
                        println!("  {} {}", "Entities:".bold(), stats.entities);
                        println!(
                            "  {} {} complete, {} partial",
                            "Assertions:".bold(),
                            stats.complete_assertions,
                            stats.partial_assertions
                        );
                    }
                }
            }
            ShellCommand::Reset => {
                web.reset();
                if format == OutputFormat::Text {
                    println!("  {} store cleared", "✓".green().bold());
                }
            }
        }
    }

    if format == OutputFormat::Text {
        println!("Goodbye!");
    }
    Ok(())
}

// =============================================================================
// Shell Parsing
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Empty,
    Help,
    Quit,
    Add(Vec<String>),
    Sign {
        signer: String,
        target: String,
        level: String,
    },
    Check {
        viewer: String,
        target: String,
    },
    Map(String),
    List,
    Stats,
    Reset,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            return Ok(Self::Empty);
        };

        match (command, rest) {
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit" | "q", _) => Ok(Self::Quit),
            ("add", []) => Err("usage: add <name> [name...]".into()),
            ("add", names) => Ok(Self::Add(names.iter().map(|n| n.to_string()).collect())),
            ("sign", [signer, target, level]) => Ok(Self::Sign {
                signer: signer.to_string(),
                target: target.to_string(),
                level: level.to_string(),
            }),
            ("sign", _) => Err("usage: sign <signer> <target> <complete|partial>".into()),
            ("check", [viewer, target]) => Ok(Self::Check {
                viewer: viewer.to_string(),
                target: target.to_string(),
            }),
            ("check", _) => Err("usage: check <viewer> <target>".into()),
            ("map", [viewer]) => Ok(Self::Map(viewer.to_string())),
            ("map", _) => Err("usage: map <viewer>".into()),
            ("list", []) => Ok(Self::List),
            ("stats", []) => Ok(Self::Stats),
            ("reset", []) => Ok(Self::Reset),
            _ => Err(format!("Unknown command: {} (type 'help')", line.trim())),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  add <name>...                 - Register entities");
    println!("  sign <signer> <target> <lvl>  - Assert complete or partial trust");
    println!("  check <viewer> <target>       - Check trust with paths");
    println!("  map <viewer>                  - Validity of every entity");
    println!("  list                          - List entities");
    println!("  stats                         - Store summary");
    println!("  reset                         - Clear the store");
    println!("  quit                          - Exit shell");
}

fn colored_level(level: ValidityLevel) -> colored::ColoredString {
    let label = level.as_str();
    match level {
        ValidityLevel::Implicit => label.cyan().bold(),
        ValidityLevel::Complete => label.green().bold(),
        ValidityLevel::Marginal => label.yellow().bold(),
        ValidityLevel::Invalid => label.red().bold(),
    }
}

fn print_outcome(outcome: &AssertionOutcome) {
    if outcome.success {
        println!("  {} {}", "✓".green().bold(), outcome.message);
    } else {
        println!("  {} {}", "✗".red().bold(), outcome.message);
    }
}

fn print_verdict(viewer: &str, target: &str, verdict: &TrustVerdict) {
    println!(
        "  {} -> {}: {} ({})",
        viewer.bold(),
        target.bold(),
        colored_level(verdict.trust_level),
        verdict.reason
    );
    for path in &verdict.paths {
        println!("    {} {}", "→".cyan(), path);
    }
    if verdict.truncated {
        println!("    {} path search stopped at configured limits", "Note:".yellow());
    }
}

fn print_map(map: &ValidityMap) {
    println!("{}", format!("Validity for {}", map.viewer()).bold().cyan());
    println!("{}", "─".repeat(40));
    for (name, level) in map.iter() {
        println!("  {:<24} {}", name.as_str(), colored_level(level));
    }
    println!("  ({} passes)", map.passes());
}

fn print_report(report: &ScenarioReport) {
    println!("{}", "Registrations".bold().cyan());
    println!("{}", "─".repeat(40));
    for registration in &report.registrations {
        if registration.success {
            println!("  {} {}", "✓".green().bold(), registration.name);
        } else {
            println!(
                "  {} {} already registered",
                "✗".red().bold(),
                registration.name
            );
        }
    }

    println!("\n{}", "Assertions".bold().cyan());
    println!("{}", "─".repeat(40));
    for assertion in &report.assertions {
        print_outcome(&assertion.outcome);
    }

    println!("\n{}", "Queries".bold().cyan());
    println!("{}", "─".repeat(40));
    for query in &report.queries {
        print_verdict(&query.viewer, &query.target, &query.verdict);
    }

    let failures = report.failures();
    if failures > 0 {
        println!("\n  {} {} rejected operations", "Note:".yellow(), failures);
    }
}

fn print_metrics(handle: &MetricsHandle) {
    println!("\n{}", "Metrics".bold().cyan());
    println!("{}", "─".repeat(40));
    print!("{}", handle.render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell_commands() {
        assert_eq!(ShellCommand::parse("   \n").unwrap(), ShellCommand::Empty);
        assert_eq!(ShellCommand::parse("quit").unwrap(), ShellCommand::Quit);
        assert_eq!(
            ShellCommand::parse("add A B\n").unwrap(),
            ShellCommand::Add(vec!["A".into(), "B".into()])
        );
        assert_eq!(
            ShellCommand::parse("sign A B partial").unwrap(),
            ShellCommand::Sign {
                signer: "A".into(),
                target: "B".into(),
                level: "partial".into(),
            }
        );
        assert_eq!(
            ShellCommand::parse("check A D").unwrap(),
            ShellCommand::Check {
                viewer: "A".into(),
                target: "D".into(),
            }
        );
        assert_eq!(ShellCommand::parse("map A").unwrap(), ShellCommand::Map("A".into()));
    }

    #[test]
    fn test_parse_shell_usage_errors() {
        assert!(ShellCommand::parse("add").is_err());
        assert!(ShellCommand::parse("sign A B").is_err());
        assert!(ShellCommand::parse("check A").is_err());
        assert!(ShellCommand::parse("stats now").is_err());
        assert!(ShellCommand::parse("frobnicate").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "wot-cli",
            "run",
            "scenario.json",
            "--format",
            "json",
            "--max-paths",
            "4",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.max_paths, Some(4));
        assert!(matches!(args.command, Commands::Run { .. }));
    }
}
