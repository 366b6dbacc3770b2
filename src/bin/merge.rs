//! k2rule-merge: CLI tool for merging Clash rule providers.

use clap::{Parser, Subcommand};
use k2rule_merge::{
    Behavior, Config, Encoding, HttpFetcher, Merger, ProcessConverter, RuleSource,
    TargetDefinition, TargetStatus,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "k2rule-merge")]
#[command(author = "Kaitu.io")]
#[command(version)]
#[command(about = "Merge Clash rule providers into deduplicated, sorted rule sets", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RuntimeArgs {
    /// Converter executable used for mrs files
    #[arg(long, default_value = ProcessConverter::DEFAULT_PROGRAM)]
    converter: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Converter timeout in seconds
    #[arg(long, default_value_t = 60)]
    converter_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every target in a configuration file
    Merge {
        /// Configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        #[command(flatten)]
        runtime: RuntimeArgs,

        /// Print a JSON report on stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a configuration file without fetching or writing anything
    Check {
        /// Configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Convert one local rule file
    Convert {
        /// Input rule file
        #[arg(short, long)]
        input: PathBuf,

        /// Behavior of the input
        #[arg(long, default_value = "classical")]
        from_behavior: Behavior,

        /// Format of the input (guessed from the extension if omitted)
        #[arg(long)]
        from_format: Option<Encoding>,

        /// Output rule file
        #[arg(short, long)]
        output: PathBuf,

        /// Behavior of the output
        #[arg(long, default_value = "classical")]
        to_behavior: Behavior,

        /// Format of the output
        #[arg(long, default_value = "yaml")]
        to_format: Encoding,

        #[command(flatten)]
        runtime: RuntimeArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Merge {
            config,
            runtime,
            summary,
        } => merge(&config, &runtime, summary),
        Commands::Check { config } => check(&config),
        Commands::Convert {
            input,
            from_behavior,
            from_format,
            output,
            to_behavior,
            to_format,
            runtime,
        } => {
            let target = TargetDefinition::new(output, to_behavior, to_format).with_source(
                "input",
                RuleSource::file(input, from_behavior, from_format),
            );
            convert(target, &runtime)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_merger(runtime: &RuntimeArgs) -> Result<Merger, Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::new(Duration::from_secs(runtime.timeout))?;
    let converter = ProcessConverter::locate(&runtime.converter)
        .with_timeout(Duration::from_secs(runtime.converter_timeout));
    Ok(Merger::new(fetcher, converter))
}

fn merge(
    config: &PathBuf,
    runtime: &RuntimeArgs,
    summary: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let config = Config::load(config)?;
    let merger = build_merger(runtime)?;

    let report = merger.run(&config);

    if summary {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    log::info!(
        "{} of {} targets written",
        report.written(),
        report.targets.len()
    );
    Ok(!report.has_failures())
}

fn check(config: &PathBuf) -> Result<bool, Box<dyn std::error::Error>> {
    let config = Config::load(config)?;

    for target in &config.targets {
        let note = match target.check_output() {
            Ok(()) => String::new(),
            Err(e) => format!("  (will be skipped: {})", e),
        };
        println!(
            "{} [{} / {}]{}",
            target.path.display(),
            target.behavior,
            target.encoding,
            note
        );
        for (name, source) in &target.upstream {
            let format = source
                .encoding
                .map(|e| e.to_string())
                .unwrap_or_else(|| "auto".to_string());
            println!(
                "  {}: {} [{} / {}]",
                name, source.origin, source.behavior, format
            );
        }
    }

    println!("Configuration OK: {} targets", config.targets.len());
    Ok(true)
}

fn convert(
    target: TargetDefinition,
    runtime: &RuntimeArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let merger = build_merger(runtime)?;
    let report = merger.merge_target(&target)?;

    match report.status {
        TargetStatus::Written { rules, .. } => {
            println!("Successfully converted {} rules -> {:?}", rules, target.path);
            Ok(true)
        }
        TargetStatus::Skipped { reason } => {
            eprintln!("Skipped: {}", reason);
            Ok(false)
        }
        TargetStatus::Failed { error } => {
            eprintln!("Failed: {}", error);
            Ok(false)
        }
    }
}
