//! TCRank simulator: random curators voting on a handful of items.

mod config;
mod simulation;

use clap::Parser;
use config::SimConfig;
use simulation::Simulation;
use std::path::PathBuf;
use tcrank_types::format_tokens;
use tcrank_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tcrank-sim", about = "TCRank ranking engine simulator")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "TCRANK_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TCRANK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TCRANK_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a simulation and print the final ranking.
    Simulate {
        /// Number of polls to play.
        #[arg(long, env = "TCRANK_SIM_ROUNDS")]
        rounds: Option<usize>,

        /// Seed of the random play.
        #[arg(long, env = "TCRANK_SIM_SEED")]
        seed: Option<u64>,

        #[arg(long)]
        items: Option<usize>,

        #[arg(long)]
        voters: Option<usize>,
    },
    /// Print the default configuration as TOML.
    Defaults,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_toml_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    match cli.command {
        Command::Defaults => {
            print!("{}", SimConfig::default().to_toml_string()?);
        }
        Command::Simulate {
            rounds,
            seed,
            items,
            voters,
        } => {
            config.rounds = rounds.unwrap_or(config.rounds);
            config.seed = seed.unwrap_or(config.seed);
            config.items = items.unwrap_or(config.items);
            config.voters = voters.unwrap_or(config.voters);

            let format: LogFormat = config.log_format.parse()?;
            init_logging(format, &config.log_level)?;
            if let Some(path) = &cli.config {
                tracing::info!("loaded config from {}", path.display());
            }

            let report = Simulation::new(config)?.run()?;

            println!("Final ranking:");
            for (position, (item, rank)) in report.ranking.iter().enumerate() {
                println!("  {:>3}. item {:<4} {}", position + 1, item, format_tokens(*rank));
            }
            println!("Balances:");
            for (account, balance) in &report.balances {
                println!("  {:<14} {}", account.as_str(), format_tokens(*balance));
            }
            let stats = &report.stats;
            println!(
                "{} polls ({} up, {} down, {} neutral), {} commits, {} reveals, {} released over {}",
                stats.polls,
                stats.up_outcomes,
                stats.down_outcomes,
                stats.neutral_outcomes,
                stats.commits,
                stats.reveals,
                format_tokens(stats.released),
                format_duration(stats.elapsed_secs),
            );
        }
    }

    Ok(())
}
