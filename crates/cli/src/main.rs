//! `callquest`: turn a call graph snapshot into a leveled curriculum.

mod command;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use command::{ChainsPayload, CommandAction, CommandRequest, GeneratePayload, GraphSource};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "callquest")]
#[command(version)]
#[command(about = "Generate code-reading levels from a call graph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Call graph JSON document produced by the analyzer
    #[arg(value_name = "GRAPH")]
    graph: PathBuf,

    /// Derive missing calls/called_by halves instead of rejecting the graph
    #[arg(long)]
    lenient: bool,

    /// Use uncalled functions as entry points when the graph lists none
    #[arg(long)]
    detect_entry_points: bool,

    /// TOML file with generation tunables
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate levels as JSON
    Generate {
        #[command(flatten)]
        graph: GraphArgs,

        /// Override max_levels from the config
        #[arg(short = 'n', long)]
        max_levels: Option<usize>,

        /// Project root used to read node source text
        #[arg(long, value_name = "DIR")]
        source_root: Option<PathBuf>,

        /// Omit answers so the output can be handed to players
        #[arg(long)]
        redact_answers: bool,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print ranked chains with their score breakdown
    Chains {
        #[command(flatten)]
        graph: GraphArgs,

        #[arg(long)]
        max_chains: Option<usize>,

        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Print node, edge and depth statistics
    Stats {
        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Export the call graph in Graphviz DOT format
    Dot {
        #[command(flatten)]
        graph: GraphArgs,
    },
}

impl GraphArgs {
    fn into_request(self, action: CommandAction) -> CommandRequest {
        CommandRequest {
            graph: GraphSource {
                path: self.graph,
                lenient: self.lenient,
                detect_entry_points: self.detect_entry_points,
            },
            config: self.config,
            action,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON/DOT output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let (request, output) = match cli.command {
        Commands::Generate {
            graph,
            max_levels,
            source_root,
            redact_answers,
            output,
        } => (
            graph.into_request(CommandAction::Generate(GeneratePayload {
                max_levels,
                source_root,
                redact_answers,
            })),
            output,
        ),
        Commands::Chains {
            graph,
            max_chains,
            max_depth,
        } => (
            graph.into_request(CommandAction::Chains(ChainsPayload {
                max_chains,
                max_depth,
            })),
            None,
        ),
        Commands::Stats { graph } => (graph.into_request(CommandAction::Stats), None),
        Commands::Dot { graph } => (graph.into_request(CommandAction::Dot), None),
    };

    let result = command::execute(request)?;
    match output {
        Some(path) => {
            fs::write(&path, format!("{}\n", result.body))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", result.body),
    }
    Ok(())
}
