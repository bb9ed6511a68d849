//! Arbor CLI - host loop for behavior tree assets.
//!
//! - `arbor run` - tick a tree asset for a crowd of agents
//! - `arbor validate` - build an asset and check its structure
//! - `arbor nodes` - list the node types assets can use

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use arbor_bt::{tick_agents, Agent, AgentConfig, NodeRegistry, Tree, TreeLibrary};
use arbor_tools::SharedTraceLog;

mod load;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Behavior tree host loop", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick a tree asset until every agent completes
    Run {
        /// Tree asset (.json, .yaml or .yml)
        asset: PathBuf,

        /// Directory of sub-tree assets
        #[arg(long)]
        library: Option<PathBuf>,

        /// Maximum number of host frames
        #[arg(long, default_value_t = 100)]
        ticks: u64,

        /// Seconds per host frame
        #[arg(long, default_value_t = 0.1)]
        dt: f32,

        /// Number of agents sharing the template
        #[arg(long, default_value_t = 1)]
        agents: u64,

        /// Tick each agent every N frames, phase-shifted by agent id
        #[arg(long, default_value_t = 1)]
        tick_every: u32,

        /// Print trace events as JSON lines
        #[arg(long)]
        trace: bool,
    },

    /// Build an asset and report structural problems
    Validate {
        /// Tree asset (.json, .yaml or .yml)
        asset: PathBuf,

        /// Directory of sub-tree assets
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// List registered node types
    Nodes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let registry = NodeRegistry::with_builtins();

    match cli.command {
        Commands::Run {
            asset,
            library,
            ticks,
            dt,
            agents,
            tick_every,
            trace,
        } => {
            let template = build_template(&registry, &asset, library.as_deref())?;
            let options = RunOptions {
                ticks,
                dt,
                agents,
                tick_every,
                trace,
            };
            run(&template, &options)
        }
        Commands::Validate { asset, library } => {
            let template = build_template(&registry, &asset, library.as_deref())?;
            template
                .validate()
                .with_context(|| format!("{} is not a valid tree", asset.display()))?;
            println!("ok: {} ({} nodes)", template.name(), template.len());
            Ok(())
        }
        Commands::Nodes => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

struct RunOptions {
    ticks: u64,
    dt: f32,
    agents: u64,
    tick_every: u32,
    trace: bool,
}

fn build_template(registry: &NodeRegistry, path: &Path, library_dir: Option<&Path>) -> Result<Tree> {
    let asset = load::read_asset(path)?;

    let mut library = TreeLibrary::new();
    let mut assets = match library_dir {
        Some(dir) => load::read_library(dir)?,
        None => Vec::new(),
    };
    for name in assets
        .iter()
        .chain(std::iter::once(&asset))
        .filter_map(|a| a.shared_blackboard.as_deref())
    {
        library.shared_or_default(name);
    }
    for sub in load::dependency_order(&mut assets) {
        let tree = sub
            .build(registry, &library)
            .with_context(|| format!("failed to build library tree '{}'", sub.name))?;
        library.insert_template(tree);
    }

    asset
        .build(registry, &library)
        .with_context(|| format!("failed to build {}", path.display()))
}

fn run(template: &Tree, options: &RunOptions) -> Result<()> {
    if options.agents == 0 {
        bail!("--agents must be at least 1");
    }

    let mut traces = Vec::new();
    let mut agents = Vec::new();
    for id in 0..options.agents {
        let config = AgentConfig {
            restart_on_completion: false,
            ..AgentConfig::deterministic(id, options.tick_every)
        };
        let mut agent = Agent::from_template(id, template)
            .with_context(|| format!("failed to instantiate agent {id}"))?
            .with_config(config);
        if options.trace {
            let log = SharedTraceLog::new();
            agent.tree_mut().set_trace_sink(Some(Box::new(log.clone())));
            traces.push((id, log));
        }
        agents.push(agent);
    }

    tracing::info!(
        tree = template.name(),
        agents = agents.len(),
        dt = options.dt,
        "Starting run"
    );

    let mut frames = 0;
    for frame in 0..options.ticks {
        tick_agents(frame, options.dt, &mut agents);
        frames = frame + 1;
        for (id, log) in &traces {
            for event in log.take().events {
                let line = serde_json::json!({ "agent": id, "event": event });
                println!("{line}");
            }
        }
        if agents.iter().all(Agent::is_finished) {
            break;
        }
    }

    for agent in &agents {
        println!(
            "agent {}: {} after {} ticks",
            agent.id,
            agent.last_state(),
            agent.tree().clock().tick
        );
    }
    tracing::info!(frames, "Run finished");
    Ok(())
}
